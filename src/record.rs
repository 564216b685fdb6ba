//! SRV records.

use std::{cmp::Reverse, fmt::Display};

use hickory_proto::rr::{rdata::SRV, Name};

use crate::Target;

/// Representation of types that contain the fields of a SRV record.
pub trait SrvRecord {
    /// Type representing the SRV record's target. Must implement `Display` so
    /// it can be used to create a [`Target`].
    type Target: Display + ?Sized;

    /// Gets a SRV record's target.
    fn target(&self) -> &Self::Target;

    /// Gets a SRV record's port.
    fn port(&self) -> u16;

    /// Gets a SRV record's priority.
    fn priority(&self) -> u16;

    /// Gets a SRV record's weight.
    fn weight(&self) -> u16;

    /// Whether the record says the service is decidedly not available at
    /// this domain (a target of `.`, RFC 2782).
    fn is_unavailable(&self) -> bool {
        let target = self.target().to_string();
        target.is_empty() || target == "."
    }

    /// Turns a SRV record into a dialable [`Target`].
    fn to_target(&self, direct_tls: bool) -> Target {
        let host = self.target().to_string();
        let host = host.strip_suffix('.').unwrap_or(&host);
        Target::new(host, self.port()).direct_tls(direct_tls)
    }

    /// Generates a key to sort a SRV record by priority and weight.
    fn sort_key(&self) -> (u16, Reverse<u16>) {
        sort_key(self.priority(), self.weight())
    }
}

/// Sorts ascending by priority, then descending (hence `Reverse`) by weight.
///
/// Weights are compared as-is rather than used for a randomized draw, so the
/// same answer always selects the same target.
pub(crate) fn sort_key(priority: u16, weight: u16) -> (u16, Reverse<u16>) {
    (priority, Reverse(weight))
}

impl SrvRecord for SRV {
    type Target = Name;

    fn target(&self) -> &Self::Target {
        self.target()
    }

    fn port(&self) -> u16 {
        self.port()
    }

    fn priority(&self) -> u16 {
        self.priority()
    }

    fn weight(&self) -> u16 {
        self.weight()
    }
}
