//! SRV Resolvers.

use crate::{proxy::DialError, SrvRecord};
use async_trait::async_trait;
use hickory_proto::ProtoError;
use std::{fmt::Debug, io};

pub(crate) mod message;
pub use message::{srv_answers, srv_query};

mod proxied;
pub use proxied::ProxiedResolver;

/// Errors encountered while looking up SRV records.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// The resolver could not be reached at all; see
    /// [`DialError::ServiceNotAvailable`]
    #[error("DNS resolver unreachable: service not available")]
    Unavailable,
    /// Connecting to or talking with the resolver failed
    #[error("DNS exchange failed")]
    Io(#[from] io::Error),
    /// The resolver did not answer in time
    #[error("DNS exchange timed out")]
    Timeout,
    /// The query could not be encoded or the answer decoded
    #[error("malformed DNS message")]
    Codec(#[from] ProtoError),
    /// The lookup worked but yielded nothing to connect to
    #[error("no usable SRV records for {0}")]
    NoRecords(String),
}

impl LookupError {
    /// Whether the failure means nothing routed the same way can work either.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}

impl From<DialError> for LookupError {
    fn from(err: DialError) -> Self {
        match err {
            DialError::ServiceNotAvailable => Self::Unavailable,
            DialError::Io(err) => Self::Io(err),
        }
    }
}

/// The XMPP client services that can be located through SRV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// `_xmpp-client._tcp`: plain TCP, upgraded with STARTTLS
    StartTls,
    /// `_xmpps-client._tcp`: TLS from the first byte (XEP-0368)
    DirectTls,
}

impl Service {
    /// Service and protocol labels.
    pub fn prefix(self) -> &'static str {
        match self {
            Service::StartTls => "_xmpp-client._tcp",
            Service::DirectTls => "_xmpps-client._tcp",
        }
    }

    /// Fully-qualified SRV name of this service for `domain`.
    pub fn srv_name(self, domain: &str) -> String {
        format!("{}.{}.", self.prefix(), domain.trim_end_matches('.'))
    }

    /// Whether connections to this service start with TLS.
    pub fn is_direct_tls(self) -> bool {
        matches!(self, Service::DirectTls)
    }
}

/// Represents the ability to act as a SRV resolver.
#[async_trait]
pub trait SrvResolver: Send + Sync {
    /// SRV record representation produced by the resolver.
    type Record: SrvRecord + Send;

    /// Errors encountered during SRV resolution.
    type Error: std::error::Error + Debug + Send + 'static;

    /// Gets the records corresponding to a srv name without sorting by
    /// priority or shuffling based on weight.
    async fn get_srv_records_unordered(&self, srv: &str) -> Result<Vec<Self::Record>, Self::Error>;

    /// Gets the records corresponding to a srv name, most preferred first.
    async fn get_srv_records(&self, srv: &str) -> Result<Vec<Self::Record>, Self::Error> {
        let mut records = self.get_srv_records_unordered(srv).await?;
        records.sort_by_key(|record| record.sort_key());
        Ok(records)
    }
}
