//! Jabber identifiers.

use std::{fmt, str::FromStr};

/// Errors produced when parsing a [`Jid`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The domain part is missing
    #[error("JID has an empty domain part")]
    EmptyDomain,
    /// An `@` was present with nothing before it
    #[error("JID has an empty local part")]
    EmptyLocal,
    /// A `/` was present with nothing after it
    #[error("JID has an empty resource part")]
    EmptyResource,
    /// The domain part is not a bare host: it carries a port, or a second `@`
    #[error("JID domain part {0:?} is not a host name")]
    InvalidDomain(String),
}

/// An address of the form `local@domain/resource`, where only the domain is
/// mandatory.
///
/// The dialer only ever looks at [`Jid::domain`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Jid {
    local: Option<String>,
    domain: String,
    resource: Option<String>,
}

impl Jid {
    /// Gets the local part, if any.
    pub fn local(&self) -> Option<&str> {
        self.local.as_deref()
    }

    /// Gets the domain part.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Gets the resource part, if any.
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }
}

impl FromStr for Jid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The resource may itself contain '@', so split it off first.
        let (bare, resource) = match s.split_once('/') {
            Some((_, "")) => return Err(Error::EmptyResource),
            Some((bare, resource)) => (bare, Some(resource.to_owned())),
            None => (s, None),
        };

        let (local, domain) = match bare.split_once('@') {
            Some(("", _)) => return Err(Error::EmptyLocal),
            Some((local, domain)) => (Some(local.to_owned()), domain),
            None => (None, bare),
        };

        if domain.is_empty() {
            return Err(Error::EmptyDomain);
        }
        if !is_host(domain) {
            return Err(Error::InvalidDomain(domain.to_owned()));
        }

        Ok(Self {
            local,
            domain: domain.to_owned(),
            resource,
        })
    }
}

/// A domain part is a name or an IP literal, so `:` may only appear inside
/// `[...]` (IPv6).
fn is_host(domain: &str) -> bool {
    if domain.contains('@') {
        return false;
    }
    match domain.strip_prefix('[') {
        Some(literal) => literal
            .strip_suffix(']')
            .is_some_and(|inner| !inner.contains(['[', ']'])),
        None => !domain.contains([':', '[', ']']),
    }
}

impl fmt::Display for Jid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(local) = &self.local {
            write!(f, "{local}@")?;
        }
        f.write_str(&self.domain)?;
        if let Some(resource) = &self.resource {
            write!(f, "/{resource}")?;
        }
        Ok(())
    }
}
