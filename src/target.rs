use std::fmt;

use http::uri::Authority;

/// The address a connection is (or was) opened to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    host: String,
    port: u16,
    direct_tls: bool,
}

impl Target {
    /// Creates a plain TCP target.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            direct_tls: false,
        }
    }

    /// Parses a `host:port` string. When the port is omitted `default_port`
    /// is used. Returns `None` for anything that is not a bare authority
    /// (e.g. has a scheme, path or userinfo).
    pub fn parse(address: &str, default_port: u16) -> Option<Self> {
        let authority: Authority = address.parse().ok()?;
        if authority.as_str().contains('@') || authority.host().is_empty() {
            return None;
        }
        let port = match authority.port_u16() {
            Some(port) => port,
            // Something follows the host, but it is not a valid port
            None if authority.as_str().len() > authority.host().len() => return None,
            None => default_port,
        };
        Some(Self::new(authority.host(), port))
    }

    /// Marks whether TLS must be negotiated directly on connect (XEP-0368)
    /// instead of through STARTTLS.
    pub fn direct_tls(self, direct_tls: bool) -> Self {
        Self { direct_tls, ..self }
    }

    /// Host name or address literal.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether the server expects TLS right away.
    pub fn is_direct_tls(&self) -> bool {
        self.direct_tls
    }

    /// Network handed to the proxy. Always TCP.
    pub fn network(&self) -> &'static str {
        "tcp"
    }

    /// `host:port` as handed to the proxy.
    pub fn address(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
