//! Dialers based on SRV lookups.

use crate::{
    proxy::{DialError, Proxy},
    resolver::{ProxiedResolver, Service},
    Jid, Target, DEFAULT_PORT, DEFAULT_QUERY_TIMEOUT, DEFAULT_RESOLVER,
};
use std::time::Duration;

/// Deciding which addresses to dial.
pub mod policy;
use policy::Plan;

/// Errors encountered by a [`Dialer`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The DNS resolver could not be reached through the proxy, so nothing
    /// else could be either
    #[error("service not available")]
    InfrastructureUnavailable,
    /// The only remaining address could not be connected to
    #[error("failed to establish a TCP connection to {address}")]
    TcpBindingFailed {
        /// Address dialed last
        address: String,
        /// Why the dial failed
        #[source]
        source: DialError,
    },
    /// SRV discovery pointed at a server, but connecting to it failed
    #[error("connection to {address} failed")]
    ConnectionFailed {
        /// Address found through SRV
        address: String,
        /// Why the dial failed
        #[source]
        source: DialError,
    },
    /// The configured server address is not a `host[:port]`
    #[error("invalid server address {0:?}")]
    InvalidServerAddress(String),
}

/// How a [`Dialer`] picks its server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Fixed `host[:port]` to connect to, bypassing SRV
    pub server_address: Option<String>,
    /// Connect to the JID's domain at the default port instead of looking
    /// up SRV records
    pub skip_srv_lookup: bool,
}

impl Config {
    /// Sets a fixed server address.
    pub fn server_address(self, server_address: impl ToString) -> Self {
        Self {
            server_address: Some(server_address.to_string()),
            ..self
        }
    }

    /// Sets whether SRV lookups are skipped.
    pub fn skip_srv_lookup(self, skip_srv_lookup: bool) -> Self {
        Self {
            skip_srv_lookup,
            ..self
        }
    }

    /// A fixed server address implies that no SRV lookup happens.
    pub fn normalize(&mut self) {
        if self.server_address.is_some() {
            self.skip_srv_lookup = true;
        }
    }
}

/// Opens the transport connection for an XMPP account, with every socket
/// (DNS included) going through a [`Proxy`].
///
/// # Usage
///
/// After being created by [`Dialer::new`], [`Dialer::connect`] follows the
/// [`Plan`] its [`Config`] calls for and returns the first connection that
/// works, along with the [`Target`] it was made to.
///
/// Failures are kept apart so that callers can give useful advice:
///
/// - [`Error::InfrastructureUnavailable`]: the proxy cannot reach anything,
/// - [`Error::TcpBindingFailed`]: no address could be connected to,
/// - [`Error::ConnectionFailed`]: SRV found a server that refused us.
///
/// A dialer holds no state between calls; each `connect` starts afresh.
#[derive(Debug)]
pub struct Dialer<P> {
    jid: Jid,
    config: Config,
    proxy: P,
    default_port: u16,
    resolver_address: String,
    services: Vec<Service>,
    query_timeout: Option<Duration>,
}

impl<P: Proxy> Dialer<P> {
    /// Creates a new dialer for `jid`. The configuration is normalized once,
    /// here.
    ///
    /// SRV queries go to [`DEFAULT_RESOLVER`], and each one gives up after
    /// [`DEFAULT_QUERY_TIMEOUT`] so that a resolver which accepts the
    /// connection but never answers cannot stall [`Dialer::connect`]. The
    /// proxy alone bounds how long dials take.
    pub fn new(jid: Jid, mut config: Config, proxy: P) -> Self {
        config.normalize();
        Self {
            jid,
            config,
            proxy,
            default_port: DEFAULT_PORT,
            resolver_address: DEFAULT_RESOLVER.to_owned(),
            services: vec![Service::StartTls],
            query_timeout: Some(DEFAULT_QUERY_TIMEOUT),
        }
    }

    /// Sets the port used for the domain when SRV is not (or cannot be) used.
    pub fn default_port(self, default_port: u16) -> Self {
        Self {
            default_port,
            ..self
        }
    }

    /// Sets the `host:port` of the DNS server queried for SRV records.
    pub fn resolver_address(self, resolver_address: impl ToString) -> Self {
        Self {
            resolver_address: resolver_address.to_string(),
            ..self
        }
    }

    /// Sets the services looked up during discovery, in order.
    pub fn services(self, services: impl IntoIterator<Item = Service>) -> Self {
        Self {
            services: services.into_iter().collect(),
            ..self
        }
    }

    /// Bounds each DNS query/response exchange, instead of
    /// [`DEFAULT_QUERY_TIMEOUT`]. A timeout counts as a failed lookup.
    pub fn query_timeout(self, query_timeout: Duration) -> Self {
        Self {
            query_timeout: Some(query_timeout),
            ..self
        }
    }

    /// Gets the JID being connected for.
    pub fn jid(&self) -> &Jid {
        &self.jid
    }

    /// Gets the (normalized) configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Gets the plan [`Dialer::connect`] will follow.
    pub fn plan(&self) -> Result<Plan, Error> {
        Plan::new(&self.config, self.jid.domain(), self.default_port)
    }

    /// Connects to the account's server.
    ///
    /// At most one dial is in flight at any time and nothing is retried.
    pub async fn connect(&self) -> Result<(P::Conn, Target), Error> {
        let plan = self.plan()?;
        #[cfg(feature = "log")]
        tracing::debug!(jid = %self.jid, ?plan, "connecting");

        match plan {
            Plan::Direct(target) => self.dial_last(target).await,
            Plan::Discover { domain, fallback } => match self.resolver().resolve(&domain).await {
                Ok(target) => {
                    #[cfg(feature = "log")]
                    tracing::info!(%domain, %target, "discovered server through SRV");
                    match self.dial(&target).await {
                        Ok(conn) => Ok((conn, target)),
                        Err(source) => {
                            #[cfg(feature = "log")]
                            tracing::warn!(%target, error = %source, "discovered server refused connection");
                            Err(Error::ConnectionFailed {
                                address: target.address(),
                                source,
                            })
                        }
                    }
                }
                Err(err) if err.is_unavailable() => {
                    #[cfg(feature = "log")]
                    tracing::warn!(%domain, "DNS resolver unreachable, giving up");
                    Err(Error::InfrastructureUnavailable)
                }
                Err(err) => {
                    #[cfg(feature = "log")]
                    tracing::info!(%domain, error = %err, %fallback, "SRV lookup failed, using default address");
                    self.dial_last(fallback).await
                }
            },
        }
    }

    fn resolver(&self) -> ProxiedResolver<&P> {
        ProxiedResolver::new(&self.proxy)
            .address(&self.resolver_address)
            .services(self.services.iter().copied())
            .timeout(self.query_timeout)
    }

    async fn dial(&self, target: &Target) -> Result<P::Conn, DialError> {
        #[cfg(feature = "log")]
        tracing::debug!(%target, "dialing");
        self.proxy.dial(target.network(), &target.address()).await
    }

    /// Dials the final candidate of a plan.
    async fn dial_last(&self, target: Target) -> Result<(P::Conn, Target), Error> {
        match self.dial(&target).await {
            Ok(conn) => Ok((conn, target)),
            Err(source) => {
                #[cfg(feature = "log")]
                tracing::warn!(%target, error = %source, "TCP binding failed");
                Err(Error::TcpBindingFailed {
                    address: target.address(),
                    source,
                })
            }
        }
    }
}
