//! SRV resolver that speaks DNS over TCP through a [`Proxy`].

use super::{srv_answers, srv_query, LookupError, Service, SrvResolver};
use crate::{proxy::Proxy, SrvRecord, Target, DEFAULT_QUERY_TIMEOUT, DEFAULT_RESOLVER};
use async_trait::async_trait;
use hickory_proto::{op::Message, rr::rdata::SRV, serialize::binary::BinEncodable};
use std::{io, time::Duration};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Looks SRV records up by sending a single query to a fixed public resolver,
/// over a connection opened by a [`Proxy`].
///
/// Every query uses a fresh connection; nothing is cached.
#[derive(Debug, Clone)]
pub struct ProxiedResolver<P> {
    proxy: P,
    address: String,
    services: Vec<Service>,
    timeout: Option<Duration>,
}

impl<P: Proxy> ProxiedResolver<P> {
    /// Creates a resolver querying [`DEFAULT_RESOLVER`] for the STARTTLS
    /// client service, giving up on an exchange after
    /// [`DEFAULT_QUERY_TIMEOUT`].
    pub fn new(proxy: P) -> Self {
        Self {
            proxy,
            address: DEFAULT_RESOLVER.to_owned(),
            services: vec![Service::StartTls],
            timeout: Some(DEFAULT_QUERY_TIMEOUT),
        }
    }

    /// Sets the `host:port` of the DNS server to query.
    pub fn address(self, address: impl ToString) -> Self {
        Self {
            address: address.to_string(),
            ..self
        }
    }

    /// Sets the services looked up by [`ProxiedResolver::resolve`], in order.
    pub fn services(self, services: impl IntoIterator<Item = Service>) -> Self {
        Self {
            services: services.into_iter().collect(),
            ..self
        }
    }

    /// Bounds each query/response exchange (not the dial itself). `None`
    /// waits for as long as the connection stays open.
    pub fn timeout(self, timeout: Option<Duration>) -> Self {
        Self { timeout, ..self }
    }

    /// Finds the preferred target for the XMPP client service of `domain`.
    ///
    /// The first service tells whether the resolver can be used at all: if
    /// looking it up fails, so does the whole lookup and no other service is
    /// tried. Failures for later services are skipped. The best record across
    /// all services wins: lowest priority, then highest weight, then the
    /// earlier service. An unreachable resolver stops the lookup at once.
    pub async fn resolve(&self, domain: &str) -> Result<Target, LookupError> {
        let mut best: Option<(SRV, Service)> = None;

        for (i, &service) in self.services.iter().enumerate() {
            let srv_name = service.srv_name(domain);
            match self.get_srv_records(&srv_name).await {
                Ok(records) => {
                    #[cfg(feature = "log")]
                    tracing::debug!(srv = %srv_name, count = records.len(), "SRV lookup answered");

                    let Some(record) = records.into_iter().next() else {
                        continue;
                    };
                    let better = best
                        .as_ref()
                        .map_or(true, |(current, _)| record.sort_key() < current.sort_key());
                    if better {
                        best = Some((record, service));
                    }
                }
                Err(err) if i == 0 || err.is_unavailable() => return Err(err),
                Err(_err) => {
                    #[cfg(feature = "log")]
                    tracing::debug!(srv = %srv_name, error = %_err, "SRV lookup failed, skipping");
                }
            }
        }

        best.map(|(record, service)| record.to_target(service.is_direct_tls()))
            .ok_or_else(|| LookupError::NoRecords(domain.to_owned()))
    }

    /// Sends `query` and reads back one response, both framed with a 2-byte
    /// length prefix (RFC 1035 §4.2.2).
    async fn exchange(&self, query: &Message) -> Result<Message, LookupError> {
        let request = query.to_bytes()?;
        let len = u16::try_from(request.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "DNS query too long"))?;
        let mut conn = self.proxy.dial("tcp", &self.address).await?;

        let talk = async {
            conn.write_u16(len).await?;
            conn.write_all(&request).await?;
            conn.flush().await?;
            let len = conn.read_u16().await?;
            let mut response = vec![0; len as usize];
            conn.read_exact(&mut response).await?;
            Ok::<_, io::Error>(response)
        };

        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, talk)
                .await
                .map_err(|_| LookupError::Timeout)??,
            None => talk.await?,
        };

        Ok(Message::from_vec(&response)?)
    }
}

#[async_trait]
impl<P: Proxy> SrvResolver for ProxiedResolver<P> {
    type Record = SRV;
    type Error = LookupError;

    async fn get_srv_records_unordered(&self, srv: &str) -> Result<Vec<SRV>, LookupError> {
        let query = srv_query(rand::random(), srv)?;
        let response = self.exchange(&query).await?;
        Ok(srv_answers(&response))
    }
}
