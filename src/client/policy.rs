use super::{Config, Error};
use crate::Target;

/// What a [`Dialer`](super::Dialer) will attempt, decided up front from its
/// configuration.
///
/// - An explicit server address is dialed as-is and nothing else is tried.
/// - With SRV lookups disabled, the JID's domain is dialed at the default
///   port.
/// - Otherwise the domain's SRV records are looked up and the best target is
///   dialed; if the lookup finds nothing (but the resolver was reachable),
///   the domain at the default port is dialed instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Dial a single, known address
    Direct(Target),
    /// Look the service up first, keeping a fallback for failed lookups
    Discover {
        /// Domain whose SRV records are looked up
        domain: String,
        /// Dialed when the lookup fails or yields nothing
        fallback: Target,
    },
}

impl Plan {
    /// Picks the plan for `domain` under `config`.
    pub fn new(config: &Config, domain: &str, default_port: u16) -> Result<Self, Error> {
        if let Some(address) = &config.server_address {
            return Target::parse(address, default_port)
                .map(Plan::Direct)
                .ok_or_else(|| Error::InvalidServerAddress(address.clone()));
        }

        let origin = Target::new(domain, default_port);
        if config.skip_srv_lookup {
            Ok(Plan::Direct(origin))
        } else {
            Ok(Plan::Discover {
                domain: domain.to_owned(),
                fallback: origin,
            })
        }
    }
}
