#![deny(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

/*!
Proxy-aware connection establishment for XMPP clients.

# Introduction

An XMPP client given a JID such as `user@example.com` has to find the server
for `example.com`. Servers advertise themselves with SRV records, as defined
in [RFC 2782](https://tools.ietf.org/html/rfc2782) and
[RFC 6120 §3.2](https://tools.ietf.org/html/rfc6120#section-3.2):

```text
_xmpp-client._tcp.example.com. 600 IN SRV 0 5 5222 xmpp.example.com.
```

A client wanting to talk to this server would connect to
`xmpp.example.com:5222`, and, should no such record exist, to
`example.com:5222`.

Asking the operating system for these records leaks which service is being
contacted, and often does not work at all on locked-down networks. This crate
instead sends a single SRV query over TCP to a fixed public resolver
([`DEFAULT_RESOLVER`]), through the same [`Proxy`] that carries the XMPP
connection itself. No socket is ever opened except through the proxy.

[`Dialer::new`] creates a dialer for a [`Jid`] and a [`Config`], and
[`Dialer::connect`] opens the connection, returning it along with the
[`Target`] it was made to.

# Failure classification

[`Dialer::connect`] fails in one of three ways:

- [`Error::InfrastructureUnavailable`]: the proxy could not even reach the DNS
  resolver, so nothing else is attempted;
- [`Error::TcpBindingFailed`]: the last address tried (a configured one, or
  the domain at [`DEFAULT_PORT`]) did not accept a connection;
- [`Error::ConnectionFailed`]: SRV discovery worked, but the server it pointed
  at did not accept a connection.

A failed or empty SRV lookup is not an error by itself: the domain at the
default port is tried instead.

# Proxies and resolvers

Any type implementing [`Proxy`] can be used; [`proxy::Direct`] connects
without one. The SRV lookup is done by [`resolver::ProxiedResolver`], which
implements [`resolver::SrvResolver`] and can be used on its own. DNS
messages are built and read with [`hickory_proto`].
*/

mod client;
pub use client::{policy, Config, Dialer, Error};

mod jid;
pub use jid::{Error as JidError, Jid};

pub mod proxy;
pub use proxy::{DialError, Proxy};

mod record;
pub use record::SrvRecord;

pub mod resolver;

mod target;
pub use target::Target;

/// Port of the client-to-server service when SRV does not say otherwise.
pub const DEFAULT_PORT: u16 = 5222;

/// The DNS server SRV queries are sent to (OpenDNS).
pub const DEFAULT_RESOLVER: &str = "208.67.222.222:53";

/// How long a DNS query may wait for its answer once the resolver is
/// connected to.
pub const DEFAULT_QUERY_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);
