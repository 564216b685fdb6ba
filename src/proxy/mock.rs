//! A scripted [`Proxy`] for tests.

use super::{DialError, Proxy};
use async_trait::async_trait;
use std::{
    collections::VecDeque,
    io::{self, Cursor},
    pin::Pin,
    sync::{Arc, Mutex},
    task::{Context, Poll},
};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

type Expectation = Box<dyn FnOnce(&str, &str) -> Result<FakeConn, DialError> + Send>;

/// Answers each dial with the next scripted expectation, in order.
#[derive(Default)]
pub(crate) struct MockProxy {
    expectations: Mutex<VecDeque<Expectation>>,
    dialed: Mutex<Vec<String>>,
}

impl MockProxy {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queues the handler for the next dial.
    pub(crate) fn expects(
        &self,
        handler: impl FnOnce(&str, &str) -> Result<FakeConn, DialError> + Send + 'static,
    ) {
        self.expectations
            .lock()
            .unwrap()
            .push_back(Box::new(handler));
    }

    /// Queues a dial that must be a TCP dial to `address`.
    pub(crate) fn expects_dial(
        &self,
        address: &'static str,
        result: impl FnOnce() -> Result<FakeConn, DialError> + Send + 'static,
    ) {
        self.expects(move |network, addr| {
            assert_eq!(network, "tcp");
            assert_eq!(addr, address);
            result()
        });
    }

    /// Addresses dialed so far.
    pub(crate) fn dialed(&self) -> Vec<String> {
        self.dialed.lock().unwrap().clone()
    }

    /// Panics if any queued expectation was not used.
    pub(crate) fn assert_satisfied(&self) {
        let left = self.expectations.lock().unwrap().len();
        assert_eq!(left, 0, "{left} expected dial(s) never happened");
    }
}

#[async_trait]
impl Proxy for MockProxy {
    type Conn = FakeConn;

    async fn dial(&self, network: &str, address: &str) -> Result<FakeConn, DialError> {
        self.dialed.lock().unwrap().push(address.to_owned());
        let handler = self
            .expectations
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected dial to {network} {address}"));
        handler(network, address)
    }
}

/// An in-memory connection that replays canned bytes and records writes.
#[derive(Debug)]
pub(crate) struct FakeConn {
    label: &'static str,
    silent: bool,
    incoming: Cursor<Vec<u8>>,
    outgoing: Arc<Mutex<Vec<u8>>>,
}

impl FakeConn {
    /// A connection with nothing to read, told apart by its label.
    pub(crate) fn labelled(label: &'static str) -> Self {
        Self {
            label,
            silent: false,
            incoming: Cursor::new(Vec::new()),
            outgoing: Default::default(),
        }
    }

    /// A connection to a DNS server that answers with `response` (which must
    /// already carry its TCP length prefix).
    pub(crate) fn dns(response: Vec<u8>) -> Self {
        Self {
            label: "dns",
            silent: false,
            incoming: Cursor::new(response),
            outgoing: Default::default(),
        }
    }

    /// A connection whose reads never complete.
    pub(crate) fn silent() -> Self {
        Self {
            silent: true,
            ..Self::labelled("silent")
        }
    }

    /// Records everything written to the connection into `sink`.
    pub(crate) fn with_sink(self, sink: Arc<Mutex<Vec<u8>>>) -> Self {
        Self {
            outgoing: sink,
            ..self
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        self.label
    }
}

impl AsyncRead for FakeConn {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if self.silent {
            return Poll::Pending;
        }
        Pin::new(&mut self.get_mut().incoming).poll_read(cx, buf)
    }
}

impl AsyncWrite for FakeConn {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.outgoing.lock().unwrap().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// An end-of-stream error, the way a dropped proxy connection looks.
pub(crate) fn eof() -> DialError {
    io::Error::from(io::ErrorKind::UnexpectedEof).into()
}
