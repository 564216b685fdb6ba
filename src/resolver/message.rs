//! SRV queries and answers, in hickory-proto's DNS message types.

use hickory_proto::{
    op::{Message, MessageType, OpCode, Query, ResponseCode},
    rr::{rdata::SRV, Name, RData, RecordType},
    ProtoError,
};

use crate::SrvRecord;

/// Builds a recursive query for the SRV records of `srv` (a name such as
/// `_xmpp-client._tcp.example.com.`).
pub fn srv_query(id: u16, srv: &str) -> Result<Message, ProtoError> {
    let name = Name::from_utf8(srv)?;

    let mut message = Message::new(id, MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(Query::query(name, RecordType::SRV));
    Ok(message)
}

/// Gets the SRV answers of `response` that point somewhere.
///
/// A response code other than NOERROR (NXDOMAIN included) yields no answers,
/// and so do records whose target is `.`.
pub fn srv_answers(response: &Message) -> Vec<SRV> {
    if response.response_code() != ResponseCode::NoError {
        #[cfg(feature = "log")]
        tracing::debug!(rcode = %response.response_code(), "DNS server returned an error");
        return Vec::new();
    }

    response
        .answers()
        .iter()
        .filter_map(|record| match record.data() {
            RData::SRV(srv) if !srv.is_unavailable() => Some(srv.clone()),
            _ => None,
        })
        .collect()
}
