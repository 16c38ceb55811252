//! DNS message codec for stream transports.
//!
//! Queries are packed behind the 2-byte length prefix used by DNS over TCP
//! and TLS; responses are read from the message body after that prefix.

mod error;
mod header;
mod question;
mod request_message;
mod resource_record;
mod response_message;
mod utils;

use domain_name_query_types::NameQuery;

pub use error::{Error, Result};
pub use header::ResponseCode;
pub use request_message::LENGTH_PREFIX_LEN;
pub use resource_record::ResourceRecord;
pub use response_message::{RecordData, ResponseMessage};

/// Builds a framed single-question query with recursion desired.
pub fn encode_query(query: &NameQuery) -> Result<Vec<u8>> {
    request_message::RequestMessage::new(query).to_framed_bytes()
}

/// Decodes the first answer matching `query` from an unframed response body.
pub fn decode_answer(response_bytes: &[u8], query: &NameQuery) -> Result<RecordData> {
    ResponseMessage::parse_response(response_bytes)?.first_answer(query)
}
