use crate::error::{Error, Result};
use crate::header::Header;
use crate::question::{Question, CLASS_IN};
use crate::resource_record::ResourceRecord;
use domain_name_query_types::{NameQuery, QType};
use std::io::Cursor;
use std::net::Ipv4Addr;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RecordData {
    Txt(String),
    A(Ipv4Addr),
}

/// Sequential reader over a DNS response. The header is checked and the
/// question section skipped up front; answers are decoded one at a time.
#[derive(Debug)]
pub struct ResponseMessage<'a> {
    reader: Cursor<&'a [u8]>,
    answers_left: u16,
}

impl<'a> ResponseMessage<'a> {
    pub fn parse_response(response: &'a [u8]) -> Result<Self> {
        let mut reader = Cursor::new(response);

        let header = Header::parse_from_reader(&mut reader)?;
        let rcode = header.response_code();
        if !rcode.is_success() {
            return Err(Error::ResponseCode(rcode));
        }

        // The echoed question is not checked against what we asked.
        for _ in 0..header.qd_count() {
            Question::parse_from_reader(&mut reader)?;
        }

        let answers_left = header.answer_count();
        let msg = Self {
            reader,
            answers_left,
        };

        Ok(msg)
    }

    pub fn next_answer(&mut self) -> Result<Option<ResourceRecord<'a>>> {
        if self.answers_left == 0 {
            return Ok(None);
        }
        self.answers_left -= 1;

        ResourceRecord::parse_from_reader(&mut self.reader).map(Some)
    }

    /// Returns the data of the first IN-class answer of the wanted type.
    pub fn first_answer(&mut self, query: &NameQuery) -> Result<RecordData> {
        let wanted = query.q_type.code();

        while let Some(record) = self.next_answer()? {
            if record.rtype() != wanted || record.rclass() != CLASS_IN {
                continue;
            }
            if !record.domain().eq_ignore_ascii_case(&query.name) {
                // Owner name is not enforced; the record is still used.
                tracing::debug!(
                    want = %query.name,
                    got = %record.domain(),
                    "answer owner name differs from query"
                );
            }

            return match query.q_type {
                QType::Txt => record.txt().map(RecordData::Txt),
                QType::A => record.ipv4().map(RecordData::A),
            };
        }

        Err(Error::NotFound(query.q_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::domain_to_qname;

    struct Answer<'n> {
        name: &'n str,
        rtype: u16,
        rclass: u16,
        rdata: Vec<u8>,
    }

    impl<'n> Answer<'n> {
        fn txt(name: &'n str, text: &str) -> Self {
            let mut rdata = vec![text.len() as u8];
            rdata.extend_from_slice(text.as_bytes());
            Self {
                name,
                rtype: 16,
                rclass: 1,
                rdata,
            }
        }

        fn a(name: &'n str, octets: [u8; 4]) -> Self {
            Self {
                name,
                rtype: 1,
                rclass: 1,
                rdata: octets.to_vec(),
            }
        }
    }

    fn response(rcode: u8, question: &NameQuery, answers: &[Answer]) -> Vec<u8> {
        let mut msg = vec![0, 0, 0x81, 0x80 | rcode, 0, 1];
        msg.extend_from_slice(&(answers.len() as u16).to_be_bytes());
        msg.extend_from_slice(&[0, 0, 0, 0]);
        msg.extend_from_slice(&domain_to_qname(&question.name).unwrap());
        msg.extend_from_slice(&question.q_type.code().to_be_bytes());
        msg.extend_from_slice(&[0, 1]);
        for answer in answers {
            msg.extend_from_slice(&domain_to_qname(answer.name).unwrap());
            msg.extend_from_slice(&answer.rtype.to_be_bytes());
            msg.extend_from_slice(&answer.rclass.to_be_bytes());
            msg.extend_from_slice(&300u32.to_be_bytes());
            msg.extend_from_slice(&(answer.rdata.len() as u16).to_be_bytes());
            msg.extend_from_slice(&answer.rdata);
        }
        msg
    }

    #[test]
    fn failed_rcode_stops_before_answers() {
        let q = NameQuery::esni_keys("example.com");
        let mut bytes = response(2, &q, &[Answer::txt("_esni.example.com.", "AAAA")]);
        // corrupt the answer; it must never be read
        let len = bytes.len();
        bytes.truncate(len - 3);

        let err = ResponseMessage::parse_response(&bytes).unwrap_err();
        assert!(matches!(err, Error::ResponseCode(rc) if rc.0 == 2));
        assert_eq!(err.to_string(), "DNS query failed, rcode=SERVFAIL");
    }

    #[test]
    fn no_matching_answer_is_not_found() {
        let q = NameQuery::a_record("example.com");
        let bytes = response(0, &q, &[Answer::txt("example.com.", "hello")]);

        let err = ResponseMessage::parse_response(&bytes)
            .unwrap()
            .first_answer(&q)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn empty_answer_section_is_not_found() {
        let q = NameQuery::esni_keys("example.com");
        let bytes = response(0, &q, &[]);
        let mut msg = ResponseMessage::parse_response(&bytes).unwrap();
        assert!(matches!(msg.first_answer(&q), Err(Error::NotFound(QType::Txt))));
    }

    #[test]
    fn skips_unrelated_records() {
        let q = NameQuery::a_record("example.com");
        let mut chaos = Answer::a("example.com.", [10, 0, 0, 1]);
        chaos.rclass = 3;
        let cname = Answer {
            name: "example.com.",
            rtype: 5,
            rclass: 1,
            rdata: domain_to_qname("edge.example.net.").unwrap(),
        };
        let bytes = response(
            0,
            &q,
            &[
                cname,
                chaos,
                Answer::a("edge.example.net.", [93, 184, 216, 34]),
                Answer::a("edge.example.net.", [1, 2, 3, 4]),
            ],
        );

        let mut msg = ResponseMessage::parse_response(&bytes).unwrap();
        let data = msg.first_answer(&q).unwrap();
        assert_eq!(data, RecordData::A(Ipv4Addr::new(93, 184, 216, 34)));
    }

    #[test]
    fn dotted_quad_uses_all_four_octets() {
        let q = NameQuery::a_record("example.com");
        let bytes = response(0, &q, &[Answer::a("example.com.", [93, 184, 216, 34])]);

        let data = ResponseMessage::parse_response(&bytes)
            .unwrap()
            .first_answer(&q)
            .unwrap();
        let RecordData::A(addr) = &data else {
            panic!("expected A data, got {:?}", data);
        };
        assert_eq!(addr.to_string(), "93.184.216.34");
    }

    #[test]
    fn mismatched_owner_name_still_consumed() {
        let q = NameQuery::esni_keys("example.com");
        let bytes = response(0, &q, &[Answer::txt("_esni.other.org.", "AAAA")]);

        let data = ResponseMessage::parse_response(&bytes)
            .unwrap()
            .first_answer(&q)
            .unwrap();
        assert_eq!(data, RecordData::Txt("AAAA".to_string()));
    }

    #[test]
    fn owner_name_match_ignores_case() {
        let q = NameQuery::esni_keys("Example.COM");
        let bytes = response(0, &q, &[Answer::txt("_esni.example.com.", "AAAA")]);
        let mut msg = ResponseMessage::parse_response(&bytes).unwrap();
        assert_eq!(msg.answers_left, 1);
        assert!(msg.first_answer(&q).is_ok());
    }

    #[test]
    fn truncated_answer_is_protocol_error() {
        let q = NameQuery::a_record("example.com");
        let mut bytes = response(0, &q, &[Answer::a("example.com.", [93, 184, 216, 34])]);
        bytes.truncate(bytes.len() - 2);

        let err = ResponseMessage::parse_response(&bytes)
            .unwrap()
            .first_answer(&q)
            .unwrap_err();
        assert!(!err.is_not_found());
        assert!(!err.is_encoding());
    }
}
