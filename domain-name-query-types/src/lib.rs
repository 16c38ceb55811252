use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum QType {
    A,
    Txt,
}

impl QType {
    // https://datatracker.ietf.org/doc/html/rfc1035#section-3.2.2
    pub fn code(&self) -> u16 {
        match self {
            QType::A => 1,
            QType::Txt => 16,
        }
    }
}

impl fmt::Display for QType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            QType::A => "A",
            QType::Txt => "TXT",
        };
        write!(f, "{}", s)
    }
}

pub type Name = String;

/// A single-question lookup. `name` is always fully qualified (trailing dot)
/// so the resolver never appends a search suffix.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct NameQuery {
    pub name: Name,
    pub q_type: QType,
}

impl NameQuery {
    pub fn a_record(host: &str) -> Self {
        Self {
            name: fqdn(host),
            q_type: QType::A,
        }
    }

    /// TXT query for the ESNI keys published at `_esni.<host>.`
    pub fn esni_keys(host: &str) -> Self {
        Self {
            name: format!("_esni.{}", fqdn(host)),
            q_type: QType::Txt,
        }
    }
}

impl fmt::Display for NameQuery {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.q_type, self.name)
    }
}

fn fqdn(host: &str) -> Name {
    if host.ends_with('.') {
        Name::from(host)
    } else {
        format!("{}.", host)
    }
}
