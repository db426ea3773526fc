use serde::{Deserialize, Serialize};
use std::fmt;

/// Which half of the API a command belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    /// Unauthenticated market data
    Public,
    /// Signed, nonce-sequenced trading and account commands
    Private,
}

impl Access {
    pub fn requires_auth(self) -> bool {
        matches!(self, Self::Private)
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Private => write!(f, "private"),
        }
    }
}

/// How arguments travel over the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    /// GET with arguments in the query string
    Query,
    /// POST with a form-encoded body
    Body,
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => write!(f, "GET"),
            Self::Body => write!(f, "POST"),
        }
    }
}

/// Static descriptor of one remote command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub access: Access,
    pub verb: Verb,
}

impl CommandSpec {
    pub const fn public(name: &'static str) -> Self {
        Self {
            name,
            access: Access::Public,
            verb: Verb::Query,
        }
    }

    pub const fn private(name: &'static str) -> Self {
        Self {
            name,
            access: Access::Private,
            verb: Verb::Body,
        }
    }

    pub fn requires_auth(&self) -> bool {
        self.access.requires_auth()
    }
}
