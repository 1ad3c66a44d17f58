//! Identifier newtypes.
//!
//! All identifiers in the matching core are opaque strings issued by the
//! document store. Wrapping them keeps request, user, match, and channel
//! ids from being mixed up at call sites.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id! {
    /// A delivery request identifier.
    RequestId
}

string_id! {
    /// A user identifier, for both gillers (couriers) and requesters.
    UserId
}

string_id! {
    /// A persisted match record identifier.
    MatchId
}

string_id! {
    /// A chat channel identifier.
    ChannelId
}

impl MatchId {
    /// Deterministic match id for a (request, giller) pair.
    ///
    /// A pair can have at most one match record, so deriving the id from
    /// the pair makes repeated persistence naturally idempotent.
    pub fn for_pair(request: &RequestId, giller: &UserId) -> Self {
        Self(format!("m-{}-{}", request.as_str(), giller.as_str()))
    }
}

impl ChannelId {
    /// Deterministic chat channel id for a request.
    ///
    /// Deriving the channel id from the request id means concurrent accepts
    /// converge on the same channel instead of racing to create duplicates.
    pub fn for_request(request: &RequestId) -> Self {
        Self(format!("chat-{}", request.as_str()))
    }
}
