//! Type-safe identifier wrappers around feed-supplied strings.
//!
//! The feed identifies games, players, and teams by opaque strings (UUIDs in
//! practice, but older archives and test fixtures use arbitrary text). Every
//! identifier gets its own newtype so a pitcher id can never be passed where a
//! team id is expected.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around [`String`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub String);

        impl $name {
            /// Wrap a raw identifier string.
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }
    };
}

define_id! {
    /// Identifier of a single game, stable across every snapshot of it.
    GameId
}

define_id! {
    /// Identifier of a player (only pitchers are tracked).
    PlayerId
}

define_id! {
    /// Identifier of a team.
    TeamId
}
