//! Shared type definitions for the Boxscore pitching-stats pipeline.
//!
//! This crate is the single source of truth for the records that flow
//! between the feed, the classifier, the ledger, and the output. Output
//! types are exported to `TypeScript` via `ts-rs` for the stats frontend.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe string wrappers for game, player, and team ids
//! - [`enums`] -- Event kinds and home/away sides
//! - [`snapshot`] -- Input records: ticks and game snapshots
//! - [`structs`] -- Player identities, domain events, play records

pub mod enums;
pub mod ids;
pub mod snapshot;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{EventKind, Side};
pub use ids::{GameId, PlayerId, TeamId};
pub use snapshot::{ClientMeta, GameSnapshot, Tick};
pub use structs::{AttributedEvent, DomainEvent, GameMarker, PlayRecord, PlayerIdentity};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the output types.

    #[test]
    fn export_bindings() {
        // ts-rs writes the files to the `bindings/` directory relative to
        // the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::GameId::export_all();
        let _ = crate::ids::PlayerId::export_all();
        let _ = crate::ids::TeamId::export_all();

        // Enums
        let _ = crate::enums::EventKind::export_all();

        // Structs
        let _ = crate::structs::GameMarker::export_all();
        let _ = crate::structs::PlayerIdentity::export_all();
        let _ = crate::structs::DomainEvent::export_all();
        let _ = crate::structs::AttributedEvent::export_all();
        let _ = crate::structs::PlayRecord::export_all();
    }
}
