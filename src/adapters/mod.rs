// Adapters layer: concrete implementations for external systems (remote card database, pacing).

pub mod pacing;
pub mod scryfall;
