/// Canonical key constants for the `kv_store` table.
///
/// Use these instead of raw string literals to prevent typo-based key mismatches.

/// The full message collection, stored as one JSON array.
pub const MESSAGES_KEY: &str = "messages";
