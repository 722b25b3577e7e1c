use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A reusable background pair used to skin generated cards.
///
/// At most one template is active at any time; the template store
/// enforces that invariant on every write. The pipeline only reads
/// templates and treats a broken background file as a recoverable
/// condition, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardTemplate {
    pub id: i64,
    pub name: String,
    /// Background image for the card front.
    pub front_path: PathBuf,
    /// Background image for the card back.
    pub back_path: PathBuf,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}
