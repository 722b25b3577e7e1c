use super::member::Member;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One stored card in a grid export: the generated face images on disk
/// plus the caption data printed beneath the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardPair {
    /// Numeric identifier shown in the row caption.
    pub id: i64,
    /// Member display name shown in the row caption.
    pub member_name: String,
    pub front_path: PathBuf,
    pub back_path: PathBuf,
}

/// How a batch caller designates one member: by id into the member
/// store, or as an inline record. Resolved once at the batch boundary;
/// the pipeline below only ever sees `Member` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BatchSelection {
    ByReference(i64),
    ByInlineData(Member),
}
