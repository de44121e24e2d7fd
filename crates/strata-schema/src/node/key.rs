use derive_more::Display;
use serde::Serialize;

///
/// KeyKind
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyKind {
    #[display("partition key")]
    Partition,
    #[display("clustering column")]
    Clustering,
}

///
/// KeyColumnInfo
///
/// Ordinal position of one key column. Within one kind, the declared
/// ordinals must form a dense permutation of `0..n-1`; `validate::keys`
/// enforces this.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct KeyColumnInfo {
    pub kind: KeyKind,
    pub ordinal: u32,
    pub field: String,
}

impl KeyColumnInfo {
    #[must_use]
    pub fn new(kind: KeyKind, ordinal: u32, field: &str) -> Self {
        Self {
            kind,
            ordinal,
            field: field.to_string(),
        }
    }
}
