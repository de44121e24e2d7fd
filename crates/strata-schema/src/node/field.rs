use crate::{node::CodecRef, types::FieldShape};
use derive_more::Display;
use serde::Serialize;

///
/// EnumEncoding
///
/// How an enumerated field is persisted: by variant name or by declaration
/// position.
///

#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumEncoding {
    #[default]
    #[display("name")]
    Name,
    #[display("ordinal")]
    Ordinal,
}

///
/// Computed
///
/// A computed column is read through a server-side function; its persisted
/// type may be overridden explicitly instead of derived from the declared
/// field type.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Computed {
    pub function: String,
    pub args: Vec<String>,
    pub cql_class: Option<FieldShape>,
}

///
/// AnnotationSet
///
/// Presence and parameters of every annotation a field may carry, parsed
/// once per field from the declaration list. At most the legal subset
/// enforced by `validate::compat` may be simultaneously present.
///

#[derive(Clone, Debug, Default)]
pub struct AnnotationSet {
    // structural roles
    pub partition_key: Option<u32>,
    pub clustering_column: Option<u32>,
    pub static_column: bool,
    pub computed: Option<Computed>,
    pub counter: bool,

    // encoding roles
    pub frozen: bool,
    pub json: bool,
    pub enumerated: Option<EnumEncoding>,
    pub codec: Option<CodecRef>,
    pub time_uuid: bool,

    /// Deferred cross-entity reference; resolved at backfill time.
    pub join: bool,
}

impl AnnotationSet {
    /// True when the field carries no annotation at all.
    #[must_use]
    pub fn is_plain(&self) -> bool {
        self.partition_key.is_none()
            && self.clustering_column.is_none()
            && !self.static_column
            && self.computed.is_none()
            && !self.counter
            && !self.frozen
            && !self.json
            && self.enumerated.is_none()
            && self.codec.is_none()
            && !self.time_uuid
            && !self.join
    }

    #[must_use]
    pub const fn role(&self) -> ColumnRole {
        if let Some(ordinal) = self.partition_key {
            ColumnRole::PartitionKey(ordinal)
        } else if let Some(ordinal) = self.clustering_column {
            ColumnRole::ClusteringColumn(ordinal)
        } else if self.static_column {
            ColumnRole::Static
        } else if self.computed.is_some() {
            ColumnRole::Computed
        } else {
            ColumnRole::Regular
        }
    }
}

///
/// ColumnRole
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ColumnRole {
    PartitionKey(u32),
    ClusteringColumn(u32),
    Static,
    Computed,
    Regular,
}

///
/// FieldDescriptor
///
/// One persistent field: name, owning class identity, declared type and its
/// analyzed shape, and the full annotation set. Immutable once extracted.
///

#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    pub name: String,
    pub class: String,
    pub ty: syn::Type,
    pub shape: FieldShape,
    pub annotations: AnnotationSet,
}

impl FieldDescriptor {
    #[must_use]
    pub fn new(name: &str, class: &str, ty: syn::Type, shape: FieldShape) -> Self {
        Self {
            name: name.to_string(),
            class: class.to_string(),
            ty,
            shape,
            annotations: AnnotationSet::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_follows_structural_precedence() {
        let mut set = AnnotationSet::default();
        assert!(set.is_plain());
        assert_eq!(set.role(), ColumnRole::Regular);

        set.partition_key = Some(1);
        assert_eq!(set.role(), ColumnRole::PartitionKey(1));
        assert!(!set.is_plain());
    }
}
