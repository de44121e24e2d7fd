use crate::node::{CodecBinding, Computed, FieldDescriptor, KeyColumnInfo};
use convert_case::{Case, Casing};

///
/// EntityDef
///
/// A parsed entity declaration, before metadata assembly.
///

#[derive(Clone, Debug)]
pub struct EntityDef {
    pub ident: String,
    pub table: String,
    pub fields: Vec<FieldDescriptor>,
}

impl EntityDef {
    #[must_use]
    pub fn new(ident: &str, table: Option<String>) -> Self {
        Self {
            ident: ident.to_string(),
            table: table.unwrap_or_else(|| ident.to_case(Case::Snake)),
            fields: Vec::new(),
        }
    }
}

///
/// ColumnMeta
///
/// One persisted column with its resolved codec binding.
///

#[derive(Clone, Debug)]
pub struct ColumnMeta {
    pub name: String,
    pub ty: syn::Type,
    pub binding: CodecBinding,

    pub key: Option<KeyColumnInfo>,
    pub computed: Option<Computed>,
    pub counter: bool,
}

///
/// JoinRef
///
/// A deferred cross-entity reference. `target_table` stays `None` until the
/// emitter's backfill pass attaches the completed target metadata.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JoinRef {
    pub field: String,
    pub target: String,
    pub target_table: Option<String>,
}

///
/// EntityMetaSignature
///
/// Complete per-entity metadata: ordered key columns, bucketed regular
/// columns, the derived counter flag, and the unresolved references still
/// owed a backfill. Owned exclusively by the driver's result collection.
///

#[derive(Clone, Debug)]
pub struct EntityMetaSignature {
    pub ident: String,
    pub table: String,

    pub partition_keys: Vec<ColumnMeta>,
    pub clustering_columns: Vec<ColumnMeta>,
    pub static_columns: Vec<ColumnMeta>,
    pub computed_columns: Vec<ColumnMeta>,
    pub regular_columns: Vec<ColumnMeta>,

    pub has_counter_column: bool,

    /// User-defined types referenced by this entity's fields.
    pub udt_refs: Vec<String>,
    pub joins: Vec<JoinRef>,
}

impl EntityMetaSignature {
    /// All columns in emission order: keys first, then static, computed and
    /// regular buckets.
    pub fn columns(&self) -> impl Iterator<Item = &ColumnMeta> {
        self.partition_keys
            .iter()
            .chain(&self.clustering_columns)
            .chain(&self.static_columns)
            .chain(&self.computed_columns)
            .chain(&self.regular_columns)
    }

    /// Key columns in ordinal order, partition keys before clustering
    /// columns. This is the full primary key of the table.
    pub fn primary_key(&self) -> impl Iterator<Item = &ColumnMeta> {
        self.partition_keys.iter().chain(&self.clustering_columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_name_defaults_to_snake_case() {
        assert_eq!(EntityDef::new("AccountEvent", None).table, "account_event");
        assert_eq!(
            EntityDef::new("Account", Some("accounts".to_string())).table,
            "accounts"
        );
    }
}
