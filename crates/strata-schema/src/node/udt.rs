use crate::node::{ColumnMeta, FieldDescriptor};
use convert_case::{Case, Casing};

///
/// UdtDef
///
/// A parsed user-defined-type declaration.
///

#[derive(Clone, Debug)]
pub struct UdtDef {
    pub ident: String,
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl UdtDef {
    #[must_use]
    pub fn new(ident: &str, name: Option<String>) -> Self {
        Self {
            ident: ident.to_string(),
            name: name.unwrap_or_else(|| ident.to_case(Case::Snake)),
            fields: Vec::new(),
        }
    }
}

///
/// UdtDescriptor
///
/// The generated descriptor for one user-defined type. Registered
/// first-seen-wins in the round context; structurally identical uses share
/// one descriptor.
///

#[derive(Clone, Debug)]
pub struct UdtDescriptor {
    pub ident: String,
    pub name: String,
    pub fields: Vec<ColumnMeta>,

    /// Other user-defined types this one is composed of.
    pub udt_refs: Vec<String>,
}
