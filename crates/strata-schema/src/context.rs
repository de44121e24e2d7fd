use crate::node::{CodecRef, UdtDef, UdtDescriptor};
use std::collections::{BTreeMap, BTreeSet};

///
/// PendingJoin
///
/// A deferred cross-entity reference recorded during entity builds. The
/// target entity may not be built yet in this round, so resolution waits
/// for the emitter's backfill pass.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PendingJoin {
    pub entity: String,
    pub field: String,
    pub target: String,
}

///
/// GlobalParsingContext
///
/// Round-scoped shared state: symbol tables populated by discovery, the
/// user-defined-type descriptor registry, and the pending backfill list.
/// Created fresh per compilation round, threaded by reference through the
/// single-threaded driver loop, read-only once emission starts, and
/// discarded at round end.
///

#[derive(Debug, Default)]
pub struct GlobalParsingContext {
    udt_defs: BTreeMap<String, UdtDef>,
    enums: BTreeSet<String>,
    class_codecs: BTreeMap<String, CodecRef>,

    udts: BTreeMap<String, UdtDescriptor>,
    pending_joins: Vec<PendingJoin>,
}

impl GlobalParsingContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    //
    // symbol tables (populated during discovery)
    //

    pub fn register_enum(&mut self, ident: &str) {
        self.enums.insert(ident.to_string());
    }

    #[must_use]
    pub fn is_enum(&self, ident: &str) -> bool {
        self.enums.contains(ident)
    }

    pub fn register_udt_def(&mut self, def: UdtDef) {
        self.udt_defs.entry(def.ident.clone()).or_insert(def);
    }

    #[must_use]
    pub fn udt_def(&self, ident: &str) -> Option<&UdtDef> {
        self.udt_defs.get(ident)
    }

    #[must_use]
    pub fn is_udt(&self, ident: &str) -> bool {
        self.udt_defs.contains_key(ident)
    }

    /// Class-level default codec for a declared type. First declaration
    /// wins.
    pub fn register_class_codec(&mut self, ident: &str, codec: CodecRef) {
        self.class_codecs.entry(ident.to_string()).or_insert(codec);
    }

    #[must_use]
    pub fn class_codec(&self, ident: &str) -> Option<&CodecRef> {
        self.class_codecs.get(ident)
    }

    //
    // build products
    //

    /// Register a built descriptor. First-seen-wins: structurally identical
    /// uses across entities share one descriptor.
    pub fn register_udt_descriptor(&mut self, descriptor: UdtDescriptor) {
        self.udts
            .entry(descriptor.ident.clone())
            .or_insert(descriptor);
    }

    #[must_use]
    pub fn udt_descriptor(&self, ident: &str) -> Option<&UdtDescriptor> {
        self.udts.get(ident)
    }

    pub fn udt_descriptors(&self) -> impl Iterator<Item = &UdtDescriptor> {
        self.udts.values()
    }

    pub fn push_join(&mut self, join: PendingJoin) {
        self.pending_joins.push(join);
    }

    #[must_use]
    pub fn pending_joins(&self) -> &[PendingJoin] {
        &self.pending_joins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::UdtDescriptor;

    fn descriptor(ident: &str, name: &str) -> UdtDescriptor {
        UdtDescriptor {
            ident: ident.to_string(),
            name: name.to_string(),
            fields: vec![],
            udt_refs: vec![],
        }
    }

    #[test]
    fn udt_descriptor_registration_is_first_seen_wins() {
        let mut ctx = GlobalParsingContext::new();

        ctx.register_udt_descriptor(descriptor("Address", "address"));
        ctx.register_udt_descriptor(descriptor("Address", "address_v2"));

        let registered = ctx.udt_descriptor("Address").expect("registered");
        assert_eq!(registered.name, "address");
    }

    #[test]
    fn symbol_tables_answer_membership() {
        let mut ctx = GlobalParsingContext::new();
        ctx.register_enum("Status");

        assert!(ctx.is_enum("Status"));
        assert!(!ctx.is_enum("Address"));
        assert!(!ctx.is_udt("Address"));
    }
}
