//! Artifact emission. Runs only after every entity in the round built
//! cleanly: first the backfill pass attaches completed target metadata to
//! deferred cross-entity references, then join cycles are rejected, then
//! each generator renders its artifact family. Emission itself cannot fail;
//! every diagnostic is raised before the first token is produced.

mod dsl;
mod factory;
mod manager;
mod meta;
mod udt;

use convert_case::{Case, Casing};
use proc_macro2::TokenStream;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use strata_schema::{
    context::GlobalParsingContext,
    diagnostic::{Diagnostic, Diagnostics},
    node::EntityMetaSignature,
};

///
/// Artifact
///
/// One generated compilation unit, named after the type it declares.
///

#[derive(Debug)]
pub struct Artifact {
    pub name: String,
    pub tokens: TokenStream,
}

impl Artifact {
    #[must_use]
    pub fn new(name: String, tokens: TokenStream) -> Self {
        Self { name, tokens }
    }

    #[must_use]
    pub fn render(&self) -> String {
        self.tokens.to_string()
    }
}

///
/// Artifacts
///
/// The complete output of one successful round, grouped by family and
/// ordered so that every artifact precedes its dependents: user-defined
/// types, then table metadata, then managers and query builders, then the
/// factory that ties the managers together.
///

#[derive(Debug)]
pub struct Artifacts {
    pub udts: Vec<Artifact>,
    pub metas: Vec<Artifact>,
    pub managers: Vec<Artifact>,
    pub query_builders: Vec<Artifact>,
    pub factory: Artifact,
}

impl Artifacts {
    /// All artifacts in dependency order.
    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.udts
            .iter()
            .chain(&self.metas)
            .chain(&self.managers)
            .chain(&self.query_builders)
            .chain(std::iter::once(&self.factory))
    }

    /// Write each artifact to `dir` as `<snake_case_name>.rs`.
    pub fn write_to(&self, dir: &Path) -> std::io::Result<()> {
        std::fs::create_dir_all(dir)?;

        for artifact in self.iter() {
            let file = dir.join(format!("{}.rs", artifact.name.to_case(Case::Snake)));
            std::fs::write(file, artifact.render())?;
        }

        Ok(())
    }
}

/// Backfill deferred references, reject join cycles, then render every
/// artifact family for the round.
pub fn emit(
    ctx: &GlobalParsingContext,
    signatures: &mut [EntityMetaSignature],
) -> Result<Artifacts, Diagnostics> {
    let mut errs = Diagnostics::new();

    backfill(signatures, &mut errs);
    reject_join_cycles(signatures, &mut errs);
    errs.result()?;

    let udts = udt::ordered(ctx)
        .into_iter()
        .map(|descriptor| {
            Artifact::new(format!("{}Udt", descriptor.ident), udt::generate(descriptor))
        })
        .collect();

    let metas = signatures
        .iter()
        .map(|signature| {
            Artifact::new(format!("{}Meta", signature.ident), meta::generate(signature))
        })
        .collect();

    let managers = signatures
        .iter()
        .map(|signature| {
            Artifact::new(
                format!("{}Manager", signature.ident),
                manager::generate(signature),
            )
        })
        .collect();

    let query_builders = signatures
        .iter()
        .map(|signature| {
            Artifact::new(format!("{}Query", signature.ident), dsl::generate(signature))
        })
        .collect();

    let factory = Artifact::new("ManagerFactory".to_string(), factory::generate(signatures));

    Ok(Artifacts {
        udts,
        metas,
        managers,
        query_builders,
        factory,
    })
}

/// Resolve every deferred cross-entity reference against the round's
/// completed signatures. A reference to an entity the round never saw is a
/// reference error; nothing falls back to runtime lookup.
fn backfill(signatures: &mut [EntityMetaSignature], errs: &mut Diagnostics) {
    let tables: BTreeMap<String, String> = signatures
        .iter()
        .map(|signature| (signature.ident.clone(), signature.table.clone()))
        .collect();

    for signature in signatures.iter_mut() {
        for join in &mut signature.joins {
            match tables.get(&join.target) {
                Some(table) => join.target_table = Some(table.clone()),
                None => errs.push(Diagnostic::reference(
                    &signature.ident,
                    Some(&join.field),
                    format!(
                        "join target '{}' was not compiled in this round",
                        join.target
                    ),
                )),
            }
        }
    }
}

/// Joins must form a directed acyclic graph across the round; a cycle has
/// no valid emission order and is rejected outright.
fn reject_join_cycles(signatures: &[EntityMetaSignature], errs: &mut Diagnostics) {
    let graph: BTreeMap<&str, Vec<&str>> = signatures
        .iter()
        .map(|signature| {
            let targets = signature
                .joins
                .iter()
                .map(|join| join.target.as_str())
                .collect();
            (signature.ident.as_str(), targets)
        })
        .collect();

    let mut done = BTreeSet::new();

    for &start in graph.keys() {
        if done.contains(start) {
            continue;
        }
        let mut stack = Vec::new();
        if let Some(cycle) = visit(start, &graph, &mut stack, &mut done) {
            errs.push(Diagnostic::reference(
                cycle.first().copied().unwrap_or(start),
                None,
                format!("cyclic join chain: {}", cycle.join(" -> ")),
            ));
            return;
        }
    }
}

fn visit<'a>(
    node: &'a str,
    graph: &BTreeMap<&'a str, Vec<&'a str>>,
    stack: &mut Vec<&'a str>,
    done: &mut BTreeSet<&'a str>,
) -> Option<Vec<&'a str>> {
    if let Some(pos) = stack.iter().position(|&seen| seen == node) {
        let mut cycle: Vec<&str> = stack[pos..].to_vec();
        cycle.push(node);
        return Some(cycle);
    }
    if done.contains(node) {
        return None;
    }

    stack.push(node);
    if let Some(targets) = graph.get(node) {
        for &target in targets {
            if let Some(cycle) = visit(target, graph, stack, done) {
                return Some(cycle);
            }
        }
    }
    stack.pop();
    done.insert(node);

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_schema::node::JoinRef;

    fn signature(ident: &str, joins: Vec<JoinRef>) -> EntityMetaSignature {
        EntityMetaSignature {
            ident: ident.to_string(),
            table: ident.to_case(Case::Snake),
            partition_keys: vec![],
            clustering_columns: vec![],
            static_columns: vec![],
            computed_columns: vec![],
            regular_columns: vec![],
            has_counter_column: false,
            udt_refs: vec![],
            joins,
        }
    }

    fn join(field: &str, target: &str) -> JoinRef {
        JoinRef {
            field: field.to_string(),
            target: target.to_string(),
            target_table: None,
        }
    }

    #[test]
    fn backfill_attaches_completed_target_tables() {
        let mut signatures = vec![
            signature("Account", vec![join("owner", "Owner")]),
            signature("Owner", vec![]),
        ];
        let mut errs = Diagnostics::new();

        backfill(&mut signatures, &mut errs);

        assert!(errs.is_empty(), "{errs}");
        assert_eq!(
            signatures[0].joins[0].target_table.as_deref(),
            Some("owner")
        );
    }

    #[test]
    fn backfill_rejects_targets_outside_the_round() {
        let mut signatures = vec![signature("Account", vec![join("owner", "Missing")])];
        let mut errs = Diagnostics::new();

        backfill(&mut signatures, &mut errs);

        assert_eq!(errs.len(), 1);
        let rendered = errs.to_string();
        assert!(rendered.contains("Missing"), "{rendered}");
        assert!(rendered.starts_with("reference error"), "{rendered}");
    }

    #[test]
    fn join_cycles_are_rejected() {
        let signatures = vec![
            signature("Account", vec![join("owner", "Owner")]),
            signature("Owner", vec![join("account", "Account")]),
        ];
        let mut errs = Diagnostics::new();

        reject_join_cycles(&signatures, &mut errs);

        assert_eq!(errs.len(), 1);
        assert!(errs.to_string().contains("cyclic join chain"));
    }

    #[test]
    fn acyclic_join_chains_pass() {
        let signatures = vec![
            signature("Account", vec![join("owner", "Owner")]),
            signature("Owner", vec![join("region", "Region")]),
            signature("Region", vec![]),
        ];
        let mut errs = Diagnostics::new();

        reject_join_cycles(&signatures, &mut errs);

        assert!(errs.is_empty(), "{errs}");
    }
}
