//! Entity metadata assembly. One entity build runs field validation and
//! codec resolution, partitions columns into role buckets, validates key
//! ordering, registers user-defined-type descriptors and records deferred
//! cross-entity references. A failure aborts only the enclosing entity; the
//! driver continues with the rest of the round.

use crate::{
    MAX_ENTITY_NAME_LEN, MAX_FIELD_NAME_LEN,
    context::{GlobalParsingContext, PendingJoin},
    diagnostic::{Diagnostic, Diagnostics},
    node::{
        ColumnMeta, ColumnRole, EntityDef, EntityMetaSignature, FieldDescriptor, JoinRef,
        KeyColumnInfo, KeyKind, UdtDescriptor,
    },
    resolve::CodecResolver,
    types::FieldShape,
    validate::{compat, keys},
};

/// Assemble one entity's complete metadata.
pub fn build_entity(
    def: &EntityDef,
    ctx: &mut GlobalParsingContext,
) -> Result<EntityMetaSignature, Diagnostics> {
    let mut errs = Diagnostics::new();

    if def.fields.is_empty() {
        errs.push(Diagnostic::structural(
            &def.ident,
            "no persistent fields found",
        ));
        return Err(errs);
    }

    if def.ident.len() > MAX_ENTITY_NAME_LEN {
        errs.push(Diagnostic::structural(
            &def.ident,
            format!("entity name exceeds max length {MAX_ENTITY_NAME_LEN}"),
        ));
    }

    let mut signature = EntityMetaSignature {
        ident: def.ident.clone(),
        table: def.table.clone(),
        partition_keys: Vec::new(),
        clustering_columns: Vec::new(),
        static_columns: Vec::new(),
        computed_columns: Vec::new(),
        regular_columns: Vec::new(),
        has_counter_column: false,
        udt_refs: Vec::new(),
        joins: Vec::new(),
    };

    for field in &def.fields {
        if field.name.len() > MAX_FIELD_NAME_LEN {
            errs.push(Diagnostic::structural(
                &def.ident,
                format!(
                    "field name '{}' exceeds max length {MAX_FIELD_NAME_LEN}",
                    field.name
                ),
            ));
            continue;
        }

        if field.annotations.join {
            build_join(def, field, ctx, &mut signature, &mut errs);
            continue;
        }

        let before = errs.len();
        compat::validate(field, &mut errs);
        validate_frozen(field, &mut errs);
        if errs.len() > before {
            continue;
        }

        // Register descriptors for referenced user-defined types before
        // resolving, so the persisted-type lookup can see them.
        register_field_udts(field, ctx, &mut signature.udt_refs, &mut errs);

        match CodecResolver::new(ctx).resolve(field) {
            Ok(binding) => {
                let key = key_info(field);
                let column = ColumnMeta {
                    name: field.name.clone(),
                    ty: field.ty.clone(),
                    binding,
                    key,
                    computed: field.annotations.computed.clone(),
                    counter: field.annotations.counter,
                };

                match field.annotations.role() {
                    ColumnRole::PartitionKey(_) => signature.partition_keys.push(column),
                    ColumnRole::ClusteringColumn(_) => signature.clustering_columns.push(column),
                    ColumnRole::Static => signature.static_columns.push(column),
                    ColumnRole::Computed => signature.computed_columns.push(column),
                    ColumnRole::Regular => signature.regular_columns.push(column),
                }

                if field.annotations.counter {
                    signature.has_counter_column = true;
                }
            }
            Err(diagnostic) => errs.push(diagnostic),
        }
    }

    sort_keys(&mut signature.partition_keys);
    sort_keys(&mut signature.clustering_columns);

    keys::validate_key_order(
        &def.ident,
        KeyKind::Partition,
        &key_infos(&signature.partition_keys),
        &mut errs,
    );
    keys::validate_key_order(
        &def.ident,
        KeyKind::Clustering,
        &key_infos(&signature.clustering_columns),
        &mut errs,
    );

    if signature.partition_keys.is_empty() {
        errs.push(Diagnostic::structural(
            &def.ident,
            "no partition key declared; at least one field must carry #[partition_key]",
        ));
    }

    errs.result().map(|()| signature)
}

fn build_join(
    def: &EntityDef,
    field: &FieldDescriptor,
    ctx: &mut GlobalParsingContext,
    signature: &mut EntityMetaSignature,
    errs: &mut Diagnostics,
) {
    let mut others = field.annotations.clone();
    others.join = false;
    if !others.is_plain() {
        errs.push(Diagnostic::configuration(
            &def.ident,
            &field.name,
            "#[join] fields cannot carry any other annotation",
        ));
        return;
    }

    let FieldShape::Named(target) = &field.shape else {
        errs.push(Diagnostic::type_error(
            &def.ident,
            &field.name,
            format!(
                "#[join] field must reference an entity type, but the declared type is '{}'",
                field.shape
            ),
        ));
        return;
    };

    signature.joins.push(JoinRef {
        field: field.name.clone(),
        target: target.clone(),
        target_table: None,
    });
    ctx.push_join(PendingJoin {
        entity: def.ident.clone(),
        field: field.name.clone(),
        target: target.clone(),
    });
}

fn validate_frozen(field: &FieldDescriptor, errs: &mut Diagnostics) {
    if field.annotations.frozen && !field.shape.is_composite() {
        errs.push(Diagnostic::configuration(
            &field.class,
            &field.name,
            format!(
                "#[frozen] is only allowed on collection and user-defined-type fields, not '{}'",
                field.shape
            ),
        ));
    }
}

fn key_info(field: &FieldDescriptor) -> Option<KeyColumnInfo> {
    match field.annotations.role() {
        ColumnRole::PartitionKey(ordinal) => Some(KeyColumnInfo::new(
            KeyKind::Partition,
            ordinal,
            &field.name,
        )),
        ColumnRole::ClusteringColumn(ordinal) => Some(KeyColumnInfo::new(
            KeyKind::Clustering,
            ordinal,
            &field.name,
        )),
        _ => None,
    }
}

fn sort_keys(columns: &mut [ColumnMeta]) {
    columns.sort_by_key(|column| column.key.as_ref().map_or(0, |key| key.ordinal));
}

fn key_infos(columns: &[ColumnMeta]) -> Vec<KeyColumnInfo> {
    columns
        .iter()
        .filter_map(|column| column.key.clone())
        .collect()
}

fn register_field_udts(
    field: &FieldDescriptor,
    ctx: &mut GlobalParsingContext,
    udt_refs: &mut Vec<String>,
    errs: &mut Diagnostics,
) {
    for name in field
        .shape
        .named_refs()
        .into_iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
    {
        if ctx.is_udt(&name) {
            let mut stack = Vec::new();
            register_udt(&name, ctx, errs, &mut stack);
            if !udt_refs.contains(&name) {
                udt_refs.push(name);
            }
        }
    }
}

/// Build and register the descriptor for one user-defined type, recursing
/// into nested user-defined types. Composition cycles are rejected with a
/// reference error naming the cycle.
fn register_udt(
    ident: &str,
    ctx: &mut GlobalParsingContext,
    errs: &mut Diagnostics,
    stack: &mut Vec<String>,
) {
    if ctx.udt_descriptor(ident).is_some() {
        return;
    }

    if stack.iter().any(|entry| entry == ident) {
        let mut cycle = stack.clone();
        cycle.push(ident.to_string());
        errs.push(Diagnostic::reference(
            ident,
            None,
            format!("cyclic user-defined-type composition: {}", cycle.join(" -> ")),
        ));
        return;
    }

    let Some(def) = ctx.udt_def(ident).cloned() else {
        return;
    };

    stack.push(ident.to_string());

    let mut fields = Vec::new();
    let mut nested = Vec::new();

    for field in &def.fields {
        if field.annotations.role() != ColumnRole::Regular
            || field.annotations.counter
            || field.annotations.join
        {
            errs.push(Diagnostic::configuration(
                &def.ident,
                &field.name,
                "key, counter and join annotations are not allowed inside a user-defined type",
            ));
            continue;
        }

        let before = errs.len();
        compat::validate(field, errs);
        validate_frozen(field, errs);
        if errs.len() > before {
            continue;
        }

        for name in field
            .shape
            .named_refs()
            .into_iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
        {
            if ctx.is_udt(&name) {
                register_udt(&name, ctx, errs, stack);
                if !nested.contains(&name) {
                    nested.push(name);
                }
            }
        }

        match CodecResolver::new(ctx).resolve(field) {
            Ok(binding) => fields.push(ColumnMeta {
                name: field.name.clone(),
                ty: field.ty.clone(),
                binding,
                key: None,
                computed: None,
                counter: false,
            }),
            Err(diagnostic) => errs.push(diagnostic),
        }
    }

    stack.pop();

    ctx.register_udt_descriptor(UdtDescriptor {
        ident: def.ident,
        name: def.name,
        fields,
        udt_refs: nested,
    });
}
