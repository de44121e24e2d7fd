//! Declaration discovery: scans a parsed file for annotated items, seeds
//! the round's symbol tables, and extracts field descriptors. Discovery
//! never resolves anything; it only records what was declared so the
//! builder can validate with the full round in view.

use darling::FromMeta;
use strata_schema::{
    context::GlobalParsingContext,
    diagnostic::{Diagnostic, Diagnostics},
    node::{AnnotationSet, CodecRef, Computed, EntityDef, EnumEncoding, FieldDescriptor, UdtDef},
    types::FieldShape,
};

///
/// EntityArgs
///

#[derive(Debug, Default, FromMeta)]
struct EntityArgs {
    #[darling(default)]
    table: Option<String>,
}

///
/// UdtArgs
///

#[derive(Debug, Default, FromMeta)]
struct UdtArgs {
    #[darling(default)]
    name: Option<String>,
}

///
/// EnumeratedArgs
///

#[derive(Debug, Default, FromMeta)]
struct EnumeratedArgs {
    #[darling(default)]
    mode: Option<String>,
}

///
/// ComputedArgs
///

#[derive(Debug, FromMeta)]
struct ComputedArgs {
    function: String,
    #[darling(default)]
    args: Option<String>,
    #[darling(default)]
    cql_class: Option<String>,
}

/// Scan a file for declarations. Returns the entity definitions found, in
/// declaration order; user-defined types, enums and class-level codecs are
/// registered on the context as a side effect.
pub fn discover(
    file: &syn::File,
    ctx: &mut GlobalParsingContext,
    errs: &mut Diagnostics,
) -> Vec<EntityDef> {
    // First sweep: symbol tables. Field extraction below consults these,
    // so they must cover the whole file before any fields are parsed.
    for item in &file.items {
        match item {
            syn::Item::Enum(item) => {
                let ident = item.ident.to_string();
                ctx.register_enum(&ident);
                register_class_codec(ctx, &ident, &item.attrs, errs);
            }
            syn::Item::Struct(item) => {
                register_class_codec(ctx, &item.ident.to_string(), &item.attrs, errs);
            }
            _ => {}
        }
    }

    let mut entities = Vec::new();

    for item in &file.items {
        let syn::Item::Struct(item) = item else {
            continue;
        };
        let ident = item.ident.to_string();

        if let Some(attr) = find_attr(&item.attrs, "entity") {
            let args: EntityArgs = marker_args(attr, &ident, errs);
            let mut def = EntityDef::new(&ident, args.table);
            def.fields = extract_fields(&ident, &item.fields, errs);
            entities.push(def);
        } else if let Some(attr) = find_attr(&item.attrs, "udt") {
            let args: UdtArgs = marker_args(attr, &ident, errs);
            let mut def = UdtDef::new(&ident, args.name);
            def.fields = extract_fields(&ident, &item.fields, errs);
            ctx.register_udt_def(def);
        }
    }

    entities
}

fn find_attr<'a>(attrs: &'a [syn::Attribute], name: &str) -> Option<&'a syn::Attribute> {
    attrs.iter().find(|attr| attr.path().is_ident(name))
}

/// Parse the arguments of a marker attribute. A bare marker (`#[entity]`)
/// yields the defaults.
fn marker_args<T: Default + FromMeta>(
    attr: &syn::Attribute,
    class: &str,
    errs: &mut Diagnostics,
) -> T {
    match &attr.meta {
        syn::Meta::Path(_) => T::default(),
        meta => T::from_meta(meta).unwrap_or_else(|err| {
            errs.push(Diagnostic::structural(
                class,
                &format!("invalid marker arguments: {err}"),
            ));
            T::default()
        }),
    }
}

/// A class-level `#[codec(..)]` on a struct or enum declaration becomes
/// the default codec for every field of that declared type.
fn register_class_codec(
    ctx: &mut GlobalParsingContext,
    ident: &str,
    attrs: &[syn::Attribute],
    errs: &mut Diagnostics,
) {
    let Some(attr) = find_attr(attrs, "codec") else {
        return;
    };

    match attr.parse_args::<syn::Path>() {
        Ok(path) => ctx.register_class_codec(ident, CodecRef::from_path(path)),
        Err(err) => errs.push(Diagnostic::structural(
            ident,
            &format!("invalid class-level codec declaration: {err}"),
        )),
    }
}

fn extract_fields(
    class: &str,
    fields: &syn::Fields,
    errs: &mut Diagnostics,
) -> Vec<FieldDescriptor> {
    let syn::Fields::Named(named) = fields else {
        errs.push(Diagnostic::structural(
            class,
            "only structs with named fields can be persisted",
        ));
        return Vec::new();
    };

    let mut out = Vec::new();

    for field in &named.named {
        let Some(ident) = &field.ident else {
            continue;
        };
        let name = ident.to_string();

        let shape = match FieldShape::from_type(&field.ty) {
            Ok(shape) => shape,
            Err(message) => {
                errs.push(Diagnostic::type_error(class, &name, &message));
                continue;
            }
        };

        let mut descriptor = FieldDescriptor::new(&name, class, field.ty.clone(), shape);
        descriptor.annotations = extract_annotations(class, &name, &field.attrs, errs);
        out.push(descriptor);
    }

    out
}

fn extract_annotations(
    class: &str,
    field: &str,
    attrs: &[syn::Attribute],
    errs: &mut Diagnostics,
) -> AnnotationSet {
    let mut set = AnnotationSet::default();

    for attr in attrs {
        let Some(ident) = attr.path().get_ident() else {
            continue;
        };

        match ident.to_string().as_str() {
            "partition_key" => set.partition_key = key_ordinal(attr, class, field, errs),
            "clustering_column" => set.clustering_column = key_ordinal(attr, class, field, errs),
            "static_column" => set.static_column = true,
            "counter" => set.counter = true,
            "frozen" => set.frozen = true,
            "json" => set.json = true,
            "time_uuid" => set.time_uuid = true,
            "join" => set.join = true,
            "enumerated" => set.enumerated = Some(enum_encoding(attr, class, field, errs)),
            "computed" => set.computed = computed(attr, class, field, errs),
            "codec" => match attr.parse_args::<syn::Path>() {
                Ok(path) => set.codec = Some(CodecRef::from_path(path)),
                Err(err) => errs.push(Diagnostic::configuration(
                    class,
                    field,
                    &format!("invalid codec declaration: {err}"),
                )),
            },
            _ => {}
        }
    }

    set
}

/// `#[partition_key(0)]` / `#[clustering_column(1)]`. The ordinal is
/// required; density across the key group is checked later.
fn key_ordinal(
    attr: &syn::Attribute,
    class: &str,
    field: &str,
    errs: &mut Diagnostics,
) -> Option<u32> {
    let parsed = attr
        .parse_args::<syn::LitInt>()
        .and_then(|lit| lit.base10_parse::<u32>());

    match parsed {
        Ok(ordinal) => Some(ordinal),
        Err(err) => {
            errs.push(Diagnostic::configuration(
                class,
                field,
                &format!("key annotation needs an integer ordinal: {err}"),
            ));
            None
        }
    }
}

fn enum_encoding(
    attr: &syn::Attribute,
    class: &str,
    field: &str,
    errs: &mut Diagnostics,
) -> EnumEncoding {
    let args: EnumeratedArgs = match &attr.meta {
        syn::Meta::Path(_) => EnumeratedArgs::default(),
        meta => match EnumeratedArgs::from_meta(meta) {
            Ok(args) => args,
            Err(err) => {
                errs.push(Diagnostic::configuration(
                    class,
                    field,
                    &format!("invalid enumerated declaration: {err}"),
                ));
                EnumeratedArgs::default()
            }
        },
    };

    match args.mode.as_deref() {
        None | Some("name") => EnumEncoding::Name,
        Some("ordinal") => EnumEncoding::Ordinal,
        Some(other) => {
            errs.push(Diagnostic::configuration(
                class,
                field,
                &format!("unknown enumerated mode '{other}'; expected 'name' or 'ordinal'"),
            ));
            EnumEncoding::Name
        }
    }
}

fn computed(
    attr: &syn::Attribute,
    class: &str,
    field: &str,
    errs: &mut Diagnostics,
) -> Option<Computed> {
    let args = match ComputedArgs::from_meta(&attr.meta) {
        Ok(args) => args,
        Err(err) => {
            errs.push(Diagnostic::configuration(
                class,
                field,
                &format!("invalid computed declaration: {err}"),
            ));
            return None;
        }
    };

    let cql_class = args.cql_class.and_then(|decl| {
        let shape = syn::parse_str::<syn::Type>(&decl)
            .map_err(|err| err.to_string())
            .and_then(|ty| FieldShape::from_type(&ty));

        match shape {
            Ok(shape) => Some(shape),
            Err(message) => {
                errs.push(Diagnostic::type_error(
                    class,
                    field,
                    &format!("invalid computed cql_class '{decl}': {message}"),
                ));
                None
            }
        }
    });

    Some(Computed {
        function: args.function,
        args: args
            .args
            .map(|list| {
                list.split(',')
                    .map(|arg| arg.trim().to_string())
                    .filter(|arg| !arg.is_empty())
                    .collect()
            })
            .unwrap_or_default(),
        cql_class,
    })
}
