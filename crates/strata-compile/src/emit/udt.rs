//! User-defined-type shape generation. Descriptors are emitted in
//! composition order so every nested type's shape precedes the types that
//! embed it; the builder guarantees the composition graph is acyclic.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use std::collections::BTreeSet;
use strata_schema::{context::GlobalParsingContext, node::UdtDescriptor};

/// The round's descriptors, nested types before the types composed of them.
pub fn ordered(ctx: &GlobalParsingContext) -> Vec<&UdtDescriptor> {
    let mut out = Vec::new();
    let mut seen = BTreeSet::new();

    for descriptor in ctx.udt_descriptors() {
        push_after_refs(ctx, descriptor, &mut seen, &mut out);
    }

    out
}

fn push_after_refs<'a>(
    ctx: &'a GlobalParsingContext,
    descriptor: &'a UdtDescriptor,
    seen: &mut BTreeSet<&'a str>,
    out: &mut Vec<&'a UdtDescriptor>,
) {
    if !seen.insert(descriptor.ident.as_str()) {
        return;
    }

    for nested in &descriptor.udt_refs {
        if let Some(nested) = ctx.udt_descriptor(nested) {
            push_after_refs(ctx, nested, seen, out);
        }
    }

    out.push(descriptor);
}

pub fn generate(descriptor: &UdtDescriptor) -> TokenStream {
    let ident = format_ident!("{}Udt", descriptor.ident);
    let name = &descriptor.name;

    let fields = descriptor.fields.iter().map(|column| {
        let field_name = &column.name;
        let cql = column.binding.cql.to_string();
        let codec = column.binding.instantiate();

        quote! {
            .field(#field_name, #cql, #codec)
        }
    });

    quote! {
        pub struct #ident;

        impl #ident {
            pub const NAME: &'static str = #name;

            #[must_use]
            pub fn shape() -> ::strata::meta::UdtShape {
                ::strata::meta::UdtShape::new(Self::NAME)
                    #(#fields)*
            }
        }
    }
}
