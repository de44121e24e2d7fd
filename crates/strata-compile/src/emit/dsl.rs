//! Query-builder generation. Each entity gets a `*Query` wrapper over the
//! runtime select builder with one equality method per key column, so a
//! caller can only restrict columns the table can actually serve.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use strata_schema::node::EntityMetaSignature;

pub fn generate(signature: &EntityMetaSignature) -> TokenStream {
    let query = format_ident!("{}Query", signature.ident);
    let meta = format_ident!("{}Meta", signature.ident);

    let key_methods = signature.primary_key().map(|column| {
        let method = format_ident!("{}_eq", column.name);
        let name = &column.name;
        let ty = &column.ty;

        quote! {
            #[must_use]
            pub fn #method(mut self, value: #ty) -> Self {
                self.inner = self.inner.where_eq(#name, value);
                self
            }
        }
    });

    quote! {
        pub struct #query {
            inner: ::strata::query::Select,
        }

        impl #query {
            #[must_use]
            pub fn new() -> Self {
                Self {
                    inner: ::strata::query::Select::from_table(#meta::TABLE),
                }
            }

            #(#key_methods)*

            #[must_use]
            pub fn build(self) -> ::strata::query::Statement {
                self.inner.build()
            }
        }

        impl Default for #query {
            fn default() -> Self {
                Self::new()
            }
        }
    }
}
