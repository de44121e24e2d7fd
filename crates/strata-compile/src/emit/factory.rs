//! Factory generation. One `ManagerFactory` per round, with an accessor per
//! entity manager and the inventory of every table the round produced.

use convert_case::{Case, Casing};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use strata_schema::node::EntityMetaSignature;

pub fn generate(signatures: &[EntityMetaSignature]) -> TokenStream {
    let accessors = signatures.iter().map(|signature| {
        let method = format_ident!("{}", signature.ident.to_case(Case::Snake));
        let manager = format_ident!("{}Manager", signature.ident);

        quote! {
            #[must_use]
            pub fn #method(&self) -> #manager {
                #manager::new(self.session.clone())
            }
        }
    });

    let tables = signatures.iter().map(|signature| &signature.table);

    quote! {
        pub struct ManagerFactory {
            session: ::strata::runtime::Session,
        }

        impl ManagerFactory {
            pub const TABLES: &'static [&'static str] = &[#(#tables),*];

            #[must_use]
            pub const fn new(session: ::strata::runtime::Session) -> Self {
                Self { session }
            }

            #(#accessors)*
        }
    }
}
