//! Manager generation. Each entity gets a `*Manager` with the CRUD surface
//! typed by its primary key; key parameters follow declared ordinal order,
//! partition keys before clustering columns.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use strata_schema::node::EntityMetaSignature;

pub fn generate(signature: &EntityMetaSignature) -> TokenStream {
    let manager = format_ident!("{}Manager", signature.ident);
    let meta = format_ident!("{}Meta", signature.ident);
    let entity = format_ident!("{}", signature.ident);

    let params: Vec<TokenStream> = signature
        .primary_key()
        .map(|column| {
            let ident = format_ident!("{}", column.name);
            let ty = &column.ty;
            quote!(#ident: #ty)
        })
        .collect();

    let restrictions: Vec<TokenStream> = signature
        .primary_key()
        .map(|column| {
            let name = &column.name;
            let ident = format_ident!("{}", column.name);
            quote!(.key(#name, #ident))
        })
        .collect();

    quote! {
        pub struct #manager {
            session: ::strata::runtime::Session,
        }

        impl #manager {
            #[must_use]
            pub const fn new(session: ::strata::runtime::Session) -> Self {
                Self { session }
            }

            #[must_use]
            pub fn insert(&self, entity: &#entity) -> ::strata::runtime::InsertRequest {
                ::strata::runtime::InsertRequest::new(
                    &self.session,
                    #meta::TABLE,
                    ::strata::row::ToRow::to_row(entity),
                )
            }

            #[must_use]
            pub fn find(&self, #(#params),*) -> ::strata::runtime::FindRequest {
                ::strata::runtime::FindRequest::new(&self.session, #meta::TABLE)
                    #(#restrictions)*
            }

            #[must_use]
            pub fn delete(&self, #(#params),*) -> ::strata::runtime::DeleteRequest {
                ::strata::runtime::DeleteRequest::new(&self.session, #meta::TABLE)
                    #(#restrictions)*
            }
        }
    }
}
