//! Table metadata generation. Each entity gets a `*Meta` unit declaring
//! its table constants and a `table_shape()` that replays the complete
//! column layout against the runtime shape builder.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use strata_schema::node::{ColumnMeta, EntityMetaSignature, KeyKind};

pub fn generate(signature: &EntityMetaSignature) -> TokenStream {
    let ident = format_ident!("{}Meta", signature.ident);
    let table = &signature.table;
    let has_counter = signature.has_counter_column;

    let partition_keys = signature.partition_keys.iter().map(key_call);
    let clustering_columns = signature.clustering_columns.iter().map(key_call);
    let static_columns = signature.static_columns.iter().map(static_call);
    let computed_columns = signature.computed_columns.iter().map(computed_call);
    let regular_columns = signature.regular_columns.iter().map(regular_call);

    let joins = signature.joins.iter().filter_map(|join| {
        let field = &join.field;
        // Backfilled before emission starts; an unresolved join never
        // reaches this point.
        join.target_table.as_ref().map(|table| {
            quote! {
                .join(#field, #table)
            }
        })
    });

    quote! {
        pub struct #ident;

        impl #ident {
            pub const TABLE: &'static str = #table;
            pub const HAS_COUNTER_COLUMN: bool = #has_counter;

            #[must_use]
            pub fn table_shape() -> ::strata::meta::TableShape {
                ::strata::meta::TableShape::new(Self::TABLE)
                    #(#partition_keys)*
                    #(#clustering_columns)*
                    #(#static_columns)*
                    #(#computed_columns)*
                    #(#regular_columns)*
                    #(#joins)*
            }
        }
    }
}

fn key_call(column: &ColumnMeta) -> TokenStream {
    let name = &column.name;
    let cql = column.binding.cql.to_string();
    let codec = column.binding.instantiate();

    // The key slot is filled by the builder; both buckets are already in
    // ordinal order.
    let Some(key) = &column.key else {
        return quote! {
            .column(#name, #cql, #codec)
        };
    };

    let ordinal = key.ordinal;
    let method = match key.kind {
        KeyKind::Partition => format_ident!("partition_key"),
        KeyKind::Clustering => format_ident!("clustering_column"),
    };

    quote! {
        .#method(#ordinal, #name, #cql, #codec)
    }
}

fn static_call(column: &ColumnMeta) -> TokenStream {
    let name = &column.name;
    let cql = column.binding.cql.to_string();
    let codec = column.binding.instantiate();

    if column.counter {
        quote! {
            .static_counter_column(#name)
        }
    } else {
        quote! {
            .static_column(#name, #cql, #codec)
        }
    }
}

fn computed_call(column: &ColumnMeta) -> TokenStream {
    let name = &column.name;
    let cql = column.binding.cql.to_string();
    let codec = column.binding.instantiate();

    let Some(computed) = &column.computed else {
        return quote! {
            .column(#name, #cql, #codec)
        };
    };

    let function = &computed.function;
    let args = computed.args.iter();

    quote! {
        .computed_column(#name, #cql, #function, &[#(#args),*], #codec)
    }
}

fn regular_call(column: &ColumnMeta) -> TokenStream {
    let name = &column.name;
    let cql = column.binding.cql.to_string();
    let codec = column.binding.instantiate();

    if column.counter {
        quote! {
            .counter_column(#name)
        }
    } else {
        quote! {
            .column(#name, #cql, #codec)
        }
    }
}
