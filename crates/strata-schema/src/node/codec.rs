use crate::types::CqlTypeRef;
use proc_macro2::TokenStream;
use quote::{ToTokens, quote};

///
/// CodecRef
///
/// A reference to a codec type carrying its `(From, To)` parameters
/// explicitly, e.g. `#[codec(MoneyCodec<Money, i64>)]`. The parameter list
/// is kept as declared; arity is validated during resolution.
///

#[derive(Clone, Debug)]
pub struct CodecRef {
    /// Codec path with the type parameters stripped.
    pub path: syn::Path,
    pub params: Vec<syn::Type>,
}

impl CodecRef {
    /// Split a declared codec path into its bare path and type parameters.
    #[must_use]
    pub fn from_path(mut path: syn::Path) -> Self {
        let mut params = Vec::new();

        if let Some(segment) = path.segments.last_mut() {
            if let syn::PathArguments::AngleBracketed(args) =
                std::mem::replace(&mut segment.arguments, syn::PathArguments::None)
            {
                params = args
                    .args
                    .into_iter()
                    .filter_map(|arg| match arg {
                        syn::GenericArgument::Type(ty) => Some(ty),
                        _ => None,
                    })
                    .collect();
            }
        }

        Self { path, params }
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        self.path.to_token_stream().to_string().replace(' ', "")
    }
}

///
/// CodecKind
///
/// The selection strategy chosen by the resolver. Each variant knows how to
/// instantiate itself against the runtime codec collaborator.
///

#[derive(Clone, Debug)]
pub enum CodecKind {
    /// Generic JSON transform; round-trips arbitrary structured values
    /// through a text column.
    Json,
    /// Explicit per-field or class-level codec.
    Custom { path: syn::Path },
    EnumName,
    EnumOrdinal,
    /// `Vec<u8>` to blob.
    ByteGrowable,
    /// `Box<[u8]>` to blob.
    ByteBoxed,
    /// Identity passthrough for directly-persistable types.
    Passthrough,
}

///
/// CodecBinding
///
/// Resolved (source type, persisted type, codec selection). Invariants held
/// by construction in the resolver: `cql` is catalog-backed (or a known
/// user-defined type), and counter-annotated fields resolve to `bigint`.
///

#[derive(Clone, Debug)]
pub struct CodecBinding {
    pub source: syn::Type,
    pub cql: CqlTypeRef,
    pub kind: CodecKind,
}

impl CodecBinding {
    /// Emit the constructor expression for this codec. The source type
    /// tokens recursively describe parameterized and nested types, so the
    /// generic transforms can round-trip arbitrary structured values.
    #[must_use]
    pub fn instantiate(&self) -> TokenStream {
        let source = &self.source;

        match &self.kind {
            CodecKind::Json => quote!(::strata::codec::JsonCodec::<#source>::new()),
            CodecKind::Custom { path } => quote!(#path::default()),
            CodecKind::EnumName => quote!(::strata::codec::EnumNameCodec::<#source>::new()),
            CodecKind::EnumOrdinal => quote!(::strata::codec::EnumOrdinalCodec::<#source>::new()),
            CodecKind::ByteGrowable => quote!(::strata::codec::ByteVecCodec::new()),
            CodecKind::ByteBoxed => quote!(::strata::codec::BoxedBytesCodec::new()),
            CodecKind::Passthrough => quote!(::strata::codec::PassthroughCodec::<#source>::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn from_path_strips_type_parameters() {
        let codec = CodecRef::from_path(parse_quote!(codecs::MoneyCodec<Money, i64>));

        assert_eq!(codec.display_name(), "codecs::MoneyCodec");
        assert_eq!(codec.params.len(), 2);
    }

    #[test]
    fn from_path_accepts_bare_paths() {
        let codec = CodecRef::from_path(parse_quote!(MoneyCodec));

        assert_eq!(codec.display_name(), "MoneyCodec");
        assert!(codec.params.is_empty());
    }

    #[test]
    fn json_instantiation_carries_the_nested_source_type() {
        let binding = CodecBinding {
            source: parse_quote!(Vec<Vec<String>>),
            cql: CqlTypeRef::Scalar(crate::types::CqlType::Text),
            kind: CodecKind::Json,
        };

        let rendered = binding.instantiate().to_string();
        assert!(rendered.contains("JsonCodec"));
        assert!(rendered.contains("Vec < Vec < String > >"));
    }
}
