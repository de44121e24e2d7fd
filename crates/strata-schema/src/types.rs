use derive_more::Display;
use quote::ToTokens;
use serde::Serialize;
use std::fmt;

///
/// CqlType
///
/// The catalog of persisted scalar types. Membership in this enum is the
/// allowed-types predicate: a declared field type with no mapping here (and
/// no codec transforming it into one) is rejected with a type error by the
/// caller.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[remain::sorted]
pub enum CqlType {
    #[display("bigint")]
    Bigint,
    #[display("blob")]
    Blob,
    #[display("boolean")]
    Boolean,
    #[display("double")]
    Double,
    #[display("float")]
    Float,
    #[display("int")]
    Int,
    #[display("smallint")]
    Smallint,
    #[display("text")]
    Text,
    #[display("timestamp")]
    Timestamp,
    #[display("timeuuid")]
    Timeuuid,
    #[display("tinyint")]
    Tinyint,
    #[display("uuid")]
    Uuid,
}

impl CqlType {
    /// Counter columns are restricted to 64-bit integer persistence.
    #[must_use]
    pub const fn is_counter_compatible(self) -> bool {
        matches!(self, Self::Bigint)
    }
}

///
/// CqlTypeRef
///
/// A full persisted-type reference: a catalog scalar, a collection over
/// other references, or a user-defined type known by schema name.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum CqlTypeRef {
    Scalar(CqlType),
    List(Box<CqlTypeRef>),
    Set(Box<CqlTypeRef>),
    Map(Box<CqlTypeRef>, Box<CqlTypeRef>),
    Udt(String),
}

impl CqlTypeRef {
    #[must_use]
    pub const fn is_bigint(&self) -> bool {
        matches!(self, Self::Scalar(CqlType::Bigint))
    }
}

impl fmt::Display for CqlTypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(ty) => write!(f, "{ty}"),
            Self::List(inner) => write!(f, "list<{inner}>"),
            Self::Set(inner) => write!(f, "set<{inner}>"),
            Self::Map(key, value) => write!(f, "map<{key}, {value}>"),
            Self::Udt(name) => write!(f, "{name}"),
        }
    }
}

///
/// ScalarType
///
/// Declared in-memory scalar types with a direct persisted mapping.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum ScalarType {
    #[display("bool")]
    Bool,
    #[display("f32")]
    Float32,
    #[display("f64")]
    Float64,
    #[display("i8")]
    Int8,
    #[display("i16")]
    Int16,
    #[display("i32")]
    Int32,
    #[display("i64")]
    Int64,
    #[display("String")]
    Text,
    #[display("SystemTime")]
    Timestamp,
    #[display("Uuid")]
    Uuid,
}

impl ScalarType {
    #[must_use]
    pub const fn cql(self) -> CqlType {
        match self {
            Self::Bool => CqlType::Boolean,
            Self::Float32 => CqlType::Float,
            Self::Float64 => CqlType::Double,
            Self::Int8 => CqlType::Tinyint,
            Self::Int16 => CqlType::Smallint,
            Self::Int32 => CqlType::Int,
            Self::Int64 => CqlType::Bigint,
            Self::Text => CqlType::Text,
            Self::Timestamp => CqlType::Timestamp,
            Self::Uuid => CqlType::Uuid,
        }
    }

    fn from_ident(ident: &str) -> Option<Self> {
        let scalar = match ident {
            "bool" => Self::Bool,
            "f32" => Self::Float32,
            "f64" => Self::Float64,
            "i8" => Self::Int8,
            "i16" => Self::Int16,
            "i32" => Self::Int32,
            "i64" => Self::Int64,
            "String" => Self::Text,
            "SystemTime" => Self::Timestamp,
            "Uuid" => Self::Uuid,
            _ => return None,
        };

        Some(scalar)
    }
}

///
/// ByteRepr
///
/// Byte-sequence representations get a dedicated blob codec each.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
pub enum ByteRepr {
    /// `Vec<u8>`
    #[display("Vec<u8>")]
    Growable,
    /// `Box<[u8]>`
    #[display("Box<[u8]>")]
    Boxed,
}

///
/// FieldShape
///
/// The analyzed shape of a declared field type. Parsed once per field from
/// the declaration; all resolution logic afterwards is plain matching over
/// this value.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldShape {
    Scalar(ScalarType),
    Bytes(ByteRepr),
    List(Box<FieldShape>),
    Set(Box<FieldShape>),
    Map(Box<FieldShape>, Box<FieldShape>),
    /// A named type resolved against the round's symbol tables (enum,
    /// user-defined type, or entity reference).
    Named(String),
}

impl FieldShape {
    /// Analyze a declared `syn::Type`. `Option<T>` is unwrapped: persisted
    /// columns are implicitly nullable, so optionality carries no schema
    /// meaning.
    pub fn from_type(ty: &syn::Type) -> Result<Self, String> {
        let syn::Type::Path(type_path) = ty else {
            return Err(format!(
                "unsupported declared type '{}'",
                ty.to_token_stream()
            ));
        };
        if type_path.qself.is_some() {
            return Err(format!(
                "unsupported declared type '{}'",
                ty.to_token_stream()
            ));
        }
        let Some(segment) = type_path.path.segments.last() else {
            return Err("empty type path".to_string());
        };

        let ident = segment.ident.to_string();
        let args = generic_args(segment);

        match (ident.as_str(), args.as_deref()) {
            ("Option", Some([inner])) => Self::from_type(inner),
            ("Vec", Some([inner])) => {
                if is_u8(inner) {
                    Ok(Self::Bytes(ByteRepr::Growable))
                } else {
                    Ok(Self::List(Box::new(Self::from_type(inner)?)))
                }
            }
            ("Box", Some([inner])) => match inner {
                syn::Type::Slice(slice) if is_u8(&slice.elem) => Ok(Self::Bytes(ByteRepr::Boxed)),
                _ => Err(format!(
                    "unsupported declared type '{}'",
                    ty.to_token_stream()
                )),
            },
            ("HashSet" | "BTreeSet", Some([inner])) => {
                Ok(Self::Set(Box::new(Self::from_type(inner)?)))
            }
            ("HashMap" | "BTreeMap", Some([key, value])) => Ok(Self::Map(
                Box::new(Self::from_type(key)?),
                Box::new(Self::from_type(value)?),
            )),
            (_, None) => Ok(ScalarType::from_ident(&ident)
                .map_or_else(|| Self::Named(ident.clone()), Self::Scalar)),
            _ => Err(format!(
                "unsupported declared type '{}'",
                ty.to_token_stream()
            )),
        }
    }

    /// Named types referenced anywhere in this shape, outermost first.
    #[must_use]
    pub fn named_refs(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_named(&mut out);
        out
    }

    fn collect_named<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Named(name) => out.push(name),
            Self::List(inner) | Self::Set(inner) => inner.collect_named(out),
            Self::Map(key, value) => {
                key.collect_named(out);
                value.collect_named(out);
            }
            Self::Scalar(_) | Self::Bytes(_) => {}
        }
    }

    /// Frozen applies only to composite shapes: collections and named
    /// (user-defined) types.
    #[must_use]
    pub const fn is_composite(&self) -> bool {
        matches!(
            self,
            Self::List(_) | Self::Set(_) | Self::Map(_, _) | Self::Named(_)
        )
    }
}

impl fmt::Display for FieldShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(scalar) => write!(f, "{scalar}"),
            Self::Bytes(repr) => write!(f, "{repr}"),
            Self::List(inner) => write!(f, "Vec<{inner}>"),
            Self::Set(inner) => write!(f, "Set<{inner}>"),
            Self::Map(key, value) => write!(f, "Map<{key}, {value}>"),
            Self::Named(name) => write!(f, "{name}"),
        }
    }
}

/// Map a declared shape to its persisted representation through the catalog.
/// Named shapes have no catalog mapping; the resolver consults the round's
/// symbol tables for those.
#[must_use]
pub fn catalog_type(shape: &FieldShape) -> Option<CqlTypeRef> {
    match shape {
        FieldShape::Scalar(scalar) => Some(CqlTypeRef::Scalar(scalar.cql())),
        FieldShape::Bytes(_) => Some(CqlTypeRef::Scalar(CqlType::Blob)),
        FieldShape::List(inner) => Some(CqlTypeRef::List(Box::new(catalog_type(inner)?))),
        FieldShape::Set(inner) => Some(CqlTypeRef::Set(Box::new(catalog_type(inner)?))),
        FieldShape::Map(key, value) => Some(CqlTypeRef::Map(
            Box::new(catalog_type(key)?),
            Box::new(catalog_type(value)?),
        )),
        FieldShape::Named(_) => None,
    }
}

fn generic_args(segment: &syn::PathSegment) -> Option<Vec<syn::Type>> {
    match &segment.arguments {
        syn::PathArguments::AngleBracketed(args) => Some(
            args.args
                .iter()
                .filter_map(|arg| match arg {
                    syn::GenericArgument::Type(ty) => Some(ty.clone()),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    }
}

fn is_u8(ty: &syn::Type) -> bool {
    matches!(ty, syn::Type::Path(path) if path.path.is_ident("u8"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn shape(ty: syn::Type) -> FieldShape {
        FieldShape::from_type(&ty).expect("shape should parse")
    }

    #[test]
    fn scalar_shapes_map_through_the_catalog() {
        assert_eq!(
            catalog_type(&shape(parse_quote!(i64))),
            Some(CqlTypeRef::Scalar(CqlType::Bigint))
        );
        assert_eq!(
            catalog_type(&shape(parse_quote!(Uuid))),
            Some(CqlTypeRef::Scalar(CqlType::Uuid))
        );
        assert_eq!(
            catalog_type(&shape(parse_quote!(String))),
            Some(CqlTypeRef::Scalar(CqlType::Text))
        );
    }

    #[test]
    fn byte_sequences_use_dedicated_shapes() {
        assert_eq!(
            shape(parse_quote!(Vec<u8>)),
            FieldShape::Bytes(ByteRepr::Growable)
        );
        assert_eq!(
            shape(parse_quote!(Box<[u8]>)),
            FieldShape::Bytes(ByteRepr::Boxed)
        );
        assert_eq!(
            shape(parse_quote!(Vec<i64>)),
            FieldShape::List(Box::new(FieldShape::Scalar(ScalarType::Int64)))
        );
    }

    #[test]
    fn option_is_unwrapped() {
        assert_eq!(
            shape(parse_quote!(Option<String>)),
            FieldShape::Scalar(ScalarType::Text)
        );
    }

    #[test]
    fn collections_recurse() {
        let map = shape(parse_quote!(BTreeMap<String, Vec<i32>>));
        assert_eq!(
            catalog_type(&map).expect("catalog mapping").to_string(),
            "map<text, list<int>>"
        );
    }

    #[test]
    fn named_types_have_no_catalog_mapping() {
        let named = shape(parse_quote!(Address));
        assert_eq!(catalog_type(&named), None);
        assert_eq!(named.named_refs(), vec!["Address"]);
    }

    #[test]
    fn references_are_rejected() {
        let ty: syn::Type = parse_quote!(&'static str);
        assert!(FieldShape::from_type(&ty).is_err());
    }
}
