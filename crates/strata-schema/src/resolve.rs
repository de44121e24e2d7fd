//! Codec resolution: a fixed-priority rule chain mapping a field's declared
//! type and annotation set to a persisted-type binding. First matching rule
//! wins; every branch validates before returning. Each `resolve` call fails
//! fast internally while the enclosing round aggregates across fields.

use crate::{
    context::GlobalParsingContext,
    diagnostic::Diagnostic,
    node::{CodecBinding, CodecKind, CodecRef, EnumEncoding, FieldDescriptor},
    types::{ByteRepr, CqlType, CqlTypeRef, FieldShape, ScalarType, catalog_type},
};

///
/// CodecResolver
///

pub struct CodecResolver<'a> {
    ctx: &'a GlobalParsingContext,
}

impl<'a> CodecResolver<'a> {
    #[must_use]
    pub const fn new(ctx: &'a GlobalParsingContext) -> Self {
        Self { ctx }
    }

    /// Resolve the field against the rule chain:
    /// json > explicit codec > class-level codec > enumerated >
    /// byte sequence > passthrough fallback.
    pub fn resolve(&self, field: &FieldDescriptor) -> Result<CodecBinding, Diagnostic> {
        let set = &field.annotations;

        let binding = if set.json {
            CodecBinding {
                source: field.ty.clone(),
                cql: CqlTypeRef::Scalar(CqlType::Text),
                kind: CodecKind::Json,
            }
        } else if let Some(codec) = &set.codec {
            self.codec_binding(field, codec)?
        } else if let Some(codec) = self.class_codec_for(&field.shape) {
            self.codec_binding(field, codec)?
        } else if let Some(encoding) = set.enumerated {
            self.enumerated_binding(field, encoding)?
        } else if let FieldShape::Bytes(repr) = &field.shape {
            CodecBinding {
                source: field.ty.clone(),
                cql: CqlTypeRef::Scalar(CqlType::Blob),
                kind: match repr {
                    ByteRepr::Growable => CodecKind::ByteGrowable,
                    ByteRepr::Boxed => CodecKind::ByteBoxed,
                },
            }
        } else {
            self.fallback_binding(field)?
        };

        // Uniform invariant, independent of which branch produced the
        // binding: counter columns persist as bigint.
        if set.counter && !binding.cql.is_bigint() {
            return Err(Diagnostic::type_error(
                &field.class,
                &field.name,
                format!(
                    "#[counter] field resolves to persisted type '{}'; counter columns must persist as bigint",
                    binding.cql
                ),
            ));
        }

        Ok(binding)
    }

    fn class_codec_for(&self, shape: &FieldShape) -> Option<&CodecRef> {
        match shape {
            FieldShape::Named(name) => self.ctx.class_codec(name),
            _ => None,
        }
    }

    fn codec_binding(
        &self,
        field: &FieldDescriptor,
        codec: &CodecRef,
    ) -> Result<CodecBinding, Diagnostic> {
        let name = codec.display_name();

        if codec.params.len() != 2 {
            return Err(Diagnostic::arity(
                &field.class,
                &field.name,
                format!(
                    "codec '{name}' should have 2 type parameters: Codec<From, To>, found {}",
                    codec.params.len()
                ),
            ));
        }

        let from = shape_of(field, &codec.params[0])?;
        let to = shape_of(field, &codec.params[1])?;

        if from != field.shape {
            return Err(Diagnostic::type_error(
                &field.class,
                &field.name,
                format!(
                    "codec '{name}' source type '{from}' should match declared field type '{}'",
                    field.shape
                ),
            ));
        }

        if let Some(computed) = &field.annotations.computed {
            if let Some(override_shape) = &computed.cql_class {
                if &to != override_shape {
                    return Err(Diagnostic::type_error(
                        &field.class,
                        &field.name,
                        format!(
                            "codec '{name}' target type '{to}' should match the computed persisted-type override '{override_shape}'"
                        ),
                    ));
                }
            }
        }

        let cql = self.persisted_type(&to).ok_or_else(|| {
            Diagnostic::type_error(
                &field.class,
                &field.name,
                format!("codec '{name}' target type '{to}' is not a supported persisted type"),
            )
        })?;

        Ok(CodecBinding {
            source: field.ty.clone(),
            cql,
            kind: CodecKind::Custom {
                path: codec.path.clone(),
            },
        })
    }

    fn enumerated_binding(
        &self,
        field: &FieldDescriptor,
        encoding: EnumEncoding,
    ) -> Result<CodecBinding, Diagnostic> {
        let is_enum = matches!(&field.shape, FieldShape::Named(name) if self.ctx.is_enum(name));
        if !is_enum {
            return Err(Diagnostic::type_error(
                &field.class,
                &field.name,
                format!(
                    "#[enumerated] requires an enumeration type, but '{}' is not one",
                    field.shape
                ),
            ));
        }

        let (cql, kind) = match encoding {
            EnumEncoding::Name => (CqlType::Text, CodecKind::EnumName),
            EnumEncoding::Ordinal => (CqlType::Int, CodecKind::EnumOrdinal),
        };

        Ok(CodecBinding {
            source: field.ty.clone(),
            cql: CqlTypeRef::Scalar(cql),
            kind,
        })
    }

    fn fallback_binding(&self, field: &FieldDescriptor) -> Result<CodecBinding, Diagnostic> {
        let set = &field.annotations;

        if set.time_uuid {
            if field.shape != FieldShape::Scalar(ScalarType::Uuid) {
                return Err(Diagnostic::type_error(
                    &field.class,
                    &field.name,
                    format!(
                        "#[time_uuid] requires a Uuid field, but the declared type is '{}'",
                        field.shape
                    ),
                ));
            }

            return Ok(CodecBinding {
                source: field.ty.clone(),
                cql: CqlTypeRef::Scalar(CqlType::Timeuuid),
                kind: CodecKind::Passthrough,
            });
        }

        if let Some(computed) = &set.computed {
            if let Some(override_shape) = &computed.cql_class {
                if override_shape != &field.shape {
                    return Err(Diagnostic::type_error(
                        &field.class,
                        &field.name,
                        format!(
                            "persisted-type override '{override_shape}' of computed field should match the declared type '{}'",
                            field.shape
                        ),
                    ));
                }
            }
        }

        let cql = self.persisted_type(&field.shape).ok_or_else(|| {
            Diagnostic::type_error(
                &field.class,
                &field.name,
                format!(
                    "impossible to persist type '{}'; it is not a supported type",
                    field.shape
                ),
            )
        })?;

        Ok(CodecBinding {
            source: field.ty.clone(),
            cql,
            kind: CodecKind::Passthrough,
        })
    }

    /// Catalog lookup extended with the round's user-defined types.
    fn persisted_type(&self, shape: &FieldShape) -> Option<CqlTypeRef> {
        match shape {
            FieldShape::Named(name) => self
                .ctx
                .udt_def(name)
                .map(|def| CqlTypeRef::Udt(def.name.clone())),
            FieldShape::List(inner) => {
                Some(CqlTypeRef::List(Box::new(self.persisted_type(inner)?)))
            }
            FieldShape::Set(inner) => Some(CqlTypeRef::Set(Box::new(self.persisted_type(inner)?))),
            FieldShape::Map(key, value) => Some(CqlTypeRef::Map(
                Box::new(self.persisted_type(key)?),
                Box::new(self.persisted_type(value)?),
            )),
            FieldShape::Scalar(_) | FieldShape::Bytes(_) => catalog_type(shape),
        }
    }
}

fn shape_of(field: &FieldDescriptor, ty: &syn::Type) -> Result<FieldShape, Diagnostic> {
    FieldShape::from_type(ty)
        .map_err(|message| Diagnostic::type_error(&field.class, &field.name, message))
}
