use crate::{
    diagnostic::{Diagnostic, Diagnostics},
    node::{AnnotationSet, FieldDescriptor},
};
use derive_more::Display;

///
/// StructuralAnnotation
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum StructuralAnnotation {
    #[display("partition_key")]
    PartitionKey,
    #[display("clustering_column")]
    ClusteringColumn,
    #[display("static_column")]
    StaticColumn,
    #[display("computed")]
    Computed,
    #[display("counter")]
    Counter,
}

///
/// EncodingAnnotation
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum EncodingAnnotation {
    #[display("frozen")]
    Frozen,
    #[display("json")]
    Json,
    #[display("enumerated")]
    Enumerated,
    #[display("codec")]
    Codec,
    #[display("computed")]
    Computed,
    #[display("counter")]
    Counter,
    #[display("time_uuid")]
    TimeUuid,
}

// Mutual exclusions on the structural axis. A static counter column is the
// one legal combination, so (StaticColumn, Counter) is absent.
const STRUCTURAL_FORBIDDEN: &[(StructuralAnnotation, StructuralAnnotation)] = {
    use StructuralAnnotation::*;
    &[
        (PartitionKey, StaticColumn),
        (ClusteringColumn, StaticColumn),
        (PartitionKey, ClusteringColumn),
        (PartitionKey, Computed),
        (ClusteringColumn, Computed),
        (StaticColumn, Computed),
        (PartitionKey, Counter),
        (ClusteringColumn, Counter),
        (Computed, Counter),
    ]
};

// Mutual exclusions on the encoding axis. (Codec, Computed) and
// (Codec, Counter) are absent: an explicit codec may serve a computed or
// counter column, with its target type validated by the resolver.
const ENCODING_FORBIDDEN: &[(EncodingAnnotation, EncodingAnnotation)] = {
    use EncodingAnnotation::*;
    &[
        (Json, Codec),
        (Enumerated, Codec),
        (Enumerated, Json),
        (Frozen, Json),
        (Frozen, Enumerated),
        (Frozen, Codec),
        (Frozen, Computed),
        (Json, Computed),
        (Enumerated, Computed),
        (Frozen, Counter),
        (Json, Counter),
        (Enumerated, Counter),
        (Computed, Counter),
        (Frozen, TimeUuid),
        (Json, TimeUuid),
        (Enumerated, TimeUuid),
        (Codec, TimeUuid),
        (Computed, TimeUuid),
        (Counter, TimeUuid),
    ]
};

fn has_structural(set: &AnnotationSet, annotation: StructuralAnnotation) -> bool {
    match annotation {
        StructuralAnnotation::PartitionKey => set.partition_key.is_some(),
        StructuralAnnotation::ClusteringColumn => set.clustering_column.is_some(),
        StructuralAnnotation::StaticColumn => set.static_column,
        StructuralAnnotation::Computed => set.computed.is_some(),
        StructuralAnnotation::Counter => set.counter,
    }
}

fn has_encoding(set: &AnnotationSet, annotation: EncodingAnnotation) -> bool {
    match annotation {
        EncodingAnnotation::Frozen => set.frozen,
        EncodingAnnotation::Json => set.json,
        EncodingAnnotation::Enumerated => set.enumerated.is_some(),
        EncodingAnnotation::Codec => set.codec.is_some(),
        EncodingAnnotation::Computed => set.computed.is_some(),
        EncodingAnnotation::Counter => set.counter,
        EncodingAnnotation::TimeUuid => set.time_uuid,
    }
}

/// Check the field's annotation set against both forbidden-pair tables.
/// Every violation names both annotations, the field and the owning class.
pub fn validate(field: &FieldDescriptor, errs: &mut Diagnostics) {
    let set = &field.annotations;

    for (a, b) in STRUCTURAL_FORBIDDEN {
        if has_structural(set, *a) && has_structural(set, *b) {
            errs.push(Diagnostic::configuration(
                &field.class,
                &field.name,
                format!("cannot combine #[{a}] with #[{b}]"),
            ));
        }
    }

    for (a, b) in ENCODING_FORBIDDEN {
        if has_encoding(set, *a) && has_encoding(set, *b) {
            errs.push(Diagnostic::configuration(
                &field.class,
                &field.name,
                format!("cannot combine #[{a}] with #[{b}]"),
            ));
        }
    }
}
