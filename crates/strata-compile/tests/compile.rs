use strata_compile::{CompileError, compile_source};
use strata_schema::diagnostic::{DiagnosticKind, Diagnostics};

fn expect_invalid(source: &str) -> Diagnostics {
    match compile_source(source) {
        Ok(_) => panic!("round should have failed"),
        Err(CompileError::Parse(err)) => panic!("round should parse: {err}"),
        Err(CompileError::Invalid(diagnostics)) => diagnostics,
    }
}

#[test]
fn account_round_emits_every_artifact_family() {
    let artifacts = compile_source(
        r#"
        #[entity]
        struct Account {
            #[partition_key(0)]
            id: Uuid,
            #[counter]
            balance: i64,
            #[json]
            tags: Vec<String>,
        }
        "#,
    )
    .expect("round compiles");

    assert!(artifacts.udts.is_empty());
    assert_eq!(artifacts.metas.len(), 1);
    assert_eq!(artifacts.managers.len(), 1);
    assert_eq!(artifacts.query_builders.len(), 1);
    assert_eq!(artifacts.factory.name, "ManagerFactory");

    let meta = artifacts.metas[0].render();
    assert!(meta.contains("\"account\""), "{meta}");
    assert!(meta.contains("HAS_COUNTER_COLUMN : bool = true"), "{meta}");
    assert!(meta.contains("counter_column"), "{meta}");
    assert!(meta.contains("JsonCodec"), "{meta}");
    assert!(meta.contains("\"text\""), "{meta}");
    assert!(meta.contains("\"uuid\""), "{meta}");
}

#[test]
fn manager_and_query_builder_are_typed_by_the_primary_key() {
    let artifacts = compile_source(
        "
        #[entity]
        struct Event {
            #[partition_key(0)]
            stream: Uuid,
            #[clustering_column(0)]
            sequence: i64,
            payload: String,
        }
        ",
    )
    .expect("round compiles");

    let manager = artifacts.managers[0].render();
    assert!(manager.contains("stream : Uuid"), "{manager}");
    assert!(manager.contains("sequence : i64"), "{manager}");
    assert!(manager.contains("fn insert"), "{manager}");
    assert!(manager.contains("fn delete"), "{manager}");

    let query = artifacts.query_builders[0].render();
    assert!(query.contains("fn stream_eq"), "{query}");
    assert!(query.contains("fn sequence_eq"), "{query}");
    assert!(!query.contains("payload_eq"), "{query}");
}

#[test]
fn factory_references_every_manager() {
    let artifacts = compile_source(
        "
        #[entity]
        struct Account {
            #[partition_key(0)]
            id: Uuid,
        }

        #[entity]
        struct Owner {
            #[partition_key(0)]
            id: Uuid,
        }
        ",
    )
    .expect("round compiles");

    let factory = artifacts.factory.render();
    assert!(factory.contains("AccountManager"), "{factory}");
    assert!(factory.contains("OwnerManager"), "{factory}");
    assert!(factory.contains("\"account\""), "{factory}");
    assert!(factory.contains("\"owner\""), "{factory}");

    // The factory ties the round together, so it is emitted last.
    let last = artifacts.iter().last().expect("artifacts");
    assert_eq!(last.name, "ManagerFactory");
}

#[test]
fn forward_declared_join_target_resolves_after_backfill() {
    let artifacts = compile_source(
        "
        #[entity]
        struct Account {
            #[partition_key(0)]
            id: Uuid,
            #[join]
            owner: Owner,
        }

        #[entity]
        struct Owner {
            #[partition_key(0)]
            id: Uuid,
        }
        ",
    )
    .expect("round compiles");

    let meta = artifacts.metas[0].render();
    assert!(meta.contains("join"), "{meta}");
    assert!(meta.contains("\"owner\""), "{meta}");
}

#[test]
fn join_target_outside_the_round_is_a_reference_error() {
    let errs = expect_invalid(
        "
        #[entity]
        struct Account {
            #[partition_key(0)]
            id: Uuid,
            #[join]
            owner: Owner,
        }
        ",
    );

    assert_eq!(errs.len(), 1);
    let diag = errs.iter().next().expect("diagnostic");
    assert_eq!(diag.kind, DiagnosticKind::Reference);
    assert!(diag.message.contains("not compiled in this round"));
}

#[test]
fn cyclic_joins_are_rejected() {
    let errs = expect_invalid(
        "
        #[entity]
        struct Account {
            #[partition_key(0)]
            id: Uuid,
            #[join]
            owner: Owner,
        }

        #[entity]
        struct Owner {
            #[partition_key(0)]
            id: Uuid,
            #[join]
            account: Account,
        }
        ",
    );

    assert_eq!(errs.len(), 1);
    let diag = errs.iter().next().expect("diagnostic");
    assert_eq!(diag.kind, DiagnosticKind::Reference);
    assert!(diag.message.contains("cyclic join chain"), "{}", diag.message);
}

#[test]
fn counter_on_a_float_is_a_type_error() {
    let errs = expect_invalid(
        "
        #[entity]
        struct Gauge {
            #[partition_key(0)]
            id: Uuid,
            #[counter]
            level: f64,
        }
        ",
    );

    assert_eq!(errs.len(), 1);
    let diag = errs.iter().next().expect("diagnostic");
    assert_eq!(diag.kind, DiagnosticKind::Type);
    assert!(diag.message.contains("bigint"), "{}", diag.message);
}

#[test]
fn diagnostics_aggregate_across_entities() {
    let errs = expect_invalid(
        "
        #[entity]
        struct Orphan {
            name: String,
        }

        #[entity]
        struct Gauge {
            #[partition_key(0)]
            id: Uuid,
            #[counter]
            level: f64,
        }
        ",
    );

    assert_eq!(errs.len(), 2);
    let rendered = errs.to_string();
    assert!(rendered.contains("Orphan"), "{rendered}");
    assert!(rendered.contains("Gauge"), "{rendered}");
}

#[test]
fn shared_udt_is_emitted_once() {
    let artifacts = compile_source(
        "
        #[udt]
        struct Address {
            street: String,
            zip: i32,
        }

        #[entity]
        struct Account {
            #[partition_key(0)]
            id: Uuid,
            billing: Address,
        }

        #[entity]
        struct Owner {
            #[partition_key(0)]
            id: Uuid,
            home: Address,
        }
        ",
    )
    .expect("round compiles");

    assert_eq!(artifacts.udts.len(), 1);
    assert_eq!(artifacts.udts[0].name, "AddressUdt");

    let udt = artifacts.udts[0].render();
    assert!(udt.contains("\"address\""), "{udt}");
    assert!(udt.contains("\"street\""), "{udt}");
    assert!(udt.contains("UdtShape"), "{udt}");
}

#[test]
fn nested_udt_shapes_precede_their_composites() {
    let artifacts = compile_source(
        "
        #[udt]
        struct Street {
            name: String,
        }

        #[udt]
        struct Address {
            street: Street,
            zip: i32,
        }

        #[entity]
        struct Account {
            #[partition_key(0)]
            id: Uuid,
            billing: Address,
        }
        ",
    )
    .expect("round compiles");

    let names: Vec<&str> = artifacts
        .udts
        .iter()
        .map(|artifact| artifact.name.as_str())
        .collect();
    assert_eq!(names, vec!["StreetUdt", "AddressUdt"]);
}

#[test]
fn enumerated_fields_resolve_through_the_enum_symbol_table() {
    let artifacts = compile_source(
        r#"
        enum Status {
            Open,
            Closed,
        }

        #[entity]
        struct Ticket {
            #[partition_key(0)]
            id: Uuid,
            #[enumerated]
            status: Status,
            #[enumerated(mode = "ordinal")]
            previous: Status,
        }
        "#,
    )
    .expect("round compiles");

    let meta = artifacts.metas[0].render();
    assert!(meta.contains("EnumNameCodec"), "{meta}");
    assert!(meta.contains("EnumOrdinalCodec"), "{meta}");
    assert!(meta.contains("\"int\""), "{meta}");
}

#[test]
fn invalid_round_display_counts_and_lists_diagnostics() {
    let err = compile_source(
        "
        #[entity]
        struct Orphan {
            name: String,
        }
        ",
    )
    .expect_err("round fails");

    let rendered = err.to_string();
    assert!(rendered.contains("1 diagnostic(s)"), "{rendered}");
    assert!(rendered.contains("no partition key"), "{rendered}");
}

#[test]
fn unparseable_input_is_a_parse_error() {
    match compile_source("struct {") {
        Err(CompileError::Parse(_)) => {}
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn failed_rounds_emit_nothing() {
    // One bad entity poisons the whole round even though the other is fine.
    let errs = expect_invalid(
        "
        #[entity]
        struct Good {
            #[partition_key(0)]
            id: Uuid,
        }

        #[entity]
        struct Orphan {
            name: String,
        }
        ",
    );

    assert_eq!(errs.len(), 1);
}
