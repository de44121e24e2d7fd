use crate::{
    diagnostic::{Diagnostic, Diagnostics},
    node::{KeyColumnInfo, KeyKind},
};

/// Verify that the declared ordinals of one key kind form a dense
/// permutation of `0..n-1`: every ordinal in range, no ordinal used twice.
///
/// An arithmetic-series sum comparison would accept duplicate ordinals that
/// happen to compensate each other, so each position is checked explicitly.
pub fn validate_key_order(
    class: &str,
    kind: KeyKind,
    keys: &[KeyColumnInfo],
    errs: &mut Diagnostics,
) {
    let len = keys.len();
    let mut seen: Vec<Option<&str>> = vec![None; len];

    for key in keys {
        let ordinal = key.ordinal as usize;

        if ordinal >= len {
            errs.push(Diagnostic::structural(
                class,
                format!(
                    "{kind} ordering is wrong: ordinal {ordinal} on field '{}' is out of range 0..{len}",
                    key.field
                ),
            ));
            continue;
        }

        match seen[ordinal] {
            Some(previous) => errs.push(Diagnostic::structural(
                class,
                format!(
                    "{kind} ordering is wrong: ordinal {ordinal} declared on both '{previous}' and '{}'",
                    key.field
                ),
            )),
            None => seen[ordinal] = Some(&key.field),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn keys(ordinals: &[u32]) -> Vec<KeyColumnInfo> {
        ordinals
            .iter()
            .enumerate()
            .map(|(i, ordinal)| KeyColumnInfo::new(KeyKind::Partition, *ordinal, &format!("k{i}")))
            .collect()
    }

    fn check(ordinals: &[u32]) -> Diagnostics {
        let mut errs = Diagnostics::new();
        validate_key_order("Account", KeyKind::Partition, &keys(ordinals), &mut errs);
        errs
    }

    #[test]
    fn dense_permutation_is_valid() {
        assert!(check(&[0, 1, 2]).is_empty());
        assert!(check(&[2, 0, 1]).is_empty());
        assert!(check(&[0]).is_empty());
        assert!(check(&[]).is_empty());
    }

    // Regression: {0, 0, 2} has the same sum as {0, 1, 1}; a sum-based
    // check cannot tell duplicates apart from a valid series.
    #[test]
    fn compensating_duplicates_are_rejected() {
        let errs = check(&[0, 0, 2]);
        assert_eq!(errs.len(), 1, "expected one duplicate diagnostic: {errs}");

        let rendered = errs.to_string();
        assert!(rendered.contains("ordinal 0"));
        assert!(rendered.contains("declared on both"));
    }

    #[test]
    fn gaps_are_rejected() {
        let errs = check(&[0, 2]);
        assert!(!errs.is_empty());
        assert!(errs.to_string().contains("out of range"));
    }

    #[test]
    fn errors_name_class_and_kind() {
        let mut errs = Diagnostics::new();
        validate_key_order(
            "Account",
            KeyKind::Clustering,
            &keys(&[1, 1]),
            &mut errs,
        );

        let rendered = errs.to_string();
        assert!(rendered.contains("Account"));
        assert!(rendered.contains("clustering column"));
    }

    proptest! {
        #[test]
        fn any_permutation_validates(
            ordinals in (1usize..10).prop_flat_map(|n| {
                Just((0..n as u32).collect::<Vec<u32>>()).prop_shuffle()
            })
        ) {
            prop_assert!(check(&ordinals).is_empty());
        }

        #[test]
        fn any_duplicate_is_rejected(
            (ordinals, from, to) in (2usize..10)
                .prop_flat_map(|n| {
                    (
                        Just((0..n as u32).collect::<Vec<u32>>()).prop_shuffle(),
                        0..n,
                        0..n,
                    )
                })
                .prop_filter("positions must differ", |(_, from, to)| from != to)
        ) {
            let mut ordinals = ordinals;
            ordinals[to] = ordinals[from];

            prop_assert!(!check(&ordinals).is_empty());
        }
    }
}
