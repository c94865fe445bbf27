//! Fuzzy file matcher behavior at the public API surface.

use redpen::{select_best_file, similarity_ratio, IdentityHint};

fn files(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn no_candidates_yields_none() {
    assert_eq!(select_best_file(&[], &IdentityHint::default(), None), None);
}

#[test]
fn single_candidate_wins_regardless_of_hints() {
    let candidates = files(&["completely_unrelated.pdf"]);
    let hint = IdentityHint {
        id: Some("s042"),
        name: Some("Alice Martin"),
    };
    assert_eq!(
        select_best_file(&candidates, &hint, Some("exam1")),
        Some("completely_unrelated.pdf")
    );
}

#[test]
fn id_substring_dominates_scoring() {
    let candidates = files(&["alice_exam1.pdf", "bob_exam1.pdf"]);
    let hint = IdentityHint {
        id: Some("alice"),
        name: None,
    };
    assert_eq!(
        select_best_file(&candidates, &hint, Some("exam1")),
        Some("alice_exam1.pdf")
    );
}

#[test]
fn name_tokens_prefer_the_matching_file() {
    let candidates = files(&["martin_alice.pdf", "martin_bob.pdf"]);
    let hint = IdentityHint {
        id: None,
        name: Some("alice martin"),
    };
    // Both match "martin"; only the first also matches "alice".
    assert_eq!(
        select_best_file(&candidates, &hint, None),
        Some("martin_alice.pdf")
    );
}

#[test]
fn low_confidence_returns_first_candidate() {
    // Documented fallback: nothing matches, but something is returned.
    let candidates = files(&["scan_0001.pdf", "scan_0002.pdf"]);
    let hint = IdentityHint {
        id: Some("alice"),
        name: Some("Alice Martin"),
    };
    assert_eq!(
        select_best_file(&candidates, &hint, Some("exam1")),
        Some("scan_0001.pdf")
    );
}

#[test]
fn similarity_ratio_is_normalized() {
    for (a, b) in [
        ("alice martin", "alice_martin"),
        ("", "x"),
        ("kitten", "sitting"),
        ("same", "same"),
    ] {
        let ratio = similarity_ratio(a, b);
        assert!((0.0..=1.0).contains(&ratio), "{} vs {} -> {}", a, b, ratio);
    }
}
