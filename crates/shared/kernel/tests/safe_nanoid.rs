use stratus_kernel::{SAFE_ALPHABET, safe_nanoid};

#[test]
fn ids_use_the_unambiguous_alphabet() {
    let id = safe_nanoid!();
    assert_eq!(id.len(), 12);
    assert!(id.chars().all(|ch| SAFE_ALPHABET.contains(&ch)), "unexpected character in {id}");
}

#[test]
fn workspace_ids_are_long_and_distinct() {
    let first = safe_nanoid!(24);
    let second = safe_nanoid!(24);

    assert_eq!(first.len(), 24);
    assert_ne!(first, second);
}
