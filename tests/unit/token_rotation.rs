//! Unit tests for token pool rotation

use repo_harvester::token::TokenRotator;

#[test]
fn double_cycle_repeats_pool_in_original_order() {
    let pool: Vec<String> = ["alpha", "beta", "gamma", "delta"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let rotator = TokenRotator::new(pool.clone()).unwrap();

    let seen: Vec<String> = (0..pool.len() * 2)
        .map(|_| rotator.next().to_string())
        .collect();

    let mut expected = pool.clone();
    expected.extend(pool);
    assert_eq!(seen, expected);
}

#[test]
fn first_call_returns_first_entry() {
    let rotator = TokenRotator::new(vec!["first".to_string(), "second".to_string()]).unwrap();
    assert_eq!(rotator.next(), "first");
}

#[test]
fn empty_pool_fails_fast() {
    assert!(TokenRotator::new(Vec::new()).is_err());
}
