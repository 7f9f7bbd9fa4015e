//! Token pool rotation
//!
//! Spreads API requests across a pool of personal access tokens so that no
//! single token absorbs the full rate-limit cost of a collection run.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Deterministic round-robin rotator over a fixed, non-empty token pool.
///
/// The first call to [`next`](TokenRotator::next) returns the first pool
/// entry; after `pool_size` calls the sequence repeats identically. The
/// cursor is atomic so the rotator can be shared behind `&self`, but the
/// engine itself issues one request at a time.
///
/// # Examples
///
/// ```
/// use repo_harvester::token::TokenRotator;
///
/// let rotator = TokenRotator::new(vec!["a".into(), "b".into()]).unwrap();
/// assert_eq!(rotator.next(), "a");
/// assert_eq!(rotator.next(), "b");
/// assert_eq!(rotator.next(), "a");
/// ```
#[derive(Debug)]
pub struct TokenRotator {
    tokens: Vec<String>,
    cursor: AtomicUsize,
}

impl TokenRotator {
    /// Create a rotator over the given pool.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::EmptyPool`] if the pool is empty. An empty pool
    /// is a configuration error and is rejected at construction rather than
    /// discovered mid-run.
    pub fn new(tokens: Vec<String>) -> Result<Self, TokenError> {
        if tokens.is_empty() {
            return Err(TokenError::EmptyPool);
        }
        Ok(Self {
            tokens,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Hand out the next token, advancing the rotation by exactly one.
    pub fn next(&self) -> &str {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.tokens.len();
        &self.tokens[index]
    }

    /// Number of tokens in the pool
    pub fn pool_size(&self) -> usize {
        self.tokens.len()
    }
}

/// Token pool errors
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The token pool was empty at construction
    #[error("token pool is empty: provide at least one personal access token")]
    EmptyPool,
}
