//! Unbiased ordering for tie-breaks.
//!
//! Candidate topics and candidate rooms are visited in a fresh random order
//! every time they are enumerated, so the first option in input order does
//! not soak up every participant.

use rand::Rng;
use rand::seq::SliceRandom;

/// Return a uniformly shuffled copy of `items` (Fisher-Yates).
pub fn shuffled<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut result = items.to_vec();
    result.shuffle(rng);
    result
}
