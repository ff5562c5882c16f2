//! The responder cache hands out a lower-cost puzzle once it marks itself
//! loaded, entries expire on their own schedule regardless of solution
//! correctness, and a flood of outstanding challenges is bounded by
//! periodic sweeping rather than growing forever.

use std::time::{Duration, Instant};

use hip_puzzle::{solve, PuzzleCache, PuzzleVerifyError, DEFAULT_DIFFICULTY, LOADED_DIFFICULTY};
use hip_types::Hit;

#[test]
fn switching_to_loaded_raises_difficulty_and_invalidates_a_solution_sized_for_the_idle_cost() {
    let responder = Hit::from_bytes([7; 16]);
    let initiator = Hit::from_bytes([8; 16]);
    let mut cache = PuzzleCache::new(responder);
    let now = Instant::now();

    let (i, k_idle) = cache.generate(now);
    assert_eq!(k_idle, DEFAULT_DIFFICULTY);
    let loose_solution = solve(i, &initiator, &responder, k_idle);
    assert!(cache.verify(initiator, i, loose_solution, now).is_ok());

    cache.set_loaded(true);
    let (i2, k_loaded) = cache.generate(now);
    assert_eq!(k_loaded, LOADED_DIFFICULTY);
    assert!(k_loaded > k_idle, "loaded difficulty must be strictly harder than the idle one");
    match cache.verify(initiator, i2, loose_solution, now) {
        Err(PuzzleVerifyError::WrongSolution) => {}
        Ok(()) => panic!("a solution sized for the looser difficulty should not satisfy the harder one"),
        Err(other) => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn expired_challenge_is_rejected_even_with_a_correct_solution() {
    let responder = Hit::from_bytes([9; 16]);
    let initiator = Hit::from_bytes([10; 16]);
    let mut cache = PuzzleCache::new(responder);

    let issued_at = Instant::now();
    let (i, k) = cache.generate(issued_at);
    let j = solve(i, &initiator, &responder, k);

    let long_after = issued_at + Duration::from_secs(3600);
    let err = cache.verify(initiator, i, j, long_after).unwrap_err();
    assert_eq!(err, PuzzleVerifyError::UnknownOrExpired);
}

#[test]
fn a_flood_of_i1s_never_grows_the_pool_past_its_bound() {
    let responder = Hit::from_bytes([11; 16]);
    let mut cache = PuzzleCache::new(responder);
    let t0 = Instant::now();

    for _ in 0..500u32 {
        cache.generate(t0);
    }
    assert_eq!(cache.len(), 16, "a flood of I1s rotates the pool instead of growing it");
}

#[test]
fn sweep_evicts_expired_entries_without_touching_live_ones() {
    let responder = Hit::from_bytes([12; 16]);
    let mut cache = PuzzleCache::new(responder);
    let t0 = Instant::now();

    for _ in 0..5u32 {
        cache.generate(t0);
    }
    assert_eq!(cache.len(), 5, "one outstanding entry per I1, until the lifetime expires or it's swept");

    let past_lifetime = t0 + Duration::from_secs(3600);
    cache.generate(past_lifetime);
    cache.sweep(past_lifetime);
    assert_eq!(cache.len(), 1, "only the entry generated at the sweep horizon itself is still live");
}
