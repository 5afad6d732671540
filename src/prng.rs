//! Session-seeded deterministic value mixing.
//!
//! Seeded overrides must be stable for the lifetime of a session: a
//! detector reading the same surface twice must see the same value, but two
//! sessions should diverge. The session seed comes from `getrandom` (backed
//! by `crypto.getRandomValues` under WASM); everything derived from it is a
//! pure function of `(seed, index)`.

use std::cell::Cell;

thread_local! {
    static SESSION_SEED: Cell<Option<u32>> = const { Cell::new(None) };
}

/// Get or initialize the per-session random seed.
pub fn session_seed() -> u32 {
    SESSION_SEED.with(|s| {
        if let Some(seed) = s.get() {
            return seed;
        }
        let mut bytes = [0u8; 4];
        // A zeroed seed is still a valid seed; entropy failure here is not
        // worth surfacing to the page.
        if getrandom::getrandom(&mut bytes).is_err() {
            log::warn!("getrandom unavailable, session seed defaults to 0");
        }
        let seed = u32::from_le_bytes(bytes);
        s.set(Some(seed));
        seed
    })
}

/// Deterministic integer mixing (murmur-style finalizer).
#[inline]
pub fn mix(seed: u32, index: u32) -> u32 {
    let mut h = seed ^ index;
    h = (h ^ (h >> 16)).wrapping_mul(0x45d9_f3b);
    h = (h ^ (h >> 13)).wrapping_mul(0x45d9_f3b);
    h ^ (h >> 16)
}

/// Pick one entry of `items` deterministically.
#[inline]
pub fn pick<'a, T>(seed: u32, index: u32, items: &'a [T]) -> &'a T {
    &items[(mix(seed, index) as usize) % items.len()]
}

/// A deterministic value in `[0, 1)`.
#[inline]
pub fn unit(seed: u32, index: u32) -> f64 {
    mix(seed, index) as f64 / (u32::MAX as f64 + 1.0)
}
