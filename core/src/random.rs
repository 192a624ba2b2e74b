//! Sampling helpers shared by the generation systems.
//!
//! Every helper takes the random source explicitly so callers can inject a
//! seeded generator in tests.

use rand::Rng;

/// Returns `true` with the provided probability.
///
/// Probabilities at or below zero never succeed and probabilities at or above
/// one always succeed.
pub fn chance<R: Rng + ?Sized>(rng: &mut R, probability: f32) -> bool {
    rng.gen::<f32>() < probability
}

/// Samples a float in `[min, max)`, collapsing to `min` when the range is empty.
pub fn uniform_f32<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max <= min {
        return min;
    }
    rng.gen_range(min..max)
}

/// Samples an integer in `[min, max]`, collapsing to `min` when `max < min`.
pub fn uniform_inclusive<R: Rng + ?Sized>(rng: &mut R, min: u32, max: u32) -> u32 {
    if max <= min {
        return min;
    }
    rng.gen_range(min..=max)
}

/// Samples an index into a collection of `len` elements.
///
/// `len` must be non-zero.
pub fn index<R: Rng + ?Sized>(rng: &mut R, len: usize) -> usize {
    debug_assert!(len > 0, "cannot pick from an empty collection");
    rng.gen_range(0..len)
}
