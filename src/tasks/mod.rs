use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::MapError;

/// Every value [`random_square`] can return.
pub const SQUARES_BELOW_TEN: [u64; 10] = [0, 1, 4, 9, 16, 25, 36, 49, 64, 81];

/// Square of one uniform draw from `[0, 10)` using a generator seeded with `seed`.
///
/// The generator lives only for this call, so the result depends on `seed`
/// alone.
pub fn random_square(seed: u64) -> u64 {
    let mut rng = StdRng::seed_from_u64(seed);
    let n: u64 = rng.random_range(0..10);
    let square = n * n;
    debug_assert!(SQUARES_BELOW_TEN.contains(&square));
    square
}

/// `(x + y)^3`, or [`MapError::Overflow`] if it leaves the `i64` range.
pub fn plus_cube(x: i64, y: i64) -> Result<i64, MapError> {
    x.checked_add(y)
        .and_then(|sum| sum.checked_pow(3))
        .ok_or(MapError::Overflow { x, y })
}
