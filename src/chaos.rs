// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Charge Arena Simulation Suite - Chaos Source
//
// The chaos factor scales every reward of a round. It is taken from the
// dominant eigenvalue of a random 2x2 integer matrix.

use rand::Rng;

const ENTRY_MIN: i32 = 1;
const ENTRY_MAX: i32 = 10;
const EIGEN_DIVISOR: f64 = 5.0;

pub const CHAOS_MIN: f64 = 0.5;
pub const CHAOS_MAX: f64 = 2.0;
/// Returned when the sampled matrix has no real eigenvalue.
pub const CHAOS_NEUTRAL: f64 = 1.0;

/// Draw a fresh matrix and return its chaos factor, always in `[0.5, 2.0]`.
pub fn sample_chaos_factor<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let matrix = [
        [rng.gen_range(ENTRY_MIN..=ENTRY_MAX), rng.gen_range(ENTRY_MIN..=ENTRY_MAX)],
        [rng.gen_range(ENTRY_MIN..=ENTRY_MAX), rng.gen_range(ENTRY_MIN..=ENTRY_MAX)],
    ];
    chaos_factor_from_matrix(matrix)
}

/// Chaos factor of `[[a, b], [c, d]]`.
///
/// A negative discriminant yields exactly [`CHAOS_NEUTRAL`]; otherwise the
/// larger eigenvalue divided by 5, clamped to `[CHAOS_MIN, CHAOS_MAX]`.
pub fn chaos_factor_from_matrix(matrix: [[i32; 2]; 2]) -> f64 {
    let [[a, b], [c, d]] = matrix;
    let trace = (a + d) as f64;
    let det = (a * d - b * c) as f64;
    let discriminant = trace * trace - 4.0 * det;
    if discriminant < 0.0 {
        return CHAOS_NEUTRAL;
    }
    let eig1 = (trace + discriminant.sqrt()) / 2.0;
    (eig1 / EIGEN_DIVISOR).clamp(CHAOS_MIN, CHAOS_MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_symmetric_matrices_bounded() {
        for a in ENTRY_MIN..=ENTRY_MAX {
            for b in ENTRY_MIN..=ENTRY_MAX {
                let f = chaos_factor_from_matrix([[a, b], [b, a]]);
                assert!((CHAOS_MIN..=CHAOS_MAX).contains(&f));
            }
        }
    }

    #[test]
    fn test_negative_discriminant_returns_exactly_one() {
        // disc = (a - d)^2 + 4bc < 0 needs bc < 0
        assert_eq!(chaos_factor_from_matrix([[1, 2], [-3, 1]]), CHAOS_NEUTRAL);
        assert_eq!(chaos_factor_from_matrix([[0, 1], [-1, 0]]), CHAOS_NEUTRAL);
    }

    #[test]
    fn test_known_matrices() {
        // [[1,1],[1,1]]: eigenvalues 0 and 2 -> 2/5 = 0.4 -> clamped to 0.5
        assert_eq!(chaos_factor_from_matrix([[1, 1], [1, 1]]), CHAOS_MIN);
        // [[5,0],[0,5]] would need 0 entries; [[5,1],[1,5]]: eigenvalues 4 and 6 -> 1.2
        assert!((chaos_factor_from_matrix([[5, 1], [1, 5]]) - 1.2).abs() < 1e-12);
        // [[10,10],[10,10]]: eigenvalue 20 -> 4.0 -> clamped to 2.0
        assert_eq!(chaos_factor_from_matrix([[10, 10], [10, 10]]), CHAOS_MAX);
    }

    #[test]
    fn test_exhaustive_entry_range_stays_bounded() {
        for a in ENTRY_MIN..=ENTRY_MAX {
            for b in ENTRY_MIN..=ENTRY_MAX {
                for c in ENTRY_MIN..=ENTRY_MAX {
                    for d in ENTRY_MIN..=ENTRY_MAX {
                        let f = chaos_factor_from_matrix([[a, b], [c, d]]);
                        assert!(
                            (CHAOS_MIN..=CHAOS_MAX).contains(&f),
                            "[[{a},{b}],[{c},{d}]] -> {f}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_sampled_factor_bounded() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..1_000 {
            let f = sample_chaos_factor(&mut rng);
            assert!((CHAOS_MIN..=CHAOS_MAX).contains(&f));
        }
    }
}
