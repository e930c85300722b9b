use matmul_recursive::recursive::{in_place, out_of_place};
use matmul_recursive::threaded::{in_place_mt, recursive_mt, winograd_mt};
use matmul_recursive::{
    Algorithm, InPlaceSchedule, MatmulError, Matrix, Multiplier, ParallelConfig, Variant,
    elements_equal, multiply, multiply_naive, multiply_parallel, winograd,
};
use proptest::prelude::*;

fn assert_matrices_equal(expected: &Matrix, actual: &Matrix, name: &str) {
    assert_eq!(expected.size(), actual.size(), "{}: size mismatch", name);
    for i in 0..expected.size() {
        for j in 0..expected.size() {
            assert!(
                expected[(i, j)].to_bits() == actual[(i, j)].to_bits(),
                "{}: mismatch at ({}, {}): expected {}, got {}",
                name,
                i,
                j,
                expected[(i, j)],
                actual[(i, j)]
            );
        }
    }
}

fn integer_matrix(size: usize, seed: usize) -> Matrix {
    Matrix::from_fn(size, |i, j| ((i * 31 + j * 17 + seed * 7) % 23) as f64 - 11.0)
}

fn naive(first: &Matrix, second: &Matrix) -> Matrix {
    let mut result = Matrix::zeros(first.size());
    multiply_naive(&mut result, first, second).unwrap();
    result
}

fn run(variant: Variant, first: &Matrix, second: &Matrix) -> Matrix {
    let mut result = Matrix::zeros(first.size());
    variant.multiply(&mut result, first, second).unwrap();
    result
}

// ============================================================
// Concrete scenarios
// ============================================================

#[test]
fn test_2x2_every_variant() {
    let first = Matrix::from_rows([[1.0, 2.0], [3.0, 4.0]]);
    let second = Matrix::from_rows([[5.0, 6.0], [7.0, 8.0]]);
    let expected = Matrix::from_rows([[19.0, 22.0], [43.0, 50.0]]);

    for variant in Variant::all(ParallelConfig::default()) {
        assert_matrices_equal(&expected, &run(variant, &first, &second), &variant.to_string());
    }
}

#[test]
fn test_4x4_ramps_closed_form() {
    let first = Matrix::row_ramp(4);
    let second = Matrix::column_ramp(4);

    for variant in Variant::all(ParallelConfig::with_threads(2)) {
        let result = run(variant, &first, &second);
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(
                    result[(i, j)],
                    (4 * (i + 1) * (j + 1)) as f64,
                    "{} at ({}, {})",
                    variant,
                    i,
                    j
                );
            }
        }
    }
}

// ============================================================
// Correctness vs brute force
// ============================================================

#[test]
fn test_recursive_engines_match_naive() {
    for size in [2, 4, 8, 16, 32, 64, 128] {
        let first = integer_matrix(size, 1);
        let second = integer_matrix(size, 2);
        let expected = naive(&first, &second);

        let mut result = Matrix::zeros(size);
        out_of_place::multiply(&mut result, &first, &second).unwrap();
        assert_matrices_equal(&expected, &result, &format!("out_of_place_{}", size));

        let mut result = Matrix::zeros(size);
        in_place::multiply(&mut result, &first, &second).unwrap();
        assert_matrices_equal(&expected, &result, &format!("in_place_{}", size));
    }
}

#[test]
fn test_winograd_matches_naive_on_even_sizes() {
    for size in [2, 4, 10, 50, 64, 80] {
        let first = integer_matrix(size, 3);
        let second = integer_matrix(size, 4);
        let expected = naive(&first, &second);

        let mut result = Matrix::zeros(size);
        winograd::multiply(&mut result, &first, &second).unwrap();
        assert_matrices_equal(&expected, &result, &format!("winograd_{}", size));
    }
}

// ============================================================
// Serial / parallel equivalence
// ============================================================

#[test]
fn test_parallel_matches_serial_bitwise() {
    let config = ParallelConfig {
        threads: Some(4),
        task_cutoff: 8,
        in_place_schedule: InPlaceSchedule::PairedQuadrants,
    };

    for size in [2, 8, 64, 256] {
        // Non-integer inputs: equality here means identical operation order.
        let first = Matrix::from_fn(size, |i, j| ((i * size + j) as f64).sqrt() * 0.1);
        let second = Matrix::from_fn(size, |i, j| 1.0 / (1.0 + (i + 3 * j) as f64));

        for algorithm in Algorithm::ALL {
            let serial = run(Variant::serial(algorithm), &first, &second);
            let parallel = run(Variant::parallel(algorithm, config), &first, &second);
            assert_matrices_equal(&serial, &parallel, &format!("{}_{}", algorithm, size));
        }
    }
}

#[test]
fn test_parallel_engines_direct() {
    let size = 128;
    let first = integer_matrix(size, 5);
    let second = integer_matrix(size, 6);
    let expected = naive(&first, &second);
    let config = ParallelConfig::with_threads(4);

    let mut result = Matrix::zeros(size);
    recursive_mt::multiply_parallel(&mut result, &first, &second, &config).unwrap();
    assert_matrices_equal(&expected, &result, "recursive_mt");

    let mut result = Matrix::zeros(size);
    in_place_mt::multiply_parallel(&mut result, &first, &second, &config).unwrap();
    assert_matrices_equal(&expected, &result, "in_place_mt");

    let mut result = Matrix::zeros(size);
    winograd_mt::multiply_parallel(&mut result, &first, &second, &config).unwrap();
    assert_matrices_equal(&expected, &result, "winograd_mt");
}

#[test]
fn test_atomic_schedule_down_to_base_case() {
    let config = ParallelConfig {
        threads: Some(4),
        task_cutoff: 2,
        in_place_schedule: InPlaceSchedule::AtomicAccumulate,
    };

    for size in [4, 32, 64] {
        let first = integer_matrix(size, 7);
        let second = integer_matrix(size, 8);

        let mut result = Matrix::zeros(size);
        in_place_mt::multiply_parallel(&mut result, &first, &second, &config).unwrap();
        assert_matrices_equal(&naive(&first, &second), &result, &format!("atomic_{}", size));
    }
}

// ============================================================
// Cross-algorithm agreement
// ============================================================

#[test]
fn test_all_algorithms_agree() {
    for size in [2, 4, 16, 64, 256] {
        let first = Matrix::row_ramp(size);
        let second = Matrix::column_ramp(size);

        let reference = run(Variant::serial(Algorithm::RecursiveOutOfPlace), &first, &second);
        for variant in Variant::all(ParallelConfig::default()) {
            let result = run(variant, &first, &second);
            assert!(
                elements_equal(&reference, &result),
                "{} disagrees at size {}",
                variant,
                size
            );
        }
    }
}

// ============================================================
// In-place accumulation (result += first * second)
// ============================================================

#[test]
fn test_in_place_accumulates_without_rezeroing() {
    let size = 16;
    let first = integer_matrix(size, 9);
    let second = integer_matrix(size, 10);
    let once = naive(&first, &second);

    let mut result = Matrix::zeros(size);
    in_place::multiply_accumulate(&mut result, &first, &second).unwrap();
    in_place::multiply_accumulate(&mut result, &first, &second).unwrap();

    let doubled = Matrix::from_fn(size, |i, j| 2.0 * once[(i, j)]);
    assert_matrices_equal(&doubled, &result, "double_accumulate");

    let mut parallel = Matrix::zeros(size);
    let config = ParallelConfig::with_threads(2);
    in_place_mt::multiply_accumulate_parallel(&mut parallel, &first, &second, &config).unwrap();
    in_place_mt::multiply_accumulate_parallel(&mut parallel, &first, &second, &config).unwrap();
    assert_matrices_equal(&doubled, &parallel, "double_accumulate_parallel");
}

// ============================================================
// Precondition errors
// ============================================================

#[test]
fn test_invalid_sizes_rejected() {
    let cases = [
        (Algorithm::RecursiveOutOfPlace, 6),
        (Algorithm::RecursiveInPlace, 12),
        (Algorithm::RecursiveInPlace, 1),
        (Algorithm::Winograd, 7),
        (Algorithm::Winograd, 0),
    ];

    for (algorithm, size) in cases {
        let m = Matrix::zeros(size);
        for variant in [
            Variant::serial(algorithm),
            Variant::parallel(algorithm, ParallelConfig::default()),
        ] {
            let mut result = Matrix::zeros(size);
            let err = variant.multiply(&mut result, &m, &m).unwrap_err();
            assert!(
                matches!(err, MatmulError::InvalidSize { size: s, .. } if s == size),
                "{} size {}: {:?}",
                variant,
                size,
                err
            );
        }
    }
}

#[test]
fn test_shape_mismatch_rejected() {
    let mut result = Matrix::zeros(8);
    for variant in Variant::all(ParallelConfig::default()) {
        let err = variant
            .multiply(&mut result, &Matrix::zeros(8), &Matrix::zeros(4))
            .unwrap_err();
        assert_eq!(err, MatmulError::ShapeMismatch { expected: 8, got: 4 }, "{}", variant);
    }
}

// ============================================================
// Top-level dispatch
// ============================================================

#[test]
fn test_multiply_any_size() {
    for size in [1, 3, 5, 6, 16, 33, 50] {
        let first = integer_matrix(size, 11);
        let second = integer_matrix(size, 12);
        let expected = naive(&first, &second);

        let mut c_single = Matrix::zeros(size);
        let mut c_parallel = Matrix::zeros(size);
        multiply(&mut c_single, &first, &second).unwrap();
        multiply_parallel(&mut c_parallel, &first, &second, 4).unwrap();

        assert_matrices_equal(&expected, &c_single, &format!("multiply_{}", size));
        assert_matrices_equal(&expected, &c_parallel, &format!("multiply_parallel_{}", size));
    }
}

#[test]
fn test_repeated_parallel_calls_share_one_pool() {
    let pool = matmul_recursive::threaded::dedicated_pool(6).unwrap();
    let first = integer_matrix(16, 13);
    let second = integer_matrix(16, 14);
    let expected = naive(&first, &second);

    for _ in 0..100 {
        let mut c = Matrix::zeros(16);
        multiply_parallel(&mut c, &first, &second, 6).unwrap();
        assert_matrices_equal(&expected, &c, "multiply_parallel_repeated");
    }

    let again = matmul_recursive::threaded::dedicated_pool(6).unwrap();
    assert!(std::sync::Arc::ptr_eq(&pool, &again));
}

// ============================================================
// Properties
// ============================================================

fn small_int_matrix(size: usize) -> impl Strategy<Value = Matrix> {
    proptest::collection::vec(-50i32..50, size * size).prop_map(move |data| {
        Matrix::from_vec(size, data.into_iter().map(f64::from).collect()).unwrap()
    })
}

fn any_float_matrix(size: usize) -> impl Strategy<Value = Matrix> {
    proptest::collection::vec(-1.0e3f64..1.0e3, size * size)
        .prop_map(move |data| Matrix::from_vec(size, data).unwrap())
}

fn pow2_pair() -> impl Strategy<Value = (Matrix, Matrix)> {
    (1u32..6).prop_flat_map(|exp| {
        let size = 1usize << exp;
        (small_int_matrix(size), small_int_matrix(size))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Every engine equals the triple loop when the arithmetic is exact.
    #[test]
    fn prop_engines_match_naive((first, second) in pow2_pair()) {
        let expected = naive(&first, &second);
        for variant in Variant::all(ParallelConfig::with_threads(2)) {
            let result = run(variant, &first, &second);
            prop_assert!(elements_equal(&expected, &result), "{}", variant);
        }
    }

    /// Serial and parallel forms agree bit-for-bit on arbitrary floats.
    #[test]
    fn prop_serial_parallel_bitwise(
        first in any_float_matrix(32),
        second in any_float_matrix(32),
        cutoff in 2usize..16,
    ) {
        let config = ParallelConfig { task_cutoff: cutoff, ..ParallelConfig::with_threads(3) };
        for algorithm in Algorithm::ALL {
            let serial = run(Variant::serial(algorithm), &first, &second);
            let parallel = run(Variant::parallel(algorithm, config), &first, &second);
            prop_assert!(elements_equal(&serial, &parallel), "{}", algorithm);
        }
    }

    /// Quadrant copy-out then copy-in reproduces the matrix exactly.
    #[test]
    fn prop_quadrant_round_trip(m in any_float_matrix(16)) {
        let mut rebuilt = Matrix::zeros(16);
        for (quadrant, block) in matmul_recursive::matrix::Quadrant::ALL.into_iter().zip(m.quadrants()) {
            rebuilt.write_quadrant(quadrant, &block);
        }
        prop_assert!(elements_equal(&m, &rebuilt));
    }
}
