//! Behavioural properties of the regularizer on structured and random batches.

use ndarray::{Array4, ArrayD};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use vcreg_core::statistics::covariance_matrix;
use vcreg_core::{RegularizerError, VCReg, VCRegConfig};
use vcreg_tensor::FeatureBatch;

fn normal_batch(seed: u64, shape: [usize; 4]) -> FeatureBatch {
    let mut rng = StdRng::seed_from_u64(seed);
    let numel: usize = shape.iter().product();
    let data: Vec<f32> = (0..numel).map(|_| StandardNormal.sample(&mut rng)).collect();
    FeatureBatch::from_shape_vec(&shape, data).unwrap()
}

fn covariance_only() -> VCReg {
    VCReg::new(VCRegConfig::default().with_variance_term(false)).unwrap()
}

#[test]
fn disabled_terms_give_exact_zero() {
    let reg = VCReg::new(
        VCRegConfig::default()
            .with_variance_term(false)
            .with_covariance_term(false)
            .with_variance_weight(-3.0),
    )
    .unwrap();
    for seed in 0..5 {
        let batch = normal_batch(seed, [3, 4, 2, 2]);
        assert_eq!(reg.compute(&batch).unwrap(), 0.0);
    }
}

#[test]
fn collapsed_batch_hits_full_variance_penalty() {
    let reg = VCReg::new(VCRegConfig::default().with_covariance_term(false)).unwrap();
    let batch = FeatureBatch::from_array4(Array4::from_elem((6, 5, 3, 3), 1.25)).unwrap();

    let loss = reg.compute(&batch).unwrap();
    // std collapses to sqrt(epsilon) = 0.01, so each hinge is 0.99.
    assert!((loss - 25.0 * 0.99).abs() < 1e-9);
    assert!((loss - 25.0).abs() < 0.26);
}

#[test]
fn orthogonal_unit_variance_channels_give_zero_loss() {
    // Walsh functions: zero mean, unit variance, pairwise orthogonal.
    let walsh: [[f32; 8]; 3] = [
        [1.0, 1.0, 1.0, 1.0, -1.0, -1.0, -1.0, -1.0],
        [1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0, -1.0],
        [1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0],
    ];
    let array = Array4::from_shape_fn((8, 3, 1, 1), |(b, c, _, _)| walsh[c][b]);
    let batch = FeatureBatch::from_array4(array).unwrap();

    let reg = VCReg::new(VCRegConfig::default()).unwrap();
    let terms = reg.compute_terms(&batch).unwrap();
    assert_eq!(terms.variance, 0.0);
    assert_eq!(terms.covariance, 0.0);
    assert_eq!(terms.total, 0.0);
}

#[test]
fn covariance_term_shrinks_with_batch_size_for_independent_channels() {
    let reg = covariance_only();
    let small = reg.compute(&normal_batch(42, [16, 4, 1, 1])).unwrap();
    let large = reg.compute(&normal_batch(42, [4096, 4, 1, 1])).unwrap();
    assert!(large < small, "large-batch {large} should be below small-batch {small}");
    assert!(large < 0.05, "large-batch covariance term {large} should be near zero");
}

#[test]
fn covariance_matrix_is_symmetric() {
    for seed in 0..4 {
        let batch = normal_batch(seed, [5, 6, 3, 2]);
        let cov = covariance_matrix(&batch.flattened()).unwrap();
        assert_eq!(cov.dim(), (6, 6));
        for i in 0..6 {
            for j in 0..6 {
                assert!((cov[[i, j]] - cov[[j, i]]).abs() < 1e-12);
            }
        }
    }
}

#[test]
fn loss_is_invariant_to_channel_permutation() {
    let reg = VCReg::new(VCRegConfig::default()).unwrap();
    let batch = normal_batch(9, [6, 5, 2, 2]);
    let permuted = batch.select_channels(&[3, 0, 4, 2, 1]).unwrap();

    let a = reg.compute(&batch).unwrap();
    let b = reg.compute(&permuted).unwrap();
    assert!((a - b).abs() <= 1e-12 * a.abs().max(1.0), "{a} != {b}");
}

#[test]
fn repeated_calls_are_identical() {
    let reg = VCReg::new(VCRegConfig::default()).unwrap();
    let batch = normal_batch(3, [4, 8, 2, 2]);
    let first = reg.compute_terms(&batch).unwrap();
    let second = reg.compute_terms(&batch).unwrap();
    assert_eq!(first, second);
}

#[test]
fn batch_of_two_is_accepted_with_covariance() {
    let reg = VCReg::new(VCRegConfig::default()).unwrap();
    let loss = reg.compute(&normal_batch(1, [2, 3, 2, 2])).unwrap();
    assert!(loss.is_finite());
}

#[test]
fn batch_of_one_is_rejected_with_covariance() {
    let reg = VCReg::new(VCRegConfig::default()).unwrap();
    let err = reg.compute(&normal_batch(1, [1, 3, 2, 2])).unwrap_err();
    assert!(matches!(err, RegularizerError::InvalidConfiguration { .. }));
}

#[test]
fn dynamic_array_matches_feature_batch() {
    let reg = VCReg::new(VCRegConfig::default()).unwrap();
    let batch = normal_batch(11, [4, 3, 2, 2]);
    let data: Vec<f32> = batch.flattened().iter().copied().collect();
    let array = ArrayD::from_shape_vec(vec![4, 3, 2, 2], data).unwrap();

    assert_eq!(reg.compute_array(&array).unwrap(), reg.compute(&batch).unwrap());
}

#[test]
fn non_rank4_array_is_shape_error() {
    let reg = VCReg::new(VCRegConfig::default()).unwrap();
    for shape in [vec![4, 3], vec![4, 3, 4], vec![1, 4, 3, 2, 2]] {
        let array = ArrayD::<f32>::zeros(shape);
        assert!(matches!(
            reg.compute_array(&array),
            Err(RegularizerError::Shape { .. })
        ));
    }
}
