//! Channel learning, template fitting and scoring on synthetic patches.

use nalgebra::DMatrix;
use observer_eval::analysis::{compare_paired, PairedSamples};
use observer_eval::{
    auc, fit_template, learn_channels, ChannelBasis, ChannelOptions, ChannelizedObserver,
    PairedConfig, TestMethod,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;

/// White Gaussian noise patches with an optional disc-shaped signal.
fn patches(n: usize, side: usize, amplitude: f64, rng: &mut StdRng) -> DMatrix<f64> {
    let normal = Normal::new(0.0, 1.0).unwrap();
    let center = (side as f64 - 1.0) / 2.0;
    DMatrix::from_fn(n, side * side, |_, p| {
        let (y, x) = ((p / side) as f64, (p % side) as f64);
        let r2 = (x - center).powi(2) + (y - center).powi(2);
        let signal = if r2 <= 4.0 { amplitude } else { 0.0 };
        rng.sample(normal) + signal
    })
}

fn stack(a: &DMatrix<f64>, b: &DMatrix<f64>) -> DMatrix<f64> {
    let mut out = DMatrix::zeros(a.nrows() + b.nrows(), a.ncols());
    out.rows_mut(0, a.nrows()).copy_from(a);
    out.rows_mut(a.nrows(), b.nrows()).copy_from(b);
    out
}

#[test]
fn learned_basis_is_orthonormal() {
    let mut rng = StdRng::seed_from_u64(1);
    let pool = patches(50, 9, 0.0, &mut rng);
    let basis = learn_channels(&pool, 4, ChannelOptions::default(), 0).unwrap();

    assert_eq!(basis.matrix().shape(), (81, 4));
    let gram = basis.matrix().transpose() * basis.matrix();
    assert!((gram - DMatrix::identity(4, 4)).norm() < 1e-8);
}

#[test]
fn oversized_request_truncates_to_rank() {
    let mut rng = StdRng::seed_from_u64(2);
    let pool = patches(5, 4, 0.0, &mut rng);
    let basis = learn_channels(&pool, 40, ChannelOptions::default(), 0).unwrap();
    assert_eq!(basis.channels(), 5);
    assert_eq!(basis.requested(), 40);
}

#[test]
fn observer_detects_disc_signal() {
    let mut rng = StdRng::seed_from_u64(3);
    let absent = patches(60, 9, 0.0, &mut rng);
    let present = patches(60, 9, 1.0, &mut rng);
    let basis = learn_channels(&stack(&absent, &present), 6, ChannelOptions::default(), 0).unwrap();

    let (_, dv0, dv1) =
        ChannelizedObserver::fit_and_score(&absent, &present, &basis, 1e-3).unwrap();
    let values: Vec<f64> = dv0.iter().chain(dv1.iter()).copied().collect();
    let labels: Vec<u8> = (0..120).map(|i| u8::from(i >= 60)).collect();
    assert!(auc(&values, &labels).unwrap() > 0.9);
}

#[test]
fn unregularized_singular_fit_stays_finite() {
    // Fewer samples than channels: the pooled covariance is rank deficient.
    let mut rng = StdRng::seed_from_u64(4);
    let absent = patches(3, 3, 0.0, &mut rng);
    let present = patches(3, 3, 2.0, &mut rng);
    let basis = ChannelBasis::identity(9);

    let z0 = basis.project(&absent).unwrap();
    let z1 = basis.project(&present).unwrap();
    let template = fit_template(&z0, &z1, 0.0).unwrap();
    assert!(template.pseudo_inverse);
    assert!(template.weights.iter().all(|w| w.is_finite()));
    assert!(template.score(&z1).unwrap().iter().all(|v| v.is_finite()));
}

#[test]
fn identical_conditions_show_no_improvement() {
    let mut rng = StdRng::seed_from_u64(5);
    let absent = patches(25, 5, 0.0, &mut rng);
    let present = patches(25, 5, 0.8, &mut rng);
    let basis = ChannelBasis::identity(25);
    let observer = ChannelizedObserver::fit(&absent, &present, &basis, 1e-3).unwrap();

    let values: Vec<f64> = observer
        .decision_values(&absent)
        .unwrap()
        .iter()
        .chain(observer.decision_values(&present).unwrap().iter())
        .copied()
        .collect();
    let labels: Vec<bool> = (0..50).map(|i| i >= 25).collect();

    let side = PairedSamples::Scored {
        values: &values,
        labels: &labels,
    };
    let config = PairedConfig {
        n_bootstrap: 300,
        ..PairedConfig::default()
    };
    let cmp = compare_paired(&side, &side, &config).unwrap();
    assert_eq!(cmp.delta_auc, 0.0);
    assert_eq!(cmp.p_value, 0.5);
    assert_eq!(cmp.method, TestMethod::MatchedBootstrap);

    let trials = [0.71, 0.74, 0.69, 0.73, 0.70, 0.72];
    let cmp = compare_paired(
        &PairedSamples::Trials(&trials),
        &PairedSamples::Trials(&trials),
        &config,
    )
    .unwrap();
    assert_eq!(cmp.delta_auc, 0.0);
    assert_eq!(cmp.p_value, 0.5);
}
