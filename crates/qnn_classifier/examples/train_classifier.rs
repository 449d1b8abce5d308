//! Train a two-layer QNN classifier on a toy dataset
//!
//! Trains the same data with an expectation-output network (sign decision)
//! and with a sampling network read out through parity (arg-max decision).
//!
//! Usage:
//! ```bash
//! cargo run --example train_classifier --release
//! ```

use qnn_backend::SimulatorBackend;
use qnn_classifier::prelude::*;
use qnn_network::{Interpretation, TwoLayerQnn};
use qnn_optim::{Lbfgs, NelderMead};

/// Two clusters in the plane, labelled `+1` and `-1`
fn dataset() -> (Vec<Vec<f64>>, Vec<f64>) {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for i in 0..6 {
        let t = i as f64 * 0.05;
        x.push(vec![0.1 + t, 0.2 - t / 2.0]);
        y.push(1.0);
        x.push(vec![1.4 - t, 1.2 + t]);
        y.push(-1.0);
    }
    (x, y)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              QNN Classifier - Two-Layer Network              ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let (x, y) = dataset();
    println!("Dataset: {} samples, {} features\n", x.len(), x[0].len());

    // Expectation mode: <Z⊗Z> thresholded at zero
    let qnn = TwoLayerQnn::new(2).build()?;
    let config = ClassifierConfig::default().with_warm_start(true);
    let mut clf = NeuralNetworkClassifier::new(qnn, NelderMead::new(60), config)?;
    println!("{}", clf);

    for round in 1..=3 {
        clf.fit(&x, &y)?;
        let result = clf.fit_result().ok_or("missing fit result")?;
        println!(
            "  round {}: loss={:.4}, evaluations={}, accuracy={:.2}",
            round,
            result.fun,
            result.evaluations,
            clf.score(&x, &y)?
        );
    }

    // Sampling mode: parity of the measured bitstring, shot backend
    let classes: Vec<f64> = y.iter().map(|l| if *l > 0.0 { 0.0 } else { 1.0 }).collect();
    let sampler = TwoLayerQnn::new(2)
        .with_backend(SimulatorBackend::new(2).with_shots(2048).with_seed(7))
        .build_sampler(Some(Interpretation::parity()), Some(2))?;
    let mut clf = NeuralNetworkClassifier::new(
        sampler,
        Lbfgs::new(30),
        ClassifierConfig::new(LossKind::CrossEntropy),
    )?;
    clf.fit(&x, &classes)?;
    println!("\nSampler network: accuracy={:.2}", clf.score(&x, &classes)?);

    let snapshot = clf.snapshot()?;
    println!("Snapshot: {}", snapshot.to_json()?);

    Ok(())
}
