//! Metric curve generation.
//!
//! The dashboard simulates training rather than running it, so the shape of
//! the loss and accuracy curves is a behavioral contract: exponential loss
//! decay toward a per-architecture floor, saturating accuracy growth toward a
//! per-architecture cap, plus bounded uniform noise. Every function takes the
//! RNG by argument so tests can seed it.

use rand::Rng;
use reef_core::ModelType;

/// Per-architecture curve constants.
#[derive(Clone, Copy, Debug)]
pub struct CurveParams {
    /// Starting amplitude of the loss decay.
    pub loss_amplitude: f64,
    /// Asymptotic loss floor.
    pub loss_floor: f64,
    /// Hard accuracy ceiling.
    pub accuracy_cap: f64,
    /// Accuracy at zero progress.
    pub accuracy_base: f64,
    /// Total accuracy gained over a full run.
    pub accuracy_growth: f64,
}

const CNN: CurveParams = CurveParams {
    loss_amplitude: 2.5,
    loss_floor: 0.1,
    accuracy_cap: 0.95,
    accuracy_base: 0.30,
    accuracy_growth: 0.65,
};

const LSTM: CurveParams = CurveParams {
    loss_amplitude: 3.0,
    loss_floor: 0.15,
    accuracy_cap: 0.92,
    accuracy_base: 0.25,
    accuracy_growth: 0.67,
};

const TRANSFORMER: CurveParams = CurveParams {
    loss_amplitude: 2.8,
    loss_floor: 0.12,
    accuracy_cap: 0.88,
    accuracy_base: 0.20,
    accuracy_growth: 0.68,
};

impl CurveParams {
    /// Curve constants for a model type.
    #[must_use]
    pub const fn for_model(model_type: ModelType) -> &'static Self {
        match model_type {
            ModelType::Cnn => &CNN,
            ModelType::Lstm => &LSTM,
            ModelType::Transformer => &TRANSFORMER,
        }
    }
}

/// Simulated training loss at `progress` ∈ [0, 1].
pub fn loss(progress: f64, model_type: ModelType, rng: &mut impl Rng) -> f64 {
    let p = CurveParams::for_model(model_type);
    p.loss_amplitude * (-3.0 * progress).exp() + p.loss_floor + rng.random_range(-0.05..=0.05)
}

/// Simulated training accuracy at `progress` ∈ [0, 1], capped per type.
pub fn accuracy(progress: f64, model_type: ModelType, rng: &mut impl Rng) -> f64 {
    let p = CurveParams::for_model(model_type);
    let raw = p.accuracy_base
        + p.accuracy_growth * (1.0 - (-2.5 * progress).exp())
        + rng.random_range(-0.01..=0.01);
    raw.min(p.accuracy_cap)
}

/// Final summary metrics derived from the last observed accuracy.
#[derive(Clone, Copy, Debug)]
pub struct FinalMetrics {
    /// Final accuracy (carried through unchanged).
    pub accuracy: f64,
    /// Precision, slightly below accuracy.
    pub precision: f64,
    /// Recall, slightly below accuracy.
    pub recall: f64,
    /// Harmonic mean of precision and recall.
    pub f1_score: f64,
}

/// Derive the persisted summary metrics from a run's final accuracy.
pub fn finalize(accuracy: f64, rng: &mut impl Rng) -> FinalMetrics {
    let precision = accuracy * rng.random_range(0.95..=1.0);
    let recall = accuracy * rng.random_range(0.93..=1.0);
    let f1_score = 2.0 * precision * recall / (precision + recall);
    FinalMetrics {
        accuracy,
        precision,
        recall,
        f1_score,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn cnn_accuracy_never_exceeds_cap() {
        let mut rng = seeded();
        for step in 0..=100 {
            let progress = f64::from(step) / 100.0;
            let acc = accuracy(progress, ModelType::Cnn, &mut rng);
            assert!(acc <= 0.95, "accuracy {acc} above cap at progress {progress}");
        }
    }

    #[test]
    fn cnn_loss_respects_floor_minus_noise() {
        let mut rng = seeded();
        for step in 0..=100 {
            let progress = f64::from(step) / 100.0;
            let l = loss(progress, ModelType::Cnn, &mut rng);
            assert!(l >= 0.1 - 0.05, "loss {l} below floor at progress {progress}");
        }
    }

    #[test]
    fn loss_decays_with_progress() {
        let mut rng = seeded();
        let early = loss(0.0, ModelType::Lstm, &mut rng);
        let late = loss(1.0, ModelType::Lstm, &mut rng);
        assert!(early > late);
    }

    #[test]
    fn accuracy_grows_with_progress() {
        let mut rng = seeded();
        let early = accuracy(0.0, ModelType::Transformer, &mut rng);
        let late = accuracy(1.0, ModelType::Transformer, &mut rng);
        assert!(late > early);
    }

    #[test]
    fn per_type_constants() {
        assert_eq!(CurveParams::for_model(ModelType::Cnn).loss_amplitude, 2.5);
        assert_eq!(CurveParams::for_model(ModelType::Lstm).loss_floor, 0.15);
        assert_eq!(
            CurveParams::for_model(ModelType::Transformer).accuracy_cap,
            0.88
        );
    }

    #[test]
    fn seeded_curves_are_deterministic() {
        let a = loss(0.5, ModelType::Cnn, &mut seeded());
        let b = loss(0.5, ModelType::Cnn, &mut seeded());
        assert_eq!(a, b);
    }

    #[test]
    fn finalize_metrics_are_bounded() {
        let mut rng = seeded();
        let metrics = finalize(0.9, &mut rng);
        assert!(metrics.precision <= metrics.accuracy);
        assert!(metrics.recall <= metrics.accuracy);
        assert!(metrics.f1_score > 0.0 && metrics.f1_score <= metrics.accuracy);
    }

    #[test]
    fn f1_is_harmonic_mean() {
        let mut rng = seeded();
        let m = finalize(0.8, &mut rng);
        let expected = 2.0 * m.precision * m.recall / (m.precision + m.recall);
        assert!((m.f1_score - expected).abs() < 1e-12);
    }
}
