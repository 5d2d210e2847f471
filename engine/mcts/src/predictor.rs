//! Predictor trait for position evaluation.
//!
//! The predictor maps a canonical board (the side to move owns the `+1`
//! stones) to a prior over every action and a scalar value in `[-1, 1]`.
//! Trainable predictors also expose a single optimisation step over a batch
//! of self-play experiences.

use engine_core::Board;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during prediction or training.
#[derive(Debug, Error, PartialEq)]
pub enum PredictorError {
    #[error("Input has {actual} features, predictor expects {expected}")]
    InputSize { expected: usize, actual: usize },

    #[error("Target policy has {actual} entries, predictor expects {expected}")]
    TargetSize { expected: usize, actual: usize },

    #[error("Training batch is empty")]
    EmptyBatch,

    #[error("Capability not implemented: {capability}")]
    Unimplemented { capability: &'static str },
}

/// Result of evaluating a canonical board.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Prior over the full action space, indexed by action.
    pub policy: Vec<f32>,

    /// Value estimate for the side to move.
    /// Range: -1.0 (certain loss) to +1.0 (certain win).
    pub value: f32,
}

/// One training example produced by self-play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    /// Board from the mover's perspective.
    pub board: Board,

    /// Search distribution over the full action space.
    pub policy: Vec<f32>,

    /// Final game outcome from the mover's perspective.
    pub value: f32,
}

/// Average losses over the samples seen by one or more training steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LossReport {
    /// Policy divergence `sum p * (ln(p + eps) - ln(q + eps))` per sample.
    pub policy_loss: f32,

    /// Squared value error per sample.
    pub value_loss: f32,

    /// Number of samples the averages cover.
    pub samples: usize,
}

impl LossReport {
    pub fn total(&self) -> f32 {
        self.policy_loss + self.value_loss
    }

    /// Fold another report in, weighting each side by its sample count.
    pub fn merge(&mut self, other: &LossReport) {
        let total = self.samples + other.samples;
        if total == 0 {
            return;
        }
        let (a, b) = (self.samples as f32, other.samples as f32);
        self.policy_loss = (self.policy_loss * a + other.policy_loss * b) / total as f32;
        self.value_loss = (self.value_loss * a + other.value_loss * b) / total as f32;
        self.samples = total;
    }
}

/// Trait for position predictors.
///
/// Implementations could be:
/// - UniformPredictor: uniform policy and neutral value (reference stand-in)
/// - LinearPredictor: one-layer softmax/tanh model trained with Adam
///
/// Prediction takes `&self` so one predictor can be shared by many
/// concurrent self-play episodes.
pub trait Predictor: Send + Sync {
    /// Evaluate a canonical board.
    fn predict(&self, board: &Board) -> Result<Prediction, PredictorError>;

    /// Apply one optimisation step that lowers the combined policy and value
    /// loss on `batch`, returning the losses measured before the update.
    fn train_step(&mut self, _batch: &[Experience]) -> Result<LossReport, PredictorError> {
        Err(PredictorError::Unimplemented {
            capability: "train_step",
        })
    }
}

/// Uniform predictor over the full action space with a neutral value.
///
/// Illegal actions get prior mass too; the search only ever selects among
/// legal actions, so the prior is never consulted for them.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformPredictor {
    action_size: usize,
}

impl UniformPredictor {
    pub fn new(action_size: usize) -> Self {
        Self { action_size }
    }
}

impl Predictor for UniformPredictor {
    fn predict(&self, _board: &Board) -> Result<Prediction, PredictorError> {
        let prob = if self.action_size == 0 {
            0.0
        } else {
            1.0 / self.action_size as f32
        };
        Ok(Prediction {
            policy: vec![prob; self.action_size],
            value: 0.0,
        })
    }

    /// Nothing to learn: report the losses and leave the predictor unchanged.
    fn train_step(&mut self, batch: &[Experience]) -> Result<LossReport, PredictorError> {
        if batch.is_empty() {
            return Err(PredictorError::EmptyBatch);
        }
        let mut policy_loss = 0.0;
        let mut value_loss = 0.0;
        for sample in batch {
            let prediction = self.predict(&sample.board)?;
            policy_loss += policy_divergence(&sample.policy, &prediction.policy)?;
            value_loss += (sample.value - prediction.value).powi(2);
        }
        let n = batch.len() as f32;
        Ok(LossReport {
            policy_loss: policy_loss / n,
            value_loss: value_loss / n,
            samples: batch.len(),
        })
    }
}

/// Additive stabiliser inside the policy loss logarithms.
pub const POLICY_LOSS_EPS: f32 = 1e-5;

/// `sum_a target[a] * (ln(target[a] + eps) - ln(predicted[a] + eps))`
pub fn policy_divergence(target: &[f32], predicted: &[f32]) -> Result<f32, PredictorError> {
    if target.len() != predicted.len() {
        return Err(PredictorError::TargetSize {
            expected: predicted.len(),
            actual: target.len(),
        });
    }
    Ok(target
        .iter()
        .zip(predicted)
        .map(|(&p, &q)| p * ((p + POLICY_LOSS_EPS).ln() - (q + POLICY_LOSS_EPS).ln()))
        .sum())
}
