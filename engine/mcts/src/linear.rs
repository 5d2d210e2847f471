//! One-layer trainable predictor.
//!
//! Two linear heads over the raw canonical board cells: a softmax policy
//! head and a tanh value head. Gradients are computed in closed form and
//! applied with Adam.

use engine_core::{Board, GameMetadata};
use ndarray::{aview1, Array, Array1, Array2, Axis, Dimension};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::predictor::{Experience, LossReport, Prediction, Predictor, PredictorError, POLICY_LOSS_EPS};

/// Parameters of both heads. Gradients and Adam moments share the layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Weights {
    /// Policy weights, one row per action (A x F)
    policy_w: Array2<f32>,
    policy_b: Array1<f32>,
    value_w: Array1<f32>,
    /// Single value bias, kept as an array so Adam treats it like the rest
    value_b: Array1<f32>,
}

impl Weights {
    fn zeros(action_size: usize, feature_size: usize) -> Self {
        Self {
            policy_w: Array2::zeros((action_size, feature_size)),
            policy_b: Array1::zeros(action_size),
            value_w: Array1::zeros(feature_size),
            value_b: Array1::zeros(1),
        }
    }

    fn random<R: Rng>(action_size: usize, feature_size: usize, bound: f32, rng: &mut R) -> Self {
        let mut draw = || rng.gen_range(-bound..=bound);
        Self {
            policy_w: Array2::from_shape_fn((action_size, feature_size), |_| draw()),
            policy_b: Array1::from_shape_fn(action_size, |_| draw()),
            value_w: Array1::from_shape_fn(feature_size, |_| draw()),
            value_b: Array1::from_shape_fn(1, |_| draw()),
        }
    }
}

/// Adam optimiser with moment buffers shaped like the parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Adam {
    lr: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    t: u64,
    m: Weights, // First moment
    v: Weights, // Second moment
}

impl Adam {
    fn new(lr: f32, action_size: usize, feature_size: usize) -> Self {
        Self {
            lr,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            t: 0,
            m: Weights::zeros(action_size, feature_size),
            v: Weights::zeros(action_size, feature_size),
        }
    }

    fn step(&mut self, params: &mut Weights, grads: &Weights) {
        self.t += 1;

        // Bias correction folded into the step size
        let update = AdamUpdate {
            beta1: self.beta1,
            beta2: self.beta2,
            epsilon: self.epsilon,
            lr_t: self.lr * (1.0 - self.beta2.powi(self.t as i32)).sqrt()
                / (1.0 - self.beta1.powi(self.t as i32)),
        };

        update.apply(&mut params.policy_w, &grads.policy_w, &mut self.m.policy_w, &mut self.v.policy_w);
        update.apply(&mut params.policy_b, &grads.policy_b, &mut self.m.policy_b, &mut self.v.policy_b);
        update.apply(&mut params.value_w, &grads.value_w, &mut self.m.value_w, &mut self.v.value_w);
        update.apply(&mut params.value_b, &grads.value_b, &mut self.m.value_b, &mut self.v.value_b);
    }
}

/// Coefficients of one Adam step.
#[derive(Debug, Clone, Copy)]
struct AdamUpdate {
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    lr_t: f32,
}

impl AdamUpdate {
    fn apply<D: Dimension>(
        &self,
        param: &mut Array<f32, D>,
        grad: &Array<f32, D>,
        m: &mut Array<f32, D>,
        v: &mut Array<f32, D>,
    ) {
        // m_t = β1 * m_{t-1} + (1 - β1) * g
        let m_t = &*m * self.beta1 + &(grad * (1.0 - self.beta1));

        // v_t = β2 * v_{t-1} + (1 - β2) * g²
        let grad_sq = grad * grad;
        let v_t = &*v * self.beta2 + &(&grad_sq * (1.0 - self.beta2));

        // θ_t = θ_{t-1} - lr_t * m_t / (√v_t + ε)
        let adaptive_update = &m_t / &(v_t.mapv(f32::sqrt) + self.epsilon) * self.lr_t;
        *param -= &adaptive_update;

        *m = m_t;
        *v = v_t;
    }
}

/// Softmax policy + tanh value, both linear in the board cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearPredictor {
    feature_size: usize,
    action_size: usize,
    weights: Weights,
    optimizer: Adam,
}

impl LinearPredictor {
    /// Create a predictor with weights drawn uniformly from
    /// `[-1/sqrt(F), 1/sqrt(F)]` using a seeded generator.
    pub fn new(feature_size: usize, action_size: usize, learning_rate: f32, seed: u64) -> Self {
        let bound = 1.0 / (feature_size.max(1) as f32).sqrt();
        let mut rng = ChaCha20Rng::seed_from_u64(seed);

        Self {
            feature_size,
            action_size,
            weights: Weights::random(action_size, feature_size, bound, &mut rng),
            optimizer: Adam::new(learning_rate, action_size, feature_size),
        }
    }

    /// Size the predictor from a game's metadata.
    pub fn for_game(metadata: &GameMetadata, learning_rate: f32, seed: u64) -> Self {
        Self::new(metadata.feature_size, metadata.num_actions, learning_rate, seed)
    }

    pub fn feature_size(&self) -> usize {
        self.feature_size
    }

    pub fn action_size(&self) -> usize {
        self.action_size
    }

    /// Number of optimisation steps applied so far.
    pub fn steps(&self) -> u64 {
        self.optimizer.t
    }

    fn features(&self, board: &Board) -> Result<Array1<f32>, PredictorError> {
        let x = board.features();
        if x.len() != self.feature_size {
            return Err(PredictorError::InputSize {
                expected: self.feature_size,
                actual: x.len(),
            });
        }
        Ok(Array1::from(x))
    }

    /// Softmax policy and tanh value for a feature vector.
    fn forward(&self, x: &Array1<f32>) -> (Array1<f32>, f32) {
        let logits = self.weights.policy_w.dot(x) + &self.weights.policy_b;
        let u = self.weights.value_w.dot(x) + self.weights.value_b[0];
        (softmax(&logits), u.tanh())
    }

    fn check_batch(&self, batch: &[Experience]) -> Result<(), PredictorError> {
        if batch.is_empty() {
            return Err(PredictorError::EmptyBatch);
        }
        if let Some(bad) = batch.iter().find(|s| s.policy.len() != self.action_size) {
            return Err(PredictorError::TargetSize {
                expected: self.action_size,
                actual: bad.policy.len(),
            });
        }
        Ok(())
    }

    /// Mean losses on `batch` without updating anything.
    pub fn evaluate_loss(&self, batch: &[Experience]) -> Result<LossReport, PredictorError> {
        self.gradients(batch).map(|(_, report)| report)
    }

    /// Loss gradients with respect to every parameter, plus the losses.
    fn gradients(&self, batch: &[Experience]) -> Result<(Weights, LossReport), PredictorError> {
        self.check_batch(batch)?;

        let scale = 1.0 / batch.len() as f32;
        let mut grads = Weights::zeros(self.action_size, self.feature_size);
        let mut policy_loss = 0.0;
        let mut value_loss = 0.0;

        for sample in batch {
            let x = self.features(&sample.board)?;
            let (q, v_hat) = self.forward(&x);
            let p = aview1(&sample.policy);

            // Policy: dL/dq_a = -p_a / (q_a + eps), pushed through the softmax
            let g = &p / &q.mapv(|qa| qa + POLICY_LOSS_EPS) * (-scale);
            let gq = g.dot(&q);
            let dz = &q * &(&g - gq);

            let outer = dz.view().insert_axis(Axis(1)).dot(&x.view().insert_axis(Axis(0)));
            grads.policy_w += &outer;
            grads.policy_b += &dz;

            let log_ratio =
                p.mapv(|pa| (pa + POLICY_LOSS_EPS).ln()) - &q.mapv(|qa| (qa + POLICY_LOSS_EPS).ln());
            policy_loss += p.dot(&log_ratio);

            // Value: squared error through tanh
            let err = v_hat - sample.value;
            let du = 2.0 * err * (1.0 - v_hat * v_hat) * scale;
            grads.value_w.scaled_add(du, &x);
            grads.value_b[0] += du;
            value_loss += err * err;
        }

        let report = LossReport {
            policy_loss: policy_loss * scale,
            value_loss: value_loss * scale,
            samples: batch.len(),
        };
        Ok((grads, report))
    }
}

impl Predictor for LinearPredictor {
    fn predict(&self, board: &Board) -> Result<Prediction, PredictorError> {
        let x = self.features(board)?;
        let (policy, value) = self.forward(&x);
        Ok(Prediction {
            policy: policy.to_vec(),
            value,
        })
    }

    fn train_step(&mut self, batch: &[Experience]) -> Result<LossReport, PredictorError> {
        let (grads, report) = self.gradients(batch)?;
        self.optimizer.step(&mut self.weights, &grads);
        Ok(report)
    }
}

/// Numerically stable softmax.
fn softmax(logits: &Array1<f32>) -> Array1<f32> {
    let max = logits.fold(f32::NEG_INFINITY, |m, &z| m.max(z));
    let exps = logits.mapv(|z| (z - max).exp());
    let total = exps.sum();
    exps / total
}
