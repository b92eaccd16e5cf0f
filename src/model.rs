
// imports
use crate::config::JsonTrain;
use crate::error::{PipelineError, Result};
use aprender::primitives::Matrix;
use aprender::tree::RandomForestClassifier;
use ndarray::{Array2, Axis};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};


/// Rows drawn into the training and the holdout side of one round.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub train: Vec<usize>,
    pub holdout: Vec<usize>,
}

impl Split {

    /// Every row lands in training with probability `train_fraction`, the rest is held out.
    pub fn random<R: Rng>(n_rows: usize, train_fraction: f64, rng: &mut R) -> Split {
        let (train, holdout): (Vec<usize>, Vec<usize>) = (0..n_rows).partition(|_| rng.gen::<f64>() < train_fraction);
        Self { train, holdout }
    }

    pub fn is_degenerate(&self) -> bool {
        self.train.is_empty() || self.holdout.is_empty()
    }

}

/// Hits and misses of one prediction pass against the truth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Accuracy {
    pub hits: usize,
    pub misses: usize,
}

impl Accuracy {

    pub fn compare(predictions: &[usize], truth: &[usize]) -> Accuracy {
        let hits = predictions.iter().zip(truth).filter(|(p, t)| p == t).count();
        Self {
            hits,
            misses: predictions.len().max(truth.len()) - hits
        }
    }

    pub fn ratio(&self) -> f32 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0
        }
        self.hits as f32 / total as f32
    }

}

/// Rounds truth values to class indices. Negative or non finite values are rejected.
pub fn labels_from_truth(truth: &[f32]) -> Result<Vec<usize>> {
    truth
    .iter()
    .enumerate()
    .map(|(i, t)| {
        let rounded = t.round();
        if rounded.is_finite() && rounded >= 0.0 {
            Ok(rounded as usize)
        } else {
            Err(PipelineError::Parse(format!("truth row {} is not a class index: {}", i, t)))
        }
    })
    .collect()
}

fn to_matrix(rows: &Array2<f32>) -> Result<Matrix<f32>> {
    // iter() walks in logical row-major order whatever the memory layout
    let (n_rows, n_cols) = rows.dim();
    Matrix::from_vec(n_rows, n_cols, rows.iter().copied().collect())
    .map_err(|e| PipelineError::Model(e.to_string()))
}

fn from_matrix(m: &Matrix<f32>) -> Result<Array2<f32>> {
    let (n_rows, n_cols) = m.shape();
    let values: Vec<f32> = (0..n_rows)
    .flat_map(|i| (0..n_cols).map(move |j| m.get(i, j)))
    .collect();
    Array2::from_shape_vec((n_rows, n_cols), values)
    .map_err(|e| PipelineError::Model(e.to_string()))
}

/// Random forest over a dense feature matrix. Tree building and voting
/// are left entirely to the classifier library.
#[derive(Serialize, Deserialize)]
pub struct Forest {
    inner: RandomForestClassifier,
    n_features: Option<usize>,
}

impl Forest {

    pub fn new(params: &JsonTrain, seed: Option<u64>) -> Forest {

        let mut inner = RandomForestClassifier::new(params.n_estimators);
        if let Some(depth) = params.max_depth {
            inner = inner.with_max_depth(depth);
        }
        if let Some(seed) = seed {
            inner = inner.with_random_state(seed);
        }

        Self {
            inner,
            n_features: None
        }
    }

    pub fn fit(&mut self, features: &Array2<f32>, labels: &[usize]) -> Result<()> {

        if features.nrows() != labels.len() {
            return Err(PipelineError::ShapeMismatch { features: features.nrows(), truth: labels.len() });
        }
        if features.nrows() == 0 {
            return Err(PipelineError::Empty("cannot fit on zero rows".into()));
        }

        let x = to_matrix(features)?;
        self.inner.fit(&x, labels).map_err(|e| PipelineError::Model(e.to_string()))?;
        self.n_features = Some(features.ncols());
        Ok(())
    }

    pub fn n_features(&self) -> Option<usize> {
        self.n_features
    }

    fn check_fitted(&self, features: &Array2<f32>) -> Result<()> {
        match self.n_features {
            None => Err(PipelineError::Model("forest used before fit".into())),
            Some(n) if n != features.ncols() => {
                Err(PipelineError::Model(format!("forest was fit on {} features, got {}", n, features.ncols())))
            },
            Some(_) => Ok(())
        }
    }

    pub fn predict(&self, features: &Array2<f32>) -> Result<Vec<usize>> {

        self.check_fitted(features)?;
        if features.nrows() == 0 {
            return Ok(Vec::new())
        }

        let x = to_matrix(features)?;
        Ok(self.inner.predict(&x))
    }

    /// Class probabilities, one row per sample and one column per class.
    pub fn predict_proba(&self, features: &Array2<f32>) -> Result<Array2<f32>> {

        self.check_fitted(features)?;
        if features.nrows() == 0 {
            return Ok(Array2::zeros((0, 0)))
        }

        let x = to_matrix(features)?;
        from_matrix(&self.inner.predict_proba(&x))
    }

}

/// Copies the selected rows into a new matrix.
pub fn select_rows(features: &Array2<f32>, rows: &[usize]) -> Array2<f32> {
    features.select(Axis(0), rows)
}

pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy()
    }
}
