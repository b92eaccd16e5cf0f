
// imports
use crate::config::files_handling::{read_input, save_output, BinaryMatrix};
use crate::config::JsonTypes;
use crate::error::{PipelineError, Result};
use crate::model::{labels_from_truth, seeded_rng, select_rows, Accuracy, Forest, Split};
use crate::posts::{build_features, read_posts, FeatureSet};
use crate::timing::measure;

use ndarray::{Array1, Array2};
use ndarray_stats::QuantileExt;
use rayon::ThreadPoolBuilder;
use std::fmt::Display;
use tracing::{info, warn};


/// A holdout row the forest got wrong.
#[derive(Debug, Clone)]
pub struct Misclassified {
    pub row: usize,
    pub proba: Vec<f32>,
    pub predicted: usize,
    pub truth: usize,
}

#[derive(Debug, Clone)]
pub struct RoundReport {
    pub round: usize,
    pub train_shape: (usize, usize),
    pub holdout_shape: (usize, usize),
    pub fit_ms: f64,
    pub predict_ms: f64,
    pub hits: usize,
    pub misses: usize,
    pub accuracy: f32,
    pub misclassified: Vec<Misclassified>,
}

impl Display for RoundReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "round {}:
        train_feat: {:?}
        pred_feat: {:?}
        Time to fit: {}
        Time to predict: {}
        hit: {}
        miss: {}
        accuracy: {:.4}",
        self.round, self.train_shape, self.holdout_shape, self.fit_ms, self.predict_ms, self.hits, self.misses, self.accuracy)?;
        for m in &self.misclassified {
            write!(f, "\n        {}\n        {:?} {} {}", m.row, m.proba, m.predicted, m.truth)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl Summary {
    fn of(values: &[f64]) -> Option<Summary> {
        let values = Array1::from_vec(values.to_vec());
        Some(Self {
            mean: values.mean()?,
            min: *values.min().ok()?,
            max: *values.max().ok()?
        })
    }
}

#[derive(Default)]
pub struct TrainingReport {
    pub rounds: Vec<RoundReport>,
    pub skipped: usize,
    /// Forest of the last completed round
    pub forest: Option<Forest>,
}

impl TrainingReport {

    pub fn fit_summary(&self) -> Option<Summary> {
        Summary::of(&self.rounds.iter().map(|r| r.fit_ms).collect::<Vec<f64>>())
    }

    pub fn predict_summary(&self) -> Option<Summary> {
        Summary::of(&self.rounds.iter().map(|r| r.predict_ms).collect::<Vec<f64>>())
    }

    pub fn mean_accuracy(&self) -> Option<f32> {
        if self.rounds.is_empty() {
            return None
        }
        Some(self.rounds.iter().map(|r| r.accuracy).sum::<f32>() / self.rounds.len() as f32)
    }

}

impl Display for TrainingReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.fit_summary(), self.predict_summary(), self.mean_accuracy()) {
            (Some(fit), Some(pred), Some(acc)) => write!(f, "{} rounds ({} skipped):
        fit ms mean/min/max: {:.1}/{:.1}/{:.1}
        predict ms mean/min/max: {:.1}/{:.1}/{:.1}
        mean accuracy: {:.4}",
                self.rounds.len(), self.skipped, fit.mean, fit.min, fit.max, pred.mean, pred.min, pred.max, acc),
            _ => write!(f, "no completed rounds ({} skipped)", self.skipped)
        }
    }
}

pub struct Pipeline {}

impl Pipeline {

    // runs the feature extraction procedure:
    // -> read raw posts, filter and dedup by title
    // -> compute features in a thread pool
    // -> save matrix, truth and the author lists to `output_dir`

    pub fn features(posts_path: &str, params: &JsonTypes) -> Result<FeatureSet> {

        println!("{}", params);
        let raw_posts = read_posts(posts_path)?;
        info!("read {} raw posts from {}", raw_posts.len(), posts_path);
        let interesting_words = read_input::<Vec<String>>(&params.words_file)?;

        let pool = ThreadPoolBuilder::new().num_threads(params.num_threads).build()?;
        let set = pool.install(|| build_features(raw_posts, &interesting_words))?;

        let out = params.output_dir.as_str();
        save_output(out, "features", set.matrix.clone())?;
        save_output(out, "features", BinaryMatrix(set.matrix.clone()))?;
        save_output(out, "truth", set.truth.clone())?;
        save_output(out, "rust_author_list", set.rust_authors.clone())?;
        save_output(out, "all_authors", set.all_authors.clone())?;
        println!("saved features of shape {:?} and {} reference authors to {}", set.matrix.dim(), set.rust_authors.len(), out);

        Ok(set)
    }

    // runs `rounds` independent train / holdout rounds over the same matrix,
    // each with a fresh forest and a fresh random split

    pub fn train(params: &JsonTypes) -> Result<TrainingReport> {

        println!("{}", params);
        println!("train_df");
        let features = read_input::<Array2<f32>>(&params.features_file)?;
        println!("train_truth_df");
        let truth = read_input::<Vec<f32>>(&params.truth_file)?;

        let report = Pipeline::train_on(&features, &truth, params)?;
        if let Some(forest) = &report.forest {
            save_output(&params.output_dir, "forest", forest)?;
            println!("saved forest to {}", params.output_dir);
        }
        Ok(report)
    }

    // runs a saved forest over the features file and returns one class per row

    pub fn predict(params: &JsonTypes) -> Result<Vec<usize>> {

        println!("{}", params);
        let forest = read_input::<Forest>(&params.model_file)?;
        info!("loaded forest fit on {:?} features from {}", forest.n_features(), params.model_file);
        let features = read_input::<Array2<f32>>(&params.features_file)?;

        let (predictions, predict_time) = measure(|| forest.predict(&features));
        let predictions = predictions?;
        println!("Time to predict: {}", predict_time.as_secs_f64() * 1000.0);
        Ok(predictions)
    }

    pub fn train_on(features: &Array2<f32>, truth: &[f32], params: &JsonTypes) -> Result<TrainingReport> {

        if features.nrows() != truth.len() {
            return Err(PipelineError::ShapeMismatch { features: features.nrows(), truth: truth.len() });
        }
        if features.nrows() == 0 {
            return Err(PipelineError::Empty("feature matrix has no rows".into()));
        }
        let labels = labels_from_truth(truth)?;
        let train_params = &params.json_train;
        info!("training on {:?} features, {}", features.dim(), train_params);

        let mut rng = seeded_rng(train_params.seed);
        let mut report = TrainingReport::default();

        for round in 0..train_params.rounds {

            let split = Split::random(features.nrows(), train_params.train_fraction, &mut rng);
            if split.is_degenerate() {
                warn!("round {} drew {} training and {} holdout rows, skipping", round, split.train.len(), split.holdout.len());
                report.skipped += 1;
                continue;
            }

            let train_feat = select_rows(features, &split.train);
            let train_truth: Vec<usize> = split.train.iter().map(|i| labels[*i]).collect();
            let pred_feat = select_rows(features, &split.holdout);
            let pred_truth: Vec<usize> = split.holdout.iter().map(|i| labels[*i]).collect();

            // each round gets its own forest seed so seeded runs stay reproducible
            let mut forest = Forest::new(train_params, train_params.seed.map(|s| s.wrapping_add(round as u64)));
            let (fitted, fit_time) = measure(|| forest.fit(&train_feat, &train_truth));
            fitted?;
            let (predictions, predict_time) = measure(|| forest.predict(&pred_feat));
            let predictions = predictions?;
            let accuracy = Accuracy::compare(&predictions, &pred_truth);

            let proba = forest.predict_proba(&pred_feat)?;
            let misclassified: Vec<Misclassified> = predictions
            .iter()
            .zip(&pred_truth)
            .enumerate()
            .filter(|(_, (pred, truth))| pred != truth)
            .map(|(i, (pred, truth))| Misclassified {
                row: split.holdout[i],
                proba: proba.row(i).to_vec(),
                predicted: *pred,
                truth: *truth
            })
            .collect();

            let round_report = RoundReport {
                round,
                train_shape: train_feat.dim(),
                holdout_shape: pred_feat.dim(),
                fit_ms: fit_time.as_secs_f64() * 1000.0,
                predict_ms: predict_time.as_secs_f64() * 1000.0,
                hits: accuracy.hits,
                misses: accuracy.misses,
                accuracy: accuracy.ratio(),
                misclassified
            };
            println!("{}", round_report);
            report.rounds.push(round_report);
            report.forest = Some(forest);
        }

        println!("{}", report);
        Ok(report)
    }

}


#[cfg(test)]
mod tests {

    use super::{Pipeline, Summary, TrainingReport};
    use crate::config::Config;
    use ndarray::Array2;

    fn separable(n: usize) -> (Array2<f32>, Vec<f32>) {
        let mut values = Vec::new();
        let mut truth = Vec::new();
        for i in 0..n {
            let class = (i % 2) as f32;
            values.extend_from_slice(&[class * 10.0 + (i as f32) * 0.01, class * 5.0]);
            truth.push(class);
        }
        (Array2::from_shape_vec((n, 2), values).unwrap(), truth)
    }

    #[test]
    fn train_rounds_test() {
        let (features, truth) = separable(60);
        let params = Config::from_json(r#"{"rounds": 3, "seed": 5, "n_estimators": 5, "train_fraction": 0.7}"#).unwrap().get_params();
        let report = Pipeline::train_on(&features, &truth, &params).unwrap();

        assert_eq!(report.rounds.len() + report.skipped, 3);
        for round in &report.rounds {
            assert_eq!(round.train_shape.0 + round.holdout_shape.0, 60);
            assert_eq!(round.hits + round.misses, round.holdout_shape.0);
            assert_eq!(round.misclassified.len(), round.misses);
            for m in &round.misclassified {
                assert_ne!(m.predicted, m.truth);
                assert_eq!(truth[m.row] as usize, m.truth);
                assert!((m.proba.iter().sum::<f32>() - 1.0).abs() < 1e-4);
            }
        }
        assert!(report.mean_accuracy().unwrap() > 0.5);
        assert!(report.forest.is_some());
    }

    #[test]
    fn degenerate_rounds_are_skipped_test() {
        let (features, truth) = separable(1);
        let params = Config::from_json(r#"{"rounds": 3, "seed": 1}"#).unwrap().get_params();
        let report = Pipeline::train_on(&features, &truth, &params).unwrap();

        assert_eq!(report.skipped, 3);
        assert!(report.rounds.is_empty());
        assert!(report.forest.is_none());
        assert_eq!(report.to_string(), "no completed rounds (3 skipped)");
    }

    #[test]
    fn shape_mismatch_test() {
        let (features, truth) = separable(10);
        let params = Config::new(None).unwrap().get_params();
        assert!(Pipeline::train_on(&features, &truth[..9], &params).is_err());
    }

    #[test]
    fn summary_test() {
        let s = Summary::of(&[2.0, 4.0, 9.0]).unwrap();
        assert_eq!(s, Summary { mean: 5.0, min: 2.0, max: 9.0 });
        assert!(Summary::of(&[]).is_none());
        assert_eq!(TrainingReport::default().to_string(), "no completed rounds (0 skipped)");
    }

}
