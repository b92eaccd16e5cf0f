
// imports
use crate::config::files_handling::read_input;
use crate::error::Result;
use crate::popularity::{author_popularity, PopularityScorer};
use crate::timing::Stopwatch;
use std::fmt::Display;
use std::hint::black_box;
use tracing::{debug, info};

pub const DEFAULT_REPETITIONS: usize = 1000;

#[derive(Debug, Clone)]
pub struct BenchReport {
    pub repetitions: usize,
    pub reference_len: usize,
    pub observation_len: usize,
    pub elapsed_ms: u128,
}

impl Display for BenchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "author: {}", self.elapsed_ms)
    }
}

/// Scores the same inputs `repetitions` times and measures the whole loop.
pub fn bench_author(reference: &[String], observations: &[String], repetitions: usize) -> BenchReport {

    debug!("scoring {} observations against {} reference authors, {} times", observations.len(), reference.len(), repetitions);
    let mut sw = Stopwatch::start_new();
    for _ in 0..repetitions {
        black_box(author_popularity(black_box(reference), black_box(observations)));
    }
    sw.stop();

    BenchReport {
        repetitions,
        reference_len: reference.len(),
        observation_len: observations.len(),
        elapsed_ms: sw.elapsed_ms()
    }
}

/// Loads both author lists and runs [`bench_author`] over them.
pub fn run(reference_path: &str, observations_path: &str, repetitions: usize) -> Result<BenchReport> {

    let reference = read_input::<Vec<String>>(reference_path)?;
    let observations = read_input::<Vec<String>>(observations_path)?;
    let scorer = PopularityScorer::new(&reference);
    let known = observations.iter().filter(|author| scorer.contains(author)).count();
    info!("loaded {} reference authors and {} observed authors, {} of them known", scorer.reference_len(), observations.len(), known);

    Ok(bench_author(&reference, &observations, repetitions))
}


#[cfg(test)]
mod tests {

    use super::{bench_author, run};

    #[test]
    fn report_counts_test() {
        let reference = vec!["a".to_string()];
        let observations = vec!["a".to_string(), "b".to_string()];
        let report = bench_author(&reference, &observations, 25);
        assert_eq!(report.repetitions, 25);
        assert_eq!(report.reference_len, 1);
        assert_eq!(report.observation_len, 2);
        assert!(report.to_string().starts_with("author: "));
    }

    #[test]
    fn run_from_files_test() {
        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("rust_author_list");
        let observations = dir.path().join("all_authors");
        std::fs::write(&reference, "ferris\ncrab\n").unwrap();
        std::fs::write(&observations, "ferris\ngamer\nferris\n").unwrap();

        let report = run(reference.to_str().unwrap(), observations.to_str().unwrap(), 3).unwrap();
        assert_eq!(report.reference_len, 2);
        assert_eq!(report.observation_len, 3);
    }

    #[test]
    fn missing_file_test() {
        assert!(run("/definitely/not/here", "/nor/here", 1).is_err());
    }

}
