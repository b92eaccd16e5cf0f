// End to end runs of the file based tools: posts CSV to feature files,
// feature files to training rounds, author lists to the benchmark.

use playrust_forest::bench;
use playrust_forest::files_handling::read_input;
use playrust_forest::{Config, Pipeline};
use ndarray::Array2;
use std::fs;
use std::path::Path;

const HEADER: &str = "is_self,author,url,downs,ups,score,selftext,subreddit,title\n";

fn write_posts(dir: &Path) -> String {
    let mut csv = String::from(HEADER);
    for i in 0..40 {
        let (sub, author, body) = if i % 2 == 0 {
            ("rust", format!("rustacean{}", i % 6), "fn main() { let x = vec![1]; println!(\"{:?}\", x); } borrow checker")
        } else {
            ("playrust", format!("gamer{}", i % 6), "looking for a server to raid with friends tonight")
        };
        csv.push_str(&format!("true,{},https://example.com/{},0,{},{},\"{}\",{},post number {}\n", author, i, i, i, body.replace('"', "\"\""), sub, i));
    }
    let path = dir.join("posts.csv");
    fs::write(&path, csv).unwrap();
    path.to_str().unwrap().to_owned()
}

fn params_for(dir: &Path) -> Config {
    let words = dir.join("words_of_interest");
    fs::write(&words, "borrow\nserver\nraid\n").unwrap();
    let out = dir.join("data");
    let json = format!(
        r#"{{"output_dir": {:?}, "words_file": {:?}, "features_file": {:?}, "truth_file": {:?}, "model_file": {:?}, "rounds": 2, "seed": 9, "num_threads": 2, "train_fraction": 0.75}}"#,
        out.to_str().unwrap(),
        words.to_str().unwrap(),
        out.join("features.bin").to_str().unwrap(),
        out.join("truth.csv").to_str().unwrap(),
        out.join("forest.bin").to_str().unwrap(),
    );
    Config::from_json(&json).unwrap()
}

#[test]
fn features_then_train() {
    let dir = tempfile::tempdir().unwrap();
    let posts = write_posts(dir.path());
    let params = params_for(dir.path()).get_params();

    let set = Pipeline::features(&posts, &params).unwrap();
    assert_eq!(set.matrix.nrows(), 40);
    assert_eq!(set.truth.len(), 40);

    let out = dir.path().join("data");
    for name in ["features.csv", "features.bin", "truth.csv", "rust_author_list", "all_authors"] {
        assert!(out.join(name).exists(), "missing {}", name);
    }

    let from_csv = read_input::<Array2<f32>>(out.join("features.csv").to_str().unwrap()).unwrap();
    assert_eq!(from_csv, set.matrix);

    let report = Pipeline::train(&params).unwrap();
    assert_eq!(report.rounds.len() + report.skipped, 2);

    // the last fitted forest is saved and classifies every row the same way once reloaded
    let forest = report.forest.expect("at least one completed round");
    let predictions = Pipeline::predict(&params).unwrap();
    assert_eq!(predictions.len(), 40);
    assert_eq!(predictions, forest.predict(&set.matrix).unwrap());
}

#[test]
fn predict_without_saved_forest_fails() {
    let dir = tempfile::tempdir().unwrap();
    let posts = write_posts(dir.path());
    let params = params_for(dir.path()).get_params();
    Pipeline::features(&posts, &params).unwrap();
    assert!(Pipeline::predict(&params).is_err());
}

#[test]
fn bench_over_generated_author_lists() {
    let dir = tempfile::tempdir().unwrap();
    let posts = write_posts(dir.path());
    let params = params_for(dir.path()).get_params();
    Pipeline::features(&posts, &params).unwrap();

    let out = dir.path().join("data");
    let report = bench::run(
        out.join("rust_author_list").to_str().unwrap(),
        out.join("all_authors").to_str().unwrap(),
        10,
    )
    .unwrap();
    assert_eq!(report.reference_len, 3);
    assert_eq!(report.observation_len, 40);
}

#[test]
fn train_without_inputs_fails() {
    let dir = tempfile::tempdir().unwrap();
    let params = params_for(dir.path()).get_params();
    assert!(Pipeline::train(&params).is_err());
}
