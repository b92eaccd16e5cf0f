
// imports
use crate::error::{PipelineError, Result};
use crate::features::{check_for_code, interesting_word_freq, subs_to_float, symbol_counts};
use crate::popularity::author_popularity;
use ndarray::Array2;
use serde::Deserialize;
use tracing::{debug, info};


/// Subreddit whose authors form the reference set for author popularity.
pub const REFERENCE_SUBREDDIT: &str = "rust";

/// Posts with a body this short or shorter carry no usable text features.
const MIN_SELFTEXT_LEN: usize = 8;

/// Columns in front of the word, symbol and code columns.
const SCALAR_FEATURES: usize = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct RawPost {
    pub is_self: bool,
    pub author: String,
    pub url: String,
    pub downs: u64,
    pub ups: u64,
    pub score: u64,
    pub selftext: String,
    pub subreddit: String,
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct ProcessedPost {
    /// How often the author posted, if they ever posted in the reference subreddit
    pub author_popularity: f32,
    pub downs: f32,
    pub ups: f32,
    pub score: f32,
    /// Length of the body in bytes
    pub post_len: f32,
    pub word_freq: Vec<f32>,
    pub symbol_freq: Vec<f32>,
    pub regex_matches: Vec<f32>,
}

impl ProcessedPost {
    fn row_len(&self) -> usize {
        SCALAR_FEATURES + self.word_freq.len() + self.symbol_freq.len() + self.regex_matches.len()
    }
}

/// Everything the training step and the popularity benchmark need.
pub struct FeatureSet {
    pub matrix: Array2<f32>,
    pub truth: Vec<f32>,
    pub rust_authors: Vec<String>,
    pub all_authors: Vec<String>,
}

pub fn read_posts(file_path: &str) -> Result<Vec<RawPost>> {
    let mut rdr = csv::Reader::from_path(file_path)?;
    let mut posts = Vec::new();
    for post in rdr.deserialize() {
        posts.push(post?);
    }
    Ok(posts)
}

/// Drops posts with a too short body, then keeps one post per title.
pub fn clean_posts(posts: Vec<RawPost>) -> Vec<RawPost> {

    let n = posts.len();
    let mut posts: Vec<RawPost> = posts
    .into_iter()
    .filter(|post| post.selftext.len() > MIN_SELFTEXT_LEN)
    .collect();

    posts.sort_by(|a, b| a.title.cmp(&b.title));
    posts.dedup_by(|a, b| a.title == b.title);
    debug!("kept {} of {} posts after filtering and title dedup", posts.len(), n);
    posts
}

/// Computes per post features and the subreddit label of every post.
pub fn normalize_post_features(raw_posts: &[RawPost], interesting_words: &[String]) -> (Vec<ProcessedPost>, Vec<f32>) {

    let authors: Vec<&str> = raw_posts.iter().map(|r| r.author.as_str()).collect();
    let rust_authors: Vec<&str> = raw_posts
    .iter()
    .filter(|r| r.subreddit == REFERENCE_SUBREDDIT)
    .map(|r| r.author.as_str())
    .collect();
    let subreddits: Vec<&str> = raw_posts.iter().map(|r| r.subreddit.as_str()).collect();
    let bodies: Vec<&str> = raw_posts.iter().map(|r| r.selftext.as_str()).collect();

    // words are searched in body and title together
    let terms: Vec<String> = raw_posts.iter().map(|r| format!("{} {}", r.selftext, r.title)).collect();
    let terms: Vec<&str> = terms.iter().map(|s| s.as_str()).collect();

    let term_frequencies = interesting_word_freq(&terms, interesting_words);
    let symbol_frequencies = symbol_counts(&bodies);
    let rust_regexes = check_for_code(&bodies);
    let popularity = author_popularity(&rust_authors, &authors);
    let sub_floats = subs_to_float(&subreddits);

    let processed = raw_posts
    .iter()
    .zip(popularity)
    .zip(term_frequencies.into_iter().zip(symbol_frequencies).zip(rust_regexes))
    .map(|((r, author_popularity), ((word_freq, symbol_freq), regex_matches))| ProcessedPost {
        author_popularity,
        downs: r.downs as f32,
        ups: r.ups as f32,
        score: r.score as f32,
        post_len: r.selftext.len() as f32,
        word_freq,
        symbol_freq,
        regex_matches,
    })
    .collect();

    (processed, sub_floats)
}

/// Stacks processed posts into a (posts, features) matrix.
pub fn construct_matrix(post_features: &[ProcessedPost]) -> Result<Array2<f32>> {

    let n_cols = match post_features.first() {
        Some(first) => first.row_len(),
        None => return Err(PipelineError::Empty("no posts to build a feature matrix from".into()))
    };

    let mut features: Vec<f32> = Vec::with_capacity(n_cols * post_features.len());
    for (i, p) in post_features.iter().enumerate() {
        if p.row_len() != n_cols {
            return Err(PipelineError::RaggedRow {
                path: "processed posts".into(),
                row: i,
                expected: n_cols,
                found: p.row_len()
            });
        }
        features.extend_from_slice(&[p.author_popularity, p.downs, p.ups, p.score, p.post_len]);
        features.extend_from_slice(&p.word_freq);
        features.extend_from_slice(&p.symbol_freq);
        features.extend_from_slice(&p.regex_matches);
    }

    Array2::from_shape_vec((post_features.len(), n_cols), features)
    .map_err(|e| PipelineError::Parse(e.to_string()))
}

pub fn build_features(raw_posts: Vec<RawPost>, interesting_words: &[String]) -> Result<FeatureSet> {

    let posts = clean_posts(raw_posts);
    let (processed, truth) = crate::time!(normalize_post_features(&posts, interesting_words), "normalize_post_features");
    let matrix = crate::time!(construct_matrix(&processed)?, "construct_matrix");
    info!("built feature matrix of shape {:?}", matrix.dim());

    let all_authors: Vec<String> = posts.iter().map(|r| r.author.clone()).collect();
    let mut rust_authors: Vec<String> = posts
    .iter()
    .filter(|r| r.subreddit == REFERENCE_SUBREDDIT)
    .map(|r| r.author.clone())
    .collect();
    rust_authors.sort();
    rust_authors.dedup();

    Ok(FeatureSet { matrix, truth, rust_authors, all_authors })
}


#[cfg(test)]
mod tests {

    use super::*;

    fn post(author: &str, subreddit: &str, title: &str, selftext: &str) -> RawPost {
        RawPost {
            is_self: true,
            author: author.into(),
            url: String::new(),
            downs: 1,
            ups: 4,
            score: 3,
            selftext: selftext.into(),
            subreddit: subreddit.into(),
            title: title.into(),
        }
    }

    #[test]
    fn clean_posts_test() {
        let posts = vec![
            post("a", "rust", "b title", "long enough body"),
            post("b", "rust", "a title", "short"),
            post("c", "playrust", "b title", "another long body"),
            post("d", "playrust", "c title", "yet another body"),
        ];
        let cleaned = clean_posts(posts);
        let titles: Vec<&str> = cleaned.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["b title", "c title"]);
    }

    #[test]
    fn build_features_test() {
        let words = vec!["borrow".to_owned(), "server".to_owned()];
        let posts = vec![
            post("ferris", "rust", "borrow checker", "fn main() { let x = 1; }"),
            post("ferris", "rust", "lifetimes", "why does the borrow fail here"),
            post("gamer", "playrust", "server wipe", "which server wiped today?"),
            post("ferris", "playrust", "raid", "base got raided by ferris"),
        ];

        let set = build_features(posts, &words).unwrap();
        let n_cols = SCALAR_FEATURES + words.len() + crate::features::SYMBOLS.len() + 4;
        assert_eq!(set.matrix.dim(), (4, n_cols));
        assert_eq!(set.rust_authors, vec!["ferris"]);
        assert_eq!(set.all_authors.len(), 4);

        // rows are sorted by title: "borrow checker", "lifetimes", "raid", "server wipe"
        let popularity: Vec<f32> = set.matrix.column(0).to_vec();
        assert_eq!(popularity, vec![3.0, 3.0, 3.0, 0.0]);
        assert_eq!(set.truth, vec![0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn empty_matrix_test() {
        assert!(construct_matrix(&[]).is_err());
    }

}
