
pub mod timing;
pub mod error;
pub mod config;
pub mod popularity;
pub mod features;
pub mod posts;
pub mod model;
pub mod bench;
pub mod pipeline;

pub use config::{files_handling, Config};
pub use error::{PipelineError, Result};
pub use pipeline::Pipeline;
pub use popularity::{author_popularity, PopularityScorer};
pub use timing::Stopwatch;
