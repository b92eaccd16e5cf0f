use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use playrust_forest::bench::{self, DEFAULT_REPETITIONS};
use playrust_forest::{Config, Pipeline};
use tracing_subscriber::EnvFilter;

/// Author popularity benchmark and random forest training for subreddit posts.
#[derive(Parser)]
#[command(name = "playrust_forest", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Time author popularity scoring over two author lists
    Bench {
        /// Known authors, one per line
        reference: String,

        /// Observed authors, one per line
        observations: String,

        /// How many times the scoring runs
        #[arg(long, default_value_t = DEFAULT_REPETITIONS)]
        repetitions: usize,
    },

    /// Train and evaluate random forests on a feature matrix
    Train {
        /// JSON file with run parameters, defaults apply when omitted
        #[arg(long)]
        config: Option<String>,
    },

    /// Classify the rows of a features file with a saved forest
    Predict {
        /// JSON file with run parameters, defaults apply when omitted
        #[arg(long)]
        config: Option<String>,
    },

    /// Turn a posts CSV into feature, truth and author list files
    Features {
        /// CSV of raw posts with a header row
        posts: String,

        /// JSON file with run parameters, defaults apply when omitted
        #[arg(long)]
        config: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("playrust_forest=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Bench { reference, observations, repetitions } => {
            let report = bench::run(&reference, &observations, repetitions)
                .with_context(|| format!("benchmark over {} and {}", reference, observations))?;
            println!("{}", report);
        }
        Commands::Train { config } => {
            let params = Config::new(config.as_deref())
                .context("loading run parameters")?
                .get_params();
            Pipeline::train(&params).context("training")?;
        }
        Commands::Predict { config } => {
            let params = Config::new(config.as_deref())
                .context("loading run parameters")?
                .get_params();
            let predictions = Pipeline::predict(&params).context("predicting")?;
            for prediction in predictions {
                println!("{}", prediction);
            }
        }
        Commands::Features { posts, config } => {
            let params = Config::new(config.as_deref())
                .context("loading run parameters")?
                .get_params();
            Pipeline::features(&posts, &params)
                .with_context(|| format!("building features from {}", posts))?;
        }
    }

    Ok(())
}
