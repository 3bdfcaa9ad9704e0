//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// es-agent: natural-language agents for Elasticsearch.
///
/// Routes each request to a search, index-management or analytics agent
/// that drives an LLM tool-calling conversation against the cluster.
#[derive(Parser, Debug)]
#[command(name = "es-agent")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"Examples:
  es-agent                                         # Interactive session
  es-agent Find all users registered in the last week
  es-agent "Create index products with a name field"
  es-agent --format json "How many orders were placed?"
  es-agent --es-url https://search.internal:9200 -v "list the indices"

Environment:
  OPENAI_API_KEY (required), OPENAI_MODEL, OPENAI_BASE_URL, MAX_ITERATIONS,
  ELASTICSEARCH_HOST, ELASTICSEARCH_PORT, ELASTICSEARCH_USER, LOG_LEVEL, LOG_DIR
"#)]
pub struct Cli {
    /// Request to answer. Starts an interactive session when omitted.
    pub query: Vec<String>,

    /// Output format (text, json).
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Completion model (overrides `OPENAI_MODEL`).
    #[arg(long)]
    pub model: Option<String>,

    /// Maximum completion rounds per request (overrides `MAX_ITERATIONS`).
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Elasticsearch base URL (overrides the `ELASTICSEARCH_*` host settings).
    #[arg(long)]
    pub es_url: Option<String>,

    /// Directory for a daily rolling log file, written alongside stderr.
    #[arg(long, env = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    /// The query words joined by spaces, or `None` when no query was given.
    #[must_use]
    pub fn query_text(&self) -> Option<String> {
        let text = self.query.join(" ");
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    /// Log filter directive used when `RUST_LOG` is unset.
    ///
    /// `-v` flags win over `level`, which is the value of `LOG_LEVEL`.
    #[must_use]
    pub fn log_directive(&self, level: Option<&str>) -> String {
        match self.verbose {
            0 => level
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .unwrap_or("info")
                .to_lowercase(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    }
}
