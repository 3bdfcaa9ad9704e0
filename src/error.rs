//! Error types for es-agent.
//!
//! Each layer has its own error enum. Backend and tool errors never cross
//! the dispatcher boundary as `Err`; they are rendered into JSON payloads
//! and fed back to the model. Only provider failures abort an agent run.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Agent or provider failure.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// Search backend failure.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Query or aggregation construction failure.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// CLI command failure.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the agent layer and completion providers.
#[derive(Debug, Error)]
pub enum AgentError {
    /// No API key was configured.
    #[error("API key not configured (set OPENAI_API_KEY)")]
    ApiKeyMissing,

    /// Configuration value could not be used.
    #[error("invalid agent configuration: {message}")]
    Config {
        /// Description of the problem.
        message: String,
    },

    /// The requested provider name is unknown.
    #[error("unsupported provider: {name}")]
    UnsupportedProvider {
        /// Provider name as configured.
        name: String,
    },

    /// The completion request failed at the transport or API level.
    #[error("API request failed: {message}")]
    ApiRequest {
        /// Error message from the provider.
        message: String,
        /// HTTP status, when known.
        status: Option<u16>,
    },

    /// The completion response could not be interpreted.
    #[error("malformed completion response: {message}")]
    ResponseParse {
        /// Description of the problem.
        message: String,
    },

    /// A tool result was appended for a call id the assistant never issued.
    #[error("tool result references unknown or already answered call id '{id}'")]
    OrphanToolResult {
        /// The offending call id.
        id: String,
    },
}

/// Errors returned by a [`SearchBackend`](crate::backend::SearchBackend).
///
/// The `Display` text is what the model sees in `{"error": ...}` payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Index or document does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Index already exists.
    #[error("{0}")]
    AlreadyExists(String),

    /// The backend rejected the request as malformed.
    #[error("{0}")]
    BadRequest(String),

    /// Any other failure, including transport errors.
    #[error("{0}")]
    Failure(String),
}

/// Errors raised while assembling queries or aggregations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Two aggregations in one request share a name.
    #[error("duplicate aggregation name: {0}")]
    DuplicateAggregationName(String),

    /// A composite aggregation was nested inside another composite.
    #[error("composite aggregation '{0}' cannot contain another composite")]
    NestedComposite(String),
}

/// Errors produced while dispatching a tool call.
///
/// Rendered as `{"error": "<display>"}` and returned to the model.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The tool is not in the calling agent's catalogue.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// A required argument is absent or null.
    #[error("Missing required argument: {0}")]
    MissingArgument(&'static str),

    /// Arguments are present but unusable.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Query or aggregation construction failed.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Backend failure, passed through verbatim.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors raised by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Command could not complete.
    #[error("{0}")]
    ExecutionFailed(String),

    /// Output could not be rendered.
    #[error("output formatting failed: {0}")]
    OutputFormat(String),
}
