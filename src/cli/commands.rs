//! CLI command implementations.
//!
//! Builds the configuration, connects to the cluster and the completion
//! service, then answers one query or runs the interactive loop.

use std::io;
use std::sync::Arc;

use tokio::runtime::Runtime;
use tracing::info;

use crate::agent::{AgentConfig, AgentSystem, create_provider};
use crate::backend::{BackendConfig, ElasticsearchBackend};
use crate::cli::output::{OutputFormat, format_answer};
use crate::cli::parser::Cli;
use crate::cli::repl;
use crate::error::{CommandError, Result};

/// Executes the CLI request and returns the text to print.
///
/// In interactive mode the session writes to stdout directly and the
/// returned string is empty.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the cluster is
/// unreachable, or the session cannot read or write the terminal.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);
    let agent_config = agent_config(cli)?;
    let backend_config = backend_config(cli);

    // Sync/async bridge for the whole session.
    let rt = Runtime::new().map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}"))
    })?;

    let backend = ElasticsearchBackend::new(&backend_config)?;
    let version = rt.block_on(backend.ping()).map_err(|e| {
        CommandError::ExecutionFailed(format!(
            "Cannot connect to Elasticsearch at {}: {e}",
            backend_config.url()
        ))
    })?;
    info!(url = %backend_config.url(), version = %version, "connected to Elasticsearch");

    let provider = create_provider(&agent_config).map_err(|e| {
        CommandError::ExecutionFailed(format!("Provider creation failed: {e}"))
    })?;
    let system = AgentSystem::new(&agent_config, provider, Arc::new(backend));

    if let Some(query) = cli.query_text() {
        let (kind, response) = rt.block_on(system.handle(&query));
        return Ok(format_answer(kind, &response, format)?);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    repl::run(stdin.lock(), &mut stdout, |query| {
        let (kind, response) = rt.block_on(system.handle(query));
        match format {
            OutputFormat::Text => response.content,
            OutputFormat::Json => format_answer(kind, &response, format)
                .map_or(response.content, |s| s.trim_end().to_string()),
        }
    })?;
    Ok(String::new())
}

/// Agent configuration from the environment plus CLI overrides.
fn agent_config(cli: &Cli) -> Result<AgentConfig> {
    let mut builder = AgentConfig::builder();
    if let Some(model) = &cli.model {
        builder = builder.model(model);
    }
    if let Some(n) = cli.max_iterations {
        builder = builder.max_tool_iterations(n);
    }
    builder.from_env().build().map_err(|e| {
        CommandError::ExecutionFailed(format!("Agent configuration error: {e}")).into()
    })
}

/// Backend configuration from the environment plus CLI overrides.
fn backend_config(cli: &Cli) -> BackendConfig {
    let mut builder = BackendConfig::builder();
    if let Some(url) = &cli.es_url {
        builder = builder.url(url);
    }
    builder.from_env().build()
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_cli_overrides_win() {
        let cli = Cli::parse_from([
            "es-agent",
            "--model",
            "gpt-4o-mini",
            "--max-iterations",
            "9",
            "--es-url",
            "http://search:9201",
        ]);
        let backend = backend_config(&cli);
        assert_eq!(backend.url(), "http://search:9201");

        // Only checked when a key is present in the environment.
        if let Ok(config) = agent_config(&cli) {
            assert_eq!(config.model, "gpt-4o-mini");
            assert_eq!(config.max_tool_iterations, 9);
        }
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let cli = Cli::parse_from(["es-agent", "--max-iterations", "0"]);
        let result = agent_config(&cli);
        assert!(matches!(
            result,
            Err(ref e) if e.to_string().starts_with("Agent configuration error: ")
        ));
    }
}
