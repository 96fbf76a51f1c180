//! Error types shared by the configuration boundary and the simulation core.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;

/// Everything that can stop a simulation request from producing a result.
#[derive(Debug, Error)]
pub enum SimError {
    /// One or more configuration problems, reported before any worker starts.
    #[error("invalid configuration:\n{}", join_errors(.0))]
    InvalidConfig(Vec<ConfigError>),

    /// The OS refused to start a worker thread.
    #[error("failed to spawn worker thread for group {group}: {source}")]
    Spawn {
        group: usize,
        #[source]
        source: io::Error,
    },

    /// A worker thread panicked mid-run; its partial output is discarded.
    #[error("worker for group {group} panicked")]
    WorkerPanicked { group: usize },

    /// A worker finished without handing its records back.
    #[error("worker for group {group} never reported its tick records")]
    MissingOutput { group: usize },

    /// A worker produced the wrong number of tick records.
    #[error("worker for group {group} produced {actual} tick records, expected {expected}")]
    TickCountMismatch {
        group: usize,
        expected: usize,
        actual: usize,
    },
}

impl From<ConfigError> for SimError {
    fn from(err: ConfigError) -> Self {
        Self::InvalidConfig(vec![err])
    }
}

fn join_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(|e| format!("  {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_lists_every_field() {
        let err = SimError::InvalidConfig(vec![
            ConfigError::new("simulation.days", "must be > 0"),
            ConfigError::new("arrival_pct", "must contain exactly 24 values, got 3"),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("simulation.days"));
        assert!(msg.contains("arrival_pct"));
    }

    #[test]
    fn single_config_error_converts() {
        let err: SimError = ConfigError::new("demand", "must not be empty").into();
        assert!(matches!(err, SimError::InvalidConfig(ref v) if v.len() == 1));
    }
}
