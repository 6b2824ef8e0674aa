//! # Entity Search Admin
//!
//! Maintenance commands for the search index of one entity kind.
//!
//! ## Commands
//!
//! - `ensure <kind>`: create the kind's index if it is missing
//! - `purge <kind>`: remove every document from the kind's index
//!
//! ## Modules
//!
//! - [`config`]: Configuration and dependency initialization

pub mod config;

use std::fmt;

use entity_search_repository::{SearchError, SearchIndexError, SearchIndexService};
use thiserror::Error;
use tracing::info;

pub use config::Dependencies;

const USAGE: &str = "usage: entity-search-admin <ensure|purge> <kind>";

/// Errors that can occur during admin initialization or execution.
#[derive(Error, Debug)]
pub enum AdminError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The command line could not be parsed.
    #[error("{0}\n{usage}", usage = USAGE)]
    UsageError(String),

    #[error("Search backend error: {0}")]
    Backend(#[from] SearchIndexError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),
}

impl AdminError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::UsageError(msg.into())
    }
}

/// A maintenance command against one entity kind's index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ensure { kind: String },
    Purge { kind: String },
}

/// What a command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    IndexReady { index: String },
    Purged { index: String, removed: usize },
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexReady { index } => write!(f, "index {index} is ready"),
            Self::Purged { index, removed } => {
                write!(f, "removed {removed} documents from {index}")
            }
        }
    }
}

impl Command {
    /// Parse the arguments following the program name.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, AdminError> {
        match args {
            [command, kind] => {
                let kind = kind.as_ref().trim();
                if kind.is_empty() {
                    return Err(AdminError::usage("entity kind must not be empty"));
                }
                match command.as_ref() {
                    "ensure" => Ok(Self::Ensure {
                        kind: kind.to_string(),
                    }),
                    "purge" => Ok(Self::Purge {
                        kind: kind.to_string(),
                    }),
                    other => Err(AdminError::usage(format!("unknown command '{other}'"))),
                }
            }
            _ => Err(AdminError::usage(format!(
                "expected 2 arguments, got {}",
                args.len()
            ))),
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Self::Ensure { kind } | Self::Purge { kind } => kind,
        }
    }

    /// Run the command against the service.
    pub async fn run(&self, service: &SearchIndexService) -> Result<CommandOutcome, AdminError> {
        let index = service.index_name(self.kind());
        match self {
            Self::Ensure { kind } => {
                service.ensure_index_for_kind(kind).await?;
                Ok(CommandOutcome::IndexReady { index })
            }
            Self::Purge { kind } => {
                info!(index = %index, "Purging search index");
                let removed = service.remove_all_of_kind(kind).await?;
                Ok(CommandOutcome::Purged { index, removed })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse(&["ensure", "Product"]).unwrap(),
            Command::Ensure {
                kind: "Product".to_string()
            }
        );
        assert_eq!(
            Command::parse(&["purge", " shop::Order "]).unwrap(),
            Command::Purge {
                kind: "shop::Order".to_string()
            }
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            Command::parse::<&str>(&[]),
            Err(AdminError::UsageError(_))
        ));
        assert!(matches!(
            Command::parse(&["drop", "Product"]),
            Err(AdminError::UsageError(_))
        ));
        assert!(matches!(
            Command::parse(&["purge", "  "]),
            Err(AdminError::UsageError(_))
        ));
        assert!(matches!(
            Command::parse(&["purge", "a", "b"]),
            Err(AdminError::UsageError(_))
        ));
    }

    #[test]
    fn test_outcome_display() {
        let outcome = CommandOutcome::Purged {
            index: "product".to_string(),
            removed: 3,
        };
        assert_eq!(outcome.to_string(), "removed 3 documents from product");
    }
}
