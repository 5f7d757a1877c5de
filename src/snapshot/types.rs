// Core types for artifact capture

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::browser::BrowserError;

/// Result type for artifact operations
pub type ArtifactResult<T> = Result<T, ArtifactError>;

/// Failures while capturing or storing an artifact.
///
/// These never leave [`crate::snapshot::ActionRecorder`]; they are logged and
/// the instrumented interaction proceeds as if capture had succeeded.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("screenshot failed: {0}")]
    Capture(#[from] BrowserError),

    #[error("could not write artifact {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Record of one instrumented interaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionEvent {
    /// Action kind plus the element label, e.g. "click_Shop"
    pub label: String,

    /// When the action completed
    pub timestamp: DateTime<Utc>,

    /// Screenshot written for this action, if capture succeeded
    pub artifact: Option<PathBuf>,
}

impl ActionEvent {
    pub fn new(label: impl Into<String>, artifact: Option<PathBuf>) -> Self {
        Self {
            label: label.into(),
            timestamp: Utc::now(),
            artifact,
        }
    }
}
