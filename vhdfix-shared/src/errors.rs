//! Error types for vhdfix.
//!
//! Every failure of an external engine invocation is tagged with the
//! pipeline stage it happened in:
//! - [`VhdfixError::Inspection`]: reading the source image metadata
//! - [`VhdfixError::Conversion`]: source → raw or raw → VHD
//! - [`VhdfixError::Resize`]: growing the raw image to the target size

use thiserror::Error;

/// Result alias used across the workspace.
pub type VhdfixResult<T> = Result<T, VhdfixError>;

/// Pipeline stages, in execution order.
///
/// `Start` and `Done` bracket the run; the others are reached after the
/// corresponding engine call succeeds. A failure is attributed to the stage
/// the run was trying to reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Sized,
    ConvertedRaw,
    Resized,
    ConvertedOutput,
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Start => "start",
            Stage::Sized => "sized",
            Stage::ConvertedRaw => "converted_raw",
            Stage::Resized => "resized",
            Stage::ConvertedOutput => "converted_output",
            Stage::Done => "done",
        }
    }

    /// The stage that follows this one. `Done` is terminal.
    pub fn next(&self) -> Stage {
        match self {
            Stage::Start => Stage::Sized,
            Stage::Sized => Stage::ConvertedRaw,
            Stage::ConvertedRaw => Stage::Resized,
            Stage::Resized => Stage::ConvertedOutput,
            Stage::ConvertedOutput | Stage::Done => Stage::Done,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum VhdfixError {
    /// Reading the virtual size of the source image failed.
    #[error("inspection of {path} failed: {reason}")]
    Inspection {
        path: String,
        reason: String,
        exit_code: Option<i32>,
    },

    /// A format conversion (source → raw or raw → VHD) failed.
    #[error("conversion of {source_path} to {target_path} failed: {reason}")]
    Conversion {
        source_path: String,
        target_path: String,
        reason: String,
        exit_code: Option<i32>,
    },

    /// Resizing the intermediate raw image failed.
    #[error("resize of {path} to {size} bytes failed: {reason}")]
    Resize {
        path: String,
        size: u64,
        reason: String,
        exit_code: Option<i32>,
    },

    /// The image engine binary could not be located.
    #[error("engine error: {0}")]
    Engine(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl VhdfixError {
    /// Create an inspection error.
    pub fn inspection(
        path: impl Into<String>,
        reason: impl Into<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::Inspection {
            path: path.into(),
            reason: reason.into(),
            exit_code,
        }
    }

    /// Create a conversion error.
    pub fn conversion(
        source_path: impl Into<String>,
        target_path: impl Into<String>,
        reason: impl Into<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::Conversion {
            source_path: source_path.into(),
            target_path: target_path.into(),
            reason: reason.into(),
            exit_code,
        }
    }

    /// Create a resize error.
    pub fn resize(
        path: impl Into<String>,
        size: u64,
        reason: impl Into<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::Resize {
            path: path.into(),
            size,
            reason: reason.into(),
            exit_code,
        }
    }

    /// Exit code reported by the engine process, if the error came from one
    /// that ran to completion.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Inspection { exit_code, .. }
            | Self::Conversion { exit_code, .. }
            | Self::Resize { exit_code, .. } => *exit_code,
            _ => None,
        }
    }

    /// The stage that was being entered when the error occurred.
    ///
    /// The two conversions are told apart by the suffix of `target_path`.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Inspection { .. } => Some(Stage::Sized),
            Self::Resize { .. } => Some(Stage::Resized),
            Self::Conversion { target_path, .. } => {
                if target_path.ends_with(crate::constants::suffix::RAW) {
                    Some(Stage::ConvertedRaw)
                } else {
                    Some(Stage::ConvertedOutput)
                }
            }
            _ => None,
        }
    }
}
