//! Run configuration: JSON-deserialized sweep descriptions, strict
//! validation, and output-path construction.

pub mod sweep;

pub use self::sweep::{load_config, MethodName, ResolvedSweep, SweepConfig};

use std::fmt;
use std::path::{Path, PathBuf};

/// Configuration errors. All of these abort a run before any trial is
/// dispatched; nothing is silently defaulted.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// A value list that the selected method/observation requires is empty.
    EmptyAxis { axis: &'static str },
    /// `reps` must be at least 1.
    NoRepetitions,
    /// Regularization strengths must be finite and non-negative.
    BadAlpha { alpha: f64 },
    /// Measurement counts must be finite and positive.
    BadNumCells { value: f64 },
    /// `dwt` method without `dwt_type` or `levels`.
    MissingDwtParams,
    /// `dct` method with wavelet parameters present.
    UnexpectedDwtParams,
    /// Decomposition level outside `[1, 4]`.
    LevelOutOfRange { level: usize },
    /// `v1` observation without `cell_sizes` or `sparse_freqs`.
    MissingV1Params,
    /// Receptive-field parameters with a non-V1 observation.
    UnexpectedV1Params,
    /// Receptive-field extent of zero.
    ZeroCellSize,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyAxis { axis } => write!(f, "value list '{axis}' is empty"),
            ConfigError::NoRepetitions => write!(f, "reps must be at least 1"),
            ConfigError::BadAlpha { alpha } => {
                write!(f, "alphas must be finite and >= 0, got {alpha}")
            }
            ConfigError::BadNumCells { value } => {
                write!(f, "num_cells values must be finite and > 0, got {value}")
            }
            ConfigError::MissingDwtParams => {
                write!(f, "dwt method requires dwt_type and levels")
            }
            ConfigError::UnexpectedDwtParams => {
                write!(f, "dct method does not use dwt_type or levels")
            }
            ConfigError::LevelOutOfRange { level } => {
                write!(f, "decomposition level must be in [1, 4], got {level}")
            }
            ConfigError::MissingV1Params => {
                write!(f, "v1 observation requires cell_sizes and sparse_freqs")
            }
            ConfigError::UnexpectedV1Params => {
                write!(
                    f,
                    "cell_sizes and sparse_freqs only apply to the v1 observation"
                )
            }
            ConfigError::ZeroCellSize => write!(f, "cell_sizes entries must be positive"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Map a run to its output location:
/// `<out_dir>/<image_name>/<method>/<observation>/<file_name>`.
pub fn data_save_path(
    out_dir: &Path,
    image_name: &str,
    method: &str,
    observation: &str,
    file_name: &str,
) -> PathBuf {
    out_dir
        .join(image_name)
        .join(method)
        .join(observation)
        .join(file_name)
}
