//! JSON run configuration for hyperparameter sweeps.
//!
//! Raw configs are deserialized with serde and then validated into a
//! [`ResolvedSweep`]: a closed observation × basis selection plus the
//! value grid. Every cross-field rule is checked here, before any image
//! is loaded or any sampling work begins.

use super::ConfigError;
use crate::basis::{BasisSpec, Wavelet, MAX_LEVEL};
use crate::image::ColorMode;
use crate::observe::{NumCells, ObservationKind};
use crate::reconstruct::Reconstructor;
use crate::sweep::SweepGrid;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Reconstruction basis selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodName {
    Dct,
    Dwt,
}

impl MethodName {
    pub fn name(&self) -> &'static str {
        match self {
            MethodName::Dct => "dct",
            MethodName::Dwt => "dwt",
        }
    }
}

impl FromStr for MethodName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dct" => Ok(MethodName::Dct),
            "dwt" => Ok(MethodName::Dwt),
            other => Err(format!("unknown method '{other}' (supported: dct, dwt)")),
        }
    }
}

impl fmt::Display for MethodName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn default_reps() -> u32 {
    20
}

/// Raw sweep configuration as found in a JSON file.
#[derive(Clone, Debug, Deserialize)]
pub struct SweepConfig {
    /// Image to reconstruct.
    pub image: PathBuf,
    /// Color handling for loading and reconstruction.
    pub mode: ColorMode,
    pub method: MethodName,
    pub observation: ObservationKind,
    /// Wavelet family; required iff `method` is `dwt`.
    #[serde(default)]
    pub dwt_type: Option<Wavelet>,
    /// Decomposition levels to sweep; required iff `method` is `dwt`.
    #[serde(default)]
    pub levels: Option<Vec<usize>>,
    /// Regularization strengths to sweep.
    pub alphas: Vec<f64>,
    /// Measurement counts; values below 1.0 are pixel fractions.
    pub num_cells: Vec<f64>,
    /// Receptive-field extents; required iff `observation` is `v1`.
    #[serde(default)]
    pub cell_sizes: Option<Vec<usize>>,
    /// Receptive-field frequencies; required iff `observation` is `v1`.
    #[serde(default)]
    pub sparse_freqs: Option<Vec<f64>>,
    /// Repetitions per combination.
    #[serde(default = "default_reps")]
    pub reps: u32,
    /// Root directory for the CSV table and manifest.
    pub output_dir: PathBuf,
}

/// A validated sweep: engine plus grid, ready to dispatch.
#[derive(Clone, Debug)]
pub struct ResolvedSweep {
    pub reconstructor: Reconstructor,
    pub grid: SweepGrid,
}

impl SweepConfig {
    /// Check every cross-field rule and resolve into a runnable sweep.
    pub fn validate(&self) -> Result<ResolvedSweep, ConfigError> {
        if self.reps == 0 {
            return Err(ConfigError::NoRepetitions);
        }
        if self.alphas.is_empty() {
            return Err(ConfigError::EmptyAxis { axis: "alphas" });
        }
        if self.num_cells.is_empty() {
            return Err(ConfigError::EmptyAxis { axis: "num_cells" });
        }
        for &alpha in &self.alphas {
            if !alpha.is_finite() || alpha < 0.0 {
                return Err(ConfigError::BadAlpha { alpha });
            }
        }
        for &v in &self.num_cells {
            if !v.is_finite() || v <= 0.0 {
                return Err(ConfigError::BadNumCells { value: v });
            }
        }

        let basis = match self.method {
            MethodName::Dct => {
                if self.dwt_type.is_some() || self.levels.is_some() {
                    return Err(ConfigError::UnexpectedDwtParams);
                }
                BasisSpec::Dct
            }
            MethodName::Dwt => {
                let wavelet = self.dwt_type.ok_or(ConfigError::MissingDwtParams)?;
                let levels = self.levels.as_ref().ok_or(ConfigError::MissingDwtParams)?;
                if levels.is_empty() {
                    return Err(ConfigError::EmptyAxis { axis: "levels" });
                }
                if let Some(&level) = levels.iter().find(|lv| !(1..=MAX_LEVEL).contains(lv)) {
                    return Err(ConfigError::LevelOutOfRange { level });
                }
                BasisSpec::Dwt { wavelet }
            }
        };

        let (cell_sizes, sparse_freqs) = if self.observation.uses_v1_params() {
            let cell_sizes = self
                .cell_sizes
                .clone()
                .ok_or(ConfigError::MissingV1Params)?;
            let sparse_freqs = self
                .sparse_freqs
                .clone()
                .ok_or(ConfigError::MissingV1Params)?;
            if cell_sizes.is_empty() {
                return Err(ConfigError::EmptyAxis { axis: "cell_sizes" });
            }
            if sparse_freqs.is_empty() {
                return Err(ConfigError::EmptyAxis { axis: "sparse_freqs" });
            }
            if cell_sizes.contains(&0) {
                return Err(ConfigError::ZeroCellSize);
            }
            (Some(cell_sizes), Some(sparse_freqs))
        } else {
            if self.cell_sizes.is_some() || self.sparse_freqs.is_some() {
                return Err(ConfigError::UnexpectedV1Params);
            }
            (None, None)
        };

        let grid = SweepGrid {
            reps: (0..self.reps).collect(),
            levels: if self.method == MethodName::Dwt {
                self.levels.clone()
            } else {
                None
            },
            alphas: self.alphas.clone(),
            num_cells: self.num_cells.iter().copied().map(NumCells::from_value).collect(),
            cell_sizes,
            sparse_freqs,
        };
        Ok(ResolvedSweep {
            reconstructor: Reconstructor::new(self.observation, basis),
            grid,
        })
    }

    /// Image file stem used in output paths.
    pub fn image_name(&self) -> String {
        self.image
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string())
    }

    pub fn mode_name(&self) -> &'static str {
        match self.mode {
            ColorMode::Black => "black",
            ColorMode::Color => "color",
        }
    }
}

/// Load and parse a JSON sweep config.
pub fn load_config(path: &Path) -> Result<SweepConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> SweepConfig {
        SweepConfig {
            image: PathBuf::from("tree_part1.jpg"),
            mode: ColorMode::Black,
            method: MethodName::Dct,
            observation: ObservationKind::Classical,
            dwt_type: None,
            levels: None,
            alphas: vec![0.1, 1.0],
            num_cells: vec![50.0, 0.3],
            cell_sizes: None,
            sparse_freqs: None,
            reps: 20,
            output_dir: PathBuf::from("out"),
        }
    }

    #[test]
    fn valid_dct_config_resolves() {
        let resolved = base_config().validate().unwrap();
        assert_eq!(resolved.grid.combination_count(), 20 * 2 * 2);
        assert_eq!(resolved.grid.columns(), vec!["rep", "alp", "num_cell"]);
        assert_eq!(resolved.grid.num_cells[1], NumCells::Fraction(0.3));
    }

    #[test]
    fn v1_without_field_params_is_rejected() {
        let mut cfg = base_config();
        cfg.observation = ObservationKind::V1;
        assert_eq!(cfg.validate().unwrap_err(), ConfigError::MissingV1Params);
    }

    #[test]
    fn v1_params_on_other_observation_are_rejected() {
        let mut cfg = base_config();
        cfg.cell_sizes = Some(vec![2]);
        assert_eq!(cfg.validate().unwrap_err(), ConfigError::UnexpectedV1Params);
    }

    #[test]
    fn dwt_requires_wavelet_and_levels() {
        let mut cfg = base_config();
        cfg.method = MethodName::Dwt;
        assert_eq!(cfg.validate().unwrap_err(), ConfigError::MissingDwtParams);

        cfg.dwt_type = Some(Wavelet::Db2);
        cfg.levels = Some(vec![1, 5]);
        assert_eq!(
            cfg.validate().unwrap_err(),
            ConfigError::LevelOutOfRange { level: 5 }
        );

        cfg.levels = Some(vec![1, 4]);
        let resolved = cfg.validate().unwrap();
        assert_eq!(
            resolved.grid.columns(),
            vec!["rep", "lv", "alp", "num_cell"]
        );
    }

    #[test]
    fn dwt_params_on_dct_are_rejected() {
        let mut cfg = base_config();
        cfg.levels = Some(vec![1]);
        assert_eq!(cfg.validate().unwrap_err(), ConfigError::UnexpectedDwtParams);
    }

    #[test]
    fn unknown_names_fail_at_parse_time() {
        let json = r#"{
            "image": "a.png", "mode": "black", "method": "fft",
            "observation": "classical", "alphas": [0.1],
            "num_cells": [10], "output_dir": "out"
        }"#;
        assert!(serde_json::from_str::<SweepConfig>(json).is_err());
    }

    #[test]
    fn bad_axis_values_are_rejected() {
        let mut cfg = base_config();
        cfg.alphas = vec![-0.5];
        assert!(matches!(cfg.validate(), Err(ConfigError::BadAlpha { .. })));

        let mut cfg = base_config();
        cfg.num_cells = vec![0.0];
        assert!(matches!(cfg.validate(), Err(ConfigError::BadNumCells { .. })));

        let mut cfg = base_config();
        cfg.reps = 0;
        assert_eq!(cfg.validate().unwrap_err(), ConfigError::NoRepetitions);
    }
}
