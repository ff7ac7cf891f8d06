//! Hyperparameter sweep driver.
//!
//! Enumerates the Cartesian product of the grid's value lists, dispatches
//! one reconstruction + scoring trial per combination on a caller-owned
//! rayon pool, joins at a single barrier and pairs every surviving result
//! with its combination by construction. Failed trials are logged and
//! dropped; nothing is persisted until the whole table exists.

mod table;

pub use self::table::{ResultTable, TrialRecord};

use crate::image::PixelImage;
use crate::metrics::reconstruction_error;
use crate::observe::NumCells;
use crate::reconstruct::{Reconstructor, TrialParams};
use log::{info, warn};
use rayon::prelude::*;
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::Path;

/// Value lists for each hyperparameter axis. `levels` applies to DWT
/// trials, `cell_sizes`/`sparse_freqs` to V1 trials; absent axes
/// contribute no column and no product factor.
#[derive(Clone, Debug, Default)]
pub struct SweepGrid {
    pub reps: Vec<u32>,
    pub levels: Option<Vec<usize>>,
    pub alphas: Vec<f64>,
    pub num_cells: Vec<NumCells>,
    pub cell_sizes: Option<Vec<usize>>,
    pub sparse_freqs: Option<Vec<f64>>,
}

impl SweepGrid {
    /// Result-table column set implied by the present axes, in the
    /// enumeration's nesting order.
    pub fn columns(&self) -> Vec<&'static str> {
        let mut cols = vec!["rep"];
        if self.levels.is_some() {
            cols.push("lv");
        }
        cols.push("alp");
        cols.push("num_cell");
        if self.cell_sizes.is_some() {
            cols.push("cell_size");
        }
        if self.sparse_freqs.is_some() {
            cols.push("sparse_freq");
        }
        cols
    }

    /// Size of the full Cartesian product.
    pub fn combination_count(&self) -> usize {
        self.reps.len()
            * self.levels.as_ref().map_or(1, Vec::len)
            * self.alphas.len()
            * self.num_cells.len()
            * self.cell_sizes.as_ref().map_or(1, Vec::len)
            * self.sparse_freqs.as_ref().map_or(1, Vec::len)
    }

    /// Enumerate every combination in fixed nesting order:
    /// rep → level → alpha → num_cells → cell_size → sparse_freq.
    pub fn enumerate(&self) -> Vec<TrialParams> {
        let levels: Vec<Option<usize>> = axis_or_none(&self.levels);
        let cell_sizes: Vec<Option<usize>> = axis_or_none(&self.cell_sizes);
        let sparse_freqs: Vec<Option<f64>> = axis_or_none(&self.sparse_freqs);

        let mut out = Vec::with_capacity(self.combination_count());
        for &rep in &self.reps {
            for &level in &levels {
                for &alpha in &self.alphas {
                    for &num_cells in &self.num_cells {
                        for &cell_size in &cell_sizes {
                            for &sparse_freq in &sparse_freqs {
                                out.push(TrialParams {
                                    rep,
                                    alpha,
                                    num_cells,
                                    level,
                                    cell_size,
                                    sparse_freq,
                                });
                            }
                        }
                    }
                }
            }
        }
        out
    }
}

fn axis_or_none<T: Copy>(axis: &Option<Vec<T>>) -> Vec<Option<T>> {
    match axis {
        Some(values) => values.iter().copied().map(Some).collect(),
        None => vec![None],
    }
}

/// Outcome of one sweep run: the surviving table plus trial accounting.
#[derive(Clone, Debug)]
pub struct SweepOutcome {
    pub table: ResultTable,
    /// Total enumerated combinations.
    pub attempted: usize,
    /// Trials that failed and were dropped from the table.
    pub failed: usize,
}

/// Run every combination of `grid` against `img` on the supplied pool.
///
/// Trials are mutually independent pure functions of their own parameters
/// plus the shared read-only image; the only suspension point is the
/// collect barrier below. Per-trial failures are warned about and
/// excluded; they never abort the sweep.
pub fn run_sweep(
    pool: &rayon::ThreadPool,
    img: &PixelImage,
    reconstructor: &Reconstructor,
    grid: &SweepGrid,
) -> SweepOutcome {
    let trials = grid.enumerate();
    let attempted = trials.len();
    info!(
        "dispatching {attempted} trials ({} × {}, {} channel(s))",
        reconstructor.observation.name(),
        reconstructor.basis.name(),
        img.channels()
    );

    let results: Vec<Result<f64, _>> = pool.install(|| {
        trials
            .par_iter()
            .map(|params| {
                reconstructor
                    .reconstruct(img, params)
                    .map(|out| reconstruction_error(img, &out))
            })
            .collect()
    });

    let mut records = Vec::with_capacity(attempted);
    let mut failed = 0usize;
    for (params, result) in trials.into_iter().zip(results) {
        match result {
            Ok(error) => records.push(TrialRecord { params, error }),
            Err(err) => {
                failed += 1;
                warn!("trial skipped ({params:?}): {err}");
            }
        }
    }
    info!("sweep finished: {} rows, {failed} skipped", records.len());

    SweepOutcome {
        table: ResultTable::new(grid.columns(), records),
        attempted,
        failed,
    }
}

/// Append the searched value lists to a plain-text sweep manifest, one
/// block per run, so repeated sweeps into the same directory stay
/// auditable. `table_stem` is the result table's file stem, tying each
/// block to the CSV it describes.
pub fn append_manifest(path: &Path, table_stem: &str, grid: &SweepGrid) -> Result<(), String> {
    crate::image::io::ensure_parent_dir(path)?;
    let mut f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| format!("Failed to open manifest {}: {e}", path.display()))?;
    let mut block = format!("{table_stem}\n");
    block.push_str(&format!("   rep: {:?}\n", grid.reps));
    if let Some(levels) = &grid.levels {
        block.push_str(&format!("   lv: {levels:?}\n"));
    }
    block.push_str(&format!("   alp: {:?}\n", grid.alphas));
    let cells: Vec<String> = grid.num_cells.iter().map(|c| c.to_string()).collect();
    block.push_str(&format!("   num_cell: {cells:?}\n"));
    if let Some(cell_sizes) = &grid.cell_sizes {
        block.push_str(&format!("   cell_size: {cell_sizes:?}\n"));
    }
    if let Some(sparse_freqs) = &grid.sparse_freqs {
        block.push_str(&format!("   sparse_freq: {sparse_freqs:?}\n"));
    }
    block.push_str("\n\n");
    f.write_all(block.as_bytes())
        .map_err(|e| format!("Failed to append manifest {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cartesian_product_size_matches_axes() {
        let grid = SweepGrid {
            reps: (0..20).collect(),
            alphas: vec![0.1, 1.0],
            num_cells: vec![NumCells::Count(50), NumCells::Count(100)],
            ..Default::default()
        };
        assert_eq!(grid.combination_count(), 80);
        let trials = grid.enumerate();
        assert_eq!(trials.len(), 80);
        assert_eq!(grid.columns(), vec!["rep", "alp", "num_cell"]);
    }

    #[test]
    fn enumeration_order_is_nested_last_axis_fastest() {
        let grid = SweepGrid {
            reps: vec![0, 1],
            alphas: vec![0.1],
            num_cells: vec![NumCells::Count(5), NumCells::Count(6)],
            ..Default::default()
        };
        let trials = grid.enumerate();
        assert_eq!(trials[0].num_cells, NumCells::Count(5));
        assert_eq!(trials[1].num_cells, NumCells::Count(6));
        assert_eq!(trials[2].rep, 1, "rep is the outermost axis");
    }

    #[test]
    fn v1_dwt_grid_carries_all_columns() {
        let grid = SweepGrid {
            reps: vec![0],
            levels: Some(vec![1, 2]),
            alphas: vec![0.1],
            num_cells: vec![NumCells::Count(10)],
            cell_sizes: Some(vec![2, 4]),
            sparse_freqs: Some(vec![1.0]),
        };
        assert_eq!(
            grid.columns(),
            vec!["rep", "lv", "alp", "num_cell", "cell_size", "sparse_freq"]
        );
        assert_eq!(grid.combination_count(), 4);
        let trials = grid.enumerate();
        assert!(trials.iter().all(|t| t.level.is_some() && t.cell_size.is_some()));
    }
}
