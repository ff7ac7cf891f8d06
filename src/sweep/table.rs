//! Tabular sweep results and CSV persistence.

use crate::image::io::ensure_parent_dir;
use crate::reconstruct::TrialParams;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// One surviving trial: its hyperparameters paired with its error.
#[derive(Clone, Debug)]
pub struct TrialRecord {
    pub params: TrialParams,
    pub error: f64,
}

/// Result table keyed by hyperparameter columns plus `error`, in
/// enumeration order. Rows for failed trials are absent.
#[derive(Clone, Debug)]
pub struct ResultTable {
    columns: Vec<&'static str>,
    records: Vec<TrialRecord>,
}

impl ResultTable {
    pub fn new(columns: Vec<&'static str>, records: Vec<TrialRecord>) -> Self {
        Self { columns, records }
    }

    /// Hyperparameter column names (without the trailing `error`).
    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    /// Assemble the whole table as a CSV string.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();
        csv.push_str(&self.columns.join(","));
        csv.push_str(",error\n");
        for record in &self.records {
            for (i, col) in self.columns.iter().enumerate() {
                if i > 0 {
                    csv.push(',');
                }
                csv.push_str(&column_value(col, &record.params));
            }
            let _ = writeln!(csv, ",{:.6}", record.error);
        }
        csv
    }

    /// All-or-nothing persistence: the CSV is assembled in memory and
    /// written in a single call, so an aborted sweep leaves no partial
    /// file behind.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        ensure_parent_dir(path)?;
        fs::write(path, self.to_csv())
            .map_err(|e| format!("Failed to write results {}: {e}", path.display()))
    }
}

fn column_value(col: &str, p: &TrialParams) -> String {
    match col {
        "rep" => p.rep.to_string(),
        "lv" => p.level.map(|v| v.to_string()).unwrap_or_default(),
        "alp" => p.alpha.to_string(),
        "num_cell" => p.num_cells.to_string(),
        "cell_size" => p.cell_size.map(|v| v.to_string()).unwrap_or_default(),
        "sparse_freq" => p.sparse_freq.map(|v| v.to_string()).unwrap_or_default(),
        other => unreachable!("unknown result column '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::NumCells;

    #[test]
    fn csv_has_header_and_one_line_per_record() {
        let records = vec![
            TrialRecord {
                params: TrialParams {
                    rep: 0,
                    alpha: 0.1,
                    num_cells: NumCells::Count(50),
                    ..Default::default()
                },
                error: 12.5,
            },
            TrialRecord {
                params: TrialParams {
                    rep: 1,
                    alpha: 1.0,
                    num_cells: NumCells::Fraction(0.5),
                    ..Default::default()
                },
                error: 3.0,
            },
        ];
        let table = ResultTable::new(vec!["rep", "alp", "num_cell"], records);
        let csv = table.to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "rep,alp,num_cell,error");
        assert_eq!(lines[1], "0,0.1,50,12.500000");
        assert_eq!(lines[2], "1,1,0.5,3.000000");
        assert_eq!(lines.len(), 3);
    }
}
