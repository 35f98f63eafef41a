use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::ExportError;
use crate::results::ResultTable;

/// One populated table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    pub sparsity: u32,
    pub task: u32,
    pub score: f64,
}

/// Serializable snapshot of a [`ResultTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub seed: Option<u64>,
    /// Sparsity levels in first-appearance order
    pub rows: Vec<u32>,
    /// Task IDs in first-appearance order
    pub columns: Vec<u32>,
    pub cells: Vec<CellRecord>,
}

impl From<&ResultTable> for TableSnapshot {
    fn from(table: &ResultTable) -> Self {
        Self {
            seed: table.seed(),
            rows: table.rows().to_vec(),
            columns: table.columns().to_vec(),
            cells: table
                .cells()
                .map(|(sparsity, task, score)| CellRecord {
                    sparsity,
                    task,
                    score,
                })
                .collect(),
        }
    }
}

/// The three aggregated tables behind one figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentTables {
    pub regular: TableSnapshot,
    pub weighted: TableSnapshot,
    pub supervised: TableSnapshot,
}

impl ExperimentTables {
    pub fn new(regular: &ResultTable, weighted: &ResultTable, supervised: &ResultTable) -> Self {
        Self {
            regular: regular.into(),
            weighted: weighted.into(),
            supervised: supervised.into(),
        }
    }

    /// Write all three tables as one pretty-printed JSON document.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush().map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, ExportError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn sample_table() -> ResultTable {
        ResultTable::from_lines([
            "id,name,best_val,final_val",
            "0,sparsity=10_task=3_seed=7,0.81,0.70",
            "1,sparsity=10_task=4_seed=7,0.77,0.71",
            "2,sparsity=50_task=3_seed=7,0.74,0.70",
        ])
        .unwrap()
    }

    #[test]
    fn test_experiment_tables_save_load() {
        let table = sample_table();
        let original = ExperimentTables::new(&table, &table, &table);

        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        original.save_json(path).unwrap();
        let loaded = ExperimentTables::load_json(path).unwrap();

        assert_eq!(loaded, original);
        assert_eq!(loaded.regular.rows, vec![10, 50]);
        assert_eq!(loaded.regular.cells.len(), 3);
    }

    #[test]
    fn test_load_reports_missing_file_and_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let missing = ExperimentTables::load_json(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(missing, ExportError::Io { .. }));

        let garbage = dir.path().join("tables.json");
        std::fs::write(&garbage, "{ not json").unwrap();
        let bad = ExperimentTables::load_json(&garbage).unwrap_err();
        assert!(matches!(bad, ExportError::Json(_)));
    }

    #[test]
    fn test_snapshot_json_format() {
        let table = sample_table();
        let snapshot = TableSnapshot::from(&table);

        let json = serde_json::to_string_pretty(&snapshot).unwrap();
        assert!(json.contains("\"seed\": 7"));
        assert!(json.contains("\"columns\""));
        assert!(json.contains("\"sparsity\": 50"));
    }
}
