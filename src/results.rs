use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::error::{FieldError, Result, ResultsError};

/// Sparsity row used for lines that carry no `sparsity=` token.
pub const BASELINE_SPARSITY: u32 = 0;

fn sparsity_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"sparsity=([0-9]+)").expect("valid regex"))
}

fn seed_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"seed=([0-9]+)").expect("valid regex"))
}

fn task_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"task=([0-9]+)").expect("valid regex"))
}

/// First `key=<digits>` match in the trimmed line, if any.
fn first_match<'a>(pattern: &Regex, line: &'a str) -> Option<&'a str> {
    pattern
        .captures(line.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn parse_digits<T: std::str::FromStr>(
    key: &'static str,
    digits: &str,
) -> std::result::Result<T, FieldError> {
    digits.parse().map_err(|_| FieldError::Overflow {
        key,
        digits: digits.to_string(),
    })
}

/// Sparsity level encoded in a run name, or `None` for an unsparsified run.
pub fn extract_sparsity(line: &str) -> std::result::Result<Option<u32>, FieldError> {
    first_match(sparsity_pattern(), line)
        .map(|digits| parse_digits("sparsity", digits))
        .transpose()
}

pub fn extract_seed(line: &str) -> std::result::Result<u64, FieldError> {
    let digits = first_match(seed_pattern(), line).ok_or(FieldError::Missing("seed"))?;
    parse_digits("seed", digits)
}

pub fn extract_task(line: &str) -> std::result::Result<u32, FieldError> {
    let digits = first_match(task_pattern(), line).ok_or(FieldError::Missing("task"))?;
    parse_digits("task", digits)
}

/// One parsed data line.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub sparsity: Option<u32>,
    pub task: u32,
    pub seed: u64,
    pub score: f64,
}

impl LogRecord {
    /// Parse a comma-separated record: field 1 is the run name, the
    /// second-to-last field is the best validation score.
    pub fn parse(raw: &str, line: usize) -> Result<Self> {
        let malformed = |reason: String| ResultsError::MalformedLine {
            line,
            reason,
            text: raw.to_string(),
        };

        let fields: Vec<&str> = raw.split(',').collect();
        if fields.len() < 2 {
            return Err(malformed(format!(
                "expected at least 2 comma-separated fields, found {}",
                fields.len()
            )));
        }

        let name = fields[1].trim();
        let score_field = fields[fields.len() - 2].trim();
        let score: f64 = score_field
            .parse()
            .map_err(|_| malformed(format!("score {:?} is not a number", score_field)))?;

        let field_err = |e: FieldError| malformed(e.to_string());
        let sparsity = extract_sparsity(name).map_err(field_err)?;
        let task = extract_task(name).map_err(field_err)?;
        let seed = extract_seed(name).map_err(field_err)?;

        Ok(Self {
            sparsity,
            task,
            seed,
            score,
        })
    }
}

/// Best validation score per (sparsity, task), with rows and columns kept
/// in first-appearance order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    seed: Option<u64>,
    rows: Vec<u32>,
    columns: Vec<u32>,
    cells: HashMap<(u32, u32), f64>,
    baseline_tasks: HashSet<u32>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate a results log. Line 0 is the header and is skipped; blank
    /// lines are ignored. The first error aborts the whole table.
    pub fn from_lines<I, S>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::new();

        for (index, raw) in lines.into_iter().enumerate().skip(1) {
            let raw = raw.as_ref();
            if raw.trim().is_empty() {
                continue;
            }
            let line = index + 1;
            let record = LogRecord::parse(raw, line)?;
            table.push(record, line)?;
        }

        debug!(
            seed = ?table.seed,
            rows = table.rows.len(),
            columns = table.columns.len(),
            cells = table.cells.len(),
            "aggregated results table"
        );
        Ok(table)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ResultsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_lines(text.lines())
    }

    /// Add one record, enforcing seed consistency and baseline exclusivity.
    /// An existing value at the same cell is overwritten.
    pub fn push(&mut self, record: LogRecord, line: usize) -> Result<()> {
        match self.seed {
            None => self.seed = Some(record.seed),
            Some(expected) if expected != record.seed => {
                return Err(ResultsError::SeedMismatch {
                    line,
                    expected,
                    found: record.seed,
                });
            }
            Some(_) => {}
        }

        let sparsity = match record.sparsity {
            Some(sparsity) => {
                if self.baseline_tasks.contains(&record.task) {
                    return Err(ResultsError::DuplicateBaselineTask {
                        line,
                        task: record.task,
                    });
                }
                sparsity
            }
            None => {
                if self.columns.contains(&record.task) {
                    return Err(ResultsError::DuplicateBaselineTask {
                        line,
                        task: record.task,
                    });
                }
                self.baseline_tasks.insert(record.task);
                BASELINE_SPARSITY
            }
        };

        self.insert(sparsity, record.task, record.score, line);
        Ok(())
    }

    fn insert(&mut self, sparsity: u32, task: u32, score: f64, line: usize) {
        if !self.rows.contains(&sparsity) {
            self.rows.push(sparsity);
        }
        if !self.columns.contains(&task) {
            self.columns.push(task);
        }
        if let Some(previous) = self.cells.insert((sparsity, task), score) {
            warn!(
                line,
                sparsity, task, previous, score, "overwriting existing result cell"
            );
        }
    }

    /// Seed shared by every line, `None` for an empty table.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Sparsity levels in first-appearance order.
    pub fn rows(&self) -> &[u32] {
        &self.rows
    }

    /// Task IDs in first-appearance order.
    pub fn columns(&self) -> &[u32] {
        &self.columns
    }

    pub fn get(&self, sparsity: u32, task: u32) -> Option<f64> {
        self.cells.get(&(sparsity, task)).copied()
    }

    /// Scores of one sparsity row, aligned with [`Self::columns`].
    pub fn row(&self, sparsity: u32) -> Vec<Option<f64>> {
        self.columns
            .iter()
            .map(|&task| self.get(sparsity, task))
            .collect()
    }

    /// Populated cells in row-major, first-appearance order.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32, f64)> + '_ {
        self.rows.iter().flat_map(move |&sparsity| {
            self.columns
                .iter()
                .filter_map(move |&task| self.get(sparsity, task).map(|s| (sparsity, task, s)))
        })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
