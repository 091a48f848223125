//! Declared schema for CK's `class.csv`

use crate::models::{ClassMetricRow, Metric, TaggedClassRow};
use crate::tables::TableError;
use std::path::Path;

const REQUIRED: [&str; 2] = ["file", "class"];

/// The rows of one `class.csv`, restricted to identification and the kept metrics.
///
/// `file` and `class` must be present. `type` and each metric column are
/// optional; which metric columns existed is recorded once here so later
/// stages never probe the raw header again.
#[derive(Debug, Clone, Default)]
pub struct ClassTable {
    rows: Vec<ClassMetricRow>,
    metrics: Vec<Metric>,
    has_type: bool,
}

struct Columns {
    file: usize,
    class: usize,
    kind: Option<usize>,
    metrics: Vec<(Metric, usize)>,
}

impl ClassTable {
    pub fn load(path: &Path) -> Result<Self, TableError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|source| TableError::Csv {
                path: path.to_path_buf(),
                source,
            })?;

        let headers = rdr
            .headers()
            .map_err(|source| TableError::Csv {
                path: path.to_path_buf(),
                source,
            })?
            .clone();
        if headers.is_empty() {
            return Err(TableError::Empty {
                path: path.to_path_buf(),
            });
        }

        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let required: Vec<usize> = REQUIRED
            .iter()
            .map(|column| {
                find(column).ok_or_else(|| TableError::MissingColumn {
                    path: path.to_path_buf(),
                    column: column.to_string(),
                })
            })
            .collect::<Result<_, _>>()?;
        let columns = Columns {
            file: required[0],
            class: required[1],
            kind: find("type"),
            metrics: Metric::all()
                .iter()
                .filter_map(|m| find(m.column()).map(|i| (*m, i)))
                .collect(),
        };

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(|source| TableError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
            rows.push(columns.row(&record));
        }

        Ok(Self {
            rows,
            metrics: columns.metrics.iter().map(|(m, _)| *m).collect(),
            has_type: columns.kind.is_some(),
        })
    }

    pub fn from_rows(rows: Vec<ClassMetricRow>, metrics: Vec<Metric>) -> Self {
        Self {
            rows,
            metrics,
            has_type: true,
        }
    }

    pub fn rows(&self) -> &[ClassMetricRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Metric columns present in the source file, in `Metric::all()` order
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn has_metric(&self, metric: Metric) -> bool {
        self.metrics.contains(&metric)
    }

    /// Non-null values of one metric
    pub fn values(&self, metric: Metric) -> Vec<f64> {
        self.rows.iter().filter_map(|r| r.metric(metric)).collect()
    }

    /// Names of the columns that made it into this table
    pub fn available_columns(&self) -> Vec<&'static str> {
        let mut cols = vec!["file", "class"];
        if self.has_type {
            cols.push("type");
        }
        cols.extend(self.metrics.iter().map(|m| m.column()));
        cols
    }

    pub fn into_tagged(self, repo: &str) -> impl Iterator<Item = TaggedClassRow> + '_ {
        self.rows.into_iter().map(move |row| TaggedClassRow {
            row,
            repo: repo.to_string(),
        })
    }
}

impl Columns {
    fn row(&self, record: &csv::StringRecord) -> ClassMetricRow {
        let cell = |i: usize| record.get(i).map(str::trim).unwrap_or("");
        let mut row = ClassMetricRow {
            file: cell(self.file).to_string(),
            class: cell(self.class).to_string(),
            kind: self
                .kind
                .map(|i| cell(i))
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            ..Default::default()
        };
        for (metric, i) in &self.metrics {
            let value = parse_number(cell(*i));
            match metric {
                Metric::Cbo => row.cbo = value,
                Metric::Dit => row.dit = value,
                Metric::Lcom => row.lcom = value,
            }
        }
        row
    }
}

/// Blank, non-numeric and NaN cells are null
fn parse_number(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|v| !v.is_nan())
}
