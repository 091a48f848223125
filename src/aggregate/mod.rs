//! Per-repository aggregation of class metrics

mod stats;

pub use stats::{quantile, round3, DescriptiveStats};

use crate::ck::ClassTable;
use crate::models::{format_value, Metric};

/// One repository collapsed into descriptive statistics per metric.
#[derive(Debug, Clone, PartialEq)]
pub struct RepoAggregateRow {
    pub repo: String,
    pub total_classes: usize,
    /// One entry per `Metric::all()`, in that order
    pub stats: Vec<(Metric, DescriptiveStats)>,
}

impl RepoAggregateRow {
    /// Aggregate a repository's class table.
    ///
    /// Returns `None` when there is nothing to aggregate: no classes, or none
    /// of the metric columns were present.
    pub fn from_table(repo: &str, table: &ClassTable) -> Option<Self> {
        if table.is_empty() || table.metrics().is_empty() {
            return None;
        }
        let stats = Metric::all()
            .iter()
            .map(|&m| {
                let stats = if table.has_metric(m) {
                    DescriptiveStats::from_values(&table.values(m))
                } else {
                    DescriptiveStats::default()
                };
                (m, stats)
            })
            .collect();
        Some(Self {
            repo: repo.to_string(),
            total_classes: table.len(),
            stats,
        })
    }

    pub fn stats_for(&self, metric: Metric) -> Option<&DescriptiveStats> {
        self.stats.iter().find(|(m, _)| *m == metric).map(|(_, s)| s)
    }

    /// `repo, total_classes, cbo_mean, ..., lcom_q3`
    pub fn header() -> Vec<String> {
        let mut header = vec!["repo".to_string(), "total_classes".to_string()];
        for metric in Metric::all() {
            for field in DescriptiveStats::FIELDS {
                header.push(format!("{}_{}", metric.column(), field));
            }
        }
        header
    }

    pub fn to_record(&self) -> Vec<String> {
        let mut record = vec![self.repo.clone(), self.total_classes.to_string()];
        for metric in Metric::all() {
            let stats = self.stats_for(*metric).copied().unwrap_or_default();
            record.extend(stats.values().iter().map(|v| format_value(*v)));
        }
        record
    }

    pub fn preview_header() -> Vec<String> {
        let mut header = vec!["repo".to_string(), "total_classes".to_string()];
        header.extend(Metric::all().iter().map(|m| format!("{}_mean", m.column())));
        header
    }

    /// Repository, class count and the three means
    pub fn preview_record(&self) -> Vec<String> {
        let mut record = vec![self.repo.clone(), self.total_classes.to_string()];
        record.extend(
            Metric::all()
                .iter()
                .map(|m| format_value(self.stats_for(*m).and_then(|s| s.mean))),
        );
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClassMetricRow;

    fn row(cbo: Option<f64>, dit: Option<f64>) -> ClassMetricRow {
        ClassMetricRow {
            file: "A.java".into(),
            class: "A".into(),
            cbo,
            dit,
            ..Default::default()
        }
    }

    #[test]
    fn test_header_layout() {
        let header = RepoAggregateRow::header();
        assert_eq!(header.len(), 2 + 3 * 7);
        assert_eq!(&header[..4], &["repo", "total_classes", "cbo_mean", "cbo_median"]);
        assert_eq!(header[8], "cbo_q3");
        assert_eq!(header[9], "dit_mean");
        assert_eq!(header.last().unwrap(), "lcom_q3");
    }

    #[test]
    fn test_from_table() {
        let table = ClassTable::from_rows(
            vec![
                row(Some(1.0), Some(1.0)),
                row(Some(2.0), None),
                row(Some(3.0), Some(2.0)),
            ],
            vec![Metric::Cbo, Metric::Dit],
        );
        let agg = RepoAggregateRow::from_table("o/n", &table).unwrap();
        assert_eq!(agg.total_classes, 3);

        let cbo = agg.stats_for(Metric::Cbo).unwrap();
        assert_eq!(cbo.mean, Some(2.0));
        assert_eq!(cbo.q3, Some(2.5));
        let dit = agg.stats_for(Metric::Dit).unwrap();
        assert_eq!(dit.mean, Some(1.5));
        assert_eq!(agg.stats_for(Metric::Lcom).unwrap().mean, None);

        let record = agg.to_record();
        assert_eq!(record.len(), RepoAggregateRow::header().len());
        assert_eq!(&record[..4], &["o/n", "3", "2", "2"]);
        assert!(record[16..].iter().all(String::is_empty));

        assert_eq!(agg.preview_record(), vec!["o/n", "3", "2", "1.5", ""]);
    }

    #[test]
    fn test_empty_table_has_no_row() {
        let table = ClassTable::from_rows(vec![], vec![Metric::Cbo]);
        assert!(RepoAggregateRow::from_table("o/n", &table).is_none());
    }

    #[test]
    fn test_table_without_metrics_has_no_row() {
        let table = ClassTable::from_rows(vec![row(None, None)], vec![]);
        assert!(RepoAggregateRow::from_table("o/n", &table).is_none());
    }
}
