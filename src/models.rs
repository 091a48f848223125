//! Core data models for ck-harvest
//!
//! These records flow between the pipeline stages: discovery produces
//! `RepositoryRecord`s, extraction reads `RepoRef`s back from a table and
//! produces `ClassMetricRow`s from the CK output.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A repository matched by the search query.
///
/// Field order is the persisted column order of `repositories.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub name: String,
    pub owner: String,
    pub url: String,
    pub stars: u64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "pushedAt")]
    pub pushed_at: DateTime<Utc>,
    #[serde(rename = "defaultBranch")]
    pub default_branch: Option<String>,
    /// Release count, 0 when the API returns none
    pub releases: u64,
}

impl RepositoryRecord {
    pub fn repo_ref(&self) -> RepoRef {
        RepoRef {
            owner: self.owner.clone(),
            name: self.name.clone(),
            url: self.url.clone(),
        }
    }
}

/// The part of a repository record the extraction pipeline needs.
///
/// Deserializes from any table carrying `owner`, `name` and `url` columns;
/// other columns are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
    pub url: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            url: url.into(),
        }
    }

    /// `owner/name`, the tag written next to every metric row
    pub fn id(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Filesystem-safe directory name for this repository's scratch tree
    pub fn dir_name(&self) -> String {
        let sanitize = |s: &str| -> String {
            s.chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                        c
                    } else {
                        '_'
                    }
                })
                .collect()
        };
        format!("{}__{}", sanitize(&self.owner), sanitize(&self.name))
    }

    /// Parse `https://github.com/<owner>/<name>[.git][/]`.
    pub fn from_github_url(url: &str) -> Option<Self> {
        static GITHUB_URL: OnceLock<Regex> = OnceLock::new();
        let re = GITHUB_URL.get_or_init(|| {
            Regex::new(r"^(?:https?://)?(?:www\.)?github\.com/([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+?)(?:\.git)?/?$")
                .expect("valid regex")
        });
        let url = url.trim();
        let caps = re.captures(url)?;
        let owner = caps.get(1)?.as_str();
        let name = caps.get(2)?.as_str();
        let canonical = format!("https://github.com/{}/{}", owner, name);
        Some(Self::new(owner, name, canonical))
    }
}

/// The three CK metrics this pipeline keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    /// Coupling between objects
    Cbo,
    /// Depth of inheritance tree
    Dit,
    /// Lack of cohesion of methods
    Lcom,
}

impl Metric {
    pub fn all() -> &'static [Metric] {
        &[Metric::Cbo, Metric::Dit, Metric::Lcom]
    }

    /// Column name in CK's `class.csv` and prefix in aggregate tables
    pub fn column(&self) -> &'static str {
        match self {
            Metric::Cbo => "cbo",
            Metric::Dit => "dit",
            Metric::Lcom => "lcom",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.column().to_uppercase())
    }
}

/// One analyzed class from CK's `class.csv`, restricted to the kept columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassMetricRow {
    pub file: String,
    pub class: String,
    /// CK's `type` column (class, interface, enum, ...)
    pub kind: Option<String>,
    pub cbo: Option<f64>,
    pub dit: Option<f64>,
    pub lcom: Option<f64>,
}

impl ClassMetricRow {
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Cbo => self.cbo,
            Metric::Dit => self.dit,
            Metric::Lcom => self.lcom,
        }
    }
}

/// A class row tagged with its owning repository, as written by per-class mode.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedClassRow {
    pub row: ClassMetricRow,
    pub repo: String,
}

impl TaggedClassRow {
    pub const HEADER: [&'static str; 7] = ["file", "class", "type", "cbo", "dit", "lcom", "repo"];

    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.row.file.clone(),
            self.row.class.clone(),
            self.row.kind.clone().unwrap_or_default(),
            format_value(self.row.cbo),
            format_value(self.row.dit),
            format_value(self.row.lcom),
            self.repo.clone(),
        ]
    }
}

/// Render an optional number for a CSV cell; null becomes an empty cell.
pub fn format_value(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_ref_from_github_url() {
        let r = RepoRef::from_github_url("https://github.com/spring-projects/spring-petclinic").unwrap();
        assert_eq!(r.owner, "spring-projects");
        assert_eq!(r.name, "spring-petclinic");
        assert_eq!(r.id(), "spring-projects/spring-petclinic");

        let r = RepoRef::from_github_url("github.com/apache/commons-lang.git/").unwrap();
        assert_eq!(r.id(), "apache/commons-lang");
        assert_eq!(r.url, "https://github.com/apache/commons-lang");

        assert!(RepoRef::from_github_url("https://gitlab.com/a/b").is_none());
        assert!(RepoRef::from_github_url("https://github.com/only-owner").is_none());
        assert!(RepoRef::from_github_url("").is_none());
    }

    #[test]
    fn test_dir_name_is_filesystem_safe() {
        let r = RepoRef::new("we ird", "na/me", "https://example.invalid");
        assert_eq!(r.dir_name(), "we_ird__na_me");
    }

    #[test]
    fn test_metric_columns() {
        let cols: Vec<_> = Metric::all().iter().map(|m| m.column()).collect();
        assert_eq!(cols, vec!["cbo", "dit", "lcom"]);
        assert_eq!(Metric::Lcom.to_string(), "LCOM");
    }

    #[test]
    fn test_tagged_row_record() {
        let tagged = TaggedClassRow {
            row: ClassMetricRow {
                file: "/src/A.java".into(),
                class: "a.A".into(),
                kind: Some("class".into()),
                cbo: Some(3.0),
                dit: Some(1.0),
                lcom: None,
            },
            repo: "o/n".into(),
        };
        assert_eq!(
            tagged.to_record(),
            vec!["/src/A.java", "a.A", "class", "3", "1", "", "o/n"]
        );
    }

    #[test]
    fn test_repository_record_serializes_in_column_order() {
        let record = RepositoryRecord {
            name: "n".into(),
            owner: "o".into(),
            url: "https://github.com/o/n".into(),
            stars: 10,
            created_at: "2020-01-01T00:00:00Z".parse().unwrap(),
            pushed_at: "2024-05-06T07:08:09Z".parse().unwrap(),
            default_branch: None,
            releases: 2,
        };
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.serialize(&record).unwrap();
        let out = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        let mut lines = out.lines();
        assert_eq!(
            lines.next().unwrap(),
            "name,owner,url,stars,createdAt,pushedAt,defaultBranch,releases"
        );
        assert_eq!(
            lines.next().unwrap(),
            "n,o,https://github.com/o/n,10,2020-01-01T00:00:00Z,2024-05-06T07:08:09Z,,2"
        );
        assert_eq!(record.repo_ref().id(), "o/n");
    }
}
