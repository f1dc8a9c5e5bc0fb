//! Question datasets.
//!
//! The tutor reads local JSON-lines exports of ScienceQA, SciQ and the high
//! school MMLU configurations:
//!
//! ```text
//! <dir>/scienceqa.jsonl
//! <dir>/sciq.jsonl
//! <dir>/mmlu/<subject>.jsonl
//! ```
//!
//! Every dataset is optional. A missing file is logged and the tutor carries
//! on with whatever did load.

pub mod rows;

pub use rows::{choice_letter, MmluRow, SciqRow, ScienceQaRow};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use stemtutor_core::config::DatasetSettings;
use stemtutor_core::{AppError, AppResult};

pub const SCIENCEQA_FILE: &str = "scienceqa.jsonl";
pub const SCIQ_FILE: &str = "sciq.jsonl";
pub const MMLU_DIR: &str = "mmlu";

/// Read up to `limit` rows from a JSON-lines file. Malformed lines are skipped.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path, limit: Option<usize>) -> AppResult<Vec<T>> {
    let file = File::open(path)
        .map_err(|e| AppError::Dataset(format!("Failed to open {:?}: {}", path, e)))?;
    let reader = BufReader::new(file);
    let mut rows = Vec::new();

    for (line_no, bytes) in reader.split(b'\n').enumerate() {
        if limit.is_some_and(|max| rows.len() >= max) {
            break;
        }

        let bytes =
            bytes.map_err(|e| AppError::Dataset(format!("Failed to read {:?}: {}", path, e)))?;
        let line = match String::from_utf8(bytes) {
            Ok(line) => line,
            Err(e) => {
                tracing::debug!("Skipping non UTF-8 row {} in {:?}: {}", line_no + 1, path, e);
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str(&line) {
            Ok(row) => rows.push(row),
            Err(e) => tracing::debug!("Skipping malformed row {} in {:?}: {}", line_no + 1, path, e),
        }
    }

    Ok(rows)
}

fn load_optional<T: DeserializeOwned>(name: &str, path: &Path, limit: Option<usize>) -> Option<Vec<T>> {
    if !path.exists() {
        tracing::warn!("{} not found at {:?}, skipping", name, path);
        return None;
    }

    match read_jsonl(path, limit) {
        Ok(rows) => {
            tracing::info!("{}: {} questions loaded", name, rows.len());
            Some(rows)
        }
        Err(e) => {
            tracing::warn!("{} failed to load: {}", name, e);
            None
        }
    }
}

/// All loaded dataset rows.
#[derive(Debug, Clone, Default)]
pub struct DatasetCatalog {
    pub scienceqa: Option<Vec<ScienceQaRow>>,
    pub sciq: Option<Vec<SciqRow>>,
    /// MMLU rows per configuration, in configured order. Only loaded
    /// configurations appear.
    pub mmlu: Vec<(String, Vec<MmluRow>)>,
}

/// Row counts per dataset. `None` means the dataset is unavailable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetCounts {
    pub scienceqa: Option<usize>,
    pub sciq: Option<usize>,
    pub mmlu: Vec<(String, usize)>,
}

impl DatasetCatalog {
    /// Load every configured dataset from `dir`.
    pub fn load(dir: &Path, settings: &DatasetSettings) -> Self {
        tracing::info!("Loading datasets from {:?}", dir);

        let scienceqa = load_optional(
            "ScienceQA",
            &dir.join(SCIENCEQA_FILE),
            Some(settings.scienceqa_limit),
        );
        let sciq = load_optional("SciQ", &dir.join(SCIQ_FILE), Some(settings.sciq_limit));

        let mut mmlu = Vec::new();
        for subject in &settings.mmlu_subjects {
            let path = dir.join(MMLU_DIR).join(format!("{}.jsonl", subject));
            if let Some(mut rows) = load_optional::<MmluRow>(subject, &path, None) {
                for row in &mut rows {
                    if row.subject.is_empty() {
                        row.subject = subject.clone();
                    }
                }
                mmlu.push((subject.clone(), rows));
            }
        }

        Self {
            scienceqa,
            sciq,
            mmlu,
        }
    }

    pub fn counts(&self) -> DatasetCounts {
        DatasetCounts {
            scienceqa: self.scienceqa.as_ref().map(Vec::len),
            sciq: self.sciq.as_ref().map(Vec::len),
            mmlu: self
                .mmlu
                .iter()
                .map(|(subject, rows)| (subject.clone(), rows.len()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.scienceqa.is_none() && self.sciq.is_none() && self.mmlu.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_read_jsonl_skips_malformed_and_blank() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "sciq.jsonl",
            "{\"question\": \"q1\", \"correct_answer\": \"a1\"}\n\
             \n\
             not json\n\
             {\"question\": \"q2\", \"correct_answer\": \"a2\"}\n",
        );

        let rows: Vec<SciqRow> = read_jsonl(&temp.path().join("sciq.jsonl"), None).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].correct_answer, "a2");
    }

    #[test]
    fn test_read_jsonl_skips_invalid_utf8() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sciq.jsonl");
        let mut content = b"{\"question\": \"q1\", \"correct_answer\": \"a1\"}\n".to_vec();
        content.extend_from_slice(b"{\"question\": \"bad \xff\", \"correct_answer\": \"x\"}\n");
        content.extend_from_slice(b"{\"question\": \"q2\", \"correct_answer\": \"a2\"}\n");
        std::fs::write(&path, content).unwrap();

        let rows: Vec<SciqRow> = read_jsonl(&path, None).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].question, "q1");
        assert_eq!(rows[1].question, "q2");

        let catalog = DatasetCatalog::load(temp.path(), &DatasetSettings::default());
        assert_eq!(catalog.counts().sciq, Some(2));
    }

    #[test]
    fn test_read_jsonl_limit() {
        let temp = TempDir::new().unwrap();
        let content: String = (0..10)
            .map(|i| format!("{{\"question\": \"q{}\", \"correct_answer\": \"a\"}}\n", i))
            .collect();
        write(temp.path(), "sciq.jsonl", &content);

        let rows: Vec<SciqRow> = read_jsonl(&temp.path().join("sciq.jsonl"), Some(3)).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].question, "q2");
    }

    #[test]
    fn test_read_jsonl_missing_file() {
        let result: AppResult<Vec<SciqRow>> = read_jsonl(Path::new("/nonexistent/x.jsonl"), None);
        assert!(matches!(result, Err(AppError::Dataset(_))));
    }

    #[test]
    fn test_catalog_load_partial() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "scienceqa.jsonl",
            "{\"question\": \"Which is a mammal?\", \"choices\": [\"frog\", \"whale\"], \"answer\": 1}\n",
        );
        write(
            temp.path(),
            "mmlu/high_school_physics.jsonl",
            "{\"question\": \"Unit of force?\", \"choices\": [\"N\", \"J\"], \"answer\": 0}\n",
        );

        let catalog = DatasetCatalog::load(temp.path(), &DatasetSettings::default());
        let counts = catalog.counts();

        assert_eq!(counts.scienceqa, Some(1));
        assert_eq!(counts.sciq, None);
        assert_eq!(counts.mmlu, vec![("high_school_physics".to_string(), 1)]);
        assert_eq!(catalog.mmlu[0].1[0].subject, "high_school_physics");
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_catalog_load_empty_dir() {
        let temp = TempDir::new().unwrap();
        let catalog = DatasetCatalog::load(temp.path(), &DatasetSettings::default());
        assert!(catalog.is_empty());
    }
}
