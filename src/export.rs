//! Export utilities for generated test cases
//!
//! Provides CSV and JSON renderings of a project. Both are pure string
//! producers; writing the file is the caller's job.

use crate::model::{Feature, ProjectDetail};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// CSV header row
pub const CSV_HEADER: &str = "Feature,Test ID,Title,Type,Description,Steps,Expected Result";

/// Separator placed between steps inside the Steps column
pub const STEP_SEPARATOR: &str = " | ";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("project '{0}' has no test cases to export")]
    NothingToExport(String),

    #[error("could not serialize project: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unknown export format '{}' (expected csv or json)", other)),
        }
    }
}

/// Quote a CSV field, doubling embedded quotes
fn quote_csv(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Render features as CSV, one row per test case
pub fn to_csv(features: &[Feature]) -> String {
    let mut lines = vec![CSV_HEADER.to_string()];

    for feature in features {
        for tc in &feature.test_cases {
            let row = [
                feature.feature_name.clone(),
                tc.id.to_string(),
                tc.title.clone(),
                tc.kind.to_string(),
                tc.description.clone(),
                tc.steps.join(STEP_SEPARATOR),
                tc.expected_result.clone(),
            ];
            let quoted: Vec<String> = row.iter().map(|cell| quote_csv(cell)).collect();
            lines.push(quoted.join(","));
        }
    }

    lines.join("\n")
}

/// Pretty-print the whole project (two-space indentation).
///
/// A project read from JSON is written back as received, key order and
/// unmodelled fields included.
pub fn to_json(project: &ProjectDetail) -> Result<String, ExportError> {
    match project.source() {
        Some(source) => Ok(serde_json::to_string_pretty(source)?),
        None => Ok(serde_json::to_string_pretty(project)?),
    }
}

fn whitespace_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

/// Download name for an export, e.g. `My_Project_test_cases.csv`
pub fn export_file_name(project_name: &str, format: ExportFormat) -> String {
    format!(
        "{}_test_cases.{}",
        whitespace_runs().replace_all(project_name, "_"),
        format.extension()
    )
}

/// Render a project in the given format.
///
/// Projects without any test case are refused, matching the client which
/// only offers export once something has been generated.
pub fn export_project(project: &ProjectDetail, format: ExportFormat) -> Result<String, ExportError> {
    if project.test_case_count() == 0 {
        return Err(ExportError::NothingToExport(project.project.name.clone()));
    }
    match format {
        ExportFormat::Csv => Ok(to_csv(&project.features)),
        ExportFormat::Json => to_json(project),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{timestamp, Project, TestCase, TestCaseType};

    fn login_feature() -> Feature {
        Feature {
            feature_name: "Login".to_string(),
            requirement_text: "Users log in".to_string(),
            test_cases: vec![TestCase {
                id: 1,
                title: "T".to_string(),
                kind: TestCaseType::Functional,
                description: "D".to_string(),
                steps: vec!["a".to_string(), "b".to_string()],
                expected_result: "R".to_string(),
            }],
        }
    }

    fn sample_project(features: Vec<Feature>) -> ProjectDetail {
        ProjectDetail::new(
            Project {
                id: 3,
                name: "My  Shop\tApp".to_string(),
                description: Some("Storefront".to_string()),
                requirement_text: None,
                created_at: timestamp::parse("2024-06-01T00:00:00Z").unwrap(),
                updated_at: None,
            },
            features,
        )
    }

    #[test]
    fn test_csv_exact_output() {
        let csv = to_csv(&[login_feature()]);
        assert_eq!(
            csv,
            "Feature,Test ID,Title,Type,Description,Steps,Expected Result\n\"Login\",\"1\",\"T\",\"functional\",\"D\",\"a | b\",\"R\""
        );
    }

    #[test]
    fn test_csv_header_only_when_empty() {
        assert_eq!(to_csv(&[]), CSV_HEADER);
    }

    #[test]
    fn test_csv_doubles_embedded_quotes() {
        let mut feature = login_feature();
        feature.test_cases[0].title = "Click \"Sign in\"".to_string();
        let csv = to_csv(&[feature]);
        assert!(csv.contains("\"Click \"\"Sign in\"\"\""));
    }

    #[test]
    fn test_json_is_pretty_with_two_spaces() {
        let project = sample_project(vec![login_feature()]);
        let json = to_json(&project).unwrap();
        assert!(json.starts_with("{\n  \"id\": 3,"));
        assert!(json.contains("\n  \"features\": ["));
        assert!(json.contains("\"type\": \"functional\""));

        let back: ProjectDetail = serde_json::from_str(&json).unwrap();
        assert_eq!(back, project);
    }

    #[test]
    fn test_json_reproduces_backend_payload() {
        let payload = r#"{
            "id": 7,
            "name": "Shop",
            "owner": {"id": 2, "username": "ada"},
            "description": null,
            "created_at": "2024-06-01T12:30:00.123456",
            "features": [{
                "feature_name": "Login",
                "requirement_text": "Users log in",
                "test_cases": [{
                    "id": 1, "project_id": 7, "title": "T", "type": "functional",
                    "description": "D", "steps": ["a"], "expected_result": "R",
                    "created_at": "2024-06-01T12:31:00"
                }]
            }]
        }"#;
        let project: ProjectDetail = serde_json::from_str(payload).unwrap();

        let json = export_project(&project, ExportFormat::Json).unwrap();
        let exported: serde_json::Value = serde_json::from_str(&json).unwrap();
        let received: serde_json::Value = serde_json::from_str(payload).unwrap();
        assert_eq!(exported, received);
        assert!(json.starts_with("{\n  \"id\": 7,\n  \"name\": \"Shop\",\n  \"owner\": {"));
        assert!(json.contains("\"created_at\": \"2024-06-01T12:30:00.123456\""));
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(
            export_file_name("My  Shop\tApp", ExportFormat::Csv),
            "My_Shop_App_test_cases.csv"
        );
        assert_eq!(export_file_name("Solo", ExportFormat::Json), "Solo_test_cases.json");
    }

    #[test]
    fn test_export_refuses_empty_project() {
        let empty = sample_project(vec![]);
        assert!(matches!(
            export_project(&empty, ExportFormat::Csv),
            Err(ExportError::NothingToExport(_))
        ));

        let full = sample_project(vec![login_feature()]);
        let csv = export_project(&full, ExportFormat::Csv).unwrap();
        assert!(csv.starts_with(CSV_HEADER));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("CSV".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert_eq!("json".parse::<ExportFormat>(), Ok(ExportFormat::Json));
        assert!("xml".parse::<ExportFormat>().is_err());
    }
}
