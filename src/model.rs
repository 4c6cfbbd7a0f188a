//! Wire and domain types for the test case generator
//!
//! These mirror the JSON payloads the backend returns. A project owns
//! features, a feature owns its generated test cases. Features are keyed by
//! name inside a project; there is no surrogate id.

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "ts-rs")]
use ts_rs::TS;

// =============================================================================
// Test case types - closed set
// =============================================================================

/// Testing intent of a generated test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-rs", derive(TS))]
#[serde(rename_all = "lowercase")]
pub enum TestCaseType {
    Functional,
    Negative,
    Boundary,
    Exploratory,
}

impl TestCaseType {
    /// All types in display order
    pub const ALL: [TestCaseType; 4] = [
        TestCaseType::Functional,
        TestCaseType::Negative,
        TestCaseType::Boundary,
        TestCaseType::Exploratory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TestCaseType::Functional => "functional",
            TestCaseType::Negative => "negative",
            TestCaseType::Boundary => "boundary",
            TestCaseType::Exploratory => "exploratory",
        }
    }
}

impl fmt::Display for TestCaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestCaseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        TestCaseType::ALL
            .into_iter()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| {
                format!(
                    "unknown test case type '{}' (expected one of: functional, negative, boundary, exploratory)",
                    s
                )
            })
    }
}

// =============================================================================
// Entities
// =============================================================================

/// One generated test scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-rs", derive(TS))]
pub struct TestCase {
    pub id: i32,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: TestCaseType,
    pub description: String,
    pub steps: Vec<String>,
    pub expected_result: String,
}

/// A named requirement and the test cases generated from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-rs", derive(TS))]
pub struct Feature {
    pub feature_name: String,
    pub requirement_text: String,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
}

/// Project as listed on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-rs", derive(TS))]
pub struct Project {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement_text: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    #[cfg_attr(feature = "ts-rs", ts(type = "string"))]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        deserialize_with = "timestamp::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    #[cfg_attr(feature = "ts-rs", ts(type = "string | null"))]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Project with its features, as returned by the read-by-id endpoint.
///
/// When read from JSON the payload is kept as received, so a JSON export
/// reproduces it exactly, fields these types do not model included.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "ts-rs", derive(TS))]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub features: Vec<Feature>,
    #[serde(skip)]
    #[cfg_attr(feature = "ts-rs", ts(skip))]
    source: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ProjectDetailFields {
    #[serde(flatten)]
    project: Project,
    #[serde(default)]
    features: Vec<Feature>,
}

impl<'de> Deserialize<'de> for ProjectDetail {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let source = serde_json::Value::deserialize(deserializer)?;
        let fields = ProjectDetailFields::deserialize(&source).map_err(de::Error::custom)?;
        Ok(ProjectDetail {
            project: fields.project,
            features: fields.features,
            source: Some(source),
        })
    }
}

/// Equality covers the typed content; the kept payload is not compared
impl PartialEq for ProjectDetail {
    fn eq(&self, other: &Self) -> bool {
        self.project == other.project && self.features == other.features
    }
}

impl ProjectDetail {
    pub fn new(project: Project, features: Vec<Feature>) -> Self {
        Self {
            project,
            features,
            source: None,
        }
    }

    /// The JSON this project was read from, if any
    pub fn source(&self) -> Option<&serde_json::Value> {
        self.source.as_ref()
    }

    /// Look up a feature by its name
    pub fn feature(&self, name: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.feature_name == name)
    }

    /// Total test cases across all features
    pub fn test_case_count(&self) -> usize {
        self.features.iter().map(|f| f.test_cases.len()).sum()
    }
}

/// The authenticated account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-rs", derive(TS))]
pub struct User {
    pub id: i32,
    pub email: String,
    pub username: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    #[cfg_attr(feature = "ts-rs", ts(type = "string"))]
    pub created_at: DateTime<Utc>,
}

/// Bearer token issued by the login endpoint
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Result of a generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-rs", derive(TS))]
pub struct GenerationResult {
    pub test_cases_count: usize,
    pub feature_name: String,
}

// =============================================================================
// Timestamps
// =============================================================================

/// Lenient timestamp parsing.
///
/// The backend emits naive UTC datetimes (`2024-01-01T10:00:00.123456`),
/// snapshots written by this crate carry RFC 3339. Bare dates are accepted
/// as midnight UTC.
pub mod timestamp {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn parse(s: &str) -> Option<DateTime<Utc>> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = s.parse::<NaiveDateTime>() {
            return Some(naive.and_utc());
        }
        s.parse::<NaiveDate>()
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", raw)))
    }

    pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", raw))),
        }
    }
}
