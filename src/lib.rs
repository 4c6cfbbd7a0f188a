//! casegen - client for the AI test case generator
//!
//! Manage projects, turn natural-language requirements into test cases,
//! browse them and export them.
//!
//! # Overview
//!
//! The backend does the generation. This crate is everything around it:
//! a typed REST client, an explicit session, and a pure list view-model
//! that answers "what does the screen show for this snapshot and these
//! parameters".
//!
//! # Test Case Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | `functional` | Happy path behavior |
//! | `negative` | Invalid input and error handling |
//! | `boundary` | Limits and edge values |
//! | `exploratory` | Unusual scenarios |
//!
//! # Quick Start
//!
//! ```
//! use casegen::{compute_feature_view, to_csv, FeatureParams, ProjectDetail, TypeFilter};
//!
//! let json = r#"{
//!     "id": 1, "name": "Shop", "created_at": "2024-06-01T00:00:00",
//!     "features": [{
//!         "feature_name": "Login",
//!         "requirement_text": "Users log in with email and password",
//!         "test_cases": [{
//!             "id": 1, "title": "Valid login", "type": "functional",
//!             "description": "Correct credentials", "steps": ["Open", "Submit"],
//!             "expected_result": "Dashboard shown"
//!         }]
//!     }]
//! }"#;
//! let project: ProjectDetail = serde_json::from_str(json).unwrap();
//!
//! let params = FeatureParams { search: "login".into(), filter: TypeFilter::All };
//! let view = compute_feature_view(&project.features, &params);
//! assert_eq!(view.total_test_cases, 1);
//!
//! let csv = to_csv(&view.visible);
//! assert!(csv.contains("\"Open | Submit\""));
//! ```

pub mod api;
pub mod config;
pub mod dialog;
pub mod error;
pub mod export;
pub mod forms;
pub mod logging;
pub mod model;
pub mod session;
pub mod state;
pub mod view;

pub use api::{Backend, HttpBackend};
pub use config::Config;
pub use dialog::{ConfirmDialog, ConfirmKind};
pub use error::{Error, Result};
pub use export::{export_file_name, export_project, to_csv, to_json, ExportError, ExportFormat};
pub use forms::{GenerateRequest, LoginForm, ProjectForm, SignupForm, SAMPLE_REQUIREMENTS};
pub use model::{
    Feature, GenerationResult, Project, ProjectDetail, TestCase, TestCaseType, Token, User,
};
pub use session::{log_in, restore_session, Session, SessionStore};
pub use state::{FeatureListMsg, FeatureListState, ProjectListMsg, ProjectListState};
pub use view::{
    compute_feature_view, compute_view, FeatureParams, FeatureView, ProjectStats, ProjectView,
    SortKey, TypeFilter, ViewParams, PAGE_SIZE,
};

// Re-export TS trait for downstream use
#[cfg(feature = "ts-rs")]
pub use ts_rs::TS;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_view_starts_on_first_page() {
        let params = ViewParams::default();
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, PAGE_SIZE);
        assert_eq!(params.sort, SortKey::CreatedDesc);
        assert!(params.search.is_empty());
        assert!(!Session::anonymous().is_authenticated());
    }
}
