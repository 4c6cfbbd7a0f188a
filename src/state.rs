//! Screen state and the messages that change it
//!
//! The view-model in `view.rs` is a pure function of (data, parameters).
//! This module owns the parameters. Every change goes through a message and
//! a single `update` method, so the "reset to page 1 when the search or sort
//! changes" policy lives in exactly one place and is explicit.

use crate::model::{Feature, Project};
use crate::view::{
    self, FeatureParams, FeatureView, ProjectView, SortKey, TypeFilter, ViewParams, PAGE_SIZE,
};
use std::collections::HashMap;

// =============================================================================
// Project list (dashboard)
// =============================================================================

/// User actions on the project list
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectListMsg {
    SetSearch(String),
    ClearSearch,
    SetSort(SortKey),
    NextPage,
    PrevPage,
    GoToPage(usize),
}

/// Dashboard parameters. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectListState {
    params: ViewParams,
}

impl Default for ProjectListState {
    fn default() -> Self {
        Self::with_page_size(PAGE_SIZE)
    }
}

impl ProjectListState {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            params: ViewParams {
                page_size: page_size.max(1),
                ..ViewParams::default()
            },
        }
    }

    pub fn params(&self) -> &ViewParams {
        &self.params
    }

    pub fn page(&self) -> usize {
        self.params.page
    }

    /// Apply a message. Page moves are clamped against `projects`.
    pub fn update(&mut self, msg: ProjectListMsg, projects: &[Project]) {
        match msg {
            ProjectListMsg::SetSearch(term) => {
                self.params.search = term;
                self.params.page = 1;
            }
            ProjectListMsg::ClearSearch => {
                self.params.search.clear();
                self.params.page = 1;
            }
            ProjectListMsg::SetSort(sort) => {
                self.params.sort = sort;
                self.params.page = 1;
            }
            ProjectListMsg::NextPage => {
                let total = self.total_pages(projects);
                self.params.page = view::clamp_page(self.params.page + 1, total);
            }
            ProjectListMsg::PrevPage => {
                let total = self.total_pages(projects);
                self.params.page = view::clamp_page(self.params.page.saturating_sub(1), total);
            }
            ProjectListMsg::GoToPage(page) => {
                let total = self.total_pages(projects);
                self.params.page = view::clamp_page(page, total);
            }
        }
    }

    fn total_pages(&self, projects: &[Project]) -> usize {
        let filtered = view::filter_projects(projects, &self.params.search);
        view::total_pages(filtered.len(), self.params.page_size)
    }

    /// Recompute the visible page for the current data
    pub fn view(&self, projects: &[Project]) -> ProjectView {
        view::compute_view(projects, &self.params)
    }
}

// =============================================================================
// Feature list (project detail)
// =============================================================================

/// User actions on the project detail screen
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureListMsg {
    SetSearch(String),
    ClearSearch,
    SetFilter(TypeFilter),
    ToggleFeature(String),
}

/// Project detail parameters plus which feature sections are expanded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureListState {
    params: FeatureParams,
    expanded: HashMap<String, bool>,
}

impl FeatureListState {
    /// Fresh state with every feature expanded
    pub fn for_features(features: &[Feature]) -> Self {
        Self {
            params: FeatureParams::default(),
            expanded: features
                .iter()
                .map(|f| (f.feature_name.clone(), true))
                .collect(),
        }
    }

    pub fn params(&self) -> &FeatureParams {
        &self.params
    }

    pub fn update(&mut self, msg: FeatureListMsg) {
        match msg {
            FeatureListMsg::SetSearch(term) => self.params.search = term,
            FeatureListMsg::ClearSearch => self.params.search.clear(),
            FeatureListMsg::SetFilter(filter) => self.params.filter = filter,
            FeatureListMsg::ToggleFeature(name) => {
                let entry = self.expanded.entry(name).or_insert(false);
                *entry = !*entry;
            }
        }
    }

    /// Unknown features (e.g. generated after this state was built) are collapsed
    pub fn is_expanded(&self, feature_name: &str) -> bool {
        self.expanded.get(feature_name).copied().unwrap_or(false)
    }

    pub fn view(&self, features: &[Feature]) -> FeatureView {
        view::compute_feature_view(features, &self.params)
    }

    pub fn summary(&self, features: &[Feature]) -> Option<String> {
        let total = self.view(features).total_test_cases;
        view::results_summary(total, &self.params.search, self.params.filter)
    }
}
