//! List view-model (Functional Core)
//!
//! Derives what a screen shows from an already-fetched snapshot and the
//! user's view parameters. Everything here is a pure function:
//! - inputs are borrowed, never mutated
//! - outputs are fresh collections
//! - no I/O, no clocks, no global state
//!
//! Callers (see `state.rs`) decide *when* to recompute and when to reset the
//! page; this module only decides *what* the result is.

use crate::model::{Feature, Project, TestCase, TestCaseType};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Projects shown per dashboard page
pub const PAGE_SIZE: usize = 9;

// =============================================================================
// View parameters
// =============================================================================

/// Ordering of the project list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Newest first
    #[default]
    CreatedDesc,
    /// Oldest first
    CreatedAsc,
    NameAsc,
    NameDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::CreatedDesc,
        SortKey::CreatedAsc,
        SortKey::NameAsc,
        SortKey::NameDesc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::CreatedDesc => "date-desc",
            SortKey::CreatedAsc => "date-asc",
            SortKey::NameAsc => "name-asc",
            SortKey::NameDesc => "name-desc",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date-desc" | "created-desc" | "newest" => Ok(SortKey::CreatedDesc),
            "date-asc" | "created-asc" | "oldest" => Ok(SortKey::CreatedAsc),
            "name-asc" | "name" => Ok(SortKey::NameAsc),
            "name-desc" => Ok(SortKey::NameDesc),
            other => Err(format!(
                "unknown sort key '{}' (expected date-desc, date-asc, name-asc or name-desc)",
                other
            )),
        }
    }
}

/// Test case type filter for the feature list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(TestCaseType),
}

impl TypeFilter {
    pub fn matches(&self, test_case: &TestCase) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(kind) => test_case.kind == *kind,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, TypeFilter::All)
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeFilter::All => f.write_str("all"),
            TypeFilter::Only(kind) => write!(f, "{}", kind),
        }
    }
}

impl FromStr for TypeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(TypeFilter::All);
        }
        s.parse::<TestCaseType>().map(TypeFilter::Only)
    }
}

/// Parameters for the project list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewParams {
    pub search: String,
    pub sort: SortKey,
    /// 1-based
    pub page: usize,
    pub page_size: usize,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort: SortKey::default(),
            page: 1,
            page_size: PAGE_SIZE,
        }
    }
}

/// Parameters for the feature/test case list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureParams {
    pub search: String,
    pub filter: TypeFilter,
}

// =============================================================================
// Project list
// =============================================================================

/// Derived project list
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectView {
    pub visible: Vec<Project>,
    pub total_filtered: usize,
    pub total_pages: usize,
}

fn contains_lower(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Filter projects by search term (name or description, case-insensitive)
pub fn filter_projects(projects: &[Project], search: &str) -> Vec<Project> {
    if search.is_empty() {
        return projects.to_vec();
    }
    let needle = search.to_lowercase();
    projects
        .iter()
        .filter(|p| {
            contains_lower(&p.name, &needle)
                || p.description
                    .as_ref()
                    .map(|d| contains_lower(d, &needle))
                    .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Primary collation key: canonical decomposition with combining marks
/// removed, lowercased. `"Émile"` keys as `"emile"`.
fn collation_key(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Collation for display names.
///
/// Accents and case are ignored first, so `"Émile"` sorts with the e's.
/// Ties fall back to the accented form after the plain one, then lowercase
/// before uppercase. Distinct strings never compare equal.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| b.cmp(a))
}

/// Stable sort; equal keys keep their input order
pub fn sort_projects(projects: &[Project], sort: SortKey) -> Vec<Project> {
    let mut sorted = projects.to_vec();
    match sort {
        SortKey::CreatedDesc => sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::CreatedAsc => sorted.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortKey::NameAsc => sorted.sort_by(|a, b| locale_cmp(&a.name, &b.name)),
        SortKey::NameDesc => sorted.sort_by(|a, b| locale_cmp(&b.name, &a.name)),
    }
    sorted
}

/// Number of pages for `count` items, never less than 1
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1)).max(1)
}

/// Clamp a requested page into `[1, total_pages]`
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// Slice out one 1-based page. Out-of-range pages yield an empty page.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Vec<T> {
    if page == 0 {
        return Vec::new();
    }
    let size = page_size.max(1);
    let start = (page - 1).saturating_mul(size);
    if start >= items.len() {
        return Vec::new();
    }
    let end = start.saturating_add(size).min(items.len());
    items[start..end].to_vec()
}

/// Filter, sort and paginate the project list in one pass
pub fn compute_view(projects: &[Project], params: &ViewParams) -> ProjectView {
    let filtered = filter_projects(projects, &params.search);
    let sorted = sort_projects(&filtered, params.sort);
    ProjectView {
        visible: paginate(&sorted, params.page, params.page_size),
        total_filtered: sorted.len(),
        total_pages: total_pages(sorted.len(), params.page_size),
    }
}

// =============================================================================
// Feature / test case list
// =============================================================================

/// Derived feature list
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureView {
    pub visible: Vec<Feature>,
    pub total_test_cases: usize,
}

fn test_case_matches(test_case: &TestCase, needle_lower: &str) -> bool {
    contains_lower(&test_case.title, needle_lower)
        || contains_lower(&test_case.description, needle_lower)
        || contains_lower(&test_case.expected_result, needle_lower)
        || test_case
            .steps
            .iter()
            .any(|step| contains_lower(step, needle_lower))
}

/// Apply type filter, then search, to every feature.
///
/// A search hit on the feature name or requirement keeps all of the
/// feature's type-filtered test cases. Otherwise only matching test cases
/// stay. Features left empty are dropped.
pub fn compute_feature_view(features: &[Feature], params: &FeatureParams) -> FeatureView {
    let needle = params.search.to_lowercase();

    let visible: Vec<Feature> = features
        .iter()
        .filter_map(|feature| {
            let by_type: Vec<&TestCase> = feature
                .test_cases
                .iter()
                .filter(|tc| params.filter.matches(tc))
                .collect();

            let kept: Vec<TestCase> = if needle.is_empty()
                || contains_lower(&feature.feature_name, &needle)
                || contains_lower(&feature.requirement_text, &needle)
            {
                by_type.into_iter().cloned().collect()
            } else {
                by_type
                    .into_iter()
                    .filter(|tc| test_case_matches(tc, &needle))
                    .cloned()
                    .collect()
            };

            if kept.is_empty() {
                None
            } else {
                Some(Feature {
                    feature_name: feature.feature_name.clone(),
                    requirement_text: feature.requirement_text.clone(),
                    test_cases: kept,
                })
            }
        })
        .collect();

    let total_test_cases = visible.iter().map(|f| f.test_cases.len()).sum();
    FeatureView {
        visible,
        total_test_cases,
    }
}

// =============================================================================
// Aggregates
// =============================================================================

/// Header counts for a project
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectStats {
    pub features: usize,
    pub test_cases: usize,
    pub by_type: BTreeMap<TestCaseType, usize>,
}

impl ProjectStats {
    pub fn count(&self, kind: TestCaseType) -> usize {
        self.by_type.get(&kind).copied().unwrap_or(0)
    }
}

pub fn project_stats(features: &[Feature]) -> ProjectStats {
    let mut stats = ProjectStats {
        features: features.len(),
        ..Default::default()
    };
    for tc in features.iter().flat_map(|f| &f.test_cases) {
        stats.test_cases += 1;
        *stats.by_type.entry(tc.kind).or_insert(0) += 1;
    }
    stats
}

/// Per-type counts for one feature, canonical order, zero counts omitted
pub fn type_distribution(feature: &Feature) -> Vec<(TestCaseType, usize)> {
    TestCaseType::ALL
        .into_iter()
        .map(|kind| {
            let count = feature.test_cases.iter().filter(|tc| tc.kind == kind).count();
            (kind, count)
        })
        .filter(|(_, count)| *count > 0)
        .collect()
}

/// "N test case(s)" with the right plural
pub fn pluralize_test_cases(count: usize) -> String {
    format!("{} test case{}", count, if count == 1 { "" } else { "s" })
}

/// Results line shown while a search or type filter is active
pub fn results_summary(total: usize, search: &str, filter: TypeFilter) -> Option<String> {
    if search.is_empty() && filter.is_all() {
        return None;
    }
    let mut summary = format!("Showing {}", pluralize_test_cases(total));
    if !search.is_empty() {
        summary.push_str(&format!(" matching \"{}\"", search));
    }
    if let TypeFilter::Only(kind) = filter {
        summary.push_str(&format!(" of type \"{}\"", kind));
    }
    Some(summary)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::timestamp;

    fn project(id: i32, name: &str, description: Option<&str>, created: &str) -> Project {
        Project {
            id,
            name: name.to_string(),
            description: description.map(|s| s.to_string()),
            requirement_text: None,
            created_at: timestamp::parse(created).unwrap(),
            updated_at: None,
        }
    }

    fn test_case(id: i32, title: &str, kind: TestCaseType, steps: &[&str]) -> TestCase {
        TestCase {
            id,
            title: title.to_string(),
            kind,
            description: format!("{} description", title),
            steps: steps.iter().map(|s| s.to_string()).collect(),
            expected_result: "It works".to_string(),
        }
    }

    fn feature(name: &str, requirement: &str, cases: Vec<TestCase>) -> Feature {
        Feature {
            feature_name: name.to_string(),
            requirement_text: requirement.to_string(),
            test_cases: cases,
        }
    }

    fn names(projects: &[Project]) -> Vec<&str> {
        projects.iter().map(|p| p.name.as_str()).collect()
    }

    // --- Project list ---

    #[test]
    fn test_zeta_alpha_ordering() {
        let projects = vec![
            project(1, "Zeta", None, "2024-01-01"),
            project(2, "Alpha", None, "2024-06-01"),
        ];

        let by_name = sort_projects(&projects, SortKey::NameAsc);
        assert_eq!(names(&by_name), vec!["Alpha", "Zeta"]);

        // Alpha is newer, so it leads the newest-first order
        let newest = sort_projects(&projects, SortKey::CreatedDesc);
        assert_eq!(names(&newest), vec!["Alpha", "Zeta"]);

        let oldest = sort_projects(&projects, SortKey::CreatedAsc);
        assert_eq!(names(&oldest), vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn test_sort_is_stable_on_equal_dates() {
        let projects = vec![
            project(1, "B", None, "2024-01-01"),
            project(2, "A", None, "2024-01-01"),
            project(3, "C", None, "2024-01-01"),
        ];
        let sorted = sort_projects(&projects, SortKey::CreatedDesc);
        let ids: Vec<i32> = sorted.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_locale_cmp_case_insensitive() {
        assert_eq!(locale_cmp("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_cmp("Zoo", "alpha"), Ordering::Greater);
        assert_eq!(locale_cmp("a", "A"), Ordering::Less);
        assert_eq!(locale_cmp("A", "a"), Ordering::Greater);
        assert_eq!(locale_cmp("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_accented_names_sort_with_their_base_letter() {
        let names = ["Zeta", "Émile", "eve", "Ångström", "Bob"];
        let projects: Vec<Project> = names
            .iter()
            .enumerate()
            .map(|(i, name)| project(i as i32 + 1, name, None, "2024-01-01"))
            .collect();

        let sorted: Vec<String> = sort_projects(&projects, SortKey::NameAsc)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(sorted, vec!["Ångström", "Bob", "Émile", "eve", "Zeta"]);

        assert_eq!(locale_cmp("Zeta", "Émile"), Ordering::Greater);
        assert_eq!(locale_cmp("e", "é"), Ordering::Less);
        assert_eq!(locale_cmp("é", "e"), Ordering::Greater);
    }

    #[test]
    fn test_filter_projects_by_name_or_description() {
        let projects = vec![
            project(1, "Checkout flow", None, "2024-01-01"),
            project(2, "Admin", Some("Back office CHECKOUT tools"), "2024-01-02"),
            project(3, "Search", Some("Product search"), "2024-01-03"),
        ];

        let hits = filter_projects(&projects, "checkout");
        assert_eq!(names(&hits), vec!["Checkout flow", "Admin"]);

        assert_eq!(filter_projects(&projects, "").len(), 3);
        assert!(filter_projects(&projects, "zzz").is_empty());
    }

    #[test]
    fn test_pagination_math() {
        assert_eq!(total_pages(0, 9), 1);
        assert_eq!(total_pages(9, 9), 1);
        assert_eq!(total_pages(10, 9), 2);
        assert_eq!(total_pages(5, 0), 5);

        assert_eq!(clamp_page(0, 3), 1);
        assert_eq!(clamp_page(7, 3), 3);
        assert_eq!(clamp_page(2, 0), 1);

        let items: Vec<u32> = (1..=10).collect();
        assert_eq!(paginate(&items, 1, 4), vec![1, 2, 3, 4]);
        assert_eq!(paginate(&items, 3, 4), vec![9, 10]);
        assert!(paginate(&items, 4, 4).is_empty());
        assert!(paginate(&items, 0, 4).is_empty());
    }

    #[test]
    fn test_compute_view_does_not_correct_out_of_range_page() {
        let projects: Vec<Project> = (1..=3)
            .map(|i| project(i, &format!("P{}", i), None, "2024-01-01"))
            .collect();
        let params = ViewParams {
            page: 5,
            page_size: 2,
            ..Default::default()
        };
        let view = compute_view(&projects, &params);
        assert!(view.visible.is_empty());
        assert_eq!(view.total_filtered, 3);
        assert_eq!(view.total_pages, 2);
    }

    #[test]
    fn test_compute_view_leaves_input_untouched() {
        let projects = vec![
            project(1, "Zeta", None, "2024-01-01"),
            project(2, "Alpha", None, "2024-06-01"),
        ];
        let before = projects.clone();
        let params = ViewParams {
            sort: SortKey::NameAsc,
            ..Default::default()
        };
        let _ = compute_view(&projects, &params);
        assert_eq!(projects, before);
    }

    #[test]
    fn test_parse_view_keys() {
        assert_eq!("name-desc".parse::<SortKey>(), Ok(SortKey::NameDesc));
        assert_eq!("newest".parse::<SortKey>(), Ok(SortKey::CreatedDesc));
        assert!("random".parse::<SortKey>().is_err());

        assert_eq!("ALL".parse::<TypeFilter>(), Ok(TypeFilter::All));
        assert_eq!(
            "boundary".parse::<TypeFilter>(),
            Ok(TypeFilter::Only(TestCaseType::Boundary))
        );
        assert!("smoke".parse::<TypeFilter>().is_err());
    }

    // --- Feature list ---

    #[test]
    fn test_type_filter_only_keeps_that_type() {
        let features = vec![feature(
            "Login",
            "Users log in",
            vec![
                test_case(1, "Valid login", TestCaseType::Functional, &["open"]),
                test_case(2, "Max length password", TestCaseType::Boundary, &["type"]),
            ],
        )];
        let params = FeatureParams {
            search: String::new(),
            filter: TypeFilter::Only(TestCaseType::Boundary),
        };
        let view = compute_feature_view(&features, &params);
        assert_eq!(view.total_test_cases, 1);
        assert!(view
            .visible
            .iter()
            .flat_map(|f| &f.test_cases)
            .all(|tc| tc.kind == TestCaseType::Boundary));
    }

    #[test]
    fn test_requirement_match_widens_to_whole_feature() {
        let features = vec![feature(
            "Login",
            "Accounts lock after 5 failed attempts",
            vec![
                test_case(1, "Valid login", TestCaseType::Functional, &["open"]),
                test_case(2, "Max length password", TestCaseType::Boundary, &["type"]),
            ],
        )];
        let params = FeatureParams {
            search: "LOCK".to_string(),
            filter: TypeFilter::Only(TestCaseType::Boundary),
        };
        let view = compute_feature_view(&features, &params);
        assert_eq!(view.visible.len(), 1);
        assert_eq!(view.visible[0].test_cases.len(), 1);
        assert_eq!(view.visible[0].test_cases[0].id, 2);
    }

    #[test]
    fn test_search_narrows_to_matching_test_cases() {
        let features = vec![
            feature(
                "Cart",
                "Manage items",
                vec![
                    test_case(1, "Add item", TestCaseType::Functional, &["Click add"]),
                    test_case(2, "Remove item", TestCaseType::Functional, &["Click remove"]),
                ],
            ),
            feature(
                "Search",
                "Find products",
                vec![test_case(3, "Empty query", TestCaseType::Negative, &["Submit"])],
            ),
        ];
        let params = FeatureParams {
            search: "remove".to_string(),
            filter: TypeFilter::All,
        };
        let view = compute_feature_view(&features, &params);
        assert_eq!(view.visible.len(), 1);
        assert_eq!(view.visible[0].feature_name, "Cart");
        assert_eq!(view.visible[0].test_cases.len(), 1);
        assert_eq!(view.total_test_cases, 1);

        // step text counts as a match
        let by_step = compute_feature_view(
            &features,
            &FeatureParams {
                search: "submit".to_string(),
                filter: TypeFilter::All,
            },
        );
        assert_eq!(by_step.visible[0].feature_name, "Search");
    }

    #[test]
    fn test_empty_features_are_dropped() {
        let features = vec![
            feature("Empty", "Nothing yet", vec![]),
            feature(
                "Login",
                "Users log in",
                vec![test_case(1, "Valid login", TestCaseType::Functional, &[])],
            ),
        ];
        let view = compute_feature_view(&features, &FeatureParams::default());
        assert_eq!(view.visible.len(), 1);
        assert_eq!(view.visible[0].feature_name, "Login");
    }

    // --- Aggregates ---

    #[test]
    fn test_project_stats_and_distribution() {
        let features = vec![
            feature(
                "Login",
                "r",
                vec![
                    test_case(1, "a", TestCaseType::Functional, &[]),
                    test_case(2, "b", TestCaseType::Negative, &[]),
                    test_case(3, "c", TestCaseType::Functional, &[]),
                ],
            ),
            feature("Cart", "r", vec![test_case(4, "d", TestCaseType::Exploratory, &[])]),
        ];
        let stats = project_stats(&features);
        assert_eq!(stats.features, 2);
        assert_eq!(stats.test_cases, 4);
        assert_eq!(stats.count(TestCaseType::Functional), 2);
        assert_eq!(stats.count(TestCaseType::Boundary), 0);

        assert_eq!(
            type_distribution(&features[0]),
            vec![(TestCaseType::Functional, 2), (TestCaseType::Negative, 1)]
        );
    }

    #[test]
    fn test_results_summary() {
        assert_eq!(results_summary(3, "", TypeFilter::All), None);
        assert_eq!(
            results_summary(1, "login", TypeFilter::All).as_deref(),
            Some("Showing 1 test case matching \"login\"")
        );
        assert_eq!(
            results_summary(0, "", TypeFilter::Only(TestCaseType::Negative)).as_deref(),
            Some("Showing 0 test cases of type \"negative\"")
        );
        assert_eq!(
            results_summary(2, "x", TypeFilter::Only(TestCaseType::Boundary)).as_deref(),
            Some("Showing 2 test cases matching \"x\" of type \"boundary\"")
        );
    }
}
