//! Confirmation prompts and display colors
//!
//! Dialog variants are an enum mapped through explicit tables rather than
//! string-keyed styling.

use crate::model::TestCaseType;
use colored::{Color, Colorize};
use std::io::{self, BufRead, Write};

/// Severity of a confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfirmKind {
    #[default]
    Danger,
    Warning,
    Info,
}

/// Presentation of one dialog kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindStyle {
    pub color: Color,
    pub icon: &'static str,
    pub default_confirm: &'static str,
}

const DANGER: KindStyle = KindStyle {
    color: Color::Red,
    icon: "✗",
    default_confirm: "Delete",
};

const WARNING: KindStyle = KindStyle {
    color: Color::Yellow,
    icon: "!",
    default_confirm: "Continue",
};

const INFO: KindStyle = KindStyle {
    color: Color::Blue,
    icon: "i",
    default_confirm: "OK",
};

impl ConfirmKind {
    pub fn style(&self) -> KindStyle {
        match self {
            ConfirmKind::Danger => DANGER,
            ConfirmKind::Warning => WARNING,
            ConfirmKind::Info => INFO,
        }
    }
}

/// Terminal color for a test case type
pub fn type_color(kind: TestCaseType) -> Color {
    match kind {
        TestCaseType::Functional => Color::Green,
        TestCaseType::Negative => Color::Red,
        TestCaseType::Boundary => Color::Yellow,
        TestCaseType::Exploratory => Color::Blue,
    }
}

/// A yes/no question before a destructive or notable action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmDialog {
    pub title: String,
    pub message: String,
    pub confirm_text: String,
    pub cancel_text: String,
    pub kind: ConfirmKind,
}

impl Default for ConfirmDialog {
    fn default() -> Self {
        Self {
            title: "Confirm Action".to_string(),
            message: String::new(),
            confirm_text: ConfirmKind::Danger.style().default_confirm.to_string(),
            cancel_text: "Cancel".to_string(),
            kind: ConfirmKind::Danger,
        }
    }
}

impl ConfirmDialog {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Switch kind; the confirm label follows unless set explicitly afterwards
    pub fn kind(mut self, kind: ConfirmKind) -> Self {
        self.kind = kind;
        self.confirm_text = kind.style().default_confirm.to_string();
        self
    }

    pub fn confirm_text(mut self, text: impl Into<String>) -> Self {
        self.confirm_text = text.into();
        self
    }

    /// Render the prompt and read one answer. Anything but y/yes cancels.
    pub fn ask<R: BufRead, W: Write>(&self, input: &mut R, output: &mut W) -> io::Result<bool> {
        let style = self.kind.style();
        writeln!(
            output,
            "{} {}",
            style.icon.color(style.color).bold(),
            self.title.bold()
        )?;
        if !self.message.is_empty() {
            writeln!(output, "  {}", self.message)?;
        }
        write!(
            output,
            "{} / {} [y/N] ",
            self.confirm_text.color(style.color),
            self.cancel_text.dimmed()
        )?;
        output.flush()?;

        let mut answer = String::new();
        input.read_line(&mut answer)?;
        let answer = answer.trim().to_lowercase();
        Ok(answer == "y" || answer == "yes")
    }

    /// Ask on the real terminal
    pub fn ask_terminal(&self) -> io::Result<bool> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stderr();
        self.ask(&mut input, &mut output)
    }
}

/// Warning before generating into a feature that already has test cases
pub fn existing_feature_dialog(feature: &str, existing: usize) -> ConfirmDialog {
    ConfirmDialog::new(format!(
        "\"{}\" already has {}. Generate more for it?",
        feature,
        crate::view::pluralize_test_cases(existing)
    ))
    .title("Feature exists")
    .kind(ConfirmKind::Warning)
    .confirm_text("Generate")
}

/// Notice before a login replaces a session that still works
pub fn replace_session_dialog(username: &str) -> ConfirmDialog {
    ConfirmDialog::new(format!(
        "Already logged in as {}. Log in with another account?",
        username
    ))
    .title("Already logged in")
    .kind(ConfirmKind::Info)
}
