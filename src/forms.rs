//! User input and its validation
//!
//! Every form is validated before a request is built: required fields are
//! trimmed and must be non-empty. Validation returns the cleaned value so
//! callers never send untrimmed input.

use crate::error::Error;
use crate::Result;
use serde::Serialize;

fn required(field: &'static str, label: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(field, format!("{} is required", label)));
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn email(value: &str) -> Result<String> {
    let email = required("email", "Email", value)?;
    match email.split_once('@') {
        Some((user, domain)) if !user.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(Error::validation("email", format!("'{}' is not an email address", email))),
    }
}

/// Credentials for the token endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<LoginForm> {
        let email = email(&self.email)?;
        // passwords are sent as typed, never trimmed
        if self.password.is_empty() {
            return Err(Error::validation("password", "Password is required"));
        }
        Ok(LoginForm {
            email,
            password: self.password.clone(),
        })
    }

    /// OAuth2 password form fields; the backend reads the email as `username`
    pub fn form_fields(&self) -> [(&'static str, &str); 2] {
        [("username", self.email.as_str()), ("password", self.password.as_str())]
    }
}

/// New account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignupForm {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<SignupForm> {
        if self.password.is_empty() {
            return Err(Error::validation("password", "Password is required"));
        }
        Ok(SignupForm {
            email: email(&self.email)?,
            username: required("username", "Username", &self.username)?,
            password: self.password.clone(),
        })
    }
}

/// Create/update payload for a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectForm {
    pub name: String,
    pub description: Option<String>,
}

impl ProjectForm {
    pub fn new(name: &str, description: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            description: description.map(str::to_string),
        }
    }

    pub fn validate(&self) -> Result<ProjectForm> {
        Ok(ProjectForm {
            name: required("name", "Project name", &self.name)?,
            description: optional(self.description.as_deref()),
        })
    }
}

/// Input for a generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateRequest {
    pub feature_name: String,
    pub requirement_text: String,
}

impl GenerateRequest {
    pub fn validate(&self) -> Result<GenerateRequest> {
        Ok(GenerateRequest {
            feature_name: required("feature_name", "Feature name", &self.feature_name)?,
            requirement_text: required(
                "requirement_text",
                "Requirement",
                &self.requirement_text,
            )?,
        })
    }
}

/// Canned requirement for quick trials
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleRequirement {
    pub feature: &'static str,
    pub text: &'static str,
}

impl SampleRequirement {
    pub fn to_request(&self) -> GenerateRequest {
        GenerateRequest {
            feature_name: self.feature.to_string(),
            requirement_text: self.text.to_string(),
        }
    }
}

pub const SAMPLE_REQUIREMENTS: &[SampleRequirement] = &[
    SampleRequirement {
        feature: "User Login",
        text: "As a user, I want to log in with my email and password so I can securely access my account. The system should validate credentials, handle incorrect passwords, and lock accounts after 5 failed attempts.",
    },
    SampleRequirement {
        feature: "User Signup",
        text: "As a new user, I want to create an account with email, username, and password so I can start using the application. The system should validate email format, ensure password strength, and check for duplicate usernames.",
    },
    SampleRequirement {
        feature: "Shopping Cart",
        text: "As a shopper, I want to add items to my cart, update quantities, and remove items so I can manage my purchases before checkout. The cart should persist across sessions and calculate totals correctly.",
    },
];

/// 1-based lookup into the samples
pub fn sample(index: usize) -> Result<SampleRequirement> {
    index
        .checked_sub(1)
        .and_then(|i| SAMPLE_REQUIREMENTS.get(i))
        .copied()
        .ok_or_else(|| {
            Error::validation(
                "sample",
                format!("choose a sample between 1 and {}", SAMPLE_REQUIREMENTS.len()),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_form_trims_and_requires_name() {
        let form = ProjectForm::new("  Checkout  ", Some("   "));
        let clean = form.validate().unwrap();
        assert_eq!(clean.name, "Checkout");
        assert_eq!(clean.description, None);

        let err = ProjectForm::new("   ", None).validate().unwrap_err();
        assert!(matches!(err, Error::Validation { field: "name", .. }));
    }

    #[test]
    fn test_generate_request_requires_both_fields() {
        let missing_text = GenerateRequest {
            feature_name: "Login".to_string(),
            requirement_text: "\n".to_string(),
        };
        assert!(matches!(
            missing_text.validate(),
            Err(Error::Validation { field: "requirement_text", .. })
        ));

        let missing_name = GenerateRequest {
            feature_name: String::new(),
            requirement_text: "Users log in".to_string(),
        };
        assert!(matches!(
            missing_name.validate(),
            Err(Error::Validation { field: "feature_name", .. })
        ));
    }

    #[test]
    fn test_login_form() {
        let form = LoginForm {
            email: " qa@example.com ".to_string(),
            password: "pw".to_string(),
        };
        let clean = form.validate().unwrap();
        assert_eq!(clean.email, "qa@example.com");
        assert_eq!(clean.form_fields()[0], ("username", "qa@example.com"));

        let bad = LoginForm {
            email: "qa".to_string(),
            password: "pw".to_string(),
        };
        assert!(bad.validate().is_err());

        let no_pw = LoginForm {
            email: "qa@example.com".to_string(),
            password: String::new(),
        };
        assert!(matches!(
            no_pw.validate(),
            Err(Error::Validation { field: "password", .. })
        ));
    }

    #[test]
    fn test_signup_form() {
        let form = SignupForm {
            email: "qa@example.com".to_string(),
            username: "  ".to_string(),
            password: "pw".to_string(),
        };
        assert!(matches!(
            form.validate(),
            Err(Error::Validation { field: "username", .. })
        ));
    }

    #[test]
    fn test_samples() {
        assert_eq!(sample(1).unwrap().feature, "User Login");
        assert_eq!(sample(3).unwrap().to_request().feature_name, "Shopping Cart");
        assert!(sample(0).is_err());
        assert!(sample(4).is_err());
    }
}
