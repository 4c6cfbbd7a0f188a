//! Client for the test case generator backend
//!
//! `Backend` is the seam the CLI talks to; `HttpBackend` implements it over
//! blocking HTTP. Each call is independent: no retries, no deduplication of
//! identical in-flight requests. Authenticated calls carry
//! `Authorization: Bearer <token>` from the `Session` they are given and fail
//! with `Error::Unauthorized` before touching the network when there is none.

use crate::config::Config;
use crate::error::Error;
use crate::forms::{GenerateRequest, LoginForm, ProjectForm, SignupForm};
use crate::model::{GenerationResult, Project, ProjectDetail, TestCase, Token, User};
use crate::session::Session;
use crate::Result;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Operations offered by the remote service
pub trait Backend {
    fn signup(&self, form: &SignupForm) -> Result<User>;
    fn login(&self, form: &LoginForm) -> Result<Token>;
    fn current_user(&self, session: &Session) -> Result<User>;

    fn list_projects(&self, session: &Session) -> Result<Vec<Project>>;
    fn create_project(&self, session: &Session, form: &ProjectForm) -> Result<Project>;
    fn get_project(&self, session: &Session, project_id: i32) -> Result<ProjectDetail>;
    fn update_project(&self, session: &Session, project_id: i32, form: &ProjectForm)
        -> Result<Project>;
    /// Cascades to every feature and test case of the project
    fn delete_project(&self, session: &Session, project_id: i32) -> Result<()>;

    fn generate(
        &self,
        session: &Session,
        project_id: i32,
        request: &GenerateRequest,
    ) -> Result<GenerationResult>;
    fn feature_test_cases(
        &self,
        session: &Session,
        project_id: i32,
        feature_name: &str,
    ) -> Result<Vec<TestCase>>;
    /// Deletes the feature and all its test cases
    fn delete_feature(&self, session: &Session, project_id: i32, feature_name: &str)
        -> Result<()>;
}

/// Blocking HTTP implementation of `Backend`
pub struct HttpBackend {
    client: Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self> {
        let base = Url::parse(config.base_url())
            .map_err(|e| Error::Config(format!("invalid api.base_url '{}': {}", config.base_url(), e)))?;
        if base.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "api.base_url '{}' cannot be used as a base URL",
                base
            )));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .build()?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Join path segments onto the base URL, percent-encoding each one
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("cannot extend base URL '{}'", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%method, %url, "backend request");
        Ok(self.client.request(method, url))
    }

    fn authed(&self, session: &Session, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let header = session.authorization_header().ok_or(Error::Unauthorized)?;
        Ok(self.request(method, segments)?.header(AUTHORIZATION, header))
    }
}

/// Pull a readable message out of an error body.
///
/// The backend answers `{"detail": "..."}`; validation failures put a list
/// of objects with `msg` fields under `detail`.
pub fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    let message = error_detail(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    });
    tracing::warn!(status = status.as_u16(), %message, "backend error");
    if status.as_u16() == 401 {
        return Err(Error::Unauthorized);
    }
    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}

fn json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T> {
    let response = check(builder.send()?)?;
    Ok(response.json::<T>()?)
}

fn empty(builder: RequestBuilder) -> Result<()> {
    check(builder.send()?)?;
    Ok(())
}

impl Backend for HttpBackend {
    fn signup(&self, form: &SignupForm) -> Result<User> {
        let form = form.validate()?;
        json(self.request(Method::POST, &["signup"])?.json(&form))
    }

    fn login(&self, form: &LoginForm) -> Result<Token> {
        let form = form.validate()?;
        let body = serde_urlencoded::to_string(&form.form_fields()[..])
            .map_err(|e| Error::validation("login", e.to_string()))?;
        json(
            self.request(Method::POST, &["token"])?
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(body),
        )
    }

    fn current_user(&self, session: &Session) -> Result<User> {
        json(self.authed(session, Method::GET, &["users", "me"])?)
    }

    fn list_projects(&self, session: &Session) -> Result<Vec<Project>> {
        json(self.authed(session, Method::GET, &["projects"])?)
    }

    fn create_project(&self, session: &Session, form: &ProjectForm) -> Result<Project> {
        let form = form.validate()?;
        json(self.authed(session, Method::POST, &["projects"])?.json(&form))
    }

    fn get_project(&self, session: &Session, project_id: i32) -> Result<ProjectDetail> {
        let id = project_id.to_string();
        json(self.authed(session, Method::GET, &["projects", &id])?)
    }

    fn update_project(
        &self,
        session: &Session,
        project_id: i32,
        form: &ProjectForm,
    ) -> Result<Project> {
        let form = form.validate()?;
        let id = project_id.to_string();
        json(self.authed(session, Method::PUT, &["projects", &id])?.json(&form))
    }

    fn delete_project(&self, session: &Session, project_id: i32) -> Result<()> {
        let id = project_id.to_string();
        empty(self.authed(session, Method::DELETE, &["projects", &id])?)
    }

    fn generate(
        &self,
        session: &Session,
        project_id: i32,
        request: &GenerateRequest,
    ) -> Result<GenerationResult> {
        let request = request.validate()?;
        let id = project_id.to_string();
        json(
            self.authed(
                session,
                Method::POST,
                &["projects", &id, "generate-test-cases"],
            )?
            .json(&request),
        )
    }

    fn feature_test_cases(
        &self,
        session: &Session,
        project_id: i32,
        feature_name: &str,
    ) -> Result<Vec<TestCase>> {
        let id = project_id.to_string();
        json(self.authed(
            session,
            Method::GET,
            &["projects", &id, "features", feature_name, "test-cases"],
        )?)
    }

    fn delete_feature(&self, session: &Session, project_id: i32, feature_name: &str) -> Result<()> {
        let id = project_id.to_string();
        empty(self.authed(
            session,
            Method::DELETE,
            &["projects", &id, "features", feature_name],
        )?)
    }
}
