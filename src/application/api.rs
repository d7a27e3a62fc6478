//! REST client for the tree service
//!
//! Every request carries the stored bearer token. A 401 triggers exactly one
//! silent refresh followed by one replay of the original request; if the
//! refresh is impossible or fails, the session is expired and the caller gets
//! `AuthExpired`. No other failure is retried.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::application::error_ext::IoResultExt;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::Session;
use crate::infrastructure::traits::{HttpRequest, HttpResponse, HttpTransport, Method, SessionStore};

/// Message used when an error body carries no usable text.
pub const FALLBACK_ERROR_MESSAGE: &str = "API Error";

/// Token pair returned by `/auth/refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Generic `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Strip trailing slashes and a trailing `/api` segment.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    trimmed
        .strip_suffix("/api")
        .unwrap_or(trimmed)
        .trim_end_matches('/')
        .to_string()
}

/// Extract the user-facing message from an error body.
///
/// Prefers `message`, then `detail` (validation lists are rendered as JSON),
/// then the fallback string.
pub fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return FALLBACK_ERROR_MESSAGE.to_string();
    };
    for key in ["message", "detail"] {
        match value.get(key) {
            Some(Value::String(s)) if !s.is_empty() => return s.clone(),
            Some(Value::String(_)) | Some(Value::Null) | None => {}
            Some(other) => return other.to_string(),
        }
    }
    FALLBACK_ERROR_MESSAGE.to_string()
}

pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    store: Arc<dyn SessionStore>,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, transport: Arc<dyn HttpTransport>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            transport,
            store,
            base_url: normalize_base_url(base_url),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> ApplicationResult<Session> {
        self.store.load().session_context("load session")
    }

    pub fn save_session(&self, session: &Session) -> ApplicationResult<()> {
        self.store.save(session).session_context("save session")
    }

    /// Drop the persisted session entirely.
    pub fn clear_session(&self) -> ApplicationResult<()> {
        self.store.clear().session_context("clear session")
    }

    /// Load, modify and persist the session in one step.
    pub fn update_session(&self, f: impl FnOnce(&mut Session)) -> ApplicationResult<Session> {
        let mut session = self.session()?;
        f(&mut session);
        self.save_session(&session)?;
        Ok(session)
    }

    pub fn get<T: DeserializeOwned>(&self, path: &str) -> ApplicationResult<T> {
        self.request(Method::Get, path, None)
    }

    pub fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> ApplicationResult<T> {
        let body = Self::encode(path, body)?;
        self.request(Method::Post, path, Some(body))
    }

    /// Anonymous POST for credential endpoints: no bearer, and a 401 is a plain API error.
    pub fn post_public<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> ApplicationResult<T> {
        let body = Self::encode(path, body)?;
        let request = self.build(Method::Post, path, Some(body), None);
        let response = self.send(&request)?;
        Self::decode(&request, response)
    }

    pub fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ApplicationResult<T> {
        self.request(Method::Post, path, None)
    }

    pub fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> ApplicationResult<T> {
        let body = Self::encode(path, body)?;
        self.request(Method::Put, path, Some(body))
    }

    pub fn delete<T: DeserializeOwned>(&self, path: &str) -> ApplicationResult<T> {
        self.request(Method::Delete, path, None)
    }

    /// Send an authenticated request, refreshing the token once on 401.
    pub fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> ApplicationResult<T> {
        let session = self.session()?;
        let request = self.build(method, path, body, session.bearer());
        let response = self.send(&request)?;

        if response.status == 401 {
            return self.refresh_and_replay(request, session);
        }
        Self::decode(&request, response)
    }

    /// Exchange a refresh token for a new pair. Never retried.
    pub fn refresh_tokens(&self, refresh_token: &str) -> ApplicationResult<TokenPair> {
        let body = serde_json::json!({ "refresh_token": refresh_token }).to_string();
        let request = self.build(Method::Post, "/auth/refresh", Some(body), None);
        let response = self.send(&request)?;
        Self::decode(&request, response)
    }

    fn refresh_and_replay<T: DeserializeOwned>(
        &self,
        mut request: HttpRequest,
        mut session: Session,
    ) -> ApplicationResult<T> {
        let Some(refresh_token) = session.refresh_token.clone() else {
            debug!("401 without refresh token: {}", request.url);
            return self.expire(session);
        };

        let tokens = match self.refresh_tokens(&refresh_token) {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!("token refresh failed: {}", e);
                return self.expire(session);
            }
        };
        info!("access token refreshed");

        let bearer = format!("Bearer {}", tokens.access_token);
        session.set_tokens(tokens.access_token, tokens.refresh_token);
        self.save_session(&session)?;

        request.set_header("Authorization", bearer);
        let response = self.send(&request)?;
        Self::decode(&request, response)
    }

    /// Forced logout after an unrecoverable 401.
    fn expire<T>(&self, mut session: Session) -> ApplicationResult<T> {
        session.expire();
        self.save_session(&session)?;
        Err(ApplicationError::AuthExpired)
    }

    fn build(&self, method: Method, path: &str, body: Option<String>, bearer: Option<String>) -> HttpRequest {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(bearer) = bearer {
            headers.push(("Authorization".to_string(), bearer));
        }
        HttpRequest {
            method,
            url: format!("{}{}", self.base_url, path),
            headers,
            body,
        }
    }

    fn send(&self, request: &HttpRequest) -> ApplicationResult<HttpResponse> {
        self.transport
            .send(request)
            .map_err(|source| ApplicationError::Transport {
                context: format!("{} {}", request.method, request.url),
                source,
            })
    }

    fn encode<B: Serialize>(path: &str, body: &B) -> ApplicationResult<String> {
        serde_json::to_string(body).map_err(|source| ApplicationError::Decode {
            context: format!("encode body for {}", path),
            source,
        })
    }

    fn decode<T: DeserializeOwned>(request: &HttpRequest, response: HttpResponse) -> ApplicationResult<T> {
        if !response.is_success() {
            let message = error_message(&response.body);
            debug!("{} {} failed: {} {}", request.method, request.url, response.status, message);
            return Err(ApplicationError::Api {
                status: response.status,
                message,
            });
        }
        let body = if response.body.trim().is_empty() {
            "null"
        } else {
            response.body.as_str()
        };
        from_json_unbounded(body).map_err(|source| ApplicationError::Decode {
            context: format!("{} {}", request.method, request.url),
            source,
        })
    }
}

/// Decode without serde_json's nesting cap; tree snapshots can be arbitrarily deep.
fn from_json_unbounded<T: DeserializeOwned>(body: &str) -> serde_json::Result<T> {
    let mut de = serde_json::Deserializer::from_str(body);
    de.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://localhost:8000", "http://localhost:8000")]
    #[case("http://localhost:8000/", "http://localhost:8000")]
    #[case("http://localhost:8000/api", "http://localhost:8000")]
    #[case("https://trees.example.com/api/", "https://trees.example.com")]
    #[case("https://example.com/apis", "https://example.com/apis")]
    fn given_base_url_when_normalizing_then_strips_api_suffix(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_base_url(raw), expected);
    }

    #[rstest]
    #[case(r#"{"message": "Tree not found"}"#, "Tree not found")]
    #[case(r#"{"detail": "Parent node not found"}"#, "Parent node not found")]
    #[case(r#"{"detail": [{"loc": ["body"], "msg": "field required"}]}"#, r#"[{"loc":["body"],"msg":"field required"}]"#)]
    #[case(r#"{"message": ""}"#, FALLBACK_ERROR_MESSAGE)]
    #[case(r#"{"message": "", "detail": "Tree not found"}"#, "Tree not found")]
    #[case(r#"{"other": 1}"#, FALLBACK_ERROR_MESSAGE)]
    #[case("<html>502</html>", FALLBACK_ERROR_MESSAGE)]
    fn given_error_body_when_extracting_message_then_expected(#[case] body: &str, #[case] expected: &str) {
        assert_eq!(error_message(body), expected);
    }
}
