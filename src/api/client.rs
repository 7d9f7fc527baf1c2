//! API client for the discourse backend.
//!
//! Two failure kinds exist at this seam and stay distinguishable all the way
//! to the screen: a **server-reported error** (2xx with `status != "success"`,
//! message authored by the backend) and a **transport error** (non-2xx,
//! timeout, or connection failure, message authored here). Neither is ever
//! propagated past the handler that started the call; both resolve into a
//! rendered discourse via [`failure_discourse`].

use crate::catalog::{Discourse, Subcategory};
use reqwest::multipart;
use reqwest::redirect::Policy;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Per-request timeout. The backend serves small JSON payloads; anything
/// slower than this is treated as a transport failure.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request timed out after 20s")]
    Timeout,
    #[error("Network error: {0}")]
    Network(reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// 2xx response whose envelope carried `status != "success"`.
    #[error("Server error: {0}")]
    Server(String),
    #[error("Invalid server URL: {0}")]
    InvalidBaseUrl(String),
    #[error("Failed to read upload file: {0}")]
    UploadRead(#[from] std::io::Error),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Network(err)
        }
    }
}

/// Resolve an API failure into a rendered discourse.
///
/// Server-reported errors show the backend's message under the title
/// `Error`; every transport failure collapses into the generic
/// `Network Error` item. The two titles are deliberately distinct.
pub fn failure_discourse(err: &ApiError) -> Discourse {
    match err {
        ApiError::Server(message) => Discourse::server_error(message),
        _ => Discourse::network_error(),
    }
}

// ============================================================================
// Wire envelopes
// ============================================================================

/// Envelope for `GET /discourse/api/get/{id}`.
#[derive(Debug, Deserialize)]
struct DiscourseEnvelope {
    status: String,
    #[serde(default)]
    discourse: Option<Discourse>,
    #[serde(default)]
    message: Option<String>,
}

/// Envelope shared by every form endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusEnvelope {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl StatusEnvelope {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    /// Backend message, or a generic fallback when the envelope omits one.
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("No message from server.")
    }
}

// ============================================================================
// Request payloads
// ============================================================================

/// Payload for `POST /add-discourse`.
#[derive(Debug, Clone, Serialize)]
pub struct DiscourseDraft {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory_id: Option<i64>,
}

/// Payload for the registration endpoint.
///
/// The password travels in the request body but is masked in Debug output,
/// so it cannot leak through logs or error messages.
pub struct JoinRequest {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub organization: Option<String>,
    pub website: Option<String>,
    pub password: SecretString,
}

impl std::fmt::Debug for JoinRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoinRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("organization", &self.organization)
            .field("website", &self.website)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Serialize for JoinRequest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        // Fields are flattened the way the registration form posts them.
        let mut state = serializer.serialize_struct("JoinRequest", 7)?;
        state.serialize_field("username", &self.username)?;
        state.serialize_field("email", &self.email)?;
        state.serialize_field("name", &self.first_name)?;
        state.serialize_field("other_names", &self.last_name)?;
        state.serialize_field("organization_name", &self.organization)?;
        state.serialize_field("website", &self.website)?;
        state.serialize_field("password", self.password.expose_secret())?;
        state.end()
    }
}

// ============================================================================
// Client
// ============================================================================

/// Create a custom redirect policy with loop detection and limited hops.
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        for prev in attempt.previous() {
            if prev.as_str() == url.as_str() {
                return attempt.error("Redirect loop detected");
            }
        }

        tracing::debug!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );

        attempt.follow()
    })
}

/// HTTP client bound to one backend base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base: Url) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .redirect(create_redirect_policy())
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, base })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|e| ApiError::InvalidBaseUrl(e.to_string()))
    }

    /// Navigation redirect convention: the page that shows a discourse
    /// in place, addressed by id. Used when no reader region is bound.
    pub fn dialogues_url(&self, discourse_id: &str) -> String {
        format!(
            "{}discourse/dialogues?discourse_id={}",
            self.base, discourse_id
        )
    }

    /// The browser-side discourse editor page.
    pub fn editor_url(&self) -> String {
        format!("{}discourse/new", self.base)
    }

    /// `GET /discourse/api/get/{id}`.
    pub async fn get_discourse(&self, id: &str) -> Result<Discourse, ApiError> {
        let url = self.endpoint(&format!("discourse/api/get/{}", id))?;
        let response = tokio::time::timeout(REQUEST_TIMEOUT, self.http.get(url).send())
            .await
            .map_err(|_| ApiError::Timeout)??;

        if !response.status().is_success() {
            return Err(ApiError::HttpStatus(response.status().as_u16()));
        }

        let envelope: DiscourseEnvelope = response.json().await?;
        match envelope.discourse {
            Some(discourse) if envelope.status == "success" => Ok(discourse),
            _ => Err(ApiError::Server(
                envelope
                    .message
                    .unwrap_or_else(|| "Could not load content.".to_string()),
            )),
        }
    }

    /// `GET /discourse/api/subcategories/{category_id}`: the editor
    /// endpoint, used to fill the add-discourse form's picker when the
    /// catalog has no entry for the category.
    pub async fn get_subcategories(&self, category_id: i64) -> Result<Vec<Subcategory>, ApiError> {
        let url = self.endpoint(&format!("discourse/api/subcategories/{}", category_id))?;
        let response = tokio::time::timeout(REQUEST_TIMEOUT, self.http.get(url).send())
            .await
            .map_err(|_| ApiError::Timeout)??;

        if !response.status().is_success() {
            return Err(ApiError::HttpStatus(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }

    /// `POST /upload-image` as multipart form data.
    ///
    /// `filename` is the target name the backend will store under;
    /// `original_name` is the local file's own name, carried on the part.
    pub async fn upload_image(
        &self,
        filename: &str,
        original_name: &str,
        image: Vec<u8>,
    ) -> Result<StatusEnvelope, ApiError> {
        let url = self.endpoint("upload-image")?;
        let form = multipart::Form::new()
            .text("filename", filename.to_string())
            .part(
                "image_file",
                multipart::Part::bytes(image).file_name(original_name.to_string()),
            );

        let response =
            tokio::time::timeout(REQUEST_TIMEOUT, self.http.post(url).multipart(form).send())
                .await
                .map_err(|_| ApiError::Timeout)??;
        Self::read_status_envelope(response).await
    }

    /// `POST /add-discourse` as JSON.
    pub async fn add_discourse(&self, draft: &DiscourseDraft) -> Result<StatusEnvelope, ApiError> {
        let url = self.endpoint("add-discourse")?;
        let response = tokio::time::timeout(REQUEST_TIMEOUT, self.http.post(url).json(draft).send())
            .await
            .map_err(|_| ApiError::Timeout)??;
        Self::read_status_envelope(response).await
    }

    /// `POST /join` as JSON.
    pub async fn join(&self, request: &JoinRequest) -> Result<StatusEnvelope, ApiError> {
        let url = self.endpoint("join")?;
        let response =
            tokio::time::timeout(REQUEST_TIMEOUT, self.http.post(url).json(request).send())
                .await
                .map_err(|_| ApiError::Timeout)??;
        Self::read_status_envelope(response).await
    }

    /// Form endpoints return their envelope on validation failures too
    /// (4xx with a JSON body), so the body is parsed before the status code
    /// is consulted. Only an unparseable non-2xx response counts as a
    /// transport error.
    async fn read_status_envelope(response: reqwest::Response) -> Result<StatusEnvelope, ApiError> {
        let status = response.status();
        match response.json::<StatusEnvelope>().await {
            Ok(envelope) => Ok(envelope),
            Err(_) if !status.is_success() => Err(ApiError::HttpStatus(status.as_u16())),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_discourse_titles_are_distinct() {
        let server = failure_discourse(&ApiError::Server("not found".to_string()));
        assert_eq!(server.title.as_deref(), Some("Error"));
        assert!(server.body.as_deref().unwrap().contains("not found"));

        let transport = failure_discourse(&ApiError::HttpStatus(502));
        assert_eq!(transport.title.as_deref(), Some("Network Error"));
        assert_ne!(server.title, transport.title);
    }

    #[test]
    fn test_join_request_debug_masks_password() {
        let request = JoinRequest {
            username: "amara".to_string(),
            email: "amara@example.com".to_string(),
            first_name: "Amara".to_string(),
            last_name: "Okoye".to_string(),
            organization: None,
            website: None,
            password: SecretString::from("hunter2"),
        };
        let debug = format!("{:?}", request);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_join_request_serializes_flattened_fields() {
        let request = JoinRequest {
            username: "amara".to_string(),
            email: "amara@example.com".to_string(),
            first_name: "Amara".to_string(),
            last_name: "Okoye".to_string(),
            organization: Some("St. Jude's".to_string()),
            website: None,
            password: SecretString::from("hunter2"),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["name"], "Amara");
        assert_eq!(value["other_names"], "Okoye");
        assert_eq!(value["password"], "hunter2");
    }

    #[test]
    fn test_dialogues_url_shape() {
        let client = ApiClient::new(Url::parse("http://127.0.0.1:5000/").unwrap()).unwrap();
        assert_eq!(
            client.dialogues_url("disc-7"),
            "http://127.0.0.1:5000/discourse/dialogues?discourse_id=disc-7"
        );
    }

    #[test]
    fn test_draft_omits_missing_subcategory() {
        let draft = DiscourseDraft {
            title: "T".to_string(),
            body: "B".to_string(),
            subcategory_id: None,
        };
        let value = serde_json::to_value(&draft).unwrap();
        assert!(value.get("subcategory_id").is_none());
    }
}
