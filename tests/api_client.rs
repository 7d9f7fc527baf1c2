//! Integration tests for the API bridge against a mock backend.
//!
//! Each test starts its own wiremock server. The key property exercised
//! throughout: server-reported errors and transport errors stay distinct
//! all the way to the rendered discourse.

use dialogues::api::{failure_discourse, ApiClient, ApiError, DiscourseDraft, JoinRequest};
use dialogues::catalog::ResourceKind;
use dialogues::util::validate_server_url;
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    let base = validate_server_url(&server.uri()).unwrap();
    ApiClient::new(base).unwrap()
}

/// Client pointed at a port nothing listens on.
fn unreachable_client() -> ApiClient {
    let base = validate_server_url("http://127.0.0.1:9").unwrap();
    ApiClient::new(base).unwrap()
}

// ============================================================================
// get_discourse
// ============================================================================

#[tokio::test]
async fn test_get_discourse_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discourse/api/get/disc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "discourse": {
                "id": "disc-1",
                "subcategory_id": 10,
                "title": "On Light",
                "body": "<p>In the beginning.</p>",
                "date_posted": "June 01, 2024",
                "reference": "DISC-2024-06-01",
                "resources": [
                    {"type": "Scripture", "name": "Psalm 19:1", "link": "https://example.com/ps19"},
                    {"type": "Commentary", "name": "On the Psalms", "link": null}
                ]
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let discourse = client.get_discourse("disc-1").await.unwrap();

    assert_eq!(discourse.title.as_deref(), Some("On Light"));
    assert_eq!(discourse.subcategory_id, Some(10));
    assert_eq!(discourse.resources.len(), 2);
    assert_eq!(discourse.resources[0].kind, ResourceKind::Scripture);
    assert_eq!(discourse.resources[1].kind, ResourceKind::Commentary);
    assert_eq!(discourse.resources[1].link, None);
}

#[tokio::test]
async fn test_get_discourse_server_error_renders_error_item() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discourse/api/get/missing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "error",
            "message": "not found"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.get_discourse("missing").await.unwrap_err();
    assert!(matches!(err, ApiError::Server(_)));

    let item = failure_discourse(&err);
    assert_eq!(item.title.as_deref(), Some("Error"));
    assert!(item.body.as_deref().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_get_discourse_missing_message_gets_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discourse/api/get/x"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "error"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    match client.get_discourse("x").await.unwrap_err() {
        ApiError::Server(message) => assert_eq!(message, "Could not load content."),
        other => panic!("expected server error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_get_discourse_http_error_is_transport() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discourse/api/get/disc-1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.get_discourse("disc-1").await.unwrap_err();
    assert!(matches!(err, ApiError::HttpStatus(500)));

    // Transport failures get the distinct title.
    let item = failure_discourse(&err);
    assert_eq!(item.title.as_deref(), Some("Network Error"));
    assert!(item
        .body
        .as_deref()
        .unwrap()
        .contains("Could not connect to the server"));
}

#[tokio::test]
async fn test_connection_failure_is_transport() {
    let client = unreachable_client();
    let err = client.get_discourse("disc-1").await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_) | ApiError::Timeout));
    assert_eq!(
        failure_discourse(&err).title.as_deref(),
        Some("Network Error")
    );
}

// ============================================================================
// Form endpoints
// ============================================================================

#[tokio::test]
async fn test_add_discourse_posts_json() {
    let server = MockServer::start().await;
    let expected = json!({
        "title": "New Discourse",
        "body": "First paragraph",
        "subcategory_id": 10
    });
    Mock::given(method("POST"))
        .and(path("/add-discourse"))
        .and(body_json(&expected))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "message": "Discourse added successfully. Please refresh."
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let envelope = client
        .add_discourse(&DiscourseDraft {
            title: "New Discourse".to_string(),
            body: "First paragraph".to_string(),
            subcategory_id: Some(10),
        })
        .await
        .unwrap();

    assert!(envelope.is_success());
    assert_eq!(
        envelope.message(),
        "Discourse added successfully. Please refresh."
    );
}

#[tokio::test]
async fn test_form_validation_failure_is_server_reported() {
    // The backend answers 400 with a JSON envelope; that is a server
    // message, not a transport fault.
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/add-discourse"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "status": "error",
            "message": "Title and Body are required"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let envelope = client
        .add_discourse(&DiscourseDraft {
            title: String::new(),
            body: String::new(),
            subcategory_id: None,
        })
        .await
        .unwrap();

    assert!(!envelope.is_success());
    assert_eq!(envelope.message(), "Title and Body are required");
}

#[tokio::test]
async fn test_form_plain_error_page_is_transport() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/add-discourse"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .add_discourse(&DiscourseDraft {
            title: "T".to_string(),
            body: "B".to_string(),
            subcategory_id: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::HttpStatus(502)));
}

#[tokio::test]
async fn test_upload_image_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload-image"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "message": "Image uploaded and saved as sunrise.webp"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let envelope = client
        .upload_image("sunrise", "sunrise.png", vec![0x89, 0x50, 0x4e, 0x47])
        .await
        .unwrap();

    assert!(envelope.is_success());
    assert!(envelope.message().contains("sunrise.webp"));
}

#[tokio::test]
async fn test_join_posts_flattened_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/join"))
        .and(body_string_contains("other_names"))
        .and(body_string_contains("Okoye"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "message": "Welcome!"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let envelope = client
        .join(&JoinRequest {
            username: "amara".to_string(),
            email: "amara@example.com".to_string(),
            first_name: "Amara".to_string(),
            last_name: "Okoye".to_string(),
            organization: None,
            website: None,
            password: SecretString::from("hunter2"),
        })
        .await
        .unwrap();

    assert!(envelope.is_success());
}

// ============================================================================
// Subcategory options endpoint
// ============================================================================

#[tokio::test]
async fn test_get_subcategories() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discourse/api/subcategories/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 10, "name": "Grace"},
            {"id": 11, "name": "Hope"}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let subs = client.get_subcategories(1).await.unwrap();
    assert_eq!(subs.len(), 2);
    assert_eq!(subs[0].name, "Grace");
}
