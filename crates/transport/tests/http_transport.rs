//! `HttpTransport` against a local mock server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use dispatch::{
    ApiPath, FetchOptions, HttpMethod, Notification, Notifier, RequestDispatcher,
    RequestOptions, Transport, TransportError,
};
use serde_json::{json, Value};
use transport::{HttpTransport, TransportConfig};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport_for(server: &MockServer, prefix: &str) -> HttpTransport {
    let config = TransportConfig::new(&format!("{}{}", server.uri(), prefix)).unwrap();
    HttpTransport::new(config).unwrap()
}

#[tokio::test]
async fn test_get_keeps_base_path_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_for(&server, "/api/v1");
    let body = transport
        .fetch(&ApiPath::normalize("users/1"), &FetchOptions::default())
        .await
        .unwrap();

    assert_eq!(body, json!({"id": 1}));
}

#[tokio::test]
async fn test_bearer_token_and_default_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer tok"))
        .and(header("x-client", "tests"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let config = TransportConfig::new(&server.uri())
        .unwrap()
        .with_bearer_token("tok")
        .with_default_header("X-Client", "tests");
    let transport = HttpTransport::new(config).unwrap();

    let body = transport
        .fetch(&ApiPath::normalize("/me"), &FetchOptions::default())
        .await
        .unwrap();
    assert_eq!(body, json!({"ok": true}));
}

#[tokio::test]
async fn test_post_forwards_query_headers_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(query_param("dry_run", "true"))
        .and(header("x-request-tag", "abc"))
        .and(body_json(json!({"item": "book"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&server)
        .await;

    let options = FetchOptions::builder()
        .method(HttpMethod::Post)
        .query("dry_run", "true")
        .header("X-Request-Tag", "abc")
        .body(json!({"item": "book"}))
        .build()
        .unwrap();
    let body = transport_for(&server, "")
        .fetch(&ApiPath::normalize("orders"), &options)
        .await
        .unwrap();

    assert_eq!(body, json!({"id": 7}));
}

#[tokio::test]
async fn test_empty_success_body_is_null() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/orders/7"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let options = FetchOptions::builder().method(HttpMethod::Delete).build().unwrap();
    let body = transport_for(&server, "")
        .fetch(&ApiPath::normalize("orders/7"), &options)
        .await
        .unwrap();

    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn test_error_status_captures_json_body() {
    let server = MockServer::start().await;
    Mock::given(path("/users/404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
        .mount(&server)
        .await;

    let err = transport_for(&server, "")
        .fetch(&ApiPath::normalize("users/404"), &FetchOptions::default())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        TransportError::Status {
            status: 404,
            body: Some(json!({"error": "not found"})),
        }
    );
}

#[tokio::test]
async fn test_error_status_captures_text_and_empty_bodies() {
    let server = MockServer::start().await;
    Mock::given(path("/text"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;
    Mock::given(path("/empty"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let transport = transport_for(&server, "");
    let text = transport
        .fetch(&ApiPath::normalize("text"), &FetchOptions::default())
        .await
        .unwrap_err();
    let empty = transport
        .fetch(&ApiPath::normalize("empty"), &FetchOptions::default())
        .await
        .unwrap_err();

    assert_eq!(text.body(), Some(&json!("oops")));
    assert_eq!(empty, TransportError::Status { status: 503, body: None });
}

#[tokio::test]
async fn test_per_request_timeout_maps_to_timeout() {
    let server = MockServer::start().await;
    Mock::given(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let options = FetchOptions::builder()
        .timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let err = transport_for(&server, "")
        .fetch(&ApiPath::normalize("slow"), &options)
        .await
        .unwrap_err();

    assert_eq!(err, TransportError::Timeout);
}

#[derive(Default)]
struct CollectingNotifier(Mutex<Vec<Notification>>);

impl Notifier for CollectingNotifier {
    fn notify(&self, notification: Notification) {
        self.0.lock().unwrap().push(notification);
    }
}

#[tokio::test]
async fn test_dispatcher_over_http_notifies_on_error_response() {
    let server = MockServer::start().await;
    Mock::given(path("/users/1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
        .mount(&server)
        .await;
    Mock::given(path("/users/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 2})))
        .mount(&server)
        .await;

    let notifier = Arc::new(CollectingNotifier::default());
    let dispatcher = RequestDispatcher::new(Arc::new(transport_for(&server, "")), notifier.clone());

    let missing = dispatcher
        .dispatch_reactive::<Value>("users/1", RequestOptions::default())
        .await;
    let found = dispatcher
        .dispatch_reactive::<Value>("users/2", RequestOptions::default())
        .await;

    assert!(missing.error().is_some());
    assert_eq!(found.data().as_deref(), Some(&json!({"id": 2})));

    let received = notifier.0.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].description, "not found");
}
