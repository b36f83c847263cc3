//! Integration tests for the search backend and the submit/answer round trip,
//! using wiremock to stand in for the QA service.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ragchat::backend::{BackendError, HttpBackend, SearchBackend, dispatch};
use ragchat::core::action::{Action, Effect, update};
use ragchat::core::dispatch::{DispatchTicket, SubmitPolicy};
use ragchat::core::message::{Sender, Source};
use ragchat::core::state::App;

fn backend_for(server: &MockServer) -> Arc<dyn SearchBackend> {
    Arc::new(HttpBackend::new(server.uri()))
}

fn submit(app: &mut App, text: &str) -> DispatchTicket {
    match update(app, Action::Submit(text.to_string())) {
        Effect::Dispatch(ticket) => ticket,
        other => panic!("expected a dispatch, got {:?}", other),
    }
}

async fn mount_answer(server: &MockServer, query: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("query", query))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_search_decodes_answer_and_sources() {
    let server = MockServer::start().await;
    mount_answer(
        &server,
        "hello",
        json!({
            "response": "Hi there",
            "sources": [{"page": 3, "company": "Acme", "image_path": "/pages/acme-3.png"}]
        }),
    )
    .await;

    let result = backend_for(&server).search("hello").await;
    let (text, sources) = assert_ok!(result).into_parts();

    assert_eq!(text, "Hi there");
    assert_eq!(
        sources,
        vec![Source {
            page: 3,
            company: "Acme".to_string(),
            image_path: "/pages/acme-3.png".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_round_trip_appends_user_then_ai() {
    let server = MockServer::start().await;
    mount_answer(
        &server,
        "hello",
        json!({"response": "Hi there", "sources": [{"page": 3, "company": "Acme"}]}),
    )
    .await;

    let mut app = App::new(server.uri(), SubmitPolicy::Reject);
    let ticket = submit(&mut app, "  hello  ");
    assert_eq!(ticket.query, "hello");
    assert!(app.is_loading());

    let action = dispatch::run(backend_for(&server), ticket).await;
    assert_eq!(update(&mut app, action), Effect::None);

    let messages = app.store.all();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender(), Sender::User);
    assert_eq!(messages[0].text(), "hello");
    assert_eq!(messages[1].sender(), Sender::Ai);
    assert_eq!(messages[1].text(), "Hi there");
    assert_eq!(messages[1].reply_to(), Some(messages[0].id()));
    assert_eq!(messages[1].sources()[0].company, "Acme");
    assert_eq!(messages[1].sources()[0].image_path, "");
    assert!(!messages[1].is_fallback());
    assert!(!app.is_loading());
    assert!(app.can_submit());
}

#[tokio::test]
async fn test_answer_without_sources_has_no_citations() {
    let server = MockServer::start().await;
    mount_answer(&server, "plain", json!({"response": "Just text"})).await;
    mount_answer(&server, "nulled", json!({"response": "Also text", "sources": null})).await;

    let mut app = App::new(server.uri(), SubmitPolicy::Overlap);
    for query in ["plain", "nulled"] {
        let ticket = submit(&mut app, query);
        let action = dispatch::run(backend_for(&server), ticket).await;
        update(&mut app, action);
    }

    let answers: Vec<_> = app.store.all().iter().filter(|m| !m.is_user()).collect();
    assert_eq!(answers.len(), 2);
    for answer in answers {
        assert!(!answer.has_sources());
        assert!(!answer.is_fallback());
    }
}

#[tokio::test]
async fn test_query_is_url_encoded() {
    let server = MockServer::start().await;
    let query = "PAT & revenue? 100%";
    mount_answer(&server, query, json!({"response": "encoded ok", "sources": []})).await;

    let result = backend_for(&server).search(query).await;
    assert_eq!(assert_ok!(result).response, "encoded ok");
}

#[tokio::test]
async fn test_server_error_becomes_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500).set_body_string("index offline"))
        .mount(&server)
        .await;

    let err = assert_err!(backend_for(&server).search("hello").await);
    assert_eq!(
        err,
        BackendError::Status {
            status: 500,
            body: "index offline".to_string(),
        }
    );

    let mut app = App::new(server.uri(), SubmitPolicy::Reject);
    let ticket = submit(&mut app, "hello");
    let action = dispatch::run(backend_for(&server), ticket).await;
    update(&mut app, action);

    let last = app.store.last().expect("fallback appended");
    assert!(last.is_fallback());
    assert_eq!(last.sender(), Sender::Ai);
    assert!(!last.has_sources());
    assert!(!app.is_loading());
}

#[tokio::test]
async fn test_malformed_body_becomes_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = assert_err!(backend_for(&server).search("hello").await);
    assert!(matches!(err, BackendError::Decode(_)));

    let mut app = App::new(server.uri(), SubmitPolicy::Reject);
    let ticket = submit(&mut app, "hello");
    let action = dispatch::run(backend_for(&server), ticket).await;
    update(&mut app, action);
    assert!(app.store.last().expect("fallback appended").is_fallback());
}

#[tokio::test]
async fn test_missing_response_field_is_decode_error() {
    let server = MockServer::start().await;
    mount_answer(&server, "hello", json!({"sources": []})).await;

    let err = assert_err!(backend_for(&server).search("hello").await);
    assert!(matches!(err, BackendError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_service_becomes_fallback() {
    // Port 9 (discard) is closed on test machines
    let backend: Arc<dyn SearchBackend> = Arc::new(HttpBackend::new("http://127.0.0.1:9"));

    let err = assert_err!(backend.search("hello").await);
    assert!(matches!(err, BackendError::Network(_)));

    let mut app = App::new("http://127.0.0.1:9".to_string(), SubmitPolicy::Reject);
    let ticket = submit(&mut app, "hello");
    let action = dispatch::run(backend, ticket).await;
    update(&mut app, action);

    let messages = app.store.all();
    assert_eq!(messages.len(), 2);
    assert!(messages[1].is_fallback());
    assert_eq!(messages[1].reply_to(), Some(messages[0].id()));
}

#[tokio::test]
async fn test_reject_policy_ignores_submit_while_loading() {
    let server = MockServer::start().await;
    mount_answer(&server, "first", json!({"response": "one", "sources": []})).await;

    let mut app = App::new(server.uri(), SubmitPolicy::Reject);
    let ticket = submit(&mut app, "first");
    assert!(!app.can_submit());

    assert_eq!(update(&mut app, Action::Submit("second".into())), Effect::None);
    assert_eq!(app.store.len(), 1);

    let action = dispatch::run(backend_for(&server), ticket).await;
    update(&mut app, action);
    assert_eq!(app.store.len(), 2);
    assert!(app.can_submit());
}

#[tokio::test]
async fn test_overlap_answers_land_in_arrival_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("query", "slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"response": "slow answer", "sources": []}))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    mount_answer(&server, "fast", json!({"response": "fast answer", "sources": []})).await;

    let mut app = App::new(server.uri(), SubmitPolicy::Overlap);
    let slow = submit(&mut app, "slow");
    let fast = submit(&mut app, "fast");
    assert_eq!(app.dispatcher.in_flight(), 2);

    let (tx, mut rx) = mpsc::unbounded_channel();
    for ticket in [slow, fast] {
        let backend = backend_for(&server);
        let tx = tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(dispatch::run(backend, ticket).await);
        });
    }
    drop(tx);

    let first = rx.recv().await.expect("first answer");
    update(&mut app, first);
    assert!(app.is_loading());
    let second = rx.recv().await.expect("second answer");
    update(&mut app, second);
    assert!(!app.is_loading());

    let messages = app.store.all();
    let texts: Vec<_> = messages.iter().map(|m| m.text()).collect();
    assert_eq!(texts, vec!["slow", "fast", "fast answer", "slow answer"]);
    assert_eq!(messages[2].reply_to(), Some(messages[1].id()));
    assert_eq!(messages[3].reply_to(), Some(messages[0].id()));
}
