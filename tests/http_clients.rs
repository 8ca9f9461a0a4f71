//! Tracker and summarizer clients against a local HTTP server.
//!
//! Tests: request shape (path, query parameters, headers, JSON body), response
//! decoding, and error mapping for non-2xx and malformed responses.

mod common;

use common::init_test_logging;
use common::server::MockServer;
use quality_report::config::{SummarizerSettings, TrackerSettings};
use quality_report::summarize::{ChatMessage, OpenAiSummarizer, Summarizer};
use quality_report::tracker::{IssueSource, Projection, TrackerClient};
use quality_report::{ErrorCode, ReportError};
use serde_json::json;

fn tracker(server: &MockServer, max_results: Option<usize>) -> TrackerClient {
    let settings = TrackerSettings {
        base_url: format!("{}/api/", server.base_url),
        token_env: "UNUSED".to_string(),
        timeout_secs: 5,
        max_results,
    };
    TrackerClient::new(&settings, "perm:secret").expect("client")
}

fn summarizer(server: &MockServer) -> OpenAiSummarizer {
    let settings = SummarizerSettings {
        enabled: true,
        base_url: format!("{}/v1", server.base_url),
        model: "gpt-4o".to_string(),
        timeout_secs: 5,
        ..SummarizerSettings::default()
    };
    OpenAiSummarizer::new(&settings, "sk-test").expect("summarizer")
}

// ============================================================================
// TRACKER
// ============================================================================

#[test]
fn tracker_sends_query_fields_and_credentials() {
    init_test_logging();
    let body = json!([
        {
            "id": "25-1",
            "idReadable": "RSRP-1",
            "summary": "Crash in debugger",
            "customFields": [
                {"name": "Type", "value": {"name": "Bug"}},
                {"name": "Priority", "value": {"name": "Major"}},
                {"name": "Available in", "value": [{"name": "2024.2.1"}, {"name": "2024.2.2"}]}
            ]
        },
        {"id": "25-2", "summary": "No fields", "customFields": []}
    ]);
    let server = MockServer::start(vec![(200, body.to_string())]);
    let client = tracker(&server, Some(500));

    let issues = client
        .fetch("project:ReSharper and created: 2024-04-10 .. 2024-08-14", Projection::Fields)
        .expect("fetch");

    assert_eq!(issues.len(), 2);
    assert_eq!(issues[0].id, "RSRP-1");
    assert_eq!(issues[0].issue_type(), Some("Bug"));
    assert_eq!(issues[0].available_in(), Some("2024.2.1, 2024.2.2"));
    assert_eq!(issues[1].id, "25-2");
    assert_eq!(issues[1].priority(), None);

    let requests = server.finish();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, "GET");
    assert!(request.url.starts_with("/api/issues?"), "url was {}", request.url);
    assert_eq!(request.authorization.as_deref(), Some("Bearer perm:secret"));
    assert_eq!(request.accept.as_deref(), Some("application/json"));
    assert_eq!(
        request.param("query").as_deref(),
        Some("project:ReSharper and created: 2024-04-10 .. 2024-08-14")
    );
    assert_eq!(request.param("fields").as_deref(), Some(Projection::Fields.fields()));
    assert_eq!(request.param("$top").as_deref(), Some("500"));
}

#[test]
fn tracker_requests_comments_and_omits_top_when_uncapped() {
    init_test_logging();
    let body = json!([{
        "idReadable": "RSRP-9",
        "summary": "Slow",
        "comments": [
            {
                "id": "4-1",
                "text": "still slow",
                "created": 1_723_000_000_000_i64,
                "author": {"login": "u", "email": "u@example.com"}
            }
        ]
    }]);
    let server = MockServer::start(vec![(200, body.to_string())]);
    let client = tracker(&server, None);

    let issues = client
        .fetch("project:ReSharper", Projection::FieldsWithComments)
        .expect("fetch");
    assert_eq!(issues[0].comments.len(), 1);
    assert_eq!(issues[0].comments[0].author.as_deref(), Some("u@example.com"));

    let request = &server.finish()[0];
    assert_eq!(request.param("fields").as_deref(), Some(Projection::FieldsWithComments.fields()));
    assert_eq!(request.param("$top"), None);
}

#[test]
fn tracker_non_success_is_fatal_http_error() {
    init_test_logging();
    let server = MockServer::start(vec![(401, r#"{"error":"Unauthorized"}"#.to_string())]);
    let client = tracker(&server, Some(10));

    let err = client.fetch("project:ReSharper", Projection::Fields).unwrap_err();
    match &err {
        ReportError::Http { status, url, body } => {
            assert_eq!(*status, 401);
            assert!(url.ends_with("/api/issues"));
            assert!(body.contains("Unauthorized"));
        }
        other => panic!("expected Http error, got {other:?}"),
    }
    assert_eq!(err.code(), ErrorCode::TrackerUnavailable);
    assert_eq!(err.code().exit_code(), 3);
    server.finish();
}

#[test]
fn tracker_malformed_body_is_an_error() {
    init_test_logging();
    let server = MockServer::start(vec![(200, r#"{"not": "an array"}"#.to_string())]);
    let client = tracker(&server, Some(10));

    let err = client.fetch("project:ReSharper", Projection::Fields).unwrap_err();
    assert!(matches!(err, ReportError::Transport(_)), "got {err:?}");
    server.finish();
}

#[test]
fn tracker_token_must_be_set() {
    let settings = TrackerSettings {
        token_env: "QREPORT_TEST_TOKEN_THAT_IS_NOT_SET".to_string(),
        ..TrackerSettings::default()
    };
    let err = TrackerClient::from_env(&settings).unwrap_err();
    assert_eq!(err.code(), ErrorCode::ConfigError);
    assert!(err.to_string().contains("QREPORT_TEST_TOKEN_THAT_IS_NOT_SET not set"));
}

// ============================================================================
// SUMMARIZER
// ============================================================================

#[test]
fn summarizer_posts_messages_and_returns_first_choice() {
    init_test_logging();
    let body = json!({
        "choices": [
            {"message": {"role": "assistant", "content": "## Findings\n\nFewer bugs."}},
            {"message": {"role": "assistant", "content": "ignored"}}
        ]
    });
    let server = MockServer::start(vec![(200, body.to_string())]);
    let client = summarizer(&server);

    let messages = [ChatMessage::system("You are a QA expert."), ChatMessage::user("data")];
    let answer = client.complete(&messages).expect("complete");
    assert_eq!(answer, "## Findings\n\nFewer bugs.");

    let request = &server.finish()[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.url, "/v1/chat/completions");
    assert_eq!(request.authorization.as_deref(), Some("Bearer sk-test"));
    let sent: serde_json::Value = serde_json::from_str(&request.body).expect("json body");
    assert_eq!(sent["model"], "gpt-4o");
    assert_eq!(sent["messages"][0]["role"], "system");
    assert_eq!(sent["messages"][1]["content"], "data");
}

#[test]
fn summarizer_empty_choices_is_an_error() {
    init_test_logging();
    let server = MockServer::start(vec![(200, r#"{"choices": []}"#.to_string())]);
    let client = summarizer(&server);

    let err = client.complete(&[ChatMessage::user("data")]).unwrap_err();
    assert!(matches!(err, ReportError::Summarizer(_)), "got {err:?}");
    assert_eq!(err.code().exit_code(), 3);
    server.finish();
}

#[test]
fn summarizer_non_success_is_http_error() {
    init_test_logging();
    let server = MockServer::start(vec![(429, r#"{"error": "rate limited"}"#.to_string())]);
    let client = summarizer(&server);

    let err = client.complete(&[ChatMessage::user("data")]).unwrap_err();
    assert!(matches!(err, ReportError::Http { status: 429, .. }), "got {err:?}");
    server.finish();
}
