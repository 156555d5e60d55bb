use std::time::Duration;

use lexview_base::ErrorKind;
use serde_json::{json, Value};
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::{ClientConfig, PositionShape, TokenFetcher};

fn point_tokens() -> Value {
    json!([
        {"type": "keyword", "attr": 0, "position": {"line": 1, "column": 1}},
        {"type": "identifier", "attr": 0, "position": {"line": 1, "column": 5}},
        {"type": "operator", "attr": 0, "position": {"line": 1, "column": 7}},
        {"type": "number", "attr": 1, "position": {"line": 1, "column": 9}},
        {"type": "punctuation", "attr": 0, "position": {"line": 1, "column": 10}}
    ])
}

fn span_tokens() -> Value {
    json!([
        {
            "type": "R_FLOAT",
            "location": {"start": {"line": 1, "column": 1}, "end": {"line": 1, "column": 5}},
            "attr": 0
        },
        {
            "type": "I_ID",
            "location": {"start": {"line": 1, "column": 7}, "end": {"line": 1, "column": 7}},
            "attr": 2
        },
        {
            "type": "V_NUM_FLOAT",
            "location": {"start": {"line": 2, "column": 3}, "end": {"line": 2, "column": 6}},
            "attr": 3.25
        }
    ])
}

fn point_fetcher(server: &MockServer) -> TokenFetcher {
    TokenFetcher::new(ClientConfig::new(server.uri()).with_position_shape(PositionShape::Point))
        .expect("fetcher should build")
}

fn span_fetcher(server: &MockServer) -> TokenFetcher {
    TokenFetcher::new(ClientConfig::new(server.uri())).expect("fetcher should build")
}

#[tokio::test]
async fn posts_raw_code_and_resolves_keyword_first() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/lexer"))
        .and(header("content-type", "text/plain; charset=utf-8"))
        .and(body_string("let x = 1;"))
        .respond_with(ResponseTemplate::new(200).set_body_json(point_tokens()))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = point_fetcher(&server)
        .fetch_tokens("let x = 1;")
        .await
        .expect("fetch should succeed");

    assert!(tokens.len() >= 2);
    let first = tokens.first().expect("sequence should not be empty");
    assert_eq!(first.token_type, "keyword");
}

#[tokio::test]
async fn passes_tokens_through_unchanged_for_any_input() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/lexer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(point_tokens()))
        .mount(&server)
        .await;
    let fetcher = point_fetcher(&server);

    for code in ["", "let x = 1;", "int main() {\n  return 0;\n}", "ünïcödé ✓", "{\"a\": 1}"] {
        let tokens = fetcher
            .fetch_tokens(code)
            .await
            .expect("fetch should succeed");
        assert_eq!(
            serde_json::to_value(&tokens).expect("tokens should encode"),
            point_tokens(),
            "input {code:?}"
        );
    }
}

#[tokio::test]
async fn preserves_span_positions_and_float_attributes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/lexer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(span_tokens()))
        .mount(&server)
        .await;

    let tokens = span_fetcher(&server)
        .fetch_tokens("float a;\n  3.25")
        .await
        .expect("fetch should succeed");

    assert_eq!(tokens.shape(), PositionShape::Span);
    assert_eq!(tokens.tokens()[2].attr_as_f64(), Some(3.25));
    assert_eq!(
        serde_json::to_value(&tokens).expect("tokens should encode"),
        span_tokens()
    );
}

#[tokio::test]
async fn server_error_status_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/lexer"))
        .respond_with(ResponseTemplate::new(500).set_body_json(point_tokens()))
        .mount(&server)
        .await;

    let error = point_fetcher(&server)
        .fetch_tokens("let x = 1;")
        .await
        .expect_err("500 should fail");

    assert_eq!(error.kind(), &ErrorKind::Transport { status: Some(500) });
}

#[tokio::test]
async fn redirect_is_transport_error_without_second_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/lexer"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/elsewhere"))
        .mount(&server)
        .await;
    Mock::given(path("/elsewhere"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let error = span_fetcher(&server)
        .fetch_tokens("int a;")
        .await
        .expect_err("redirect should fail");

    assert_eq!(error.kind(), &ErrorKind::Transport { status: Some(302) });
    let received = server
        .received_requests()
        .await
        .expect("request recording should be enabled");
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].url.path(), "/lexer");
}

#[tokio::test]
async fn missing_route_is_transport_error() {
    let server = MockServer::start().await;

    let error = span_fetcher(&server)
        .fetch_tokens("int a;")
        .await
        .expect_err("unmatched route should fail");

    assert!(error.is_transport());
    assert_eq!(error.status(), Some(404));
}

#[tokio::test]
async fn connection_refused_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("should bind free port");
    let address = listener.local_addr().expect("listener should have address");
    drop(listener);

    let fetcher =
        TokenFetcher::new(ClientConfig::new(format!("http://{address}"))).expect("should build");
    let error = tokio::time::timeout(Duration::from_secs(10), fetcher.fetch_tokens("anything"))
        .await
        .expect("refused connection should fail promptly")
        .expect_err("refused connection should fail");

    assert_eq!(error.kind(), &ErrorKind::Transport { status: None });
    assert!(std::error::Error::source(&error).is_some());
}

#[tokio::test]
async fn missing_attr_rejects_whole_response() {
    let mut payload = point_tokens();
    payload[3]
        .as_object_mut()
        .expect("token should be an object")
        .remove("attr");

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/lexer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload))
        .mount(&server)
        .await;

    let error = point_fetcher(&server)
        .fetch_tokens("let x = 1;")
        .await
        .expect_err("missing attr should fail");

    assert!(error.is_malformed_response());
    assert!(error.to_string().contains("token 3"));
}

#[tokio::test]
async fn mixed_position_shapes_are_rejected() {
    let mut payload = span_tokens();
    payload
        .as_array_mut()
        .expect("payload should be an array")
        .push(json!({"type": "S_SEMICOLON", "attr": 0, "position": {"line": 2, "column": 7}}));

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/lexer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload))
        .mount(&server)
        .await;

    let error = span_fetcher(&server)
        .fetch_tokens("float a;")
        .await
        .expect_err("mixed shapes should fail");

    assert!(error.is_malformed_response());
}

#[tokio::test]
async fn non_json_success_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/lexer"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let error = span_fetcher(&server)
        .fetch_tokens("int a;")
        .await
        .expect_err("html body should fail");

    assert!(matches!(error.kind(), ErrorKind::MalformedResponse(_)));
}

#[tokio::test]
async fn trailing_slash_in_server_url_targets_same_route() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/lexer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(span_tokens()))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher =
        TokenFetcher::new(ClientConfig::new(format!("{}/", server.uri()))).expect("should build");
    assert_eq!(fetcher.endpoint().path(), "/lexer");
    fetcher
        .fetch_tokens("int a;")
        .await
        .expect("fetch should succeed");
}

#[tokio::test]
async fn concurrent_calls_complete_independently() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/lexer"))
        .and(body_string("slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(span_tokens())
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/lexer"))
        .and(body_string("fast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let fetcher = span_fetcher(&server);
    let slow = fetcher.fetch_tokens("slow");
    let fast = fetcher.fetch_tokens("fast");
    tokio::pin!(slow);

    let fast_tokens = tokio::select! {
        _ = &mut slow => panic!("delayed response should not arrive first"),
        result = fast => result.expect("fast fetch should succeed"),
    };
    assert!(fast_tokens.is_empty());

    let slow_tokens = slow.await.expect("slow fetch should succeed");
    assert_eq!(slow_tokens.len(), 3);
}

#[test]
fn rejects_unparsable_server_url() {
    let error = TokenFetcher::new(ClientConfig::new("not a url"))
        .expect_err("invalid URL should fail");
    assert!(error.to_string().contains("invalid lexer service URL"));
}
