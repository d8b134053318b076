//! End-to-end streaming over a mock HTTP server

use std::time::Duration;

use futures::StreamExt;
use llm_stream_client::prelude::*;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> Client {
    Client::builder()
        .api_key("test-key")
        .base_url(server.uri())
        .http_stream_disable_compression(true)
        .build()
        .expect("client")
}

/// Accept one connection, answer with `response` verbatim and then hold the
/// socket open without sending anything else.
async fn raw_server(response: &'static [u8]) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let task = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut request = vec![0u8; 16 * 1024];
        let _ = socket.read(&mut request).await;
        socket.write_all(response).await.expect("write response");
        tokio::time::sleep(Duration::from_secs(60)).await;
    });
    (format!("http://{addr}"), task)
}

fn sse(lines: &[&str]) -> String {
    lines.iter().map(|l| format!("{l}\n\n")).collect()
}

#[tokio::test]
async fn chat_stream_emits_chunks_in_order_then_done() {
    let server = MockServer::start().await;
    let body = sse(&[
        r#"data: {"id":"chatcmpl-1","object":"chat.completion.chunk","created":1700000000,"model":"gpt-3.5-turbo","choices":[{"delta":{"role":"assistant"},"index":0}]}"#,
        r#"data: {"id":"chatcmpl-1","object":"chat.completion.chunk","created":1700000000,"model":"gpt-3.5-turbo","choices":[{"delta":{"content":"Hi"},"index":0}]}"#,
        "data: [DONE]",
    ]);

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(header("accept", "text/event-stream"))
        .and(header("accept-encoding", "identity"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-3.5-turbo",
            "stream": true,
            "temperature": 0.0,
            "messages": [{"role": "user", "content": "hello"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let mut stream = client_for(&server)
        .chat_stream(
            vec![ChatMessage::user("hello")],
            SamplingParams::new().with_temperature(0.0),
        )
        .await
        .expect("stream opens");

    let first = stream.next().await.expect("first").expect("ok");
    assert_eq!(first.choices[0].delta.role, Some(Role::Assistant));
    assert_eq!(first.created.map(|t| t.timestamp()), Some(1_700_000_000));

    let second = stream.next().await.expect("second").expect("ok");
    assert_eq!(second.content(), Some("Hi"));

    assert!(stream.next().await.is_none());
    assert_eq!(stream.state(), StreamState::Done);
    assert_eq!(stream.emitted(), 2);
}

#[tokio::test]
async fn unauthorized_open_surfaces_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .chat_stream(vec![ChatMessage::user("hi")], SamplingParams::default())
        .await
        .expect_err("401 must fail the open");

    match err {
        LlmError::TransportError {
            status,
            reason,
            body,
        } => {
            assert_eq!(status, 401);
            assert_eq!(reason, "Unauthorized");
            assert!(body.unwrap_or_default().contains("Incorrect API key"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn completion_stream_handles_crlf_and_comments() {
    let server = MockServer::start().await;
    let body = concat!(
        ": ping\r\n\r\n",
        "data: {\"id\":\"cmpl-1\",\"choices\":[{\"text\":\"Once\",\"index\":0}]}\r\n\r\n",
        "event: completion\r\n",
        "data: {\"id\":\"cmpl-1\",\"choices\":[{\"text\":\" upon\",\"index\":0,\"finish_reason\":\"length\"}]}\r\n\r\n",
        "data: [DONE]\r\n\r\n",
    );
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .and(body_partial_json(serde_json::json!({
            "model": "text-davinci-003",
            "prompt": ["Tell me a story"],
            "stream": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let stream = client_for(&server)
        .completion_stream("Tell me a story".to_string(), SamplingParams::default())
        .await
        .expect("stream opens");

    assert_eq!(stream.collect_text().await.expect("text"), "Once upon");
}

#[tokio::test]
async fn malformed_chunk_fails_stream_with_raw_payload() {
    let server = MockServer::start().await;
    let body = sse(&[
        r#"data: {"choices":[{"delta":{"content":"ok"},"index":0}]}"#,
        r#"data: {"choices":[{"delta":{"content":"tru"#,
        r#"data: {"choices":[{"delta":{"content":"never"},"index":0}]}"#,
        "data: [DONE]",
    ]);
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let mut stream = client_for(&server)
        .chat_stream(vec![ChatMessage::user("hi")], SamplingParams::default())
        .await
        .expect("stream opens");

    assert!(stream.next().await.expect("first").is_ok());
    let err = stream.next().await.expect("second").expect_err("decode error");
    assert_eq!(
        err.payload(),
        Some(r#"{"choices":[{"delta":{"content":"tru"#)
    );
    assert!(stream.next().await.is_none());
    assert_eq!(stream.state(), StreamState::Failed);
}

#[tokio::test]
async fn body_closed_without_sentinel_ends_done() {
    let server = MockServer::start().await;
    let body = sse(&[r#"data: {"choices":[{"delta":{"content":"partial"},"index":0}]}"#]);
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let mut stream = client_for(&server)
        .chat_stream(vec![ChatMessage::user("hi")], SamplingParams::default())
        .await
        .expect("stream opens");

    let chunks: Vec<_> = stream.by_ref().collect().await;
    assert_eq!(chunks.len(), 1);
    assert_eq!(stream.state(), StreamState::Done);
}

#[tokio::test]
async fn cancel_during_header_wait_yields_cancelled_stream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(sse(&["data: [DONE]"]), "text/event-stream")
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let cancel = new_cancel_handle();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let mut stream = tokio::time::timeout(
        Duration::from_secs(3),
        client.chat_stream_with_cancel(
            vec![ChatMessage::user("hi")],
            SamplingParams::default(),
            cancel,
        ),
    )
    .await
    .expect("cancel must not wait for the slow server")
    .expect("cancellation is not an error");

    assert_eq!(stream.state(), StreamState::Cancelled);
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn collect_message_rebuilds_assistant_turn() {
    let server = MockServer::start().await;
    let body = sse(&[
        r#"data: {"choices":[{"delta":{"role":"assistant"},"index":0}]}"#,
        r#"data: {"choices":[{"delta":{"content":"Hello"},"index":0}]}"#,
        r#"data: {"choices":[{"delta":{"content":" there"},"index":0}]}"#,
        r#"data: {"choices":[{"delta":{},"index":0,"finish_reason":"stop"}]}"#,
        "data: [DONE]",
    ]);
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let message = client_for(&server)
        .chat_stream(
            vec![
                ChatMessage::system("You are terse."),
                ChatMessage::user("Greet me"),
            ],
            SamplingParams::default(),
        )
        .await
        .expect("stream opens")
        .collect_message()
        .await
        .expect("message");

    assert_eq!(message, ChatMessage::assistant("Hello there"));
}

#[tokio::test]
async fn concurrent_streams_are_independent() {
    let server = MockServer::start().await;
    let body = sse(&[
        r#"data: {"choices":[{"delta":{"content":"a"},"index":0}]}"#,
        r#"data: {"choices":[{"delta":{"content":"b"},"index":0}]}"#,
        "data: [DONE]",
    ]);
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut first = client
        .chat_stream(vec![ChatMessage::user("1")], SamplingParams::default())
        .await
        .expect("first opens");
    let second = client
        .chat_stream(vec![ChatMessage::user("2")], SamplingParams::default())
        .await
        .expect("second opens");

    assert_eq!(first.next().await.unwrap().unwrap().content(), Some("a"));
    first.cancel();
    assert_eq!(first.state(), StreamState::Cancelled);

    let message = second.collect_message().await.expect("second completes");
    assert_eq!(message.content, "ab");
}

#[tokio::test]
async fn cancel_while_reading_stalled_error_body_returns_promptly() {
    let (uri, server) = raw_server(
        b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 1000\r\n\r\npartial",
    )
    .await;
    let client = Client::builder()
        .api_key("test-key")
        .base_url(uri)
        .build()
        .expect("client");

    let cancel = new_cancel_handle();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let stream = tokio::time::timeout(
        Duration::from_secs(3),
        client.chat_stream_with_cancel(
            vec![ChatMessage::user("hi")],
            SamplingParams::default(),
            cancel,
        ),
    )
    .await
    .expect("cancel must interrupt the error body read")
    .expect("cancellation is not an error");

    assert_eq!(stream.state(), StreamState::Cancelled);
    server.abort();
}

#[tokio::test]
async fn transport_error_carries_server_reason_phrase() {
    let (uri, server) = raw_server(
        b"HTTP/1.1 429 Slow Down Please\r\nContent-Length: 4\r\nConnection: close\r\n\r\nbusy",
    )
    .await;
    let client = Client::builder()
        .api_key("test-key")
        .base_url(uri)
        .build()
        .expect("client");

    let err = client
        .chat_stream(vec![ChatMessage::user("hi")], SamplingParams::default())
        .await
        .expect_err("429 must fail the open");

    assert_eq!(
        err,
        LlmError::TransportError {
            status: 429,
            reason: "Slow Down Please".to_string(),
            body: Some("busy".to_string()),
        }
    );
    assert_eq!(err.category(), ErrorCategory::RateLimit);
    server.abort();
}

#[tokio::test]
async fn overlong_line_fails_stream() {
    let server = MockServer::start().await;
    let body = format!("data: {}\n\ndata: [DONE]\n\n", "x".repeat(512));
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let client = Client::builder()
        .api_key("test-key")
        .base_url(server.uri())
        .stream_max_line_length(64)
        .build()
        .expect("client");
    let mut stream = client
        .chat_stream(vec![ChatMessage::user("hi")], SamplingParams::default())
        .await
        .expect("stream opens");

    let err = stream.next().await.expect("error item").expect_err("line too long");
    assert!(matches!(err, LlmError::StreamError(_)));
    assert!(stream.next().await.is_none());
    assert_eq!(stream.state(), StreamState::Failed);
}
