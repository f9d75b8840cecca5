use bytes::Bytes;
use converge_llm::{parse_sse_byte_stream, StreamEvent};
use futures::StreamExt;

type ChunkResult = Result<Bytes, std::convert::Infallible>;

fn byte_stream(chunks: Vec<&str>) -> impl futures::Stream<Item = ChunkResult> {
    let owned: Vec<ChunkResult> = chunks
        .into_iter()
        .map(|c| Ok(Bytes::from(c.to_string())))
        .collect();
    futures::stream::iter(owned)
}

async fn collect(chunks: Vec<&str>) -> Vec<StreamEvent> {
    parse_sse_byte_stream(byte_stream(chunks))
        .map(|e| e.expect("transport error"))
        .collect()
        .await
}

#[tokio::test]
async fn test_tokens_then_done() {
    let events = collect(vec![
        "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"},\"finish_reason\":null}]}\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"},\"finish_reason\":null}]}\n",
        "data: [DONE]\n",
    ])
    .await;

    assert_eq!(events.len(), 3);
    match &events[0] {
        StreamEvent::Token { content } => assert_eq!(content, "Hel"),
        _ => panic!("Expected Token variant"),
    }
    match &events[1] {
        StreamEvent::Token { content } => assert_eq!(content, "lo"),
        _ => panic!("Expected Token variant"),
    }
    assert!(matches!(events[2], StreamEvent::Done));
}

#[tokio::test]
async fn test_line_split_across_chunks() {
    let events = collect(vec![
        "data: {\"choices\":[{\"delta\":{\"con",
        "tent\":\"Hi\"},\"finish_reason\":null}]}\ndata: [DONE]\n",
    ])
    .await;

    assert_eq!(events.len(), 2);
    match &events[0] {
        StreamEvent::Token { content } => assert_eq!(content, "Hi"),
        _ => panic!("Expected Token variant"),
    }
}

#[tokio::test]
async fn test_malformed_chunk_is_skipped() {
    let events = collect(vec![
        "data: this is not json\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"ok\"},\"finish_reason\":null}]}\n",
        "data: [DONE]\n",
    ])
    .await;

    assert_eq!(events.len(), 2);
    match &events[0] {
        StreamEvent::Token { content } => assert_eq!(content, "ok"),
        _ => panic!("Expected Token variant"),
    }
}

#[tokio::test]
async fn test_empty_delta_content_is_skipped() {
    let events = collect(vec![
        "data: {\"choices\":[{\"delta\":{\"content\":null},\"finish_reason\":null}]}\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"\"},\"finish_reason\":null}]}\n",
        "data: [DONE]\n",
    ])
    .await;

    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], StreamEvent::Done));
}

#[tokio::test]
async fn test_non_data_lines_ignored() {
    let events = collect(vec![
        ": keep-alive comment\n",
        "event: ping\n",
        "data: [DONE]\n",
    ])
    .await;

    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], StreamEvent::Done));
}

#[tokio::test]
async fn test_nothing_after_done_terminator() {
    let events = collect(vec![
        "data: [DONE]\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"late\"},\"finish_reason\":null}]}\n",
    ])
    .await;

    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], StreamEvent::Done));
}

#[test]
fn test_stream_event_serialization() {
    let token = StreamEvent::Token {
        content: "Test".to_string(),
    };
    let json = serde_json::to_string(&token).unwrap();
    assert!(json.contains("\"type\":\"token\""));
    assert!(json.contains("Test"));

    let done = serde_json::to_string(&StreamEvent::Done).unwrap();
    assert!(done.contains("\"type\":\"done\""));
}
