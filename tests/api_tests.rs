mod common;

use serde_json::json;

use common::{chat_completion, embeddings, sample_deck_json, MockServer};
use deckbot::config::Settings;
use deckbot::llm::{GeminiClient, OpenAiClient, SlideGenerator};
use deckbot::search::build_embedder;
use deckbot::slides::{SlideError, SlideKind};
use deckbot::transcription::WhisperTranscriber;
use deckbot::DeckbotError;

fn settings_for(server: &MockServer) -> Settings {
    let mut settings = Settings::default();
    settings.llm.api_key = "sk-test".to_string();
    settings.llm.endpoint = server.url().to_string();
    settings.llm.timeout_secs = 10;
    settings.embeddings.api_key = "sk-test".to_string();
    settings.embeddings.endpoint = server.url().to_string();
    settings.transcription.api_key = "sk-test".to_string();
    settings.transcription.endpoint = server.url().to_string();
    settings
}

#[tokio::test]
async fn generates_deck_through_structured_output() {
    let server = MockServer::start(vec![chat_completion(&sample_deck_json())]);
    let client = OpenAiClient::from_settings(&settings_for(&server)).unwrap();

    let deck = client.generate_deck("A talk on deckbot").await.unwrap();

    assert_eq!(deck.talk_title, "deckbot");
    assert_eq!(deck.len(), 4);
    assert_eq!(deck.slides[2].kind(), SlideKind::Html);

    let requests = server.finish();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/v1/chat/completions");
    assert_eq!(request.header("authorization"), Some("Bearer sk-test"));

    let body = request.json();
    assert_eq!(body["response_format"]["type"], "json_schema");
    assert_eq!(body["response_format"]["json_schema"]["name"], "slide_deck");
    assert_eq!(body["response_format"]["json_schema"]["strict"], true);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["content"], "A talk on deckbot");
}

#[tokio::test]
async fn heading_in_generated_slide_is_rejected() {
    let slide = json!({ "title": "Intro", "content": "## Hello\nworld", "type": "Markdown" });
    let server = MockServer::start(vec![chat_completion(&slide)]);
    let client = OpenAiClient::from_settings(&settings_for(&server)).unwrap();

    let err = client.generate_slide("an intro slide").await.unwrap_err();
    assert!(
        matches!(err, DeckbotError::Slide(SlideError::MarkdownHeader { line: 1 })),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn malformed_output_is_schema_error() {
    let server = MockServer::start(vec![chat_completion(&json!({ "headline": "nope" }))]);
    let client = OpenAiClient::from_settings(&settings_for(&server)).unwrap();

    let err = client.generate_slide("anything").await.unwrap_err();
    assert!(matches!(err, DeckbotError::Schema(_)), "unexpected error: {err}");
}

#[tokio::test]
async fn error_status_is_service_failure() {
    let server = MockServer::start(vec![(
        429,
        json!({ "error": { "message": "Rate limit reached" } }).to_string(),
    )]);
    let client = OpenAiClient::from_settings(&settings_for(&server)).unwrap();

    let err = client.generate_deck("anything").await.unwrap_err();
    match err {
        DeckbotError::Service { message, .. } => {
            assert!(message.contains("429"));
            assert!(message.contains("Rate limit reached"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn refusal_is_service_failure() {
    let body = json!({
        "choices": [{ "message": { "role": "assistant", "content": null, "refusal": "I can't help with that." } }]
    });
    let server = MockServer::start(vec![(200, body.to_string())]);
    let client = OpenAiClient::from_settings(&settings_for(&server)).unwrap();

    let err = client.generate_slide("anything").await.unwrap_err();
    assert!(err.to_string().contains("model refused"));
}

#[tokio::test]
async fn edit_sends_old_slide_and_change_to_model() {
    let replacement = json!({ "title": "Why deckbot, briefly", "content": "Less drawing, more talking.", "type": "Markdown" });
    let server = MockServer::start(vec![
        chat_completion(&sample_deck_json()),
        chat_completion(&replacement),
    ]);
    let client = OpenAiClient::from_settings(&settings_for(&server)).unwrap();

    let mut deck = client.generate_deck("A talk on deckbot").await.unwrap();
    let original = deck.clone();
    deck.edit(0, "make it one line", &client).await.unwrap();

    assert_eq!(deck.slides[0].title(), "Why deckbot, briefly");
    assert_eq!(&deck.slides[1..], &original.slides[1..]);

    let requests = server.finish();
    let prompt = requests[1].json()["messages"][1]["content"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(prompt.contains("make it one line"));
    assert!(prompt.contains("## Why deckbot"));
    assert_eq!(requests[1].json()["response_format"]["json_schema"]["name"], "slide");
}

#[tokio::test]
async fn select_embeds_slides_then_query() {
    let server = MockServer::start(vec![
        chat_completion(&sample_deck_json()),
        embeddings(&[
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
            vec![0.5, 0.5, 0.0],
        ]),
        embeddings(&[vec![0.1, 0.0, 0.9]]),
    ]);
    let settings = settings_for(&server);
    let client = OpenAiClient::from_settings(&settings).unwrap();
    let embedder = build_embedder(&settings).unwrap();

    let deck = client.generate_deck("A talk on deckbot").await.unwrap();
    let index = deck.select("the quotes from users", embedder.as_ref()).await.unwrap();
    assert_eq!(index, 2);

    let requests = server.finish();
    assert_eq!(requests[1].path, "/v1/embeddings");
    let inputs = requests[1].json()["input"].as_array().unwrap().len();
    assert_eq!(inputs, 4);
    assert_eq!(requests[2].json()["input"][0], "the quotes from users");
}

#[tokio::test]
async fn transcription_uploads_audio_and_cleans_up() {
    let server = MockServer::start(vec![(200, json!({ "text": " A talk about tools. " }).to_string())]);
    let tmp = tempfile::tempdir().unwrap();
    let transcriber = WhisperTranscriber::from_settings(&settings_for(&server))
        .unwrap()
        .with_temp_dir(tmp.path());

    let text = transcriber.transcribe(b"RIFF\x24\x00\x00\x00WAVEfmt ").await.unwrap();
    assert_eq!(text, "A talk about tools.");
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);

    let requests = server.finish();
    let request = &requests[0];
    assert_eq!(request.path, "/v1/audio/transcriptions");
    assert!(request
        .header("content-type")
        .unwrap_or_default()
        .starts_with("multipart/form-data"));
    let body = request.body_text();
    assert!(body.contains("whisper-1"));
    assert!(body.contains("filename=\"deckbot-"));
}

#[tokio::test]
async fn transcription_cleans_up_after_service_error() {
    let server = MockServer::start(vec![(500, json!({ "error": "boom" }).to_string())]);
    let tmp = tempfile::tempdir().unwrap();
    let transcriber = WhisperTranscriber::from_settings(&settings_for(&server))
        .unwrap()
        .with_temp_dir(tmp.path());

    let err = transcriber.transcribe(b"RIFF").await.unwrap_err();
    assert!(matches!(err, DeckbotError::Service { .. }));
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn gemini_sends_key_in_header_not_url() {
    let response = json!({
        "candidates": [{ "content": { "parts": [{ "text": sample_deck_json().to_string() }] } }]
    });
    let server = MockServer::start(vec![
        (200, response.to_string()),
        (200, json!({ "embeddings": [{ "values": [1.0, 0.0] }] }).to_string()),
    ]);

    let mut settings = settings_for(&server);
    settings.llm.provider = "gemini".to_string();
    settings.llm.api_key = "g-secret".to_string();
    settings.embeddings.provider = "gemini".to_string();
    settings.embeddings.api_key = "g-secret".to_string();

    let client = GeminiClient::from_settings(&settings).unwrap();
    let deck = client.generate_deck("A talk on deckbot").await.unwrap();
    assert_eq!(deck.len(), 4);

    let embedder = build_embedder(&settings).unwrap();
    let vectors = embedder.embed(&["hello".to_string()]).await.unwrap();
    assert_eq!(vectors, vec![vec![1.0, 0.0]]);

    let requests = server.finish();
    assert_eq!(requests[0].path, "/v1/models/gemini-2.5-flash:generateContent");
    assert_eq!(requests[1].path, "/v1/models/text-embedding-004:batchEmbedContents");
    for request in &requests {
        assert_eq!(request.header("x-goog-api-key"), Some("g-secret"));
        assert!(!request.path.contains("g-secret"));
    }
}
