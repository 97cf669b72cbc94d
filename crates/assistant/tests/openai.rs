use std::time::Duration;

use axum::{Json, Router, http::HeaderMap, http::StatusCode, routing::post};
use mealmate_assistant::{
    Assistant, CompletionProvider, CompletionRequest, HouseholdContext, Message, OpenAiClient,
    OpenAiConfig, Priority, RecommendInput, RequestQueue,
};
use serde_json::{Value, json};
use std::sync::Arc;

async fn chat_completions(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "Bearer test-key");

    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"message": "invalid api key"}})),
        );
    }

    let prompt = body["messages"][1]["content"].as_str().unwrap_or_default();
    let content = if prompt.contains("recipe") {
        "```json\n[{\"name\": \"Lentil Soup\", \"ingredients\": [\"200 g red lentils\"], \"instructions\": [\"Simmer\"]}]\n```"
    } else {
        "not json at all"
    };

    (
        StatusCode::OK,
        Json(json!({
            "id": "chatcmpl-1",
            "model": body["model"],
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop",
            }],
            "echo": {
                "temperature": body["temperature"],
                "max_tokens": body["max_tokens"],
            }
        })),
    )
}

async fn serve_llm() -> anyhow::Result<String> {
    let app = Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .route(
            "/broken/chat/completions",
            post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(format!("http://{addr}"))
}

fn config(base_url: String, api_key: &str) -> OpenAiConfig {
    OpenAiConfig {
        base_url,
        api_key: api_key.to_owned(),
        model: "gpt-test".to_owned(),
        temperature: 0.7,
        max_tokens: 512,
        timeout: Duration::from_secs(5),
    }
}

#[tokio::test]
async fn completes_against_compatible_endpoint() -> anyhow::Result<()> {
    let base = serve_llm().await?;
    let client = OpenAiClient::new(config(format!("{base}/v1/"), "test-key"))?;
    assert_eq!(client.model(), "gpt-test");

    let completion = client
        .complete(CompletionRequest {
            messages: vec![Message::system("be brief"), Message::user("one recipe")],
            ..Default::default()
        })
        .await?;

    assert_eq!(completion.model, "gpt-test");
    assert!(completion.content.contains("Lentil Soup"));

    Ok(())
}

#[tokio::test]
async fn upstream_errors_are_unavailable() -> anyhow::Result<()> {
    let base = serve_llm().await?;

    let client = OpenAiClient::new(config(format!("{base}/v1"), "wrong-key"))?;
    let err = client
        .complete(CompletionRequest {
            messages: vec![Message::user("hi")],
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, mealmate_shared::Error::Unavailable(msg) if msg.contains("401")));

    let client = OpenAiClient::new(config(format!("{base}/broken"), "test-key"))?;
    let err = client
        .complete(CompletionRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, mealmate_shared::Error::Unavailable(msg) if msg.contains("502")));

    let client = OpenAiClient::new(config("http://127.0.0.1:1".to_owned(), "test-key"))?;
    let err = client
        .complete(CompletionRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, mealmate_shared::Error::Unavailable(_)));

    Ok(())
}

#[tokio::test]
async fn assistant_end_to_end() -> anyhow::Result<()> {
    let base = serve_llm().await?;
    let client = OpenAiClient::new(config(format!("{base}/v1"), "test-key"))?;
    let assistant = Assistant::new(Some(Arc::new(client)), RequestQueue::new(1));

    let recommendation = assistant
        .recommend_recipes(
            RecommendInput {
                count: 1,
                ..Default::default()
            },
            &HouseholdContext::default(),
            Priority::Normal,
        )
        .await?;

    assert_eq!(recommendation.model, "gpt-test");
    assert_eq!(recommendation.recipes[0].name, "Lentil Soup");
    assert_eq!(recommendation.recipes[0].ingredients[0].name, "red lentils");
    assert_eq!(recommendation.recipes[0].ingredients[0].quantity, Some(200.0));

    let err = assistant
        .suggest_meal_plan(Default::default(), &HouseholdContext::default(), Priority::Normal)
        .await
        .unwrap_err();
    assert!(matches!(err, mealmate_shared::Error::Server(msg) if msg == "AI response could not be parsed"));

    Ok(())
}
