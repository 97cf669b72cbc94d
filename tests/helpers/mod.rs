#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use mealmate::{
    AppState,
    config::{AiConfig, Config, DatabaseConfig, JwtConfig, ObservabilityConfig, ServerConfig},
};
use mealmate_assistant::{
    Assistant, Completion, CompletionProvider, CompletionRequest, RequestQueue,
};
use serde_json::{Value, json};
use temp_dir::TempDir;
use tower::ServiceExt;

pub const PASSWORD: &str = "my_password";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _dir: TempDir,
}

pub fn test_config(url: String) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_owned(),
            port: 3000,
            cors_origins: vec!["*".to_owned()],
        },
        database: DatabaseConfig {
            url,
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: "test_secret_key_minimum_32_characters_long".to_owned(),
            expiration_hours: 1,
        },
        ai: AiConfig::default(),
        root: None,
        observability: ObservabilityConfig::default(),
    }
}

pub async fn setup() -> anyhow::Result<TestApp> {
    setup_with(None).await
}

pub async fn setup_with(provider: Option<Arc<dyn CompletionProvider>>) -> anyhow::Result<TestApp> {
    let dir = TempDir::new()?;
    let url = format!("sqlite:{}", dir.child("db.sqlite3").display());
    let pool = mealmate::create_pool(&url, 1).await?;
    mealmate_db::migrate(&pool).await?;

    let assistant = Assistant::new(provider, RequestQueue::new(2));
    let state = AppState::new(
        test_config(url),
        mealmate_shared::State::single(pool),
        assistant,
    )?;

    Ok(TestApp {
        router: mealmate::router(state.clone()),
        state,
        _dir: dir,
    })
}

impl TestApp {
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        self.raw(request).await
    }

    pub async fn raw(&self, request: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        Ok((status, value))
    }

    pub async fn get(&self, uri: &str, token: &str) -> anyhow::Result<(StatusCode, Value)> {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(
        &self,
        uri: &str,
        token: &str,
        body: Value,
    ) -> anyhow::Result<(StatusCode, Value)> {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(
        &self,
        uri: &str,
        token: &str,
        body: Value,
    ) -> anyhow::Result<(StatusCode, Value)> {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> anyhow::Result<(StatusCode, Value)> {
        self.send(Method::DELETE, uri, Some(token), None).await
    }

    /// Registers `{name}@mealmate.localhost` and returns `(token, user_id)`.
    pub async fn register(&self, name: &str) -> anyhow::Result<(String, String)> {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/auth/register",
                None,
                Some(json!({
                    "email": format!("{name}@mealmate.localhost"),
                    "password": PASSWORD,
                    "full_name": name,
                })),
            )
            .await?;
        assert_eq!(status, StatusCode::CREATED, "{body}");

        Ok((
            body["token"].as_str().unwrap_or_default().to_owned(),
            body["user"]["id"].as_str().unwrap_or_default().to_owned(),
        ))
    }

    /// Registers an account and grants it the admin role.
    pub async fn admin(&self, name: &str) -> anyhow::Result<(String, String)> {
        let (token, id) = self.register(name).await?;
        self.state
            .user_command
            .set_role(&id, mealmate_shared::user::Role::Admin)
            .await?;

        Ok((token, id))
    }
}

pub fn pasta() -> Value {
    json!({
        "name": "Garlic pasta",
        "meal_type": "dinner",
        "servings": 2,
        "ingredients": [
            {"name": "pasta", "quantity": 200.0, "unit": "g"},
            {"name": "garlic", "quantity": 2.0, "unit": "clove"},
            {"name": "salt"}
        ],
        "instructions": ["Boil the pasta", "Fry the garlic"],
        "tags": ["quick"]
    })
}

/// Replies with canned content and remembers every request.
pub struct FakeProvider {
    reply: String,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeProvider {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_owned(),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn last_prompt(&self) -> String {
        let requests = self.requests.lock().unwrap();
        requests.last().unwrap().messages.last().unwrap().content.to_owned()
    }
}

#[async_trait::async_trait]
impl CompletionProvider for FakeProvider {
    fn model(&self) -> &str {
        "fake-model"
    }

    async fn complete(&self, request: CompletionRequest) -> mealmate_shared::Result<Completion> {
        self.requests.lock().unwrap().push(request);

        Ok(Completion {
            model: self.model().to_owned(),
            content: self.reply.to_owned(),
        })
    }
}
