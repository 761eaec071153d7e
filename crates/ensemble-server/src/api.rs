//! HTTP routes for the conversation sandbox

use axum::{Json, Router, extract::State, http::HeaderValue, routing::post};
use ensemble_core::{Conversation, Participant};
use serde::Deserialize;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::{config::ServerSettings, error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeCharactersRequest {
    pub count: usize,
    #[serde(default)]
    pub user_engagement_enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct ContinueConversationRequest {
    pub conversation: Conversation,
}

/// Create the main API router.
pub fn create_router(state: AppState, settings: &ServerSettings) -> anyhow::Result<Router> {
    let mut router = Router::new()
        .route("/initializeCharacters", post(initialize_characters))
        .route("/continueConversation", post(continue_conversation));

    if settings.serve_ui {
        let dir = &settings.static_dir;
        if !dir.is_dir() {
            anyhow::bail!(
                "UI serving is enabled but {} does not exist",
                dir.display()
            );
        }
        tracing::info!("Serving UI from {}", dir.display());
        router = router
            .route_service("/", ServeFile::new(dir.join("index.html")))
            .nest_service("/static", ServeDir::new(dir.join("static")));
    }

    Ok(router
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&settings.cors_origins))
        .with_state(state))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn initialize_characters(
    State(state): State<AppState>,
    Json(req): Json<InitializeCharactersRequest>,
) -> Result<Json<Vec<Participant>>, ApiError> {
    let participants = state
        .sandbox
        .initialize_characters(req.count, req.user_engagement_enabled)
        .await?;
    Ok(Json(participants))
}

async fn continue_conversation(
    State(state): State<AppState>,
    Json(req): Json<ContinueConversationRequest>,
) -> Result<Json<Conversation>, ApiError> {
    let conversation = state
        .sandbox
        .continue_conversation(req.conversation)
        .await?;
    Ok(Json(conversation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ensemble_ai::{ChatRequest, InferenceClient};
    use ensemble_core::{CharacterSandbox, SandboxConfig};
    use serde_json::{Value, json};
    use std::{fs, path::PathBuf, sync::Arc, time::Duration};

    struct StubClient;

    #[async_trait]
    impl InferenceClient for StubClient {
        async fn invoke(&self, request: &ChatRequest) -> ensemble_ai::Result<String> {
            let last = request
                .chat_history
                .last()
                .map(|m| m.message.as_str())
                .unwrap_or_default();
            if last.contains("first name and last name") {
                Ok("Elara Moonwhisper".to_string())
            } else if request.bot_name == "Brian" {
                Ok("Raised by moon elves.".to_string())
            } else {
                Ok("The stars whisper. USER: what?".to_string())
            }
        }
    }

    async fn spawn_app(settings: ServerSettings) -> String {
        let sandbox = CharacterSandbox::new(
            Arc::new(StubClient),
            SandboxConfig {
                stagger: Duration::ZERO,
                max_characters: 4,
            },
        );
        let app = create_router(AppState::new(sandbox), &settings).unwrap();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn conversation_body(turns: Value) -> Value {
        json!({
            "conversation": {
                "participants": [
                    {"type": "HUMAN", "name": "Stranger", "backstory": "A curious human."},
                    {"type": "AI", "name": "Seraphina Vale", "backstory": "A warrior."},
                    {"type": "AI", "name": "Thorne Blackwood", "backstory": "A druid."}
                ],
                "dialogTurns": turns
            }
        })
    }

    #[tokio::test]
    async fn test_initialize_characters() {
        let base = spawn_app(ServerSettings::default()).await;

        let resp = reqwest::Client::new()
            .post(format!("{base}/initializeCharacters"))
            .json(&json!({"count": 2, "userEngagementEnabled": true}))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        let participants = body.as_array().unwrap();
        assert_eq!(participants.len(), 3);
        assert_eq!(participants[0]["type"], "HUMAN");
        assert_eq!(participants[0]["name"], "Stranger");

        let mut names: Vec<&str> = participants[1..]
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        names.sort();
        assert_eq!(names.len(), 2);
        assert_eq!(names[1], "Elara");
        assert!(names[0].starts_with("Character"));
    }

    #[tokio::test]
    async fn test_initialized_cast_can_continue() {
        let base = spawn_app(ServerSettings::default()).await;
        let client = reqwest::Client::new();

        let resp = client
            .post(format!("{base}/initializeCharacters"))
            .json(&json!({"count": 3, "userEngagementEnabled": true}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let participants: Value = resp.json().await.unwrap();

        let body = json!({
            "conversation": {"participants": participants, "dialogTurns": []}
        });
        let resp = client
            .post(format!("{base}/continueConversation"))
            .json(&body)
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["dialogTurns"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_initialize_rejects_oversized_count() {
        let base = spawn_app(ServerSettings::default()).await;

        let resp = reqwest::Client::new()
            .post(format!("{base}/initializeCharacters"))
            .json(&json!({"count": 50, "userEngagementEnabled": false}))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 400);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"]["type"], "invalid_request_error");
    }

    #[tokio::test]
    async fn test_continue_bootstraps_greeting() {
        let base = spawn_app(ServerSettings::default()).await;

        let resp = reqwest::Client::new()
            .post(format!("{base}/continueConversation"))
            .json(&conversation_body(json!([])))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        let turns = body["dialogTurns"].as_array().unwrap();
        assert_eq!(turns.len(), 1);
        let speaker = turns[0]["participant"].as_str().unwrap();
        assert_eq!(turns[0]["content"], format!("Hello. I am {speaker}."));
    }

    #[tokio::test]
    async fn test_continue_appends_turn() {
        let base = spawn_app(ServerSettings::default()).await;

        let resp = reqwest::Client::new()
            .post(format!("{base}/continueConversation"))
            .json(&conversation_body(json!([
                {"participant": "Stranger", "content": "Hello, who are you?"}
            ])))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        let turns = body["dialogTurns"].as_array().unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0]["participant"], "Stranger");
        assert_eq!(turns[1]["content"], "The stars whisper. ");
    }

    #[tokio::test]
    async fn test_continue_without_ai_is_server_error() {
        let base = spawn_app(ServerSettings::default()).await;

        let resp = reqwest::Client::new()
            .post(format!("{base}/continueConversation"))
            .json(&json!({
                "conversation": {
                    "participants": [{"type": "HUMAN", "name": "Stranger", "backstory": "Alone."}],
                    "dialogTurns": [{"participant": "Stranger", "content": "Anyone?"}]
                }
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 500);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"]["message"], "Internal server error");
    }

    #[tokio::test]
    async fn test_continue_rejects_unknown_speaker() {
        let base = spawn_app(ServerSettings::default()).await;

        let resp = reqwest::Client::new()
            .post(format!("{base}/continueConversation"))
            .json(&conversation_body(json!([
                {"participant": "Ghost", "content": "Boo."}
            ])))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 400);
    }

    #[tokio::test]
    async fn test_malformed_body_is_client_error() {
        let base = spawn_app(ServerSettings::default()).await;

        let resp = reqwest::Client::new()
            .post(format!("{base}/initializeCharacters"))
            .header("content-type", "application/json")
            .body(r#"{"count": "three"}"#)
            .send()
            .await
            .unwrap();

        assert!(resp.status().is_client_error());
    }

    #[test]
    fn test_missing_static_dir_fails() {
        let settings = ServerSettings {
            serve_ui: true,
            static_dir: PathBuf::from("/nonexistent/ensemble-ui"),
            ..ServerSettings::default()
        };
        let sandbox = CharacterSandbox::new(Arc::new(StubClient), SandboxConfig::default());

        assert!(create_router(AppState::new(sandbox), &settings).is_err());
    }

    #[tokio::test]
    async fn test_serves_ui_index() {
        let name = format!("ensemble-ui-{}", std::process::id());
        let dir = std::env::temp_dir().join(name);
        let assets = dir.join("static");
        fs::create_dir_all(&assets).unwrap();
        fs::write(dir.join("index.html"), "<html>ensemble</html>").unwrap();
        fs::write(assets.join("app.js"), "console.log(1);").unwrap();

        let base = spawn_app(ServerSettings {
            serve_ui: true,
            static_dir: dir.clone(),
            ..ServerSettings::default()
        })
        .await;

        let index = reqwest::get(format!("{base}/")).await.unwrap();
        assert_eq!(index.status(), 200);
        assert_eq!(index.text().await.unwrap(), "<html>ensemble</html>");

        let asset = reqwest::get(format!("{base}/static/app.js")).await.unwrap();
        assert_eq!(asset.status(), 200);

        let _ = fs::remove_dir_all(dir);
    }
}
