#![allow(dead_code)]

use std::collections::HashMap;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::ServiceExt;

use game_tracker_lib::api::router::api_routes;
use game_tracker_lib::api::AppState;
use game_tracker_lib::config::Config;
use game_tracker_lib::database::connection::{establish_connection, DatabaseSettings};

/// Fresh in-memory database with the schema applied.
pub async fn test_db() -> DatabaseConnection {
    let db = establish_connection(&DatabaseSettings::in_memory())
        .await
        .expect("in-memory database");
    migration::Migrator::up(&db, None)
        .await
        .expect("migrations");
    db
}

pub fn test_config(pairs: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    vars.entry("DATABASE_URL".into())
        .or_insert_with(|| "sqlite::memory:".into());
    Config::from_lookup(|key| vars.get(key).cloned()).expect("config")
}

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(test_config(&[])).await
    }

    pub async fn with_config(config: Config) -> Self {
        let db = test_db().await;
        let state = AppState::new(db.clone(), &config).expect("app state");
        Self {
            router: api_routes(state),
            db,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }

    /// Creates a game and returns its id.
    pub async fn create_game(&self, overrides: Value) -> i64 {
        let (status, body) = self.post("/api/games", game_body(overrides)).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_i64().unwrap()
    }

    /// Creates a review and returns its id.
    pub async fn create_review(&self, game_id: i64, overrides: Value) -> i64 {
        let (status, body) = self.post("/api/reviews", review_body(game_id, overrides)).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_i64().unwrap()
    }
}

fn merge(mut base: Value, overrides: Value) -> Value {
    if let (Some(base), Value::Object(overrides)) = (base.as_object_mut(), overrides) {
        for (key, value) in overrides {
            base.insert(key, value);
        }
    }
    base
}

pub fn game_body(overrides: Value) -> Value {
    merge(
        json!({
            "title": "Hollow Knight",
            "genre": "Platformer",
            "platform": "PC",
            "releaseYear": 2017,
            "developer": "Team Cherry",
            "description": "Descend into a ruined insect kingdom."
        }),
        overrides,
    )
}

pub fn review_body(game_id: i64, overrides: Value) -> Value {
    merge(
        json!({
            "gameId": game_id,
            "score": 4,
            "text": "Tight controls and a huge map to explore.",
            "hoursPlayed": 40,
            "difficulty": "Hard"
        }),
        overrides,
    )
}
