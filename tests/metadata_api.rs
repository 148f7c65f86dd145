//! Metadata endpoints against a local stand-in for the IGDB and MobyGames APIs.

mod common;

use std::collections::HashMap;

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use game_tracker_lib::config::Config;

use common::{test_config, TestApp};

/// Serves `router` on an ephemeral port and returns its base URL.
async fn spawn_upstream(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

async fn fake_igdb(headers: HeaderMap, body: String) -> Result<Json<Value>, StatusCode> {
    if headers.get("client-id").map(|v| v.as_bytes()) != Some(b"client".as_slice())
        || headers.get("authorization").map(|v| v.as_bytes()) != Some(b"Bearer token".as_slice())
    {
        return Err(StatusCode::UNAUTHORIZED);
    }
    if body.contains("where id = 404;") {
        return Ok(Json(json!([])));
    }
    if body.contains("where id = 500;") {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    if body.contains("search \"hollow \\\"knight\\\"\";") {
        assert!(body.ends_with("limit 20;"), "{body}");
    }
    Ok(Json(json!([{
        "id": 14593,
        "name": "Hollow Knight",
        "cover": { "id": 1, "url": "//images.igdb.com/igdb/image/upload/t_thumb/co1rgi.jpg" },
        "first_release_date": 1488499200,
        "genres": [{ "id": 8, "name": "Platform" }],
        "platforms": [{ "id": 6, "name": "PC (Microsoft Windows)" }],
        "involved_companies": [{ "id": 1, "company": { "id": 2, "name": "Team Cherry" }, "developer": true }],
        "summary": "A challenging 2D action-adventure."
    }])))
}

fn igdb_config(base: &str) -> Config {
    test_config(&[
        ("IGDB_CLIENT_ID", "client"),
        ("IGDB_ACCESS_TOKEN", "token"),
        ("IGDB_API_BASE", base),
    ])
}

#[tokio::test]
async fn igdb_requires_credentials() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/igdb/search?q=zelda").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "IGDB is not configured");

    let (status, _) = app.get("/api/igdb/game?id=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn igdb_search_and_details() {
    let base = spawn_upstream(Router::new().route("/games", post(fake_igdb))).await;
    let app = TestApp::with_config(igdb_config(&base)).await;

    let (status, body) = app.get("/api/igdb/search?q=%20%20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({ "suggestions": [] }));

    let (status, body) = app
        .get("/api/igdb/search?q=hollow%20%22knight%22&limit=50")
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let suggestion = &body["data"]["suggestions"][0];
    assert_eq!(suggestion["title"], "Hollow Knight");
    assert_eq!(suggestion["releaseYear"], 2017);
    assert_eq!(
        suggestion["coverUrl"],
        "https://images.igdb.com/igdb/image/upload/t_cover_big/co1rgi.jpg"
    );

    let (status, body) = app.get("/api/igdb/game?id=14593").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({
            "sourceId": 14593,
            "title": "Hollow Knight",
            "genre": "Platformer",
            "platform": "PC",
            "releaseYear": 2017,
            "developer": "Team Cherry",
            "coverImage": "https://images.igdb.com/igdb/image/upload/t_cover_big/co1rgi.jpg",
            "description": "A challenging 2D action-adventure."
        })
    );
}

#[tokio::test]
async fn igdb_game_errors() {
    let base = spawn_upstream(Router::new().route("/games", post(fake_igdb))).await;
    let app = TestApp::with_config(igdb_config(&base)).await;

    let (status, _) = app.get("/api/igdb/game?id=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.get("/api/igdb/game").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/api/igdb/game?id=404").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get("/api/igdb/game?id=500").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn igdb_rejected_credentials_are_an_upstream_error() {
    let base = spawn_upstream(Router::new().route("/games", post(fake_igdb))).await;
    let config = test_config(&[
        ("IGDB_CLIENT_ID", "client"),
        ("IGDB_ACCESS_TOKEN", "expired"),
        ("IGDB_API_BASE", &base),
    ]);
    let app = TestApp::with_config(config).await;

    let (status, _) = app.get("/api/igdb/search?q=zelda").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn moby_demo_mode() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/moby/search?q=phoenix").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("demo mode"));
    let suggestion = &body["data"]["suggestions"][0];
    assert_eq!(suggestion["id"], 20581);
    assert_eq!(suggestion["title"], "Phoenix Wright: Ace Attorney");
    assert_eq!(suggestion["releaseYear"], 2005);
    assert_eq!(
        suggestion["platforms"],
        json!([
            { "id": null, "name": "Nintendo DS" },
            { "id": null, "name": "iPhone" },
            { "id": null, "name": "Wii" }
        ])
    );

    let (status, body) = app.get("/api/moby/game?id=20581").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("demo mode"));
    assert_eq!(body["data"]["genre"], "Adventure");
    assert_eq!(body["data"]["platform"], "Handheld Console");
    assert_eq!(body["data"]["developer"], "Capcom");
    assert_eq!(body["data"]["coverImage"], "");

    let (status, _) = app.get("/api/moby/search?q=p").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.get("/api/moby/game").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

async fn fake_moby_games(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    assert_eq!(params.get("api_key").map(String::as_str), Some("moby-key"));
    if params.get("format").map(String::as_str) == Some("brief") {
        assert_eq!(params.get("limit").map(String::as_str), Some("25"));
        return Json(json!({
            "games": [{
                "game_id": 1,
                "title": "Doom",
                "platforms": [
                    { "platform_id": 2, "platform_name": "DOS", "first_release_date": "1993-12-10" },
                    { "platform_id": 3, "platform_name": "Windows", "first_release_date": "1995" }
                ]
            }]
        }));
    }
    match params.get("id").map(String::as_str) {
        Some("1") => Json(json!({
            "games": [{
                "game_id": 1,
                "title": "Doom",
                "first_release_year": 1993,
                "genres": [{ "genre_name": "Action" }],
                "platforms": [
                    { "platform_id": 2, "platform_name": "DOS" },
                    { "platform_id": 3, "platform_name": "Windows" }
                ],
                "companies": [{ "company_name": "id Software", "role": "Developed by" }],
                "brief_description": "Demons on Mars."
            }]
        })),
        _ => Json(json!({ "games": [] })),
    }
}

async fn fake_moby_covers(Path((_game, platform)): Path<(u64, u64)>) -> Result<Json<Value>, StatusCode> {
    if platform != 3 {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(json!({
        "covers": [
            { "type": "Back Cover", "image": "https://cdn.mobygames.com/back.jpg" },
            { "type": "Front Cover", "image": "https://cdn.mobygames.com/front.jpg" }
        ]
    })))
}

#[tokio::test]
async fn moby_live_search_and_details() {
    let upstream = Router::new()
        .route("/games", get(fake_moby_games))
        .route(
            "/games/:game/platforms/:platform/covers",
            get(fake_moby_covers),
        );
    let base = spawn_upstream(upstream).await;
    let app = TestApp::with_config(test_config(&[
        ("MOBY_API_KEY", "moby-key"),
        ("MOBY_API_BASE", &base),
    ]))
    .await;

    let (status, body) = app.get("/api/moby/search?q=doom&limit=99").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body.get("message").is_none());
    let suggestion = &body["data"]["suggestions"][0];
    assert_eq!(suggestion["releaseYear"], 1993);
    assert_eq!(suggestion["platforms"][1], json!({ "id": 3, "name": "Windows" }));

    // first platform has no covers: the draft still comes back
    let (status, body) = app.get("/api/moby/game?id=1").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("message").is_none());
    assert_eq!(body["data"]["platform"], "PC");
    assert_eq!(body["data"]["coverImage"], "");
    assert_eq!(body["data"]["developer"], "id Software");
    assert_eq!(body["data"]["description"], "Demons on Mars.");

    let (_, body) = app.get("/api/moby/game?id=1&platformId=3").await;
    assert_eq!(body["data"]["coverImage"], "https://cdn.mobygames.com/front.jpg");
    assert_eq!(body["data"]["releaseYear"], 1993);

    let (status, _) = app.get("/api/moby/game?id=2").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
