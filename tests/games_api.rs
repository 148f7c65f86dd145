mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn create_then_fetch_game() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post("/api/games", common::game_body(json!({ "title": "  Celeste  " })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["title"], "Celeste");
    assert_eq!(body["data"]["coverImage"], "https://via.placeholder.com/150");
    assert_eq!(body["data"]["completed"], false);
    assert!(body["data"]["createdAt"].is_string());

    let id = body["data"]["id"].as_i64().unwrap();
    let (status, body) = app.get(&format!("/api/games/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Celeste");
    assert_eq!(body["data"]["reviews"], json!([]));
}

#[tokio::test]
async fn invalid_game_reports_all_errors() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/games",
            json!({ "genre": "Dating Sim", "releaseYear": 1850, "coverImage": "not-a-url" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    let errors = body["errors"].as_array().unwrap();
    // title, genre, platform, releaseYear, developer, coverImage, description
    assert_eq!(errors.len(), 7, "{errors:?}");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = TestApp::new().await;
    let response = app
        .request(
            axum::http::Method::POST,
            "/api/games",
            Some(json!("just a string")),
        )
        .await;
    assert_eq!(response.0, StatusCode::BAD_REQUEST);
    assert_eq!(response.1["success"], false);
}

#[tokio::test]
async fn missing_and_malformed_ids() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/games/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Game not found");

    let (status, _) = app.get("/api/games/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.put("/api/games/999", json!({ "completed": true })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete("/api/games/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_filters_and_searches() {
    let app = TestApp::new().await;
    app.create_game(json!({})).await;
    app.create_game(json!({
        "title": "Hades",
        "genre": "Action",
        "developer": "Supergiant Games",
        "completed": true
    }))
    .await;
    app.create_game(json!({
        "title": "Pokemon Emerald",
        "genre": "RPG",
        "platform": "Handheld Console",
        "developer": "Game Freak",
        "releaseYear": 2004
    }))
    .await;

    let (_, body) = app.get("/api/games").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["limit"], 50);
    // newest first
    assert_eq!(body["data"][0]["title"], "Pokemon Emerald");

    let (_, body) = app.get("/api/games?completed=true").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "Hades");

    let (_, body) = app.get("/api/games?completed=nope").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = app.get("/api/games?platform=Handheld%20Console").await;
    assert_eq!(body["data"][0]["developer"], "Game Freak");

    // developer match, case-insensitive
    let (_, body) = app.get("/api/games?search=supergiant").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = app.get("/api/games?search=KNIGHT&genre=").await;
    assert_eq!(body["data"][0]["title"], "Hollow Knight");

    let (status, _) = app.get("/api/games?genre=Dating%20Sim").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_sorts_and_paginates() {
    let app = TestApp::new().await;
    for (title, year) in [("Braid", 2008), ("Axiom Verge", 2015), ("Celeste", 2018)] {
        app.create_game(json!({ "title": title, "releaseYear": year }))
            .await;
    }

    let (_, body) = app.get("/api/games?sortBy=title&order=asc").await;
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["Axiom Verge", "Braid", "Celeste"]);

    let (_, body) = app
        .get("/api/games?sortBy=releaseYear&order=asc&limit=2&page=2")
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "Celeste");
    assert_eq!(
        body["pagination"],
        json!({ "total": 3, "limit": 2, "page": 2, "totalPages": 2 })
    );

    let (_, body) = app.get("/api/games?limit=0&page=-1").await;
    assert_eq!(body["success"], false);

    let (_, body) = app.get("/api/games?limit=500").await;
    assert_eq!(body["pagination"]["limit"], 100);

    let (status, body) = app.get("/api/games?sortBy=password").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"][0].as_str().unwrap().contains("password"));
}

#[tokio::test]
async fn partial_update_keeps_other_fields() {
    let app = TestApp::new().await;
    let id = app.create_game(json!({})).await;

    let (status, body) = app
        .put(&format!("/api/games/{id}"), json!({ "completed": true }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["completed"], true);
    assert_eq!(body["data"]["title"], "Hollow Knight");
    assert_ne!(body["data"]["updatedAt"], body["data"]["createdAt"]);

    let (status, body) = app
        .put(&format!("/api/games/{id}"), json!({ "platform": "Dreamcast" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn deleting_a_game_removes_its_review() {
    let app = TestApp::new().await;
    let game_id = app.create_game(json!({})).await;
    let review_id = app.create_review(game_id, json!({})).await;

    let (status, body) = app.delete(&format!("/api/games/{game_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body.get("data").is_none());

    let (status, _) = app.get(&format!("/api/reviews/{review_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn library_summary() {
    let app = TestApp::new().await;

    let (_, body) = app.get("/api/games/stats/summary").await;
    assert_eq!(body["data"]["totalGames"], 0);
    assert_eq!(body["data"]["completionPercentage"], 0);

    app.create_game(json!({ "completed": true })).await;
    app.create_game(json!({ "title": "Hades", "genre": "Action" }))
        .await;
    app.create_game(json!({ "title": "Doom", "genre": "Shooter" }))
        .await;

    let (status, body) = app.get("/api/games/stats/summary").await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["totalGames"], 3);
    assert_eq!(data["completedGames"], 1);
    assert_eq!(data["pendingGames"], 2);
    assert_eq!(data["completionPercentage"], 33);
    assert_eq!(
        data["genreDistribution"],
        json!([
            { "name": "Action", "count": 1 },
            { "name": "Platformer", "count": 1 },
            { "name": "Shooter", "count": 1 }
        ])
    );
    assert_eq!(
        data["platformDistribution"],
        json!([{ "name": "PC", "count": 3 }])
    );
}

#[tokio::test]
async fn far_pages_are_empty() {
    let app = TestApp::new().await;
    app.create_game(json!({})).await;

    let (status, body) = app
        .get("/api/games?page=100000000000000000&limit=100")
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["pagination"]["totalPages"], 1);

    let (status, body) = app
        .get("/api/games?page=18446744073709551615&limit=1")
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn search_folds_unicode_case() {
    let app = TestApp::new().await;
    app.create_game(json!({ "title": "Ōkami", "developer": "Clover Studio" }))
        .await;
    app.create_game(json!({ "title": "Hades", "developer": "Supergiant Games" }))
        .await;

    // ōkami
    let (_, body) = app.get("/api/games?search=%C5%8Dkami").await;
    assert_eq!(body["pagination"]["total"], 1, "{body}");
    assert_eq!(body["data"][0]["title"], "Ōkami");

    // ŌKAMI
    let (_, body) = app.get("/api/games?search=%C5%8CKAMI").await;
    assert_eq!(body["pagination"]["total"], 1);

    let (_, body) = app.get("/api/games?search=CLOVER").await;
    assert_eq!(body["pagination"]["total"], 1);
}

#[tokio::test]
async fn search_wildcards_match_literally() {
    let app = TestApp::new().await;
    app.create_game(json!({})).await;
    app.create_game(json!({ "title": "100% Orange Juice", "developer": "Orange_Juice" }))
        .await;

    let (_, body) = app.get("/api/games?search=_").await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["title"], "100% Orange Juice");

    let (_, body) = app.get("/api/games?search=%25").await;
    assert_eq!(body["pagination"]["total"], 1);

    let (_, body) = app.get("/api/games?search=%5C").await;
    assert_eq!(body["pagination"]["total"], 0);

    let (_, body) = app.get("/api/games?search=k_ight").await;
    assert_eq!(body["pagination"]["total"], 0);
}

#[tokio::test]
async fn search_follows_renames() {
    let app = TestApp::new().await;
    let id = app.create_game(json!({})).await;

    let (status, _) = app
        .put(&format!("/api/games/{id}"), json!({ "title": "Silksong" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get("/api/games?search=silk").await;
    assert_eq!(body["pagination"]["total"], 1);
    let (_, body) = app.get("/api/games?search=hollow").await;
    assert_eq!(body["pagination"]["total"], 0);
    let (_, body) = app.get("/api/games?search=cherry").await;
    assert_eq!(body["pagination"]["total"], 1);
}

#[tokio::test]
async fn wrong_field_types_are_listed_with_other_errors() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post("/api/games", json!({ "title": "", "releaseYear": "2017" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors = body["errors"].as_array().unwrap();
    assert!(errors.contains(&json!("title is required")), "{errors:?}");
    assert!(!errors.iter().any(|e| e.as_str().unwrap().starts_with("releaseYear")));

    let (status, body) = app
        .post(
            "/api/games",
            common::game_body(json!({ "releaseYear": "2017", "completed": "yes" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"], json!(["completed must be true or false"]));

    let (status, body) = app
        .post(
            "/api/games",
            common::game_body(json!({ "releaseYear": "2017", "completed": "true" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["releaseYear"], 2017);
    assert_eq!(body["data"]["completed"], true);
}
