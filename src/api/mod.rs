//! HTTP surface: JSON endpoints for game results, players, leaderboards and
//! team randomization.

pub mod games;
pub mod players;
pub mod teams;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use sqlx::SqlitePool;
use tracing::error;

use crate::error::LedgerError;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/game", post(games::create_game).get(games::list_games))
        .route(
            "/game/{id}",
            get(games::get_game)
                .put(games::update_game)
                .delete(games::delete_game),
        )
        .route("/player", post(players::create_player).get(players::list_players))
        .route("/player/leaderboard", get(players::leaderboard))
        .route("/player/{id}", get(players::get_player))
        .route("/teams/randomize", post(teams::randomize))
        .with_state(state)
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            LedgerError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            LedgerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            LedgerError::Persistence(e) => {
                error!(error = %e, "database operation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use serde_json::Value;
    use tower::util::ServiceExt;

    async fn test_app() -> Router {
        build_router(AppState::new(test_pool().await))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => request
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let resp = app.clone().oneshot(request).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    async fn add_player(app: &Router, name: &str) -> i64 {
        let (status, json) = send(app, Method::POST, "/player", Some(json!({ "name": name }))).await;
        assert_eq!(status, StatusCode::CREATED);
        json["id"].as_i64().unwrap()
    }

    async fn player_json(app: &Router, id: i64) -> Value {
        let (status, json) = send(app, Method::GET, &format!("/player/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        json
    }

    #[tokio::test]
    async fn test_player_endpoints() {
        let app = test_app().await;

        let (status, json) = send(&app, Method::POST, "/player", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Player name is required");

        let id = add_player(&app, "Hana").await;
        let (status, json) = send(&app, Method::GET, "/player", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["id"], id);
        assert_eq!(json[0]["win"], 0);

        let (status, _) = send(&app, Method::GET, "/player/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_game_updates_counters() {
        let app = test_app().await;
        let p1 = add_player(&app, "p1").await;
        let p2 = add_player(&app, "p2").await;
        let p3 = add_player(&app, "p3").await;

        let (status, json) = send(
            &app,
            Method::POST,
            "/game",
            Some(json!({
                "winPlayerIds": [p1, p2],
                "lossPlayerIds": [p3],
                "date": "2024-05-01T19:00:00Z"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["winPlayerIds"], json!([p1, p2]));
        assert_eq!(json["lossPlayerIds"], json!([p3]));

        for winner in [p1, p2] {
            let player = player_json(&app, winner).await;
            assert_eq!(player["win"], 1);
            assert_eq!(player["winsByYear"]["2024"], 1);
        }
        let loser = player_json(&app, p3).await;
        assert_eq!(loser["loss"], 1);
        assert_eq!(loser["lossesByYear"]["2024"], 1);
    }

    #[tokio::test]
    async fn test_create_game_validation() {
        let app = test_app().await;
        let p1 = add_player(&app, "p1").await;
        let p2 = add_player(&app, "p2").await;

        let (status, _) = send(&app, Method::POST, "/game", Some(json!({ "winPlayerIds": [p1] }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::POST,
            "/game",
            Some(json!({ "winPlayerIds": [p1, p2], "lossPlayerIds": [p2] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::POST,
            "/game",
            Some(json!({ "winPlayerIds": [p1], "lossPlayerIds": [404] })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let player = player_json(&app, p1).await;
        assert_eq!(player["win"], 0);
    }

    #[tokio::test]
    async fn test_unstorable_dates_are_rejected() {
        let app = test_app().await;
        let p1 = add_player(&app, "p1").await;
        let p2 = add_player(&app, "p2").await;

        for date in ["+12345-01-01", "-0001-01-01", "9999-12-31T23:00:00-05:00"] {
            let (status, json) = send(
                &app,
                Method::POST,
                "/game",
                Some(json!({ "winPlayerIds": [p1], "lossPlayerIds": [p2], "date": date })),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "date {date}");
            assert!(json["message"].is_string());
        }

        let (_, game) = send(
            &app,
            Method::POST,
            "/game",
            Some(json!({ "winPlayerIds": [p1], "lossPlayerIds": [p2], "date": "2024-01-01" })),
        )
        .await;
        let game_id = game["id"].as_i64().unwrap();

        let (status, _) = send(
            &app,
            Method::PUT,
            &format!("/game/{game_id}"),
            Some(json!({ "date": "+12345-01-01", "winPlayerIds": [p2], "lossPlayerIds": [p1] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let winner = player_json(&app, p1).await;
        assert_eq!(winner["win"], 1);
        assert_eq!(winner["winsByYear"], json!({ "2024": 1 }));
        let loser = player_json(&app, p2).await;
        assert_eq!(loser["loss"], 1);

        let (status, json) = send(&app, Method::GET, "/player", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_non_numeric_ids_return_json_errors() {
        let app = test_app().await;

        for (method, uri) in [
            (Method::GET, "/game/abc"),
            (Method::DELETE, "/game/abc"),
            (Method::GET, "/player/abc"),
        ] {
            let (status, json) = send(&app, method, uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(json["message"].is_string(), "{uri}");
        }

        let (status, json) = send(
            &app,
            Method::PUT,
            "/game/abc",
            Some(json!({ "date": "2024-01-05", "winPlayerIds": [1], "lossPlayerIds": [2] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["message"].is_string());
    }

    #[tokio::test]
    async fn test_list_games_by_date() {
        let app = test_app().await;
        let p1 = add_player(&app, "Ara").await;
        let p2 = add_player(&app, "Bom").await;

        send(
            &app,
            Method::POST,
            "/game",
            Some(json!({ "winPlayerIds": [p1], "lossPlayerIds": [p2], "date": "2024-05-01T10:00:00Z" })),
        )
        .await;

        let (status, _) = send(&app, Method::GET, "/game", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::GET, "/game?date=May-1", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, json) = send(&app, Method::GET, "/game?date=2024-05-01", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["winPlayers"], json!([{ "id": p1, "name": "Ara" }]));
        assert_eq!(json[0]["lossPlayers"], json!([{ "id": p2, "name": "Bom" }]));

        let (status, json) = send(&app, Method::GET, "/game?date=2024-05-02", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_game_moves_year() {
        let app = test_app().await;
        let p1 = add_player(&app, "p1").await;
        let p2 = add_player(&app, "p2").await;

        let (_, game) = send(
            &app,
            Method::POST,
            "/game",
            Some(json!({ "winPlayerIds": [p1], "lossPlayerIds": [p2], "date": "2023-11-11" })),
        )
        .await;
        let game_id = game["id"].as_i64().unwrap();

        let (status, json) = send(
            &app,
            Method::PUT,
            &format!("/game/{game_id}"),
            Some(json!({ "date": "2024-01-05", "winPlayerIds": [p1], "lossPlayerIds": [p2] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["date"], "2024-01-05T00:00:00Z");

        let winner = player_json(&app, p1).await;
        assert_eq!(winner["win"], 1);
        assert!(winner["winsByYear"].get("2023").is_none());
        assert_eq!(winner["winsByYear"]["2024"], 1);

        let (status, _) = send(
            &app,
            Method::PUT,
            &format!("/game/{game_id}"),
            Some(json!({ "winPlayerIds": [p1], "lossPlayerIds": [p2] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::PUT,
            "/game/9999",
            Some(json!({ "date": "2024-01-05", "winPlayerIds": [p1], "lossPlayerIds": [p2] })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_game() {
        let app = test_app().await;
        let p1 = add_player(&app, "p1").await;
        let p2 = add_player(&app, "p2").await;

        let (_, game) = send(
            &app,
            Method::POST,
            "/game",
            Some(json!({ "winPlayerIds": [p1], "lossPlayerIds": [p2] })),
        )
        .await;
        let game_id = game["id"].as_i64().unwrap();

        let (status, json) = send(&app, Method::DELETE, &format!("/game/{game_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Game result deleted successfully");

        let (status, _) = send(&app, Method::DELETE, &format!("/game/{game_id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::GET, &format!("/game/{game_id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        assert_eq!(player_json(&app, p1).await["win"], 0);
        assert_eq!(player_json(&app, p2).await["loss"], 0);
    }

    #[tokio::test]
    async fn test_leaderboard_endpoint() {
        let app = test_app().await;
        let p1 = add_player(&app, "Ara").await;
        let p2 = add_player(&app, "Bom").await;

        send(
            &app,
            Method::POST,
            "/game",
            Some(json!({ "winPlayerIds": [p2], "lossPlayerIds": [p1], "date": "2024-03-01" })),
        )
        .await;

        let (status, json) = send(&app, Method::GET, "/player/leaderboard?sort=wins", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json[0]["name"], "Bom");
        assert_eq!(json[0]["rank"], 1);
        assert_eq!(json[0]["winRate"], 100.0);
        assert_eq!(json[1]["rank"], 2);

        let (status, json) = send(&app, Method::GET, "/player/leaderboard?year=2023", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json[0]["total"], 0);
        assert_eq!(json[1]["rank"], 1);

        let (status, _) = send(&app, Method::GET, "/player/leaderboard?sort=losses", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_randomize_teams_endpoint() {
        let app = test_app().await;
        let mut ids = Vec::new();
        for name in ["a", "b", "c", "d"] {
            ids.push(add_player(&app, name).await);
        }

        let (status, json) = send(&app, Method::POST, "/teams/randomize", Some(json!({ "playerIds": ids }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["team1"].as_array().unwrap().len(), 2);
        assert_eq!(json["team2"].as_array().unwrap().len(), 2);
        assert_eq!(json["team1WinRate"], 0.0);

        let (status, _) = send(&app, Method::POST, "/teams/randomize", Some(json!({ "playerIds": [ids[0]] }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::POST,
            "/teams/randomize",
            Some(json!({ "playerIds": [ids[0], 12345] })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
