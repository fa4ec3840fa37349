use axum::Json;
use axum::extract::State;

use super::errors::ApiError;
use super::models::*;
use super::state::SharedState;
use crate::config::AppConfig;
use crate::engine::{Position, pgn, replay};

// =========================================================================
// Health
// =========================================================================

/// GET /health
pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let uptime = state.start_time.elapsed().as_secs();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        language: "rust".to_string(),
        engine: "chess-replay".to_string(),
        uptime,
    })
}

// =========================================================================
// Request limits
// =========================================================================

fn check_move_text(config: &AppConfig, field: &str, text: &str) -> Result<(), ApiError> {
    if text.len() > config.max_move_text {
        return Err(ApiError::InvalidRequest(format!(
            "{field} is {} bytes, limit is {}",
            text.len(),
            config.max_move_text
        )));
    }
    Ok(())
}

fn check_half_moves(config: &AppConfig, half_moves: usize) -> Result<(), ApiError> {
    if half_moves > config.max_half_moves {
        return Err(ApiError::InvalidRequest(format!(
            "halfMoves {half_moves} exceeds limit {}",
            config.max_half_moves
        )));
    }
    Ok(())
}

// =========================================================================
// Replay
// =========================================================================

/// POST /api/fen
pub async fn fen(
    State(state): State<SharedState>,
    Json(input): Json<FenRequest>,
) -> Result<Json<FenResponse>, ApiError> {
    check_move_text(&state.config, "moves", &input.moves)?;
    if let Some(n) = input.half_moves {
        check_half_moves(&state.config, n)?;
    }

    let start = match &input.fen {
        Some(fen) => Position::from_fen(fen)?,
        None => Position::starting(),
    };
    let available = pgn::tokenize(&input.moves).len();
    let half_moves = input.half_moves.map_or(available, |n| n.min(available));
    let pos = replay::replay_from(start, &input.moves, Some(half_moves))?;

    Ok(Json(FenResponse {
        fen: pos.to_fen(),
        half_moves,
    }))
}

/// POST /api/positions
pub async fn positions(
    State(state): State<SharedState>,
    Json(input): Json<PositionsRequest>,
) -> Result<Json<PositionsResponse>, ApiError> {
    check_move_text(&state.config, "moves", &input.moves)?;
    let positions = replay::positions(&input.moves)?;
    Ok(Json(PositionsResponse { positions }))
}

// =========================================================================
// Move-text queries
// =========================================================================

/// POST /api/first-moves
pub async fn first_moves(
    State(state): State<SharedState>,
    Json(input): Json<FirstMovesRequest>,
) -> Result<Json<FirstMovesResponse>, ApiError> {
    check_move_text(&state.config, "moves", &input.moves)?;
    check_half_moves(&state.config, input.half_moves)?;
    let moves = pgn::first_moves(&input.moves, input.half_moves)?;
    Ok(Json(FirstMovesResponse {
        moves,
        half_moves: input.half_moves,
    }))
}

/// POST /api/has-opening
pub async fn has_opening(
    State(state): State<SharedState>,
    Json(input): Json<HasOpeningRequest>,
) -> Result<Json<MatchResponse>, ApiError> {
    check_move_text(&state.config, "moves", &input.moves)?;
    check_move_text(&state.config, "opening", &input.opening)?;
    let matches = pgn::has_opening(&input.moves, &input.opening)?;
    Ok(Json(MatchResponse { matches }))
}

/// POST /api/has-board
pub async fn has_board(
    State(state): State<SharedState>,
    Json(input): Json<HasBoardRequest>,
) -> Result<Json<MatchResponse>, ApiError> {
    check_move_text(&state.config, "moves", &input.moves)?;
    let matches = match input.half_moves {
        Some(n) => {
            check_half_moves(&state.config, n)?;
            replay::has_board(&input.moves, &input.fen, n)?
        }
        None => replay::contains_board(&input.moves, &input.fen)?,
    };
    Ok(Json(MatchResponse { matches }))
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use crate::api::router::create_router;
    use crate::api::state::{AppState, SharedState};
    use crate::config::AppConfig;
    use crate::engine::STARTING_FEN;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_state() -> SharedState {
        AppState::new(AppConfig::default())
    }

    async fn body_json(response: axum::http::Response<Body>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn post_json(
        state: SharedState,
        uri: &str,
        body: serde_json::Value,
    ) -> axum::http::Response<Body> {
        create_router(state)
            .oneshot(
                Request::post(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    // --- Health ---

    #[tokio::test]
    async fn health_returns_200() {
        let app = create_router(test_state());
        let resp = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["language"], "rust");
        assert_eq!(json["engine"], "chess-replay");
    }

    #[tokio::test]
    async fn not_found_returns_404() {
        let app = create_router(test_state());
        let resp = app
            .oneshot(Request::get("/nonexistent").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cors_preflight() {
        let app = create_router(test_state());
        let resp = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/fen")
                    .header("Origin", "http://localhost:3001")
                    .header("Access-Control-Request-Method", "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get("access-control-allow-origin").is_some());
    }

    // --- FEN ---

    #[tokio::test]
    async fn fen_of_empty_game_is_start() {
        let resp = post_json(test_state(), "/api/fen", serde_json::json!({ "moves": "" })).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["fen"], STARTING_FEN);
        assert_eq!(json["halfMoves"], 0);
    }

    #[tokio::test]
    async fn fen_with_half_move_limit() {
        let resp = post_json(
            test_state(),
            "/api/fen",
            serde_json::json!({ "moves": "1. e4 e5 2. Nf3 Nc6", "halfMoves": 1 }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(
            json["fen"],
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
        assert_eq!(json["halfMoves"], 1);
    }

    #[tokio::test]
    async fn fen_limit_past_end_reports_replayed_count() {
        let resp = post_json(
            test_state(),
            "/api/fen",
            serde_json::json!({ "moves": "1. e4 e5", "halfMoves": 10 }),
        )
        .await;
        let json = body_json(resp).await;
        assert_eq!(json["halfMoves"], 2);
    }

    #[tokio::test]
    async fn fen_from_custom_start() {
        let resp = post_json(
            test_state(),
            "/api/fen",
            serde_json::json!({
                "moves": "1... Kd7",
                "fen": "4k3/8/8/8/4P3/8/8/4K3 b - e3 0 1"
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["fen"], "8/3k4/8/8/4P3/8/8/4K3 w - - 1 2");
    }

    #[tokio::test]
    async fn fen_reports_failing_token() {
        let resp = post_json(
            test_state(),
            "/api/fen",
            serde_json::json!({ "moves": "1. e4 e5 2. Nf" }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "MALFORMED_TOKEN");
        assert_eq!(json["error"]["index"], 2);
        assert_eq!(json["error"]["token"], "Nf");
    }

    #[tokio::test]
    async fn fen_rejects_invalid_start() {
        let resp = post_json(
            test_state(),
            "/api/fen",
            serde_json::json!({ "moves": "e4", "fen": "invalid" }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"]["code"], "INVALID_FEN");
    }

    #[tokio::test]
    async fn fen_with_unbacked_en_passant_square_rejected() {
        let resp = post_json(
            test_state(),
            "/api/fen",
            serde_json::json!({ "moves": "exd6", "fen": "4k3/8/8/4P3/8/8/8/4K3 w - d6 0 1" }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"]["code"], "INVALID_FEN");
    }

    #[tokio::test]
    async fn oversized_move_text_rejected() {
        let state = AppState::new(AppConfig {
            max_move_text: 8,
            ..AppConfig::default()
        });
        let resp = post_json(
            state,
            "/api/fen",
            serde_json::json!({ "moves": "1. e4 e5 2. Nf3" }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"]["code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn half_move_limit_enforced() {
        let resp = post_json(
            test_state(),
            "/api/fen",
            serde_json::json!({ "moves": "e4", "halfMoves": 100_000 }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    // --- Positions ---

    #[tokio::test]
    async fn positions_lists_every_ply() {
        let resp = post_json(
            test_state(),
            "/api/positions",
            serde_json::json!({ "moves": "1. e4 e5" }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        let positions = json["positions"].as_array().unwrap();
        assert_eq!(positions.len(), 3);
        assert_eq!(positions[0], STARTING_FEN);
    }

    // --- First moves / opening ---

    #[tokio::test]
    async fn first_moves_truncates() {
        let resp = post_json(
            test_state(),
            "/api/first-moves",
            serde_json::json!({ "moves": "1.e4 e5 2.Nf3 Nc6", "halfMoves": 3 }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["moves"], "1. e4 e5 2. Nf3");
    }

    #[tokio::test]
    async fn first_moves_game_too_short() {
        let resp = post_json(
            test_state(),
            "/api/first-moves",
            serde_json::json!({ "moves": "1.e4", "halfMoves": 3 }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"]["code"], "GAME_TOO_SHORT");
    }

    #[tokio::test]
    async fn has_opening_matches_tokens() {
        let resp = post_json(
            test_state(),
            "/api/has-opening",
            serde_json::json!({ "moves": "1. e4 e5 2. Nf3", "opening": "1.e4 e5" }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["matches"], true);
    }

    // --- Board search ---

    #[tokio::test]
    async fn has_board_at_ply() {
        let resp = post_json(
            test_state(),
            "/api/has-board",
            serde_json::json!({
                "moves": "1. e4 e5",
                "fen": "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
                "halfMoves": 1
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["matches"], true);
    }

    #[tokio::test]
    async fn has_board_anywhere() {
        let resp = post_json(
            test_state(),
            "/api/has-board",
            serde_json::json!({
                "moves": "1. d4 d5",
                "fen": "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["matches"], false);
    }
}
