use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Request models
// ---------------------------------------------------------------------------

/// Replay move text and return the resulting FEN.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FenRequest {
    pub moves: String,
    /// Stop after this many half-moves.
    pub half_moves: Option<usize>,
    /// Starting position; the standard start when absent.
    pub fen: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionsRequest {
    pub moves: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirstMovesRequest {
    pub moves: String,
    pub half_moves: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HasOpeningRequest {
    pub moves: String,
    pub opening: String,
}

/// Compare a board placement against a game. Without `halfMoves` every
/// position of the game is searched.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HasBoardRequest {
    pub moves: String,
    pub fen: String,
    pub half_moves: Option<usize>,
}

// ---------------------------------------------------------------------------
// Response models
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub language: String,
    pub engine: String,
    pub uptime: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FenResponse {
    pub fen: String,
    /// Half-moves actually replayed.
    pub half_moves: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionsResponse {
    /// FEN before the first move and after every half-move.
    pub positions: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FirstMovesResponse {
    pub moves: String,
    pub half_moves: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    pub matches: bool,
}
