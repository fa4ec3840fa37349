//! Replaying SAN move text onto a position.
//!
//! Every function here folds the tokens of one game over a single owned
//! `Position`, left to right. The first token that fails to decode or apply
//! aborts the whole replay with its index; no partial result is returned.

use tracing::{debug, error, trace};

use crate::engine::board::Position;
use crate::engine::pgn;
use crate::engine::san;
use crate::engine::types::{ChessError, MoveError};

/// FEN after replaying `text` from the standard start, stopping after
/// `limit` half-moves when given. A limit past the end of the game replays
/// the whole game.
pub fn replay(text: &str, limit: Option<usize>) -> Result<String, ChessError> {
    replay_from(Position::starting(), text, limit).map(|pos| pos.to_fen())
}

/// Replay onto an arbitrary starting position and return the final position.
pub fn replay_from(
    mut pos: Position,
    text: &str,
    limit: Option<usize>,
) -> Result<Position, ChessError> {
    let tokens = pgn::tokenize(text);
    let count = limit.map_or(tokens.len(), |n| n.min(tokens.len()));
    for (index, token) in tokens[..count].iter().enumerate() {
        play(&mut pos, index, token)?;
    }
    Ok(pos)
}

/// FEN of the start position and after every half-move: `n` moves give
/// `n + 1` entries.
pub fn positions(text: &str) -> Result<Vec<String>, ChessError> {
    let mut pos = Position::starting();
    let tokens = pgn::tokenize(text);
    let mut fens = Vec::with_capacity(tokens.len() + 1);
    fens.push(pos.to_fen());
    for (index, token) in tokens.iter().enumerate() {
        play(&mut pos, index, token)?;
        fens.push(pos.to_fen());
    }
    Ok(fens)
}

/// FEN after exactly `n` half-moves. Unlike `replay`, a game shorter than
/// `n` is an error.
pub fn board_state(text: &str, n: usize) -> Result<String, ChessError> {
    let available = pgn::tokenize(text).len();
    if available < n {
        return Err(ChessError::GameTooShort {
            requested: n,
            available,
        });
    }
    replay(text, Some(n))
}

/// Does the piece placement after `n` half-moves equal the placement of
/// `fen`? Side to move, castling and clocks are not compared.
pub fn has_board(text: &str, fen: &str, n: usize) -> Result<bool, ChessError> {
    let wanted = Position::from_fen(fen)?.placement_fen();
    let reached = board_state(text, n)?;
    Ok(reached.split(' ').next() == Some(wanted.as_str()))
}

/// Does the placement of `fen` occur anywhere in the game, the start
/// position included?
pub fn contains_board(text: &str, fen: &str) -> Result<bool, ChessError> {
    let wanted = Position::from_fen(fen)?.placement_fen();
    let mut pos = Position::starting();
    if pos.placement_fen() == wanted {
        return Ok(true);
    }
    for (index, token) in pgn::tokenize(text).iter().enumerate() {
        play(&mut pos, index, token)?;
        if pos.placement_fen() == wanted {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Decode and apply one token, logging failures by kind.
fn play(pos: &mut Position, index: usize, token: &str) -> Result<(), ChessError> {
    let result = san::decode(pos, token).and_then(|mv| {
        pos.apply(&mv)?;
        trace!(index, token, mv = %mv, "applied");
        Ok(())
    });

    result.map_err(|source| {
        match &source {
            MoveError::InconsistentState(detail) => {
                error!(index, token, detail = %detail, fen = %pos.to_fen(), "decoded move did not fit the board");
            }
            other => debug!(index, token, reason = %other, "rejected move"),
        }
        ChessError::Replay {
            index,
            token: token.to_string(),
            source,
        }
    })
}
