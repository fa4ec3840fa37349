//! Seeded random games.
//!
//! Plays uniformly random legal moves and writes the game out as move text.
//! The generator owns no state of its own: the caller passes an RNG in and
//! gets it back, so a run is reproducible from its seed.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::engine::board::Position;
use crate::engine::movegen;
use crate::engine::pgn;
use crate::engine::san;
use crate::engine::types::{Color, GameStatus};

/// Bounds for the per-game full-move cap used by `random_games`.
pub const MIN_GAME_LENGTH: u32 = 10;
pub const MAX_GAME_LENGTH: u32 = 70;

/// Play random legal moves from the start position until the game is over
/// or the full-move number reaches `max_moves`.
///
/// Returns numbered move text ending in a result marker, and the RNG.
pub fn random_game<R: Rng>(mut rng: R, max_moves: u32) -> (String, R) {
    let mut pos = Position::starting();
    let mut sans = Vec::new();

    let status = loop {
        let status = movegen::status(&pos);
        if status.is_game_over() || pos.fullmove_number >= max_moves {
            break status;
        }
        let moves = movegen::legal_moves(&pos);
        let Some(mv) = moves.choose(&mut rng) else {
            break status;
        };
        sans.push(san::encode(&pos, mv));
        pos.apply_unchecked(mv);
    };

    let result = result_token(&status, pos.side_to_move);
    (pgn::format_movetext(&sans, 1, true, Some(result)), rng)
}

/// `count` games, each with its own random cap in
/// `MIN_GAME_LENGTH..=MAX_GAME_LENGTH`.
pub fn random_games<R: Rng>(mut rng: R, count: usize) -> (Vec<String>, R) {
    let mut games = Vec::with_capacity(count);
    for _ in 0..count {
        let cap = rng.gen_range(MIN_GAME_LENGTH..=MAX_GAME_LENGTH);
        let (text, back) = random_game(rng, cap);
        rng = back;
        games.push(text);
    }
    (games, rng)
}

/// PGN result for a final status. On checkmate the side to move has lost.
fn result_token(status: &GameStatus, to_move: Color) -> &'static str {
    match status {
        GameStatus::Checkmate => match to_move {
            Color::White => "0-1",
            Color::Black => "1-0",
        },
        GameStatus::Stalemate | GameStatus::Draw(_) => "1/2-1/2",
        GameStatus::Active | GameStatus::Check => "*",
    }
}
