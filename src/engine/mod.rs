pub mod attacks;
pub mod board;
pub mod fen;
pub mod generate;
pub mod movegen;
pub mod pgn;
pub mod replay;
pub mod san;
pub mod types;

pub use board::{Position, STARTING_FEN};
pub use movegen::legal_moves;
pub use replay::{board_state, contains_board, has_board, positions, replay, replay_from};
pub use types::*;
