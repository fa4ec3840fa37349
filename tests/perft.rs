//! Perft node counts for the standard test positions.
//!
//! Every legal move is played through `Position::apply`, so the counts check
//! move generation and the consistency checks on the apply path together.
//!
//! Reference: <https://www.chessprogramming.org/Perft_Results>

use chess_replay::engine::board::Position;
use chess_replay::engine::movegen::legal_moves;

fn perft(pos: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = legal_moves(pos);
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0u64;
    for mv in moves {
        let mut child = pos.clone();
        child
            .apply(&mv)
            .unwrap_or_else(|e| panic!("{}: {mv}: {e}", pos.to_fen()));
        nodes += perft(&child, depth - 1);
    }
    nodes
}

// =====================================================================
// Starting position
// =====================================================================

#[test]
fn perft_start() {
    let pos = Position::starting();
    assert_eq!(perft(&pos, 1), 20);
    assert_eq!(perft(&pos, 2), 400);
    assert_eq!(perft(&pos, 3), 8_902);
}

// =====================================================================
// "Kiwipete": castling, en passant, pins, promotions
// =====================================================================

#[test]
fn perft_kiwipete() {
    let pos =
        Position::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
            .unwrap();
    assert_eq!(perft(&pos, 1), 48);
    assert_eq!(perft(&pos, 2), 2_039);
}

#[test]
fn perft_position_3() {
    let pos = Position::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1").unwrap();
    assert_eq!(perft(&pos, 1), 14);
    assert_eq!(perft(&pos, 2), 191);
    assert_eq!(perft(&pos, 3), 2_812);
}

#[test]
fn perft_position_4() {
    let pos =
        Position::from_fen("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1")
            .unwrap();
    assert_eq!(perft(&pos, 1), 6);
    assert_eq!(perft(&pos, 2), 264);
    assert_eq!(perft(&pos, 3), 9_467);
}

#[test]
fn perft_position_5() {
    let pos = Position::from_fen("rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8")
        .unwrap();
    assert_eq!(perft(&pos, 1), 44);
    assert_eq!(perft(&pos, 2), 1_486);
}
