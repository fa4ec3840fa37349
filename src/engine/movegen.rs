//! Move legality.
//!
//! Everything here is a pure function of an immutable `Position`:
//!   1. `candidate_origins` lists squares a piece could move from to reach a
//!      destination under its movement rule.
//!   2. `leaves_king_safe` applies a move to a copy and checks the mover's king.
//!
//! `legal_moves` and `status` build on the same two steps and are only used
//! where the full move list matters (SAN encoding, random games).

use crate::engine::attacks;
use crate::engine::board::{Position, castling_rook_squares};
use crate::engine::types::{
    CastleSide, Color, DecodedMove, DrawReason, GameStatus, Piece, PieceType, Square,
};

// =========================================================================
// Candidate origins
// =========================================================================

/// Squares holding `piece` that can reach `to` by the piece's movement rule.
///
/// Pawns use `capture` to pick between diagonal and straight movement. The
/// occupancy of `to` itself is not checked, and neither is king safety.
pub fn candidate_origins(pos: &Position, piece: Piece, to: Square, capture: bool) -> Vec<Square> {
    let holds = |sq: Square| pos.piece_at(sq) == Some(piece);
    let t = attacks::tables();

    match piece.kind {
        PieceType::Pawn if capture => attacks::pawn_attack_sources(piece.color, to)
            .filter(|&sq| holds(sq))
            .collect(),
        PieceType::Pawn => pawn_push_origin(pos, piece.color, to).into_iter().collect(),
        PieceType::Knight => t
            .knight_targets(to)
            .iter()
            .copied()
            .filter(|&sq| holds(sq))
            .collect(),
        PieceType::King => t
            .king_targets(to)
            .iter()
            .copied()
            .filter(|&sq| holds(sq))
            .collect(),
        kind => {
            let mut origins: Vec<Square> = attacks::ROOK_DIRECTIONS
                .into_iter()
                .chain(attacks::BISHOP_DIRECTIONS)
                .filter(|&dir| attacks::slides_along(kind, dir))
                .filter_map(|dir| attacks::ray(to, dir).find(|&sq| !pos.is_empty(sq)))
                .filter(|&sq| holds(sq))
                .collect();
            origins.sort();
            origins
        }
    }
}

/// The pawn that would push to `to`: one step behind, or two steps behind
/// when `to` is on the double-push rank and the square between is empty.
fn pawn_push_origin(pos: &Position, color: Color, to: Square) -> Option<Square> {
    let pawn = Piece::new(color, PieceType::Pawn);
    let step = color.pawn_step();
    let one_back = to.offset(0, -step)?;
    if pos.piece_at(one_back) == Some(pawn) {
        return Some(one_back);
    }
    let double_rank = (color.pawn_rank() as i8 + 2 * step) as u8;
    if to.rank() == double_rank && pos.is_empty(one_back) {
        let two_back = one_back.offset(0, -step)?;
        if pos.piece_at(two_back) == Some(pawn) {
            return Some(two_back);
        }
    }
    None
}

// =========================================================================
// Move construction and king safety
// =========================================================================

/// Build the move of whatever stands on `from` to `to`, filling in capture
/// and en-passant details from the board. `None` when `from` is empty.
pub fn describe_move(
    pos: &Position,
    from: Square,
    to: Square,
    promotion: Option<PieceType>,
) -> Option<DecodedMove> {
    let piece = pos.piece_at(from)?;
    let en_passant = piece.kind == PieceType::Pawn
        && from.file() != to.file()
        && pos.en_passant == Some(to)
        && pos.is_empty(to);
    let captured = if en_passant {
        Some(Piece::new(!piece.color, PieceType::Pawn))
    } else {
        pos.piece_at(to)
    };
    Some(DecodedMove {
        from,
        to,
        piece,
        captured,
        promotion,
        castle: None,
        en_passant,
    })
}

/// Does playing `mv` keep the mover's king out of check?
pub fn leaves_king_safe(pos: &Position, mv: &DecodedMove) -> bool {
    let mut copy = pos.clone();
    copy.apply_unchecked(mv);
    !copy.is_king_attacked(mv.piece.color)
}

// =========================================================================
// Castling
// =========================================================================

/// The castling move for the side to move, or the reason it is not allowed.
pub fn castle_move(pos: &Position, side: CastleSide) -> Result<DecodedMove, String> {
    let us = pos.side_to_move;
    let them = !us;
    let rank = us.home_rank();
    let king_from = Square::from_file_rank(4, rank);
    let king_to = Square::from_file_rank(side.king_to_file(), rank);
    let (rook_from, _) = castling_rook_squares(us, side);
    let king = Piece::new(us, PieceType::King);

    if !pos.castling_rights.can_castle(us, side) {
        return Err(format!("{us} no longer holds the {} castling right", side.san()));
    }
    if pos.piece_at(king_from) != Some(king) {
        return Err(format!("king is not on {king_from}"));
    }
    if pos.piece_at(rook_from) != Some(Piece::new(us, PieceType::Rook)) {
        return Err(format!("rook is not on {rook_from}"));
    }
    if let Some(blocked) = attacks::between(king_from, rook_from)
        .into_iter()
        .find(|&sq| !pos.is_empty(sq))
    {
        return Err(format!("{blocked} is occupied"));
    }
    if pos.is_square_attacked(king_from, them) {
        return Err("king is in check".to_string());
    }
    // Transit square and destination.
    if let Some(attacked) = attacks::between(king_from, king_to)
        .into_iter()
        .chain([king_to])
        .find(|&sq| pos.is_square_attacked(sq, them))
    {
        return Err(format!("king would cross attacked square {attacked}"));
    }

    Ok(DecodedMove {
        from: king_from,
        to: king_to,
        piece: king,
        captured: None,
        promotion: None,
        castle: Some(side),
        en_passant: false,
    })
}

// =========================================================================
// Full enumeration
// =========================================================================

/// All legal moves for the side to move, ordered by origin square.
pub fn legal_moves(pos: &Position) -> Vec<DecodedMove> {
    let us = pos.side_to_move;
    let mut moves = Vec::with_capacity(64);

    for from in Square::all() {
        let Some(piece) = pos.piece_at(from) else {
            continue;
        };
        if piece.color != us {
            continue;
        }
        for to in pseudo_targets(pos, from, piece) {
            let last_rank = piece.kind == PieceType::Pawn && to.rank() == us.promotion_rank();
            if last_rank {
                moves.extend(
                    PieceType::PROMOTIONS
                        .into_iter()
                        .filter_map(|promo| describe_move(pos, from, to, Some(promo))),
                );
            } else {
                moves.extend(describe_move(pos, from, to, None));
            }
        }
    }

    moves.extend(
        [CastleSide::Kingside, CastleSide::Queenside]
            .into_iter()
            .filter_map(|side| castle_move(pos, side).ok()),
    );

    moves.retain(|mv| {
        mv.captured.is_none_or(|c| c.kind != PieceType::King) && leaves_king_safe(pos, mv)
    });
    moves
}

/// Destinations ignoring king safety and castling.
fn pseudo_targets(pos: &Position, from: Square, piece: Piece) -> Vec<Square> {
    let t = attacks::tables();
    let us = piece.color;
    let open = |sq: &Square| pos.piece_at(*sq).is_none_or(|p| p.color != us);

    match piece.kind {
        PieceType::Pawn => {
            let mut targets = Vec::with_capacity(4);
            let step = us.pawn_step();
            if let Some(one) = from.offset(0, step)
                && pos.is_empty(one)
            {
                targets.push(one);
                if from.rank() == us.pawn_rank()
                    && let Some(two) = one.offset(0, step)
                    && pos.is_empty(two)
                {
                    targets.push(two);
                }
            }
            targets.extend(attacks::pawn_attack_targets(us, from).filter(|&sq| {
                pos.piece_at(sq).is_some_and(|p| p.color != us) || pos.en_passant == Some(sq)
            }));
            targets
        }
        PieceType::Knight => t.knight_targets(from).iter().copied().filter(open).collect(),
        PieceType::King => t.king_targets(from).iter().copied().filter(open).collect(),
        kind => {
            let mut targets = Vec::new();
            for dir in attacks::ROOK_DIRECTIONS
                .into_iter()
                .chain(attacks::BISHOP_DIRECTIONS)
                .filter(|&dir| attacks::slides_along(kind, dir))
            {
                for sq in attacks::ray(from, dir) {
                    match pos.piece_at(sq) {
                        None => targets.push(sq),
                        Some(p) => {
                            if p.color != us {
                                targets.push(sq);
                            }
                            break;
                        }
                    }
                }
            }
            targets
        }
    }
}

// =========================================================================
// Status
// =========================================================================

/// Game status of a position, for deciding when a generated game ends.
pub fn status(pos: &Position) -> GameStatus {
    let in_check = pos.is_in_check();

    if legal_moves(pos).is_empty() {
        return if in_check {
            GameStatus::Checkmate
        } else {
            GameStatus::Stalemate
        };
    }

    if pos.halfmove_clock >= 100 {
        return GameStatus::Draw(DrawReason::FiftyMoveRule);
    }

    if is_insufficient_material(pos) {
        return GameStatus::Draw(DrawReason::InsufficientMaterial);
    }

    if in_check {
        GameStatus::Check
    } else {
        GameStatus::Active
    }
}

/// K vs K, K+minor vs K, and K+B vs K+B with same-coloured bishops.
pub fn is_insufficient_material(pos: &Position) -> bool {
    let mut minors = [0usize; 2];
    let mut bishop_shades = Vec::with_capacity(2);

    for sq in Square::all() {
        let Some(piece) = pos.piece_at(sq) else {
            continue;
        };
        match piece.kind {
            PieceType::King => {}
            PieceType::Knight => minors[piece.color.index()] += 1,
            PieceType::Bishop => {
                minors[piece.color.index()] += 1;
                bishop_shades.push((sq.file() + sq.rank()) % 2);
            }
            PieceType::Pawn | PieceType::Rook | PieceType::Queen => return false,
        }
    }

    match minors {
        [0, 0] | [1, 0] | [0, 1] => true,
        [1, 1] => bishop_shades.len() == 2 && bishop_shades[0] == bishop_shades[1],
        _ => false,
    }
}

// =========================================================================
// Tests
// =========================================================================
