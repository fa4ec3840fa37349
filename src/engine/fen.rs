//! FEN parsing and rendering for `Position`.

use crate::engine::board::Position;
use crate::engine::types::{CastlingRights, ChessError, Color, Piece, PieceType, Square};

impl Position {
    /// Parse a FEN string.
    ///
    /// All six fields are required. The placement must hold exactly one king
    /// per side and no pawns on the first or last rank. An en passant square
    /// must sit behind a pawn that could just have made a double push.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(ChessError::InvalidFen(format!(
                "expected 6 fields, got {}",
                fields.len()
            )));
        }

        let mut pos = Position::empty();
        parse_placement(&mut pos, fields[0])?;

        // ----- Field 2: Side to move -----
        pos.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(ChessError::InvalidFen(format!(
                    "invalid side to move: '{other}'"
                )));
            }
        };

        // ----- Field 3: Castling availability -----
        pos.castling_rights = CastlingRights::from_fen(fields[2]).ok_or_else(|| {
            ChessError::InvalidFen(format!("invalid castling string: '{}'", fields[2]))
        })?;

        // ----- Field 4: En passant target square -----
        if fields[3] != "-" {
            let ep_sq = Square::from_algebraic(fields[3]).ok_or_else(|| {
                ChessError::InvalidFen(format!("invalid en passant square: '{}'", fields[3]))
            })?;
            // The target sits behind a pawn of the side that just moved.
            let expected_rank = match pos.side_to_move {
                Color::White => 5,
                Color::Black => 2,
            };
            if ep_sq.rank() != expected_rank {
                return Err(ChessError::InvalidFen(format!(
                    "en passant square {ep_sq} does not fit {} to move",
                    pos.side_to_move
                )));
            }
            check_double_push(&pos, ep_sq)?;
            pos.en_passant = Some(ep_sq);
        }

        // ----- Field 5: Halfmove clock -----
        pos.halfmove_clock = fields[4].parse::<u32>().map_err(|_| {
            ChessError::InvalidFen(format!("invalid halfmove clock: '{}'", fields[4]))
        })?;

        // ----- Field 6: Fullmove number -----
        pos.fullmove_number = fields[5].parse::<u32>().map_err(|_| {
            ChessError::InvalidFen(format!("invalid fullmove number: '{}'", fields[5]))
        })?;
        if pos.fullmove_number == 0 {
            return Err(ChessError::InvalidFen(
                "fullmove number must be >= 1".to_string(),
            ));
        }

        Ok(pos)
    }

    /// Serialize the position to FEN.
    pub fn to_fen(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            self.placement_fen(),
            match self.side_to_move {
                Color::White => 'w',
                Color::Black => 'b',
            },
            self.castling_rights.to_fen(),
            self.en_passant
                .map_or_else(|| "-".to_string(), Square::to_algebraic),
            self.halfmove_clock,
            self.fullmove_number,
        )
    }

    /// First FEN field only: piece placement, rank 8 first.
    pub fn placement_fen(&self) -> String {
        let mut fen = String::with_capacity(72);
        for rank in (0..8).rev() {
            let mut empty_count = 0u8;
            for file in 0..8 {
                match self.piece_at(Square::from_file_rank(file, rank)) {
                    Some(piece) => {
                        if empty_count > 0 {
                            fen.push((b'0' + empty_count) as char);
                            empty_count = 0;
                        }
                        fen.push(piece.to_char());
                    }
                    None => empty_count += 1,
                }
            }
            if empty_count > 0 {
                fen.push((b'0' + empty_count) as char);
            }
            if rank > 0 {
                fen.push('/');
            }
        }
        fen
    }
}

fn parse_placement(pos: &mut Position, placement: &str) -> Result<(), ChessError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(ChessError::InvalidFen(format!(
            "expected 8 ranks, got {}",
            ranks.len()
        )));
    }

    for (rank_idx, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - rank_idx as u8;
        let mut file: u8 = 0;
        for ch in rank_str.chars() {
            if file > 7 {
                return Err(ChessError::InvalidFen(format!(
                    "too many squares in rank {}",
                    rank + 1
                )));
            }
            if let Some(digit) = ch.to_digit(10) {
                if !(1..=8).contains(&digit) {
                    return Err(ChessError::InvalidFen(format!(
                        "invalid empty count '{ch}' in rank {}",
                        rank + 1
                    )));
                }
                file += digit as u8;
            } else if let Some(piece) = Piece::from_char(ch) {
                if piece.kind == PieceType::Pawn && (rank == 0 || rank == 7) {
                    return Err(ChessError::InvalidFen(format!(
                        "pawn on rank {}",
                        rank + 1
                    )));
                }
                pos.put_piece(Square::from_file_rank(file, rank), piece);
                file += 1;
            } else {
                return Err(ChessError::InvalidFen(format!(
                    "invalid character '{ch}' in piece placement"
                )));
            }
        }
        if file != 8 {
            return Err(ChessError::InvalidFen(format!(
                "rank {} has {} squares instead of 8",
                rank + 1,
                file
            )));
        }
    }

    for color in [Color::White, Color::Black] {
        let king_count = pos.count(Piece::new(color, PieceType::King));
        if king_count != 1 {
            return Err(ChessError::InvalidFen(format!(
                "{color} has {king_count} kings (expected 1)"
            )));
        }
    }
    Ok(())
}

/// The en passant target must be the square a pawn of the side that just
/// moved skipped over: empty, with its origin square empty and the pawn one
/// rank beyond.
fn check_double_push(pos: &Position, ep_sq: Square) -> Result<(), ChessError> {
    let mover = !pos.side_to_move;
    let step = mover.pawn_step();
    let landed = ep_sq.offset(0, step);
    let origin = ep_sq.offset(0, -step);

    let fits = pos.is_empty(ep_sq)
        && origin.is_some_and(|sq| pos.is_empty(sq))
        && landed.is_some_and(|sq| pos.piece_at(sq) == Some(Piece::new(mover, PieceType::Pawn)));
    if !fits {
        return Err(ChessError::InvalidFen(format!(
            "en passant square {ep_sq} does not follow a {mover} double push"
        )));
    }
    Ok(())
}
