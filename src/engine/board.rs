//! Mailbox chess position and move application.
//!
//! `Position` stores piece placement as 64 optional pieces plus side to move,
//! castling rights, en-passant target and the two move counters. FEN parsing
//! and rendering live in `engine::fen`.

use crate::engine::attacks;
use crate::engine::types::{
    CastleSide, CastlingRights, Color, DecodedMove, MoveError, Piece, PieceType, Square,
};

/// FEN of the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A complete chess position.
///
/// Board layout follows LERF (Little-Endian Rank-File) mapping:
/// a1 = 0, b1 = 1, … h1 = 7, a2 = 8, … h8 = 63.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    /// Piece on each square, indexed by `Square::index`.
    pub board: [Option<Piece>; Square::NUM],

    /// Whose turn it is.
    pub side_to_move: Color,

    /// Castling availability (K/Q/k/q).
    pub castling_rights: CastlingRights,

    /// En-passant target square (the square *behind* the double-pushed pawn).
    pub en_passant: Option<Square>,

    /// Half-move clock for the 50-move rule (reset on pawn move or capture).
    pub halfmove_clock: u32,

    /// Full-move number (starts at 1, incremented after Black moves).
    pub fullmove_number: u32,
}

impl Default for Position {
    fn default() -> Self {
        Self::starting()
    }
}

// ---------------------------------------------------------------------------
// Construction helpers
// ---------------------------------------------------------------------------

impl Position {
    /// Create an empty board with no pieces.
    pub fn empty() -> Self {
        Position {
            board: [None; Square::NUM],
            side_to_move: Color::White,
            castling_rights: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Standard starting position.
    pub fn starting() -> Self {
        let mut pos = Position::empty();
        let back_rank = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];
        for (file, kind) in back_rank.into_iter().enumerate() {
            let file = file as u8;
            for color in [Color::White, Color::Black] {
                pos.put_piece(
                    Square::from_file_rank(file, color.home_rank()),
                    Piece::new(color, kind),
                );
                pos.put_piece(
                    Square::from_file_rank(file, color.pawn_rank()),
                    Piece::new(color, PieceType::Pawn),
                );
            }
        }
        pos.castling_rights = CastlingRights::ALL;
        pos
    }

    // -----------------------------------------------------------------------
    // Piece manipulation (low-level)
    // -----------------------------------------------------------------------

    #[inline]
    pub fn put_piece(&mut self, sq: Square, piece: Piece) {
        self.board[sq.index()] = Some(piece);
    }

    #[inline]
    pub fn remove_piece(&mut self, sq: Square) -> Option<Piece> {
        self.board[sq.index()].take()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// What piece (if any) is on a given square?
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.board[sq.index()]
    }

    #[inline]
    pub fn is_empty(&self, sq: Square) -> bool {
        self.board[sq.index()].is_none()
    }

    /// Squares holding `piece`, in a1..h8 order.
    pub fn squares_of(&self, piece: Piece) -> impl Iterator<Item = Square> + '_ {
        Square::all().filter(move |&sq| self.piece_at(sq) == Some(piece))
    }

    /// Find the king square for the given colour.
    pub fn king_sq(&self, color: Color) -> Option<Square> {
        self.squares_of(Piece::new(color, PieceType::King)).next()
    }

    /// Number of pieces of one kind and colour.
    pub fn count(&self, piece: Piece) -> usize {
        self.squares_of(piece).count()
    }

    // -----------------------------------------------------------------------
    // Attack detection
    // -----------------------------------------------------------------------

    /// Is `sq` attacked by any piece of colour `by`?
    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        let t = attacks::tables();

        if attacks::pawn_attack_sources(by, sq)
            .any(|from| self.piece_at(from) == Some(Piece::new(by, PieceType::Pawn)))
        {
            return true;
        }

        if t.knight_targets(sq)
            .iter()
            .any(|&from| self.piece_at(from) == Some(Piece::new(by, PieceType::Knight)))
        {
            return true;
        }

        if t.king_targets(sq)
            .iter()
            .any(|&from| self.piece_at(from) == Some(Piece::new(by, PieceType::King)))
        {
            return true;
        }

        // Sliders: the first piece met along each ray decides.
        for dir in attacks::ROOK_DIRECTIONS
            .into_iter()
            .chain(attacks::BISHOP_DIRECTIONS)
        {
            let blocker = attacks::ray(sq, dir).find_map(|s| self.piece_at(s));
            if let Some(piece) = blocker
                && piece.color == by
                && attacks::slides_along(piece.kind, dir)
            {
                return true;
            }
        }

        false
    }

    /// Is `color`'s king attacked? A missing king counts as not in check.
    pub fn is_king_attacked(&self, color: Color) -> bool {
        self.king_sq(color)
            .is_some_and(|k| self.is_square_attacked(k, !color))
    }

    /// Is the side-to-move's king currently in check?
    #[inline]
    pub fn is_in_check(&self) -> bool {
        self.is_king_attacked(self.side_to_move)
    }

    // -----------------------------------------------------------------------
    // Apply move
    // -----------------------------------------------------------------------

    /// Apply a decoded move.
    ///
    /// The move is checked against the current board first; any mismatch is
    /// an `InconsistentState` and leaves `self` untouched. Changes are staged
    /// on a copy and committed in one assignment.
    pub fn apply(&mut self, mv: &DecodedMove) -> Result<(), MoveError> {
        self.check_consistent(mv)?;
        let mut next = self.clone();
        next.apply_unchecked(mv);
        *self = next;
        Ok(())
    }

    /// Apply a move already known to match the board.
    pub(crate) fn apply_unchecked(&mut self, mv: &DecodedMove) {
        let us = self.side_to_move;

        self.remove_piece(mv.from);
        if mv.captured.is_some() {
            self.remove_piece(mv.capture_square());
        }
        let landing = match mv.promotion {
            Some(kind) => Piece::new(us, kind),
            None => mv.piece,
        };
        self.put_piece(mv.to, landing);

        if let Some(side) = mv.castle {
            let (rook_from, rook_to) = castling_rook_squares(us, side);
            if let Some(rook) = self.remove_piece(rook_from) {
                self.put_piece(rook_to, rook);
            }
        }

        // Moving king or rook, or capturing on a rook's home square.
        self.castling_rights.0 &= CASTLING_MASK[mv.from.index()];
        self.castling_rights.0 &= CASTLING_MASK[mv.to.index()];

        self.en_passant = if mv.is_double_push() {
            Square::from_file_rank(mv.from.file(), (mv.from.rank() + mv.to.rank()) / 2).into()
        } else {
            None
        };

        if mv.piece.kind == PieceType::Pawn || mv.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }

        if us == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }

        self.side_to_move = !us;
    }

    fn check_consistent(&self, mv: &DecodedMove) -> Result<(), MoveError> {
        let us = self.side_to_move;
        let fail = |what: String| Err(MoveError::InconsistentState(format!("{mv}: {what}")));

        if mv.piece.color != us {
            return fail(format!("{} to move, got a {} piece", us, mv.piece.color));
        }
        if mv.from == mv.to {
            return fail("origin equals destination".into());
        }
        if self.piece_at(mv.from) != Some(mv.piece) {
            return fail(format!("no {} on {}", mv.piece, mv.from));
        }

        let last_rank = mv.piece.kind == PieceType::Pawn && mv.to.rank() == us.promotion_rank();
        match mv.promotion {
            Some(kind) if !last_rank || !PieceType::PROMOTIONS.contains(&kind) => {
                return fail(format!("cannot promote to {kind} here"));
            }
            None if last_rank => return fail("pawn on last rank without promotion".into()),
            _ => {}
        }

        if mv.en_passant {
            if mv.piece.kind != PieceType::Pawn || self.en_passant != Some(mv.to) {
                return fail(format!("{} is not the en-passant target", mv.to));
            }
            if !self.is_empty(mv.to) {
                return fail(format!("en-passant target {} is occupied", mv.to));
            }
            if mv.captured != Some(Piece::new(!us, PieceType::Pawn)) {
                return fail("en passant must capture a pawn".into());
            }
        }
        let on_capture_square = self.piece_at(mv.capture_square());
        if on_capture_square != mv.captured {
            return fail(format!(
                "expected {:?} on {}, found {:?}",
                mv.captured,
                mv.capture_square(),
                on_capture_square
            ));
        }
        if let Some(captured) = mv.captured
            && (captured.color == us || captured.kind == PieceType::King)
        {
            return fail(format!("cannot capture {captured}"));
        }

        if let Some(side) = mv.castle {
            let home = Square::from_file_rank(4, us.home_rank());
            let king_to = Square::from_file_rank(side.king_to_file(), us.home_rank());
            if mv.piece.kind != PieceType::King || mv.from != home || mv.to != king_to {
                return fail("castling move does not match king squares".into());
            }
            let (rook_from, rook_to) = castling_rook_squares(us, side);
            if self.piece_at(rook_from) != Some(Piece::new(us, PieceType::Rook)) {
                return fail(format!("no rook on {rook_from}"));
            }
            if !self.is_empty(rook_to) {
                return fail(format!("rook destination {rook_to} is occupied"));
            }
            if !self.castling_rights.can_castle(us, side) {
                return fail("castling right already lost".into());
            }
        }

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Board display (8×8 text grid)
    // -----------------------------------------------------------------------

    /// Render the board as an 8-line string (rank 8 at top), useful for debugging.
    pub fn board_string(&self) -> String {
        let mut s = String::with_capacity(200);
        for rank in (0..8).rev() {
            s.push((b'1' + rank) as char);
            s.push(' ');
            for file in 0..8 {
                let sq = Square::from_file_rank(file, rank);
                s.push(self.piece_at(sq).map_or('.', Piece::to_char));
                if file < 7 {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        s.push_str("  a b c d e f g h");
        s
    }
}

// ---------------------------------------------------------------------------
// Castling helpers (free functions)
// ---------------------------------------------------------------------------

/// Rook (from, to) squares for a castle.
pub fn castling_rook_squares(color: Color, side: CastleSide) -> (Square, Square) {
    let (from_file, to_file) = side.rook_files();
    let rank = color.home_rank();
    (
        Square::from_file_rank(from_file, rank),
        Square::from_file_rank(to_file, rank),
    )
}

/// Mask table indexed by square index. When a move touches a square, AND the
/// castling rights with this mask. The king's home square removes both of
/// that side's rights.
#[rustfmt::skip]
const CASTLING_MASK: [u8; 64] = {
    let mut mask = [0b1111u8; 64];
    mask[0]  = 0b1111 & !CastlingRights::WHITE_QUEENSIDE;
    mask[4]  = 0b1111 & !(CastlingRights::WHITE_KINGSIDE | CastlingRights::WHITE_QUEENSIDE);
    mask[7]  = 0b1111 & !CastlingRights::WHITE_KINGSIDE;
    mask[56] = 0b1111 & !CastlingRights::BLACK_QUEENSIDE;
    mask[60] = 0b1111 & !(CastlingRights::BLACK_KINGSIDE | CastlingRights::BLACK_QUEENSIDE);
    mask[63] = 0b1111 & !CastlingRights::BLACK_KINGSIDE;
    mask
};

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.board_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
