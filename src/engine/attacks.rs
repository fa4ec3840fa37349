//! Piece movement geometry.
//!
//! Leaper targets (knight, king) are tabulated once via `OnceLock`; sliders
//! walk rays over the board, so the only precomputation is the 64 × 8 leaper
//! lists.

use crate::engine::types::{Color, PieceType, Square};
use std::sync::OnceLock;

// =========================================================================
// Directions
// =========================================================================

/// Orthogonal (file, rank) steps.
pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Diagonal (file, rank) steps.
pub const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

// =========================================================================
// Leaper tables
// =========================================================================

/// Get a reference to the global leaper tables.
pub fn tables() -> &'static LeaperTables {
    static TABLES: OnceLock<LeaperTables> = OnceLock::new();
    TABLES.get_or_init(LeaperTables::init)
}

/// Destination squares for knights and kings, indexed by origin square.
pub struct LeaperTables {
    knight: Vec<Vec<Square>>,
    king: Vec<Vec<Square>>,
}

impl LeaperTables {
    fn init() -> Self {
        LeaperTables {
            knight: build_leaper_table(&KNIGHT_OFFSETS),
            king: build_leaper_table(&KING_OFFSETS),
        }
    }

    #[inline]
    pub fn knight_targets(&self, sq: Square) -> &[Square] {
        &self.knight[sq.index()]
    }

    #[inline]
    pub fn king_targets(&self, sq: Square) -> &[Square] {
        &self.king[sq.index()]
    }
}

fn build_leaper_table(offsets: &[(i8, i8)]) -> Vec<Vec<Square>> {
    Square::all()
        .map(|sq| {
            offsets
                .iter()
                .filter_map(|&(df, dr)| sq.offset(df, dr))
                .collect()
        })
        .collect()
}

// =========================================================================
// Rays
// =========================================================================

/// Squares from `from` (exclusive) stepping by `dir` until the board edge.
pub fn ray(from: Square, dir: (i8, i8)) -> impl Iterator<Item = Square> {
    std::iter::successors(from.offset(dir.0, dir.1), move |sq| {
        sq.offset(dir.0, dir.1)
    })
}

/// Unit step from `from` towards `to` if the two share a file, rank or
/// diagonal.
pub fn line_direction(from: Square, to: Square) -> Option<(i8, i8)> {
    if from == to {
        return None;
    }
    let df = to.file() as i8 - from.file() as i8;
    let dr = to.rank() as i8 - from.rank() as i8;
    if df == 0 || dr == 0 || df.abs() == dr.abs() {
        Some((df.signum(), dr.signum()))
    } else {
        None
    }
}

/// Squares strictly between two aligned squares. Empty when not aligned.
pub fn between(from: Square, to: Square) -> Vec<Square> {
    match line_direction(from, to) {
        Some(dir) => ray(from, dir).take_while(|&sq| sq != to).collect(),
        None => Vec::new(),
    }
}

/// Does a slider of `kind` move along `dir`?
pub fn slides_along(kind: PieceType, dir: (i8, i8)) -> bool {
    let diagonal = dir.0 != 0 && dir.1 != 0;
    match kind {
        PieceType::Bishop => diagonal,
        PieceType::Rook => !diagonal,
        PieceType::Queen => true,
        _ => false,
    }
}

// =========================================================================
// Pawn geometry
// =========================================================================

/// Squares a pawn of `color` on `sq` attacks.
pub fn pawn_attack_targets(color: Color, sq: Square) -> impl Iterator<Item = Square> {
    let step = color.pawn_step();
    [-1i8, 1]
        .into_iter()
        .filter_map(move |df| sq.offset(df, step))
}

/// Squares from which a pawn of `color` would attack `sq`.
pub fn pawn_attack_sources(color: Color, sq: Square) -> impl Iterator<Item = Square> {
    let step = color.pawn_step();
    [-1i8, 1]
        .into_iter()
        .filter_map(move |df| sq.offset(df, -step))
}

// =========================================================================
// Tests
// =========================================================================
