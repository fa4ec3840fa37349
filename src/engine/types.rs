use std::fmt;

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// The two sides in a chess game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Index for array lookups: White=0, Black=1.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Rank (0-based) of this side's back rank.
    #[inline]
    pub const fn home_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// Rank (0-based) a pawn of this side promotes on.
    #[inline]
    pub const fn promotion_rank(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// Rank (0-based) this side's pawns start on.
    #[inline]
    pub const fn pawn_rank(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    /// Rank delta of a single pawn step.
    #[inline]
    pub const fn pawn_step(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }
}

impl std::ops::Not for Color {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

// ---------------------------------------------------------------------------
// PieceType
// ---------------------------------------------------------------------------

/// The six piece kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    /// Pieces a pawn may promote to, strongest first.
    pub const PROMOTIONS: [PieceType; 4] = [
        PieceType::Queen,
        PieceType::Rook,
        PieceType::Bishop,
        PieceType::Knight,
    ];

    /// Uppercase SAN letter (`P` for pawns, which SAN itself omits).
    pub fn san_letter(self) -> char {
        match self {
            PieceType::Pawn => 'P',
            PieceType::Knight => 'N',
            PieceType::Bishop => 'B',
            PieceType::Rook => 'R',
            PieceType::Queen => 'Q',
            PieceType::King => 'K',
        }
    }

    /// Parse an uppercase SAN piece letter. Pawns have no letter in SAN.
    pub fn from_san_letter(c: char) -> Option<PieceType> {
        match c {
            'N' => Some(PieceType::Knight),
            'B' => Some(PieceType::Bishop),
            'R' => Some(PieceType::Rook),
            'Q' => Some(PieceType::Queen),
            'K' => Some(PieceType::King),
            _ => None,
        }
    }

    /// Parse the piece after `=` in a promotion suffix.
    pub fn from_promotion_char(c: char) -> Option<PieceType> {
        match c {
            'Q' | 'q' => Some(PieceType::Queen),
            'R' | 'r' => Some(PieceType::Rook),
            'B' | 'b' => Some(PieceType::Bishop),
            'N' | 'n' => Some(PieceType::Knight),
            _ => None,
        }
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PieceType::Pawn => write!(f, "pawn"),
            PieceType::Knight => write!(f, "knight"),
            PieceType::Bishop => write!(f, "bishop"),
            PieceType::Rook => write!(f, "rook"),
            PieceType::Queen => write!(f, "queen"),
            PieceType::King => write!(f, "king"),
        }
    }
}

// ---------------------------------------------------------------------------
// Piece
// ---------------------------------------------------------------------------

/// A coloured piece standing on (or leaving) a square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceType,
}

impl Piece {
    pub const fn new(color: Color, kind: PieceType) -> Self {
        Piece { color, kind }
    }

    /// FEN letter: uppercase for White, lowercase for Black.
    pub fn to_char(self) -> char {
        let c = self.kind.san_letter();
        match self.color {
            Color::White => c,
            Color::Black => c.to_ascii_lowercase(),
        }
    }

    /// Parse a FEN piece letter.
    pub fn from_char(c: char) -> Option<Piece> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let kind = match c.to_ascii_lowercase() {
            'p' => PieceType::Pawn,
            'n' => PieceType::Knight,
            'b' => PieceType::Bishop,
            'r' => PieceType::Rook,
            'q' => PieceType::Queen,
            'k' => PieceType::King,
            _ => return None,
        };
        Some(Piece { color, kind })
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color, self.kind)
    }
}

// ---------------------------------------------------------------------------
// Square
// ---------------------------------------------------------------------------

/// A square on the chess board (0..63, LERF: a1=0, h8=63).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(pub u8);

impl Square {
    pub const NUM: usize = 64;

    #[inline]
    pub fn new(index: u8) -> Self {
        debug_assert!(index < 64, "Square index out of range: {index}");
        Square(index)
    }

    #[inline]
    pub fn file(self) -> u8 {
        self.0 & 7
    }

    #[inline]
    pub fn rank(self) -> u8 {
        self.0 >> 3
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn from_file_rank(file: u8, rank: u8) -> Self {
        debug_assert!(file < 8 && rank < 8);
        Square(rank * 8 + file)
    }

    /// Step by a (file, rank) delta, or `None` when leaving the board.
    #[inline]
    pub fn offset(self, file_delta: i8, rank_delta: i8) -> Option<Self> {
        let file = self.file() as i8 + file_delta;
        let rank = self.rank() as i8 + rank_delta;
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Square::from_file_rank(file as u8, rank as u8))
        } else {
            None
        }
    }

    /// Iterate a1, b1, ... h8.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64u8).map(Square)
    }

    /// Parse algebraic notation like "e4".
    pub fn from_algebraic(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        if file < 8 && rank < 8 {
            Some(Square::from_file_rank(file, rank))
        } else {
            None
        }
    }

    /// File letter `a`..`h`.
    #[inline]
    pub fn file_char(self) -> char {
        (b'a' + self.file()) as char
    }

    /// Rank digit `1`..`8`.
    #[inline]
    pub fn rank_char(self) -> char {
        (b'1' + self.rank()) as char
    }

    /// Convert to algebraic notation like "e4".
    pub fn to_algebraic(self) -> String {
        format!("{}{}", self.file_char(), self.rank_char())
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

// ---------------------------------------------------------------------------
// CastleSide & CastlingRights
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CastleSide {
    Kingside,
    Queenside,
}

impl CastleSide {
    /// File the king lands on.
    pub fn king_to_file(self) -> u8 {
        match self {
            CastleSide::Kingside => 6,
            CastleSide::Queenside => 2,
        }
    }

    /// Rook (from, to) files.
    pub fn rook_files(self) -> (u8, u8) {
        match self {
            CastleSide::Kingside => (7, 5),
            CastleSide::Queenside => (0, 3),
        }
    }

    pub fn san(self) -> &'static str {
        match self {
            CastleSide::Kingside => "O-O",
            CastleSide::Queenside => "O-O-O",
        }
    }
}

/// Castling availability bitfield: bits 0-3 = WK, WQ, BK, BQ.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CastlingRights(pub u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KINGSIDE: u8 = 1;
    pub const WHITE_QUEENSIDE: u8 = 2;
    pub const BLACK_KINGSIDE: u8 = 4;
    pub const BLACK_QUEENSIDE: u8 = 8;
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    /// The single flag for a colour and wing.
    pub const fn flag(color: Color, side: CastleSide) -> u8 {
        match (color, side) {
            (Color::White, CastleSide::Kingside) => Self::WHITE_KINGSIDE,
            (Color::White, CastleSide::Queenside) => Self::WHITE_QUEENSIDE,
            (Color::Black, CastleSide::Kingside) => Self::BLACK_KINGSIDE,
            (Color::Black, CastleSide::Queenside) => Self::BLACK_QUEENSIDE,
        }
    }

    #[inline]
    pub fn has(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    #[inline]
    pub fn can_castle(self, color: Color, side: CastleSide) -> bool {
        self.has(Self::flag(color, side))
    }

    /// Parse FEN castling string (e.g. "KQkq", "-", "Kq").
    pub fn from_fen(s: &str) -> Option<Self> {
        if s == "-" {
            return Some(CastlingRights::NONE);
        }
        if s.is_empty() {
            return None;
        }
        let mut rights = 0u8;
        for c in s.chars() {
            let flag = match c {
                'K' => Self::WHITE_KINGSIDE,
                'Q' => Self::WHITE_QUEENSIDE,
                'k' => Self::BLACK_KINGSIDE,
                'q' => Self::BLACK_QUEENSIDE,
                _ => return None,
            };
            if rights & flag != 0 {
                return None;
            }
            rights |= flag;
        }
        Some(CastlingRights(rights))
    }

    /// Convert to FEN castling string.
    pub fn to_fen(self) -> String {
        if self.0 == 0 {
            return "-".to_string();
        }
        let mut s = String::with_capacity(4);
        for (flag, c) in [
            (Self::WHITE_KINGSIDE, 'K'),
            (Self::WHITE_QUEENSIDE, 'Q'),
            (Self::BLACK_KINGSIDE, 'k'),
            (Self::BLACK_QUEENSIDE, 'q'),
        ] {
            if self.has(flag) {
                s.push(c);
            }
        }
        s
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}

// ---------------------------------------------------------------------------
// DecodedMove
// ---------------------------------------------------------------------------

/// A fully specified move, produced by the SAN decoder for one token and
/// consumed by `Position::apply`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedMove {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    /// For en passant this is the pawn behind `to`, not anything on `to`.
    pub captured: Option<Piece>,
    pub promotion: Option<PieceType>,
    pub castle: Option<CastleSide>,
    pub en_passant: bool,
}

impl DecodedMove {
    #[inline]
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    #[inline]
    pub fn is_double_push(&self) -> bool {
        self.piece.kind == PieceType::Pawn && self.from.rank().abs_diff(self.to.rank()) == 2
    }

    /// Square the captured piece stands on (differs from `to` for en passant).
    pub fn capture_square(&self) -> Square {
        if self.en_passant {
            Square::from_file_rank(self.to.file(), self.from.rank())
        } else {
            self.to
        }
    }
}

impl fmt::Display for DecodedMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promo) = self.promotion {
            write!(f, "={}", promo.san_letter())?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// GameStatus
// ---------------------------------------------------------------------------

/// Status of a position, as far as random game generation needs it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Active,
    Check,
    Checkmate,
    Stalemate,
    Draw(DrawReason),
}

impl GameStatus {
    pub fn as_str(&self) -> &str {
        match self {
            GameStatus::Active => "active",
            GameStatus::Check => "check",
            GameStatus::Checkmate => "checkmate",
            GameStatus::Stalemate => "stalemate",
            GameStatus::Draw(reason) => reason.as_str(),
        }
    }

    pub fn is_game_over(&self) -> bool {
        matches!(
            self,
            GameStatus::Checkmate | GameStatus::Stalemate | GameStatus::Draw(_)
        )
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reason for a draw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DrawReason {
    FiftyMoveRule,
    InsufficientMaterial,
}

impl DrawReason {
    pub fn as_str(&self) -> &str {
        match self {
            DrawReason::FiftyMoveRule => "fifty_move_rule",
            DrawReason::InsufficientMaterial => "insufficient_material",
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a single SAN token could not be decoded or applied.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("malformed move '{token}': {reason}")]
    MalformedToken { token: String, reason: String },

    #[error("illegal move '{token}': {reason}")]
    IllegalMove { token: String, reason: String },

    #[error("ambiguous move '{token}': {candidates} pieces can make it")]
    AmbiguousMove { token: String, candidates: usize },

    /// An apply-time consistency check failed. Never caused by user input
    /// when the move came from the decoder.
    #[error("inconsistent board state: {0}")]
    InconsistentState(String),
}

impl MoveError {
    pub(crate) fn malformed(token: &str, reason: impl Into<String>) -> Self {
        MoveError::MalformedToken {
            token: token.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn illegal(token: &str, reason: impl Into<String>) -> Self {
        MoveError::IllegalMove {
            token: token.to_string(),
            reason: reason.into(),
        }
    }

    /// Short machine-readable kind, used in API error codes.
    pub fn code(&self) -> &'static str {
        match self {
            MoveError::MalformedToken { .. } => "MALFORMED_TOKEN",
            MoveError::IllegalMove { .. } => "ILLEGAL_MOVE",
            MoveError::AmbiguousMove { .. } => "AMBIGUOUS_MOVE",
            MoveError::InconsistentState(_) => "INCONSISTENT_STATE",
        }
    }
}

/// Domain errors for the replay engine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ChessError {
    #[error("invalid FEN string: {0}")]
    InvalidFen(String),

    /// A token in the move text failed; `index` counts SAN tokens from 0.
    #[error("move {index} ('{token}'): {source}")]
    Replay {
        index: usize,
        token: String,
        #[source]
        source: MoveError,
    },

    #[error("game has {available} half-moves, {requested} requested")]
    GameTooShort { requested: usize, available: usize },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
