//! Standard Algebraic Notation (SAN) decoding and encoding.
//!
//! SAN examples: `e4`, `Nf3`, `Bxe5`, `O-O`, `e8=Q+`, `Raxd1#`.

use crate::engine::board::Position;
use crate::engine::movegen;
use crate::engine::types::{CastleSide, DecodedMove, MoveError, Piece, PieceType, Square};

// =========================================================================
// SAN decoding
// =========================================================================

/// Shape of a token before it is matched against the board.
#[derive(Debug, PartialEq, Eq)]
struct SanParts {
    kind: PieceType,
    file_hint: Option<u8>,
    rank_hint: Option<u8>,
    capture: bool,
    to: Square,
    promotion: Option<PieceType>,
}

/// Decode one SAN token against `pos` into a fully specified move.
///
/// Trailing `+`, `#`, `!` and `?` are ignored. The position is not modified.
/// Candidate origins are filtered for king safety before ambiguity is
/// judged, so a pinned piece never makes a move ambiguous.
pub fn decode(pos: &Position, token: &str) -> Result<DecodedMove, MoveError> {
    let token = token.trim();
    let san = token.trim_end_matches(['+', '#', '!', '?']);
    if san.is_empty() {
        return Err(MoveError::malformed(token, "empty move"));
    }

    match san {
        "O-O" | "0-0" => return decode_castle(pos, token, CastleSide::Kingside),
        "O-O-O" | "0-0-0" => return decode_castle(pos, token, CastleSide::Queenside),
        _ => {}
    }

    let parts = parse_parts(token, san)?;
    let us = pos.side_to_move;
    let piece = Piece::new(us, parts.kind);
    let is_pawn = parts.kind == PieceType::Pawn;
    let to = parts.to;

    // Destination occupancy.
    match pos.piece_at(to) {
        Some(target) if target.color == us => {
            return Err(MoveError::illegal(token, format!("{to} holds a {us} piece")));
        }
        Some(target) if target.kind == PieceType::King => {
            return Err(MoveError::illegal(token, "the king cannot be captured"));
        }
        Some(_) if is_pawn && !parts.capture => {
            return Err(MoveError::illegal(token, format!("pawn push to {to} is blocked")));
        }
        None if parts.capture && !(is_pawn && pos.en_passant == Some(to)) => {
            return Err(MoveError::illegal(token, format!("nothing to capture on {to}")));
        }
        _ => {}
    }

    // Promotion must match the destination rank.
    let last_rank = is_pawn && to.rank() == us.promotion_rank();
    match (last_rank, parts.promotion) {
        (true, None) => {
            return Err(MoveError::illegal(token, "promotion piece required"));
        }
        (false, Some(_)) => {
            return Err(MoveError::illegal(token, "promotion only on the last rank"));
        }
        _ => {}
    }

    let reachable: Vec<Square> = movegen::candidate_origins(pos, piece, to, parts.capture)
        .into_iter()
        .filter(|sq| parts.file_hint.is_none_or(|f| sq.file() == f))
        .filter(|sq| parts.rank_hint.is_none_or(|r| sq.rank() == r))
        .collect();
    if reachable.is_empty() {
        return Err(MoveError::illegal(
            token,
            format!("no {} can reach {to}", parts.kind),
        ));
    }

    let mut legal: Vec<DecodedMove> = reachable
        .into_iter()
        .filter_map(|from| movegen::describe_move(pos, from, to, parts.promotion))
        .filter(|mv| movegen::leaves_king_safe(pos, mv))
        .collect();

    match legal.len() {
        0 => Err(MoveError::illegal(token, "move leaves the king in check")),
        1 => Ok(legal.remove(0)),
        n => Err(MoveError::AmbiguousMove {
            token: token.to_string(),
            candidates: n,
        }),
    }
}

fn decode_castle(pos: &Position, token: &str, side: CastleSide) -> Result<DecodedMove, MoveError> {
    movegen::castle_move(pos, side).map_err(|reason| MoveError::illegal(token, reason))
}

/// Split a non-castling SAN body into piece, hints, capture marker,
/// destination and promotion. Purely syntactic.
fn parse_parts(token: &str, san: &str) -> Result<SanParts, MoveError> {
    // Promotion suffix.
    let (body, promotion) = match san.rsplit_once('=') {
        Some((body, promo)) => {
            let mut chars = promo.chars();
            let piece = match (chars.next(), chars.next()) {
                (Some(c), None) => PieceType::from_promotion_char(c),
                _ => None,
            };
            match piece {
                Some(p) => (body, Some(p)),
                None => {
                    return Err(MoveError::malformed(
                        token,
                        format!("invalid promotion piece '{promo}'"),
                    ));
                }
            }
        }
        None => (san, None),
    };

    let chars: Vec<char> = body.chars().collect();
    let Some(&first) = chars.first() else {
        return Err(MoveError::malformed(token, "missing destination square"));
    };

    let (kind, rest) = if first.is_ascii_uppercase() {
        match PieceType::from_san_letter(first) {
            Some(kind) => (kind, &chars[1..]),
            None => {
                return Err(MoveError::malformed(
                    token,
                    format!("unknown piece letter '{first}'"),
                ));
            }
        }
    } else if ('a'..='h').contains(&first) {
        (PieceType::Pawn, &chars[..])
    } else {
        return Err(MoveError::malformed(
            token,
            format!("unexpected character '{first}'"),
        ));
    };

    if promotion.is_some() && kind != PieceType::Pawn {
        return Err(MoveError::malformed(token, "only pawns can promote"));
    }

    // The last two characters are the destination square.
    if rest.len() < 2 {
        return Err(MoveError::malformed(token, "missing destination square"));
    }
    let dest: String = rest[rest.len() - 2..].iter().collect();
    let to = Square::from_algebraic(&dest)
        .ok_or_else(|| MoveError::malformed(token, format!("invalid destination '{dest}'")))?;

    let mut middle = &rest[..rest.len() - 2];
    let capture = middle.last() == Some(&'x');
    if capture {
        middle = &middle[..middle.len() - 1];
    }

    let (file_hint, rank_hint) = match middle {
        [] => (None, None),
        [f] if ('a'..='h').contains(f) => (Some(*f as u8 - b'a'), None),
        [r] if ('1'..='8').contains(r) => (None, Some(*r as u8 - b'1')),
        [f, r] if ('a'..='h').contains(f) && ('1'..='8').contains(r) => {
            (Some(*f as u8 - b'a'), Some(*r as u8 - b'1'))
        }
        _ => {
            let hint: String = middle.iter().collect();
            return Err(MoveError::malformed(
                token,
                format!("invalid disambiguation '{hint}'"),
            ));
        }
    };

    if kind == PieceType::Pawn {
        // Push: `e4`. Capture: `exd5`, origin file required, nothing else.
        let shape_ok = match (capture, file_hint, rank_hint) {
            (false, None, None) => true,
            (true, Some(_), None) => true,
            _ => false,
        };
        if !shape_ok {
            return Err(MoveError::malformed(token, "invalid pawn move"));
        }
    }

    Ok(SanParts {
        kind,
        file_hint,
        rank_hint,
        capture,
        to,
        promotion,
    })
}

// =========================================================================
// SAN encoding
// =========================================================================

/// Render a legal move in SAN, with minimal disambiguation and a `+` or `#`
/// suffix.
pub fn encode(pos: &Position, mv: &DecodedMove) -> String {
    let mut san = match mv.castle {
        Some(side) => side.san().to_string(),
        None => encode_body(pos, mv),
    };

    let mut after = pos.clone();
    after.apply_unchecked(mv);
    if after.is_in_check() {
        if movegen::legal_moves(&after).is_empty() {
            san.push('#');
        } else {
            san.push('+');
        }
    }
    san
}

fn encode_body(pos: &Position, mv: &DecodedMove) -> String {
    let mut san = String::with_capacity(8);

    if mv.piece.kind == PieceType::Pawn {
        if mv.is_capture() {
            // Prefix with departure file on captures: "exd5".
            san.push(mv.from.file_char());
            san.push('x');
        }
        san.push_str(&mv.to.to_algebraic());
        if let Some(promo) = mv.promotion {
            san.push('=');
            san.push(promo.san_letter());
        }
    } else {
        san.push(mv.piece.kind.san_letter());
        san.push_str(&disambiguation(pos, mv));
        if mv.is_capture() {
            san.push('x');
        }
        san.push_str(&mv.to.to_algebraic());
    }
    san
}

/// File, rank or both, whichever is the least that tells `mv` apart from
/// other legal moves of the same piece kind to the same square.
fn disambiguation(pos: &Position, mv: &DecodedMove) -> String {
    let rivals: Vec<Square> = movegen::legal_moves(pos)
        .into_iter()
        .filter(|m| m.to == mv.to && m.from != mv.from && m.piece == mv.piece && m.castle.is_none())
        .map(|m| m.from)
        .collect();

    if rivals.is_empty() {
        return String::new();
    }

    let same_file = rivals.iter().any(|sq| sq.file() == mv.from.file());
    let same_rank = rivals.iter().any(|sq| sq.rank() == mv.from.rank());

    match (same_file, same_rank) {
        (false, _) => mv.from.file_char().to_string(),
        (true, false) => mv.from.rank_char().to_string(),
        (true, true) => mv.from.to_algebraic(),
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::Color;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    // -------------------------------------------------------------------
    // Decoding: basics
    // -------------------------------------------------------------------

    #[test]
    fn decode_pawn_push() {
        let p = Position::starting();
        let mv = decode(&p, "e4").unwrap();
        assert_eq!(mv.from, sq("e2"));
        assert_eq!(mv.to, sq("e4"));
        assert_eq!(mv.piece, Piece::new(Color::White, PieceType::Pawn));
        assert_eq!(mv.captured, None);
        assert!(!mv.en_passant);
    }

    #[test]
    fn decode_knight_move() {
        let p = Position::starting();
        let mv = decode(&p, "Nf3").unwrap();
        assert_eq!(mv.from, sq("g1"));
        assert_eq!(mv.to, sq("f3"));
    }

    #[test]
    fn decode_ignores_annotations() {
        let p = Position::starting();
        assert_eq!(decode(&p, "e4!?").unwrap(), decode(&p, "e4").unwrap());
        assert_eq!(decode(&p, " Nf3+ ").unwrap(), decode(&p, "Nf3").unwrap());
    }

    #[test]
    fn decode_pawn_capture() {
        let p = pos("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2");
        let mv = decode(&p, "exd5").unwrap();
        assert_eq!(mv.from, sq("e4"));
        assert_eq!(mv.captured, Some(Piece::new(Color::Black, PieceType::Pawn)));
    }

    #[test]
    fn decode_piece_capture() {
        let p = pos("rnbqkbnr/ppp1pppp/8/3p4/4P3/2N5/PPPP1PPP/R1BQKBNR b KQkq - 1 2");
        let mv = decode(&p, "dxe4").unwrap();
        assert_eq!(mv.captured, Some(Piece::new(Color::White, PieceType::Pawn)));
        let p = pos("rnbqkbnr/ppp1pppp/8/8/4p3/2N5/PPPP1PPP/R1BQKBNR w KQkq - 0 3");
        let mv = decode(&p, "Nxe4").unwrap();
        assert_eq!(mv.from, sq("c3"));
        assert!(mv.is_capture());
    }

    // -------------------------------------------------------------------
    // Decoding: ambiguity
    // -------------------------------------------------------------------

    #[test]
    fn ambiguous_without_hint() {
        let p = pos("4k3/8/8/8/8/8/K7/R6R w - - 0 1");
        let err = decode(&p, "Rd1").unwrap_err();
        assert_eq!(
            err,
            MoveError::AmbiguousMove {
                token: "Rd1".into(),
                candidates: 2
            }
        );
    }

    #[test]
    fn file_hint_resolves() {
        let p = pos("4k3/8/8/8/8/8/K7/R6R w - - 0 1");
        assert_eq!(decode(&p, "Rad1").unwrap().from, sq("a1"));
        assert_eq!(decode(&p, "Rhd1").unwrap().from, sq("h1"));
    }

    #[test]
    fn rank_hint_resolves() {
        let p = pos("4k3/8/8/R7/8/8/8/R3K3 w - - 0 1");
        assert!(matches!(
            decode(&p, "Ra3"),
            Err(MoveError::AmbiguousMove { .. })
        ));
        assert_eq!(decode(&p, "R1a3").unwrap().from, sq("a1"));
        assert_eq!(decode(&p, "R5a3").unwrap().from, sq("a5"));
    }

    #[test]
    fn square_hint_resolves() {
        let p = pos("6k1/8/8/8/Q6Q/8/8/Q3K3 w - - 0 1");
        assert!(matches!(
            decode(&p, "Qa4e4"),
            Ok(mv) if mv.from == sq("a4")
        ));
        assert!(matches!(
            decode(&p, "Qd4"),
            Err(MoveError::AmbiguousMove { .. })
        ));
    }

    #[test]
    fn pinned_piece_does_not_make_ambiguity() {
        // The c3 knight is pinned by the b4 bishop; only the g1 knight can go to e2.
        let p = pos("4k3/8/8/8/1b6/2N5/8/4K1N1 w - - 0 1");
        let mv = decode(&p, "Ne2").unwrap();
        assert_eq!(mv.from, sq("g1"));
    }

    // -------------------------------------------------------------------
    // Decoding: special moves
    // -------------------------------------------------------------------

    #[test]
    fn decode_en_passant() {
        let p = pos("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
        let mv = decode(&p, "exf6").unwrap();
        assert!(mv.en_passant);
        assert_eq!(mv.captured, Some(Piece::new(Color::Black, PieceType::Pawn)));
        assert_eq!(mv.capture_square(), sq("f5"));
    }

    #[test]
    fn decode_castles() {
        let p = pos("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");
        assert_eq!(decode(&p, "O-O").unwrap().castle, Some(CastleSide::Kingside));
        assert_eq!(decode(&p, "0-0-0").unwrap().castle, Some(CastleSide::Queenside));
    }

    #[test]
    fn castle_without_right_is_illegal() {
        let p = pos("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w Qkq - 0 1");
        assert!(matches!(
            decode(&p, "O-O"),
            Err(MoveError::IllegalMove { .. })
        ));
    }

    #[test]
    fn decode_promotion() {
        let p = pos("7k/4P3/8/8/8/8/8/4K3 w - - 0 1");
        let mv = decode(&p, "e8=Q+").unwrap();
        assert_eq!(mv.promotion, Some(PieceType::Queen));
        assert_eq!(decode(&p, "e8=n").unwrap().promotion, Some(PieceType::Knight));
    }

    #[test]
    fn promotion_errors() {
        let p = pos("7k/4P3/8/8/8/8/8/4K3 w - - 0 1");
        assert!(matches!(
            decode(&p, "e8"),
            Err(MoveError::IllegalMove { .. })
        ));
        assert!(matches!(
            decode(&p, "e8=K"),
            Err(MoveError::MalformedToken { .. })
        ));
        assert!(matches!(
            decode(&p, "Ke2=Q"),
            Err(MoveError::MalformedToken { .. })
        ));
        let start = Position::starting();
        assert!(matches!(
            decode(&start, "e4=Q"),
            Err(MoveError::IllegalMove { .. })
        ));
    }

    // -------------------------------------------------------------------
    // Decoding: failures
    // -------------------------------------------------------------------

    #[test]
    fn malformed_tokens() {
        let p = Position::starting();
        for token in ["", "+", "Nf", "N", "Zf3", "xe4", "e9", "Nfff3", "e2e4", "exd", "i4"] {
            assert!(
                matches!(decode(&p, token), Err(MoveError::MalformedToken { .. })),
                "accepted {token:?}"
            );
        }
    }

    #[test]
    fn illegal_moves() {
        let p = Position::starting();
        for token in ["e5", "Nf4", "Ke2", "Bxc3", "exd3", "Nd2"] {
            assert!(
                matches!(decode(&p, token), Err(MoveError::IllegalMove { .. })),
                "accepted {token:?}"
            );
        }
    }

    #[test]
    fn moving_into_check_is_illegal() {
        let p = pos("4k3/8/8/8/8/8/8/r3K3 w - - 0 1");
        let err = decode(&p, "Kd1").unwrap_err();
        assert_eq!(
            err,
            MoveError::illegal("Kd1", "move leaves the king in check")
        );
    }

    #[test]
    fn decode_does_not_touch_position() {
        let p = Position::starting();
        let before = p.clone();
        decode(&p, "e4").unwrap();
        let _ = decode(&p, "Qh5");
        assert_eq!(p, before);
    }

    // -------------------------------------------------------------------
    // Encoding
    // -------------------------------------------------------------------

    #[test]
    fn encode_basic_moves() {
        let p = Position::starting();
        let e4 = decode(&p, "e4").unwrap();
        assert_eq!(encode(&p, &e4), "e4");
        let nf3 = decode(&p, "Nf3").unwrap();
        assert_eq!(encode(&p, &nf3), "Nf3");
    }

    #[test]
    fn encode_disambiguates_minimally() {
        let p = pos("4k3/8/8/8/8/8/K7/R6R w - - 0 1");
        let mv = decode(&p, "Rad1").unwrap();
        assert_eq!(encode(&p, &mv), "Rad1");

        let p = pos("4k3/8/8/R7/8/8/8/R3K3 w - - 0 1");
        let mv = decode(&p, "R5a3").unwrap();
        assert_eq!(encode(&p, &mv), "R5a3");

        let p = pos("6k1/8/8/8/Q6Q/8/8/Q3K3 w - - 0 1");
        let mv = decode(&p, "Qa4e4").unwrap();
        assert_eq!(encode(&p, &mv), "Qae4");
        let mv = decode(&p, "Qa4d4").unwrap();
        assert_eq!(encode(&p, &mv), "Qa4d4");
    }

    #[test]
    fn encode_check_and_mate() {
        let p = pos("rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2");
        let mv = decode(&p, "Qh4").unwrap();
        assert_eq!(encode(&p, &mv), "Qh4#");

        let p = pos("4k3/8/8/8/8/8/8/R3K3 w - - 0 1");
        let mv = decode(&p, "Ra8").unwrap();
        assert_eq!(encode(&p, &mv), "Ra8+");
    }

    #[test]
    fn encode_promotion_and_castle() {
        let p = pos("7k/4P3/8/8/8/8/8/R3K3 w Q - 0 1");
        let promo = decode(&p, "e8=R").unwrap();
        assert_eq!(encode(&p, &promo), "e8=R+");
        let castle = decode(&p, "O-O-O").unwrap();
        assert_eq!(encode(&p, &castle), "O-O-O");
    }

    #[test]
    fn encode_decode_round_trip_all_legal_moves() {
        for fen in [
            crate::engine::board::STARTING_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        ] {
            let p = pos(fen);
            for mv in movegen::legal_moves(&p) {
                let san = encode(&p, &mv);
                let back = decode(&p, &san)
                    .unwrap_or_else(|e| panic!("{fen}: {san} failed to decode: {e}"));
                assert_eq!(back, mv, "{fen}: round trip of {san}");
            }
        }
    }
}
