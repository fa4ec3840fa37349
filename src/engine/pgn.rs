//! PGN move text: tokenizing SAN out of free-form game text, and writing
//! numbered move text back out.
//!
//! The tokenizer understands the parts of PGN that show up in stored games:
//! tag pairs, `{}` and `;` comments, `()` variations, `$n` glyphs, move
//! numbers (`1.`, `12...`, glued `1.e4`) and the result marker.

use crate::engine::types::ChessError;

/// Game termination markers. Anything after one of these is ignored.
pub const RESULT_TOKENS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

// =========================================================================
// Tokenizing
// =========================================================================

/// Extract the SAN tokens of the main line, in order.
///
/// Tokens are returned as written (annotations such as `+` or `!` are kept);
/// only move numbers are removed.
pub fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    for raw in raw_tokens(text) {
        if raw.starts_with('$') {
            continue;
        }
        if RESULT_TOKENS.contains(&raw) {
            break;
        }
        let san = strip_move_number(raw);
        if !san.is_empty() {
            tokens.push(san);
        }
    }
    tokens
}

/// Split text on whitespace and comment/variation delimiters, dropping
/// everything inside comments, variations and tag pairs.
fn raw_tokens(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start: Option<usize> = None;
    let mut chars = text.char_indices();

    let mut flush = |start: &mut Option<usize>, end: usize, depth: usize| {
        if let Some(s) = start.take()
            && depth == 0
        {
            out.push(&text[s..end]);
        }
    };

    while let Some((i, c)) = chars.next() {
        match c {
            '{' | ';' | '[' => {
                flush(&mut start, i, depth);
                let close = match c {
                    '{' => '}',
                    '[' => ']',
                    _ => '\n',
                };
                // An unterminated comment runs to the end of the text.
                for (_, inner) in chars.by_ref() {
                    if inner == close {
                        break;
                    }
                }
            }
            '(' => {
                flush(&mut start, i, depth);
                depth += 1;
            }
            ')' => {
                flush(&mut start, i, depth);
                depth = depth.saturating_sub(1);
            }
            c if c.is_whitespace() => flush(&mut start, i, depth),
            _ => {
                if start.is_none() {
                    start = Some(i);
                }
            }
        }
    }
    flush(&mut start, text.len(), depth);
    out
}

/// `12.` → ``, `12...e5` → `e5`, `e4` → `e4`. Leading dots with no number
/// are dropped too, so `...e5` → `e5`. Castling written with zeros (`0-0`)
/// has no dot and is left alone.
fn strip_move_number(token: &str) -> &str {
    let digits = token.len() - token.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    let after_digits = &token[digits..];
    if after_digits.starts_with('.') || digits == 0 {
        after_digits.trim_start_matches('.')
    } else {
        token
    }
}

// =========================================================================
// Move-text queries
// =========================================================================

/// The first `n` half-moves of a game, rewritten as numbered move text.
pub fn first_moves(text: &str, n: usize) -> Result<String, ChessError> {
    let tokens = tokenize(text);
    if tokens.len() < n {
        return Err(ChessError::GameTooShort {
            requested: n,
            available: tokens.len(),
        });
    }
    Ok(format_movetext(&tokens[..n], 1, true, None))
}

/// Does `game` start with the same SAN moves as `opening`?
///
/// Tokens are compared after move-number stripping, so `1.e4 e5` matches
/// `1. e4 e5 2. Nf3`. Check and annotation suffixes must match too.
pub fn has_opening(game: &str, opening: &str) -> Result<bool, ChessError> {
    let game = tokenize(game);
    let opening = tokenize(opening);
    if game.len() < opening.len() {
        return Err(ChessError::GameTooShort {
            requested: opening.len(),
            available: game.len(),
        });
    }
    Ok(game.iter().zip(&opening).all(|(g, o)| g == o))
}

// =========================================================================
// Writing
// =========================================================================

/// Join SAN moves into numbered move text wrapped at 80 columns.
///
/// `first_move` is the full-move number of the first token and `white_first`
/// says who plays it; a Black first move is written `N... san`.
pub fn format_movetext<S: AsRef<str>>(
    sans: &[S],
    first_move: u32,
    white_first: bool,
    result: Option<&str>,
) -> String {
    let mut text = String::with_capacity(sans.len() * 6);
    let mut line_len = 0;
    let mut move_num = first_move;
    let mut white_turn = white_first;

    let mut push = |token: &str, text: &mut String| {
        if line_len > 0 && line_len + token.len() + 1 > 80 {
            text.push('\n');
            line_len = 0;
        } else if line_len > 0 {
            text.push(' ');
            line_len += 1;
        }
        text.push_str(token);
        line_len += token.len();
    };

    for (i, san) in sans.iter().enumerate() {
        let san = san.as_ref();
        let token = if white_turn {
            format!("{move_num}. {san}")
        } else if i == 0 {
            format!("{move_num}... {san}")
        } else {
            san.to_string()
        };
        push(&token, &mut text);

        if !white_turn {
            move_num += 1;
        }
        white_turn = !white_turn;
    }

    if let Some(result) = result {
        push(result, &mut text);
    }
    text
}

// =========================================================================
// Tests
// =========================================================================
