//! External scanner for context-sensitive tokens
//!
//! Logos handles the regular part of the token set. Everything that depends
//! on where we are (inside a string, inside an interpolation, how deep the
//! braces nest) or that logos cannot express (Unicode identifiers, comments
//! that may run to end of input) goes through [`scan`], which keeps its
//! state in an explicit [`ScanState`] owned by the caller.

use unicode_ident::{is_xid_continue, is_xid_start};

use super::syntax_kind::SyntaxKind;

/// Maximum number of bytes past a token's end that lexing it may inspect.
///
/// The incremental re-lexer relies on this: a token ending more than this
/// many bytes before an edit cannot change because of it.
pub const MAX_LOOKAHEAD: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Frame {
    /// Between `"` and `"`
    String,
    /// Between `${` and its closing `}`, with the count of open `{`
    Interpolation { depth: u32 },
}

/// Lexer mode stack. The empty stack is top-level code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ScanState {
    frames: Vec<Frame>,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True at top level: not inside any string or interpolation
    pub fn is_top_level(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn in_string(&self) -> bool {
        matches!(self.frames.last(), Some(Frame::String))
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

/// Scan one context-sensitive token at `offset`.
///
/// Returns the kind and byte length, or `None` when the regular lexer
/// should take over. Never called at end of input.
pub(crate) fn scan(input: &str, offset: usize, state: &mut ScanState) -> Option<(SyntaxKind, usize)> {
    let rest = &input[offset..];
    if state.in_string() {
        return Some(scan_string_piece(rest, state));
    }

    let bytes = rest.as_bytes();
    match bytes[0] {
        b'"' => {
            state.frames.push(Frame::String);
            Some((SyntaxKind::STRING_START, 1))
        }
        b'{' => {
            if let Some(Frame::Interpolation { depth }) = state.frames.last_mut() {
                *depth += 1;
            }
            Some((SyntaxKind::L_BRACE, 1))
        }
        b'}' => match state.frames.last_mut() {
            Some(Frame::Interpolation { depth: 0 }) => {
                state.frames.pop();
                Some((SyntaxKind::INTERPOLATION_END, 1))
            }
            Some(Frame::Interpolation { depth }) => {
                *depth -= 1;
                Some((SyntaxKind::R_BRACE, 1))
            }
            _ => Some((SyntaxKind::R_BRACE, 1)),
        },
        b'/' if rest.starts_with("//") => {
            let len = rest.find('\n').unwrap_or(rest.len());
            Some((SyntaxKind::LINE_COMMENT, len))
        }
        b'/' if rest.starts_with("/*") => {
            // Unterminated comments run to end of input
            let len = rest[2..].find("*/").map(|end| end + 4).unwrap_or(rest.len());
            Some((SyntaxKind::BLOCK_COMMENT, len))
        }
        b'0'..=b'9' => Some((SyntaxKind::NUMBER, number_len(bytes))),
        byte if byte >= 0x80 => {
            let first = rest.chars().next()?;
            if is_xid_start(first) {
                Some((SyntaxKind::IDENT, first.len_utf8() + ident_continue_len(&rest[first.len_utf8()..])))
            } else {
                Some((SyntaxKind::ERROR, first.len_utf8()))
            }
        }
        _ => None,
    }
}

/// Length of identifier-continue characters at the start of `rest`.
///
/// The regular lexer only knows ASCII identifiers, so it uses this to
/// extend an identifier (or keyword) followed by non-ASCII letters.
pub(crate) fn ident_continue_len(rest: &str) -> usize {
    rest.char_indices()
        .find(|&(_, c)| !is_xid_continue(c))
        .map(|(index, _)| index)
        .unwrap_or(rest.len())
}

fn scan_string_piece(rest: &str, state: &mut ScanState) -> (SyntaxKind, usize) {
    let bytes = rest.as_bytes();
    match bytes[0] {
        b'"' => {
            state.frames.pop();
            (SyntaxKind::STRING_END, 1)
        }
        b'\\' => {
            let escaped = rest[1..].chars().next().map(char::len_utf8).unwrap_or(0);
            (SyntaxKind::ESCAPE_SEQUENCE, 1 + escaped)
        }
        b'$' if bytes.get(1) == Some(&b'{') => {
            state.frames.push(Frame::Interpolation { depth: 0 });
            (SyntaxKind::INTERPOLATION_START, 2)
        }
        _ => {
            let mut len = 1;
            while len < bytes.len() {
                match bytes[len] {
                    b'"' | b'\\' => break,
                    b'$' if bytes.get(len + 1) == Some(&b'{') => break,
                    _ => len += 1,
                }
            }
            // Content may contain multi-byte characters; stop on a boundary
            while !rest.is_char_boundary(len) {
                len += 1;
            }
            (SyntaxKind::STRING_CONTENT, len)
        }
    }
}

fn number_len(bytes: &[u8]) -> usize {
    let mut len = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if bytes.get(len) == Some(&b'.') && bytes.get(len + 1).is_some_and(u8::is_ascii_digit) {
        len += 1;
        len += bytes[len..].iter().take_while(|b| b.is_ascii_digit()).count();
    }
    len
}
