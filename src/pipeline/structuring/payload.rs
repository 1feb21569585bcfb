//! Locate the JSON object inside free-form model output.
//!
//! Models wrap their answer in prose, code fences, or stop mid-object when
//! they hit a token limit. The scanner below is a small explicit state
//! machine over the bytes of the response: string context, escape state and
//! brace depth. All delimiters are ASCII, so byte offsets always land on
//! UTF-8 character boundaries.

const OPEN: u8 = b'{';
const CLOSE: u8 = b'}';
const QUOTE: u8 = b'"';
const BACKSLASH: u8 = b'\\';

/// How the payload span was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// A balanced object starting at the first `{`.
    Balanced,
    /// Depth never returned to zero: first `{` through last `}`.
    Fallback,
    /// Nothing to extract; the input is returned as is.
    Unchanged,
}

impl PayloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadKind::Balanced => "balanced",
            PayloadKind::Fallback => "fallback",
            PayloadKind::Unchanged => "unchanged",
        }
    }
}

/// A candidate payload borrowed from the raw response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadSpan<'a> {
    pub text: &'a str,
    pub kind: PayloadKind,
}

impl<'a> PayloadSpan<'a> {
    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// No balanced object was found.
    pub fn is_ambiguous(&self) -> bool {
        self.kind != PayloadKind::Balanced
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Structural,
    /// A backslash was seen outside a string; the next quote is not a toggle.
    StructuralEscape,
    InString,
    InStringEscape,
}

/// Step result for one byte of input.
enum Step {
    Continue(ScanState, usize),
    Closed,
}

fn step(state: ScanState, depth: usize, byte: u8) -> Step {
    match state {
        ScanState::Structural | ScanState::StructuralEscape => {
            let escaped = state == ScanState::StructuralEscape;
            match byte {
                QUOTE if !escaped => Step::Continue(ScanState::InString, depth),
                BACKSLASH if !escaped => Step::Continue(ScanState::StructuralEscape, depth),
                OPEN => Step::Continue(ScanState::Structural, depth + 1),
                CLOSE => match depth {
                    0 | 1 => Step::Closed,
                    d => Step::Continue(ScanState::Structural, d - 1),
                },
                _ => Step::Continue(ScanState::Structural, depth),
            }
        }
        ScanState::InString => match byte {
            QUOTE => Step::Continue(ScanState::Structural, depth),
            BACKSLASH => Step::Continue(ScanState::InStringEscape, depth),
            _ => Step::Continue(ScanState::InString, depth),
        },
        ScanState::InStringEscape => Step::Continue(ScanState::InString, depth),
    }
}

/// Find the first balanced object in `text`, falling back to the widest
/// brace span when the object is truncated. Never fails.
pub fn extract_payload(text: &str) -> PayloadSpan<'_> {
    let Some(start) = text.find('{') else {
        return PayloadSpan {
            text,
            kind: PayloadKind::Unchanged,
        };
    };

    let bytes = text.as_bytes();
    let mut state = ScanState::Structural;
    let mut depth = 0usize;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        match step(state, depth, byte) {
            Step::Closed => {
                let end = start + offset;
                return PayloadSpan {
                    text: &text[start..=end],
                    kind: PayloadKind::Balanced,
                };
            }
            Step::Continue(next, d) => {
                state = next;
                depth = d;
            }
        }
    }

    match text.rfind('}') {
        Some(end) if end > start => PayloadSpan {
            text: &text[start..=end],
            kind: PayloadKind::Fallback,
        },
        _ => PayloadSpan {
            text,
            kind: PayloadKind::Unchanged,
        },
    }
}

/// Convenience wrapper returning only the candidate text.
pub fn extract(text: &str) -> &str {
    extract_payload(text).text
}
