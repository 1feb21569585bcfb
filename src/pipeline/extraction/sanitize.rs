/// Clean extracted text before it reaches the prompt.
/// Strips control and invisible formatting characters, maps non-breaking
/// spaces to plain spaces, collapses runs of blanks, trims every line and
/// drops empty lines.
pub fn sanitize_extracted_text(raw: &str) -> String {
    raw.lines()
        .map(sanitize_line)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Single-line variant used for paragraph text.
pub fn sanitize_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut pending_space = false;

    for c in line.chars() {
        if is_invisible(c) {
            continue;
        }
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if c.is_control() {
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }
    out
}

fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}' // Soft hyphen
            | '\u{200B}'..='\u{200F}' // Zero-width space/joiners, LRM/RLM
            | '\u{202A}'..='\u{202E}' // Bidi embedding and override
            | '\u{2060}'..='\u{2064}' // Word joiner, invisible operators
            | '\u{FEFF}' // BOM
    )
}
