//! Brace expansion for pattern lines
//!
//! `src/{api,web}/**/*.go` expands to one pattern per alternative before
//! matching. Groups nest; a group without a top-level comma is literal.

/// Expands every brace group in `pattern`
///
/// Alternatives are produced left to right; duplicates are removed while
/// keeping first occurrence order.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let mut out = Vec::new();
    expand_into(pattern, 0, &mut out);

    let mut seen = std::collections::HashSet::new();
    out.retain(|p| seen.insert(p.clone()));
    out
}

fn expand_into(pattern: &str, search_from: usize, out: &mut Vec<String>) {
    let Some((open, close)) = find_group(pattern, search_from) else {
        out.push(pattern.to_string());
        return;
    };

    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];
    for alternative in split_alternatives(&pattern[open + 1..close]) {
        let candidate = format!("{prefix}{alternative}{suffix}");
        // Everything before the group is already literal
        expand_into(&candidate, prefix.len(), out);
    }
}

/// Finds the first balanced `{...}` group at or after `from` that contains
/// a top-level comma, returning the byte offsets of its braces.
fn find_group(pattern: &str, from: usize) -> Option<(usize, usize)> {
    let bytes = pattern.as_bytes();
    let mut start = from;

    while start < bytes.len() {
        let open = start + pattern[start..].find('{')?;
        let mut depth = 0usize;
        let mut has_comma = false;
        let mut close = None;

        for (offset, byte) in bytes[open..].iter().enumerate() {
            match byte {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(open + offset);
                        break;
                    }
                }
                b',' if depth == 1 => has_comma = true,
                _ => {}
            }
        }

        match close {
            Some(close) if has_comma => return Some((open, close)),
            // Literal group: look for groups nested inside it
            Some(_) => start = open + 1,
            None => return None,
        }
    }
    None
}

fn split_alternatives(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut last = 0;

    for (i, byte) in body.bytes().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                parts.push(&body[last..i]);
                last = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[last..]);
    parts
}
