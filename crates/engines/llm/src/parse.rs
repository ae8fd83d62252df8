//! Best-effort extraction of a choice from free-form model output.
//!
//! Strategies, in order, each accepted only if the value is legal:
//! 1. an explicit marker such as `ACTION: 3`, `BET = 7` or `Answer: **2**`
//! 2. a bold number, `**5**`
//! 3. the last standalone integer in the reply
//!
//! Reasoning models wrap their scratch work in `<think>...</think>`; closed
//! think blocks are removed before anything else.

const MARKERS: [&str; 5] = ["answer", "action", "bet", "choice", "final"];

/// Recover a legal choice in `0..num_actions`, or `None`.
pub fn parse_choice(text: &str, num_actions: usize) -> Option<i64> {
    let text = strip_think_blocks(text);
    let legal = |v: &i64| *v >= 0 && (*v as u64) < num_actions as u64;

    marker_value(&text)
        .filter(legal)
        .or_else(|| bold_value(&text).filter(legal))
        .or_else(|| integers(&text).last().map(|n| n.value).filter(legal))
}

/// Remove every closed `<think>...</think>` block. An unclosed block is left
/// alone so a truncated reply can still be parsed.
pub fn strip_think_blocks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("<think>") {
        match rest[start..].find("</think>") {
            Some(end) => {
                out.push_str(&rest[..start]);
                rest = &rest[start + end + "</think>".len()..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Number {
    start: usize,
    end: usize,
    value: i64,
}

/// Standalone integers: not glued to letters or other digits (`r1`, `v2`
/// and `3b` are skipped). A leading `-` is kept when it is not a hyphen
/// inside a word.
fn integers(text: &str) -> Vec<Number> {
    let bytes = text.as_bytes();
    let mut numbers = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let digits_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        let end = i;

        let before = digits_start.checked_sub(1).map(|j| bytes[j]);
        let after = bytes.get(end).copied();
        if before.is_some_and(|b| b.is_ascii_alphabetic())
            || after.is_some_and(|b| b.is_ascii_alphabetic())
        {
            continue;
        }
        // "1.5" is not a choice
        if after == Some(b'.') && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) {
            continue;
        }
        if before == Some(b'.') && digits_start >= 2 && bytes[digits_start - 2].is_ascii_digit() {
            continue;
        }

        let negative = before == Some(b'-')
            && (digits_start < 2 || !bytes[digits_start - 2].is_ascii_alphanumeric());
        let start = if negative { digits_start - 1 } else { digits_start };

        if let Ok(value) = text[start..end].parse::<i64>() {
            numbers.push(Number { start, end, value });
        }
    }
    numbers
}

/// Value following the last marker keyword, e.g. `action: **3**`.
fn marker_value(text: &str) -> Option<i64> {
    let lower = text.to_ascii_lowercase();
    let numbers = integers(text);

    let mut best: Option<(usize, i64)> = None;
    for marker in MARKERS {
        for (pos, _) in lower.match_indices(marker) {
            let bytes = lower.as_bytes();
            // whole words only: "alphabet 3" has no marker
            if pos > 0 && bytes[pos - 1].is_ascii_alphanumeric() {
                continue;
            }
            let mut cursor = pos + marker.len();
            while cursor < bytes.len() && b" \t:=*#`'\"".contains(&bytes[cursor]) {
                cursor += 1;
            }
            if let Some(n) = numbers.iter().find(|n| n.start == cursor) {
                if best.map_or(true, |(p, _)| pos > p) {
                    best = Some((pos, n.value));
                }
            }
        }
    }
    best.map(|(_, value)| value)
}

/// Last `**n**` in the text.
fn bold_value(text: &str) -> Option<i64> {
    integers(text)
        .into_iter()
        .rev()
        .find(|n| {
            n.start >= 2
                && text.get(n.start - 2..n.start) == Some("**")
                && text.get(n.end..n.end + 2) == Some("**")
        })
        .map(|n| n.value)
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod parse_tests;
