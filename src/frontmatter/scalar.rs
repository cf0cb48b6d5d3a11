use crate::metadata::FieldValue;

/// Reads an inline value (the part after `key:`).
pub(super) fn parse_scalar(raw: &str) -> FieldValue {
    let raw = raw.trim();
    if let Some(s) = unquote(raw) {
        return FieldValue::Text(s);
    }
    match raw {
        "true" | "True" | "TRUE" => return FieldValue::Bool(true),
        "false" | "False" | "FALSE" => return FieldValue::Bool(false),
        _ => {}
    }
    if let Some(inner) = raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        return FieldValue::List(split_flow(inner));
    }
    FieldValue::Text(raw.to_string())
}

pub(super) fn is_item(line: &str) -> bool {
    let t = line.trim_start();
    t == "-" || t.starts_with("- ")
}

/// Reads a `- item` line.
pub(super) fn parse_item(line: &str) -> String {
    let t = line.trim_start();
    let v = t.strip_prefix('-').unwrap_or(t).trim();
    unquote(v).unwrap_or_else(|| v.to_string())
}

/// Plain form when it reads back as the same text, double-quoted otherwise.
pub(super) fn render_text(value: &str) -> String {
    if needs_quotes(value, |v| parse_scalar(v) == FieldValue::Text(v.to_string())) {
        quote(value)
    } else {
        value.to_string()
    }
}

pub(super) fn render_item(value: &str) -> String {
    if needs_quotes(value, |v| parse_item(&format!("- {v}")) == v) {
        quote(value)
    } else {
        value.to_string()
    }
}

fn needs_quotes(value: &str, reads_back: impl Fn(&str) -> bool) -> bool {
    value.is_empty() || value.contains(['\n', '\r']) || !reads_back(value)
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn unquote(raw: &str) -> Option<String> {
    if raw.len() < 2 {
        return None;
    }
    if let Some(inner) = raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')) {
        Some(unescape(inner))
    } else {
        raw.strip_prefix('\'')
            .and_then(|r| r.strip_suffix('\''))
            .map(|inner| inner.replace("''", "'"))
    }
}

fn unescape(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Splits the inside of `[a, "b, c"]` on commas outside quotes.
fn split_flow(inner: &str) -> Vec<String> {
    let mut items = vec![];
    let mut current = String::new();
    let mut quote_char: Option<char> = None;
    for c in inner.chars() {
        match (quote_char, c) {
            (None, '"' | '\'') => {
                quote_char = Some(c);
                current.push(c);
            }
            (Some(q), c) if c == q => {
                quote_char = None;
                current.push(c);
            }
            (None, ',') => items.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    items.push(current);

    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| unquote(s).unwrap_or_else(|| s.to_string()))
        .collect()
}
