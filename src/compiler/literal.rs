//! Rendering of configuration values as script literals.
//!
//! Formatting is fixed so that output is byte-reproducible:
//! - booleans → `True` / `False`, null → `None`
//! - integers → decimal
//! - floats → shortest round-trip decimal, `.0` appended when integral
//! - strings → single-quoted with `\`, `'` and control characters escaped
//! - lists → `[a, b]`, mappings → `{'k': v}`
//!
//! Free text that ends up in a `#` comment goes through `comment`, which
//! escapes line breaks so the text cannot leave the comment.

use serde_json::{Number, Value};

pub fn boolean(b: bool) -> &'static str {
    if b {
        "True"
    } else {
        "False"
    }
}

pub fn integer(i: i64) -> String {
    i.to_string()
}

pub fn float(f: f64) -> String {
    if !f.is_finite() {
        return if f.is_nan() {
            "float('nan')".to_string()
        } else if f > 0.0 {
            "float('inf')".to_string()
        } else {
            "float('-inf')".to_string()
        };
    }
    let mut s = f.to_string();
    if !s.contains(['.', 'e', 'E']) {
        s.push_str(".0");
    }
    s
}

/// Numbers keep their written kind: `15` stays `15`, `0.5` stays `0.5`.
pub fn number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        integer(i)
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        float(n.as_f64().unwrap_or(0.0))
    }
}

fn push_control(out: &mut String, c: char) {
    match c {
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        c => out.push_str(&format!("\\x{:02x}", c as u32)),
    }
}

pub fn string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            c if c.is_control() => push_control(&mut out, c),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Single-line comment text. Tabs are kept, other control characters
/// (`\n`, `\r` included) are written as escapes.
pub fn comment(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\t' => out.push(c),
            c if c.is_control() => push_control(&mut out, c),
            c => out.push(c),
        }
    }
    out
}

pub fn value(v: &Value) -> String {
    match v {
        Value::Null => "None".to_string(),
        Value::Bool(b) => boolean(*b).to_string(),
        Value::Number(n) => number(n),
        Value::String(s) => string(s),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(value).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::Object(map) => {
            let parts: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", string(k), value(v)))
                .collect();
            format!("{{{}}}", parts.join(", "))
        }
    }
}

/// A numeric pair such as a crop scale range, rendered as a tuple.
pub fn tuple(items: &[Value]) -> String {
    let parts: Vec<String> = items.iter().map(value).collect();
    if parts.len() == 1 {
        format!("({},)", parts[0])
    } else {
        format!("({})", parts.join(", "))
    }
}
