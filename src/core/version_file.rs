//! Version file loading.
//!
//! The version lives in a Python source file as `__version__ = "x.y.z"`.
//! The file is parsed, never executed: only a plain string literal on the
//! right-hand side of a top-level assignment is accepted.

use regex::Regex;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

const ASSIGNMENT_PATTERN: &str = r"^__version__\s*(?::\s*[A-Za-z_][A-Za-z0-9_.]*\s*)?=\s*(.*)$";

/// Read the version file at `path` and return the `__version__` literal.
pub fn load_version(path: &Path) -> Result<String> {
    let display = path.display().to_string();
    let content = fs::read_to_string(path)
        .map_err(|e| Error::version_load_failed(display.clone(), e.to_string()))?;

    parse_version(&content).map_err(|problem| Error::version_load_failed(display, problem))
}

/// Extract the `__version__` literal from version file content.
///
/// The last top-level assignment wins, matching module-level rebinding.
/// Indented assignments belong to nested blocks and are ignored.
pub fn parse_version(content: &str) -> std::result::Result<String, String> {
    let re = Regex::new(ASSIGNMENT_PATTERN).map_err(|e| e.to_string())?;

    let mut found: Option<std::result::Result<String, String>> = None;
    let mut open: Option<u8> = None;
    for line in content.lines() {
        let continues_string = open.is_some();
        open = scan_line(line.as_bytes(), open);
        if continues_string {
            continue;
        }
        if let Some(caps) = re.captures(line) {
            let rhs = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            found = Some(parse_string_literal(rhs));
        }
    }

    match found {
        None => Err("no top-level __version__ assignment".to_string()),
        Some(Err(problem)) => Err(problem),
        Some(Ok(value)) if value.is_empty() => Err("__version__ is an empty string".to_string()),
        Some(Ok(value)) => Ok(value),
    }
}

/// Track triple-quoted strings across lines.
///
/// `open` is the quote byte of a triple-quoted string still open at the start
/// of the line; the return value is the one still open at its end. Comments
/// and single-line strings are stepped over so their quotes do not count.
fn scan_line(line: &[u8], mut open: Option<u8>) -> Option<u8> {
    let triple_at = |i: usize, q: u8| line.len() >= i + 3 && line[i..i + 3].iter().all(|&b| b == q);

    let mut i = 0;
    while i < line.len() {
        let b = line[i];
        match open {
            Some(q) => {
                if b == b'\\' {
                    i += 2;
                } else if triple_at(i, q) {
                    open = None;
                    i += 3;
                } else {
                    i += 1;
                }
            }
            None => match b {
                b'#' => return None,
                b'"' | b'\'' if triple_at(i, b) => {
                    open = Some(b);
                    i += 3;
                }
                b'"' | b'\'' => {
                    i += 1;
                    while i < line.len() && line[i] != b {
                        i += if line[i] == b'\\' { 2 } else { 1 };
                    }
                    i += 1;
                }
                _ => i += 1,
            },
        }
    }
    open
}

/// Parse a single- or double-quoted literal followed by an optional `;` and comment.
fn parse_string_literal(rhs: &str) -> std::result::Result<String, String> {
    let rhs = rhs.trim();
    let quote = match rhs.chars().next() {
        Some(q @ ('"' | '\'')) => q,
        _ => return Err(format!("__version__ is not a string literal: {}", rhs)),
    };

    if rhs.starts_with(&format!("{q}{q}{q}", q = quote)) {
        return Err("triple-quoted __version__ is not supported".to_string());
    }

    let body = &rhs[1..];
    let end = body
        .find(quote)
        .ok_or_else(|| format!("unterminated string literal: {}", rhs))?;
    let value = &body[..end];

    if value.contains('\\') {
        return Err("escape sequences are not supported in __version__".to_string());
    }

    let rest = body[end + 1..].trim_start();
    let rest = rest.strip_prefix(';').unwrap_or(rest).trim();
    if !rest.is_empty() && !rest.starts_with('#') {
        return Err(format!("__version__ is not a plain string literal: {}", rhs));
    }

    Ok(value.to_string())
}
