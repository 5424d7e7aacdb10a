// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! POSIX shell quoting
//!
//! Every string is written as a single-quoted word. Inside single quotes the
//! shell takes every byte literally, so the only character that needs care is
//! the quote itself, which is closed, escaped, and reopened (`'\''`).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnquoteError {
    #[error("unterminated single quote")]
    Unterminated,
    #[error("backslash at end of input")]
    DanglingEscape,
    #[error("unexpected {found:?} at byte {offset}")]
    Unexpected { found: char, offset: usize },
}

/// Quote `s` so that `sh` reads it back as exactly one word equal to `s`
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if c == '\'' {
            out.push_str("'\\''");
        } else {
            out.push(c);
        }
    }
    out.push('\'');
    out
}

/// Inverse of [`quote`]
///
/// Accepts any concatenation of single-quoted segments and backslash-escaped
/// characters, which is the subset of shell word syntax `quote` produces.
pub fn unquote(word: &str) -> Result<String, UnquoteError> {
    let mut out = String::with_capacity(word.len());
    let mut chars = word.char_indices();

    while let Some((offset, c)) = chars.next() {
        match c {
            '\'' => loop {
                match chars.next() {
                    Some((_, '\'')) => break,
                    Some((_, inner)) => out.push(inner),
                    None => return Err(UnquoteError::Unterminated),
                }
            },
            '\\' => match chars.next() {
                Some((_, escaped)) => out.push(escaped),
                None => return Err(UnquoteError::DanglingEscape),
            },
            found => return Err(UnquoteError::Unexpected { found, offset }),
        }
    }

    Ok(out)
}

#[cfg(test)]
#[path = "shell_tests.rs"]
mod tests;
