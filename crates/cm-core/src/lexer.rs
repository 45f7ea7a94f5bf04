//! Statement splitter for migration scripts.
//!
//! This is not a CQL parser. It only knows enough to cut a script into the
//! statements the store executes one at a time:
//!
//! - statements end at `;`
//! - `--` and `//` start a comment that runs to the end of the line
//! - `/*` block comments are rejected with
//!   [`CoreError::UnsupportedBlockComment`] rather than guessed at
//!
//! Quotes are not tracked, so a `--` or `//` inside a string literal is still
//! treated as a comment.

use crate::error::{CoreError, CoreResult};

/// Lazy iterator over the trimmed statements of a script.
///
/// Whitespace follows the Unicode `White_Space` property, which covers NBSP,
/// NEL and the line/paragraph separators. Empty statements (`;;`) are yielded
/// as empty strings; callers decide whether to skip them.
///
/// The iterator is `Clone`, so a copy taken before iteration replays the same
/// sequence from the start. After yielding an error it is exhausted.
#[derive(Debug, Clone)]
pub struct StatementSplitter<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    done: bool,
}

impl<'a> StatementSplitter<'a> {
    /// Create a splitter over `input`.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            done: false,
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Discard everything up to and including the next newline, or to the end
    /// of input when the comment is on the last line.
    fn skip_line_comment(&mut self) {
        while let Some(c) = self.bump() {
            if c == '\n' {
                break;
            }
        }
    }
}

impl Iterator for StatementSplitter<'_> {
    type Item = CoreResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        self.skip_whitespace();

        let mut statement = String::new();
        while let Some(c) = self.peek() {
            match (c, self.peek_second()) {
                ('/', Some('/')) | ('-', Some('-')) => self.skip_line_comment(),
                ('/', Some('*')) => {
                    self.done = true;
                    return Some(Err(CoreError::UnsupportedBlockComment { line: self.line }));
                }
                (';', _) => {
                    self.bump();
                    return Some(Ok(statement.trim().to_string()));
                }
                _ => {
                    statement.push(c);
                    self.bump();
                }
            }
        }

        // End of input: emit whatever is left unless it was only comments.
        self.done = true;
        let trailing = statement.trim();
        if trailing.is_empty() {
            None
        } else {
            Some(Ok(trailing.to_string()))
        }
    }
}

/// Split a whole script eagerly, failing on the first unsupported construct.
pub fn split_statements(input: &str) -> CoreResult<Vec<String>> {
    StatementSplitter::new(input).collect()
}

#[cfg(test)]
#[path = "lexer_test.rs"]
mod tests;
