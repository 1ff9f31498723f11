//! Pattern compilation
//!
//! snip compiles the user's expression exactly once, up front, and reuses the
//! compiled matcher across every record of every source. The four global
//! regex switches are not passed to the engine as builder options; they are
//! assembled into a single inline modifier group (e.g. `(?is)`) and prepended
//! to the expression text, the same way a user could write them by hand.

use regex::bytes::Regex;

use crate::error::{Result, SnipError};

/// The four independent regex switches exposed on the command line.
///
/// `multiline` does double duty: it turns on the engine's `m` flag (so `^`
/// and `$` keep matching at internal line boundaries) and it switches the
/// scanner into whole-buffer mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegexFlags {
    /// `-i`: case insensitive
    pub case_insensitive: bool,
    /// `-m`: multiline anchors + whole-buffer scanning
    pub multiline: bool,
    /// `-s`: let `.` match `\n`
    pub dot_matches_newline: bool,
    /// `-U`: swap the meaning of `x*` and `x*?`, `x+` and `x+?`
    pub ungreedy: bool,
}

impl RegexFlags {
    /// Render the inline modifier group, or an empty string when no flag is
    /// set (an empty `(?)` group is a syntax error).
    pub fn inline_prefix(&self) -> String {
        let mut letters = String::new();
        for (enabled, letter) in [
            (self.case_insensitive, 'i'),
            (self.multiline, 'm'),
            (self.dot_matches_newline, 's'),
            (self.ungreedy, 'U'),
        ] {
            if enabled {
                letters.push(letter);
            }
        }
        if letters.is_empty() {
            String::new()
        } else {
            format!("(?{letters})")
        }
    }
}

/// Compile `pattern` with `flags` into a byte-oriented matcher.
///
/// Input data is treated as opaque bytes, so the matcher is a
/// `regex::bytes::Regex`; it never requires records to be valid UTF-8.
pub fn compile(pattern: Option<&str>, flags: RegexFlags) -> Result<Regex> {
    let pattern = pattern.ok_or(SnipError::MissingPattern)?;
    let prefixed = format!("{}{}", flags.inline_prefix(), pattern);
    Regex::new(&prefixed).map_err(|source| SnipError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}
