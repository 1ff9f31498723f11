//! Record transformers
//!
//! Match, replace, and split share one scan loop and differ only in how a
//! single record maps to output records. That mapping lives here: a
//! `Transformer` is selected once at startup and its `transform` method is
//! invoked for every record of every source.

use regex::bytes::Regex;

use crate::error::{Result, SnipError};

/// The command selected on the command line, before the pattern is attached.
///
/// Parameters are already validated and normalized by the CLI layer (fields
/// are zero-based here), except for the invert/only-matching combination,
/// which is rejected when the transformer is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Match {
        invert: bool,
        only_matching: bool,
        /// `-n`: never prefix output with the source name.
        suppress_filenames: bool,
    },
    Replace {
        replacement: String,
    },
    Split {
        /// Zero-based field indices, in requested order, duplicates allowed.
        fields: Vec<usize>,
    },
}

/// A compiled command: the pattern plus the record-to-records mapping.
#[derive(Debug)]
pub enum Transformer {
    Match {
        regex: Regex,
        invert: bool,
        only_matching: bool,
        show_filenames: bool,
    },
    Replace {
        regex: Regex,
        replacement: Vec<u8>,
    },
    Split {
        regex: Regex,
        fields: Vec<usize>,
        separator: Vec<u8>,
    },
}

impl Transformer {
    /// Bind a command to its compiled pattern.
    ///
    /// `source_count` resolves filename display: names are shown only when
    /// more than one source is being scanned and `-n` was not given.
    /// `separator` joins the selected fields of the split command.
    pub fn build(
        regex: Regex,
        command: Command,
        source_count: usize,
        separator: &str,
    ) -> Result<Self> {
        match command {
            Command::Match {
                invert,
                only_matching,
                suppress_filenames,
            } => {
                if invert && only_matching {
                    return Err(SnipError::Config(
                        "incompatible flags: --invert and --only-matching".to_string(),
                    ));
                }
                Ok(Transformer::Match {
                    regex,
                    invert,
                    only_matching,
                    show_filenames: !suppress_filenames && source_count > 1,
                })
            }
            Command::Replace { replacement } => Ok(Transformer::Replace {
                regex,
                replacement: replacement.into_bytes(),
            }),
            Command::Split { fields } => Ok(Transformer::Split {
                regex,
                fields,
                separator: separator.as_bytes().to_vec(),
            }),
        }
    }

    /// Map one input record to zero or more output records.
    pub fn transform(&self, record: &[u8], source_name: Option<&str>) -> Vec<Vec<u8>> {
        match self {
            Transformer::Match {
                regex,
                invert,
                only_matching,
                show_filenames,
            } => {
                let prefix = match (show_filenames, source_name) {
                    (true, Some(name)) => Some(name),
                    _ => None,
                };
                if *only_matching {
                    regex
                        .find_iter(record)
                        .map(|m| prefixed(prefix, m.as_bytes()))
                        .collect()
                } else if regex.is_match(record) != *invert {
                    vec![prefixed(prefix, record)]
                } else {
                    Vec::new()
                }
            }
            Transformer::Replace { regex, replacement } => {
                vec![regex.replace_all(record, replacement.as_slice()).into_owned()]
            }
            Transformer::Split {
                regex,
                fields,
                separator,
            } => {
                let parts: Vec<&[u8]> = regex.split(record).collect();
                let mut joined = Vec::new();
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        joined.extend_from_slice(separator);
                    }
                    if let Some(part) = parts.get(*field) {
                        joined.extend_from_slice(part);
                    }
                }
                vec![joined]
            }
        }
    }
}

fn prefixed(name: Option<&str>, body: &[u8]) -> Vec<u8> {
    match name {
        Some(name) => {
            let mut out = Vec::with_capacity(name.len() + 2 + body.len());
            out.extend_from_slice(name.as_bytes());
            out.extend_from_slice(b": ");
            out.extend_from_slice(body);
            out
        }
        None => body.to_vec(),
    }
}
