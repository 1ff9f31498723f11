//! Command-line surface
//!
//! Thin glue around the engine: clap parses and validates the arguments,
//! and `parse_args` folds them together with the configuration file into
//! the single immutable `RunConfig` the engine consumes. No flag state
//! leaks past this module.

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::{Result, SnipError};
use crate::pattern::RegexFlags;
use crate::scanner::RunConfig;
use crate::transform::Command;

const LONG_ABOUT: &str = "snip, cut, trim, chop: a lovechild of grep and sed.

One pattern language, one scanning discipline, three commands: filter records
that match (or don't), rewrite every match in place, or split records into
fields and pick some out. Input is one or more files, a directory tree with
--recursive, or standard input when no paths are given.

By default each line of input is one record. With -m the entire input is a
single record, so patterns can span line boundaries and a replacement can
restructure the whole document.

EXAMPLES:
  snip match 'error' server.log            Lines containing 'error'
  snip m -v 'debug' server.log             Lines NOT containing 'debug'
  snip m -o '[0-9]+' server.log            Only the matched digits
  snip -r match 'TODO' src/                Search a directory tree
  snip replace 'fo(o+)' 'f$1' file.txt     Replace with a capture group
  snip -m s '\\n+' '\\n' doc.txt            Squeeze blank lines (whole buffer)
  cat data.csv | snip split ',' -f 1,3     Fields 1 and 3 of each line";

#[derive(Parser)]
#[command(name = "snip")]
#[command(about = "snip, cut, trim, chop: a lovechild of grep and sed")]
#[command(long_about = LONG_ABOUT)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(propagate_version = true)]
struct Cli {
    /// Case insensitive matching
    #[arg(short = 'i', long = "insensitive", global = true)]
    insensitive: bool,

    /// Multiline: treat the whole input as one record; ^ and $ match at
    /// line boundaries inside it
    #[arg(short = 'm', long = "multiline", global = true)]
    multiline: bool,

    /// Let . match \n
    #[arg(short = 's', long = "dotall", global = true)]
    dotall: bool,

    /// Swap the meaning of x* and x*?, x+ and x+?
    #[arg(short = 'U', long = "ungreedy", global = true)]
    ungreedy: bool,

    /// Recurse into directory arguments
    #[arg(short = 'r', long = "recursive", global = true)]
    recursive: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Print records matching the pattern
    #[command(alias = "m")]
    Match {
        /// Regular expression to match
        #[arg(value_name = "PATTERN")]
        pattern: String,

        /// Files or directories to scan (stdin when omitted)
        #[arg(value_name = "PATH")]
        paths: Vec<String>,

        /// Invert: print records that do NOT match
        #[arg(short = 'v', long)]
        invert: bool,

        /// Print only the matched substrings, not the whole record
        #[arg(short = 'o', long = "only-matching")]
        only_matching: bool,

        /// Never prefix output with file names
        #[arg(short = 'n', long = "no-filenames")]
        no_filenames: bool,
    },

    /// Replace every match with a template (capture groups via $1, $name)
    #[command(alias = "s")]
    Replace {
        /// Regular expression to replace
        #[arg(value_name = "PATTERN")]
        pattern: String,

        /// Replacement template
        #[arg(value_name = "REPLACEMENT")]
        replacement: String,

        /// Files or directories to scan (stdin when omitted)
        #[arg(value_name = "PATH")]
        paths: Vec<String>,
    },

    /// Split records on the pattern and print selected fields
    #[command(alias = "c")]
    Split {
        /// Regular expression to split on
        #[arg(value_name = "PATTERN")]
        pattern: String,

        /// Files or directories to scan (stdin when omitted)
        #[arg(value_name = "PATH")]
        paths: Vec<String>,

        /// Fields to output, 1-indexed, comma separated (e.g. 1,3)
        #[arg(short = 'f', long, value_name = "FIELDS")]
        fields: String,
    },
}

/// Parse the process arguments and merge them with the loaded configuration
/// into the run configuration. Exits the process on usage errors (clap's
/// behavior); returns `ConfigError` for values clap cannot judge, like a
/// malformed field list.
pub fn parse_args(config: &Config) -> Result<RunConfig> {
    let cli = Cli::parse();
    build_run_config(cli, config)
}

fn build_run_config(cli: Cli, config: &Config) -> Result<RunConfig> {
    let flags = config.apply_defaults(RegexFlags {
        case_insensitive: cli.insensitive,
        multiline: cli.multiline,
        dot_matches_newline: cli.dotall,
        ungreedy: cli.ungreedy,
    });

    let (pattern, paths, command) = match cli.command {
        CliCommand::Match {
            pattern,
            paths,
            invert,
            only_matching,
            no_filenames,
        } => (
            pattern,
            paths,
            Command::Match {
                invert,
                only_matching,
                suppress_filenames: no_filenames,
            },
        ),
        CliCommand::Replace {
            pattern,
            replacement,
            paths,
        } => (pattern, paths, Command::Replace { replacement }),
        CliCommand::Split {
            pattern,
            paths,
            fields,
        } => (pattern, paths, Command::Split {
            fields: parse_fields(&fields)?,
        }),
    };

    Ok(RunConfig {
        pattern,
        paths,
        flags,
        recursive: cli.recursive,
        command,
        separator: config.output.separator.clone(),
    })
}

/// Convert the user's 1-indexed comma-separated field list to zero-based
/// indices, preserving order and duplicates.
pub fn parse_fields(spec: &str) -> Result<Vec<usize>> {
    spec.split(',')
        .map(|raw| {
            let raw = raw.trim();
            match raw.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(n - 1),
                _ => Err(SnipError::Config(format!("invalid field value `{raw}`"))),
            }
        })
        .collect()
}
