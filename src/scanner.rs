//! Scan dispatch
//!
//! The dispatcher drives the whole run: it walks the enumerated sources in
//! order and, for each one, feeds records to the selected transformer and
//! hands the transformer's output to the writer. Sources are processed
//! strictly sequentially and a single read or write failure aborts the run;
//! output already written stays written.

use std::io::{BufRead, BufReader, BufWriter, Read, Write};

use tracing::{debug, trace};

use crate::error::{Result, SnipError};
use crate::input::{enumerate_inputs, SourceSpec};
use crate::pattern::{compile, RegexFlags};
use crate::transform::{Command, Transformer};

/// How a source is carved into records, chosen once for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// One record per newline-delimited line, delimiter stripped; every
    /// output record gets a trailing newline.
    LineByLine,
    /// The entire source is one record; output is written verbatim, the
    /// transform is responsible for any structure it wants to keep.
    WholeBuffer,
}

impl ScanMode {
    /// The global `-m` switch selects whole-buffer scanning.
    pub fn from_multiline(multiline: bool) -> Self {
        if multiline {
            ScanMode::WholeBuffer
        } else {
            ScanMode::LineByLine
        }
    }
}

/// The immutable per-run configuration, assembled once by the CLI layer.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub pattern: String,
    pub paths: Vec<String>,
    pub flags: RegexFlags,
    pub recursive: bool,
    pub command: Command,
    /// Joins the selected fields of the split command.
    pub separator: String,
}

/// Pure sink for output records. Appends a newline per record only in
/// line-by-line mode and never touches record content.
pub struct OutputWriter<W: Write> {
    inner: BufWriter<W>,
    mode: ScanMode,
}

impl<W: Write> OutputWriter<W> {
    pub fn new(dest: W, mode: ScanMode) -> Self {
        Self {
            inner: BufWriter::new(dest),
            mode,
        }
    }

    pub fn write_record(&mut self, record: &[u8]) -> Result<()> {
        self.inner.write_all(record)?;
        if self.mode == ScanMode::LineByLine {
            self.inner.write_all(b"\n")?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

/// Run a complete transformation: compile the pattern, enumerate the inputs,
/// bind the transformer, and scan every source into `dest`.
pub fn run<W: Write>(config: &RunConfig, dest: W) -> Result<()> {
    let regex = compile(Some(&config.pattern), config.flags)?;
    let sources = enumerate_inputs(&config.paths, config.recursive)?;
    let transformer = Transformer::build(
        regex,
        config.command.clone(),
        sources.len(),
        &config.separator,
    )?;
    let mode = ScanMode::from_multiline(config.flags.multiline);
    scan(&sources, mode, &transformer, dest)
}

/// Scan every source, in order, through `transformer` into `dest`.
///
/// Each source handle is opened immediately before its scan and dropped
/// before the next one is opened, on success and on error alike.
pub fn scan<W: Write>(
    sources: &[SourceSpec],
    mode: ScanMode,
    transformer: &Transformer,
    dest: W,
) -> Result<()> {
    let mut writer = OutputWriter::new(dest, mode);
    for spec in sources {
        let name = spec.display_name();
        debug!(source = name.as_deref().unwrap_or("<stdin>"), "scanning source");
        let reader = spec.open()?;
        scan_source(reader, name.as_deref(), mode, transformer, &mut writer)?;
    }
    writer.flush()
}

fn scan_source<W: Write>(
    mut reader: Box<dyn Read>,
    name: Option<&str>,
    mode: ScanMode,
    transformer: &Transformer,
    writer: &mut OutputWriter<W>,
) -> Result<()> {
    match mode {
        ScanMode::LineByLine => {
            let mut reader = BufReader::new(reader);
            let mut line = Vec::new();
            let mut records = 0usize;
            loop {
                line.clear();
                let n = reader
                    .read_until(b'\n', &mut line)
                    .map_err(|e| SnipError::io(name.map(str::to_string), e))?;
                if n == 0 {
                    break;
                }
                // Strip the delimiter, tolerating CRLF input.
                if line.last() == Some(&b'\n') {
                    line.pop();
                    if line.last() == Some(&b'\r') {
                        line.pop();
                    }
                }
                records += 1;
                for record in transformer.transform(&line, name) {
                    writer.write_record(&record)?;
                }
            }
            trace!(records, "source scanned line by line");
        }
        ScanMode::WholeBuffer => {
            let mut buffer = Vec::new();
            reader
                .read_to_end(&mut buffer)
                .map_err(|e| SnipError::io(name.map(str::to_string), e))?;
            for record in transformer.transform(&buffer, name) {
                writer.write_record(&record)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io;
    use tempfile::TempDir;

    fn run_to_string(config: &RunConfig) -> String {
        let mut out = Vec::new();
        run(config, &mut out).expect("run should succeed");
        String::from_utf8(out).expect("test output should be UTF-8")
    }

    fn match_config(pattern: &str, paths: Vec<String>) -> RunConfig {
        RunConfig {
            pattern: pattern.to_string(),
            paths,
            flags: RegexFlags::default(),
            recursive: false,
            command: Command::Match {
                invert: false,
                only_matching: false,
                suppress_filenames: false,
            },
            separator: ",".to_string(),
        }
    }

    fn write_file(dir: &TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path.display().to_string()
    }

    #[test]
    fn test_line_mode_match_filters_lines() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "input.txt", "foo\nbar\nfoo\n");

        let output = run_to_string(&match_config("foo", vec![path]));
        assert_eq!(output, "foo\nfoo\n");
    }

    #[test]
    fn test_line_mode_inverted_match() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "input.txt", "foo\nbar\nfoo\n");

        let mut config = match_config("foo", vec![path]);
        config.command = Command::Match {
            invert: true,
            only_matching: false,
            suppress_filenames: false,
        };
        assert_eq!(run_to_string(&config), "bar\n");
    }

    #[test]
    fn test_line_mode_handles_missing_trailing_newline() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "input.txt", "foo\nfoo");

        let output = run_to_string(&match_config("foo", vec![path]));
        assert_eq!(output, "foo\nfoo\n", "a final unterminated line is still one record");
    }

    #[test]
    fn test_line_mode_strips_carriage_returns() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "input.txt", "foo\r\nbar\r\n");

        let output = run_to_string(&match_config("foo", vec![path]));
        assert_eq!(output, "foo\n", "CRLF delimiters are stripped from the record");
    }

    #[test]
    fn test_cross_line_pattern_matches_only_in_whole_buffer_mode() {
        let dir = TempDir::new().unwrap();
        let content = "first\nsecond\n";

        let line_path = write_file(&dir, "line.txt", content);
        let line_out = run_to_string(&match_config("first\\nsecond", vec![line_path]));
        assert_eq!(line_out, "", "a pattern spanning lines cannot match single-line records");

        let buf_path = write_file(&dir, "buf.txt", content);
        let mut config = match_config("first\\nsecond", vec![buf_path]);
        config.flags.multiline = true;
        let buf_out = run_to_string(&config);
        assert_eq!(buf_out, content, "whole-buffer mode sees the document as one record");
    }

    #[test]
    fn test_whole_buffer_replace_appends_no_newline() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "doc.txt", "one\ntwo\n");

        let config = RunConfig {
            pattern: "two".to_string(),
            paths: vec![path],
            flags: RegexFlags {
                multiline: true,
                ..Default::default()
            },
            recursive: false,
            command: Command::Replace {
                replacement: "2".to_string(),
            },
            separator: ",".to_string(),
        };
        assert_eq!(
            run_to_string(&config),
            "one\n2\n",
            "whole-buffer output reproduces the document byte-for-byte around the edit"
        );
    }

    #[test]
    fn test_line_mode_replace_scenario() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "input.txt", "xabcx\n");

        let config = RunConfig {
            pattern: "a(b)c".to_string(),
            paths: vec![path],
            flags: RegexFlags::default(),
            recursive: false,
            command: Command::Replace {
                replacement: "$1".to_string(),
            },
            separator: ",".to_string(),
        };
        assert_eq!(run_to_string(&config), "xbx\n");
    }

    #[test]
    fn test_split_scenario() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "input.txt", "a,b,c\n");

        let config = RunConfig {
            pattern: ",".to_string(),
            paths: vec![path],
            flags: RegexFlags::default(),
            recursive: false,
            command: Command::Split { fields: vec![0, 2] },
            separator: ",".to_string(),
        };
        assert_eq!(run_to_string(&config), "a,c\n");
    }

    #[test]
    fn test_multiple_sources_scanned_in_order_with_prefixes() {
        let dir = TempDir::new().unwrap();
        let first = write_file(&dir, "first.txt", "foo one\nskip\n");
        let second = write_file(&dir, "second.txt", "foo two\n");

        let output = run_to_string(&match_config("foo", vec![first.clone(), second.clone()]));
        assert_eq!(output, format!("{first}: foo one\n{second}: foo two\n"));
    }

    #[test]
    fn test_single_source_has_no_prefix() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "only.txt", "foo\n");

        let output = run_to_string(&match_config("foo", vec![path]));
        assert_eq!(output, "foo\n");
    }

    #[test]
    fn test_suppress_filenames_across_multiple_sources() {
        let dir = TempDir::new().unwrap();
        let first = write_file(&dir, "first.txt", "foo\n");
        let second = write_file(&dir, "second.txt", "foo\n");

        let mut config = match_config("foo", vec![first, second]);
        config.command = Command::Match {
            invert: false,
            only_matching: false,
            suppress_filenames: true,
        };
        assert_eq!(run_to_string(&config), "foo\nfoo\n");
    }

    #[test]
    fn test_recursive_run_over_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.txt"), "match a\nno\n").unwrap();
        fs::write(dir.path().join("sub").join("b.txt"), "match b\n").unwrap();

        let mut config = match_config("match", vec![dir.path().display().to_string()]);
        config.recursive = true;
        config.command = Command::Match {
            invert: false,
            only_matching: false,
            suppress_filenames: true,
        };
        assert_eq!(run_to_string(&config), "match a\nmatch b\n");
    }

    #[test]
    fn test_invalid_pattern_aborts_before_any_output() {
        let mut out = Vec::new();
        let config = match_config("(unclosed", vec![]);
        let err = run(&config, &mut out).unwrap_err();
        assert!(matches!(err, SnipError::Pattern { .. }));
        assert!(out.is_empty(), "nothing may be written when compilation fails");
    }

    #[test]
    fn test_incompatible_match_flags_abort_before_scanning() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "input.txt", "foo\n");

        let mut config = match_config("foo", vec![path]);
        config.command = Command::Match {
            invert: true,
            only_matching: true,
            suppress_filenames: false,
        };
        let mut out = Vec::new();
        let err = run(&config, &mut out).unwrap_err();
        assert!(matches!(err, SnipError::Config(_)));
        assert!(out.is_empty());
    }

    /// A sink that fails on the first write, to exercise the abort path.
    struct FailingWriter;

    impl io::Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_aborts_the_run() {
        let dir = TempDir::new().unwrap();
        // Large enough to overflow the BufWriter and force a real write.
        let content = "foo\n".repeat(4096);
        let path = write_file(&dir, "big.txt", &content);

        let err = run(&match_config("foo", vec![path]), FailingWriter).unwrap_err();
        assert!(
            matches!(err, SnipError::Io { .. }),
            "a failed write should surface as an I/O error, got: {:?}",
            err
        );
    }

    #[test]
    fn test_identical_runs_produce_identical_output() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "foo 1\nbar\n").unwrap();
        fs::write(dir.path().join("b.txt"), "foo 2\n").unwrap();

        let mut config = match_config("foo", vec![dir.path().display().to_string()]);
        config.recursive = true;
        assert_eq!(
            run_to_string(&config),
            run_to_string(&config),
            "output must be a deterministic function of inputs and configuration"
        );
    }
}
