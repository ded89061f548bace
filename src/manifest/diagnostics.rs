//! Errors raised while loading a `Wiringfile`.
use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use semver::Version;
use serde_saphyr::{Error as YamlError, Location};
use thiserror::Error;

const YAML_HINTS: [(&str, &str); 3] = [
    (
        "did not find expected '-'",
        "Start list items with '-' and ensure proper indentation.",
    ),
    (
        "mapping values are not allowed",
        "Check for a stray ':' or add quotes around values where needed.",
    ),
    (
        "found character that cannot start any token",
        "Remove stray characters and ensure indentation uses spaces (no tabs).",
    ),
];

/// Error raised when a manifest cannot be turned into a wiring spec.
#[derive(Debug, Error, Diagnostic)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("failed to read manifest {}", .path.display())]
    #[diagnostic(code(wirespec::manifest::read))]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The YAML is malformed or does not match the manifest schema.
    #[error("manifest parse error in {name}")]
    #[diagnostic(code(wirespec::manifest::parse))]
    Parse {
        /// Manifest display name.
        name: String,
        /// Located diagnostic.
        #[source]
        #[diagnostic_source]
        source: Box<dyn Diagnostic + Send + Sync + 'static>,
    },

    /// The manifest targets a format this build does not understand.
    #[error("unsupported wiring_version {version}")]
    #[diagnostic(
        code(wirespec::manifest::version),
        help("this build reads wiring_version 1.x manifests")
    )]
    UnsupportedVersion {
        /// Declared version.
        version: Version,
    },
}

#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(wirespec::manifest::yaml))]
struct YamlDiagnostic {
    #[source_code]
    src: NamedSource<String>,
    #[label("parse error here")]
    span: Option<SourceSpan>,
    #[help]
    help: Option<String>,
    #[source]
    source: YamlError,
    message: String,
}

#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(wirespec::manifest::structure))]
struct DataDiagnostic {
    #[source]
    source: serde_json::Error,
    message: String,
}

fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

/// Byte offset of a one-based line and character column.
fn offset_of(src: &str, line_no: u64, column_no: u64) -> usize {
    let line = to_usize(line_no.saturating_sub(1));
    let column = to_usize(column_no.saturating_sub(1));
    let mut offset = 0;
    for (idx, segment) in src.split_inclusive('\n').enumerate() {
        if idx == line {
            let text = segment.strip_suffix('\n').unwrap_or(segment);
            return offset
                + text
                    .char_indices()
                    .nth(column)
                    .map_or(text.len(), |(byte, _)| byte);
        }
        offset += segment.len();
    }
    src.len()
}

fn hint_for(message: &str, src: &str, loc: Option<Location>) -> Option<String> {
    let tab_indented = loc.is_some_and(|l| {
        src.lines()
            .nth(to_usize(l.line().saturating_sub(1)))
            .is_some_and(|line| {
                line.chars()
                    .take_while(|c| c.is_whitespace())
                    .any(|c| c == '\t')
            })
    });
    if tab_indented {
        return Some("Use spaces for indentation; tabs are invalid in YAML.".into());
    }
    let lower = message.to_lowercase();
    YAML_HINTS
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, hint)| (*hint).to_owned())
}

/// Attach the source location and a hint to a YAML syntax error.
pub(crate) fn map_yaml_error(
    err: YamlError,
    src: &str,
    name: &str,
) -> Box<dyn Diagnostic + Send + Sync + 'static> {
    let loc = err.location();
    let (line, column, span) = loc.map_or((1, 1, None), |l| {
        let at = offset_of(src, l.line(), l.column());
        let len = usize::from(at < src.len());
        (l.line(), l.column(), Some(SourceSpan::from((at, len))))
    });
    let detail = err.to_string();
    let help = hint_for(&detail, src, loc);
    let mut message = format!("YAML parse error at line {line}, column {column}: {detail}");
    if let Some(hint) = &help {
        message.push_str("\nhelp: ");
        message.push_str(hint);
    }
    Box::new(YamlDiagnostic {
        src: NamedSource::new(name, src.to_owned()),
        span,
        help,
        source: err,
        message,
    })
}

/// Wrap a schema mismatch such as an unknown field or a wrong type.
pub(crate) fn map_data_error(
    err: serde_json::Error,
    name: &str,
) -> Box<dyn Diagnostic + Send + Sync + 'static> {
    Box::new(DataDiagnostic {
        message: format!("manifest structure error in {name}: {err}"),
        source: err,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_indentation_gets_a_hint() {
        let src = "\tkey: \"unterminated";
        let err = serde_saphyr::from_str::<serde_json::Value>(src).expect_err("parse error");
        let msg = map_yaml_error(err, src, "test").to_string();
        assert!(msg.contains("Use spaces for indentation"), "message: {msg}");
    }

    #[test]
    fn offsets_count_columns_in_characters() {
        let src = "a: 1\nbé: x\n";
        assert_eq!(offset_of(src, 2, 3), "a: 1\nbé".len());
        assert_eq!(offset_of(src, 9, 1), src.len());
    }

    #[test]
    fn data_errors_name_the_manifest() {
        let err = serde_json::from_str::<u8>("\"x\"").expect_err("type error");
        let diag = map_data_error(err, "Wiringfile");
        assert!(diag.to_string().starts_with("manifest structure error in Wiringfile"));
    }
}
