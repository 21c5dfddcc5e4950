//! Error adapter for converting SketchError to miette diagnostics.
//!
//! This module provides the bridge between the library's error type and
//! miette's rich diagnostic formatting used in the CLI. Each variant gets a
//! stable code and, where the user can act on it, help text.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use sketchmap::SketchError;

/// Adapter giving a [`SketchError`] a miette presentation.
pub struct ErrorAdapter<'a>(pub &'a SketchError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            SketchError::UnsupportedFormat { .. } => "sketchmap::ingest::unsupported_format",
            SketchError::PayloadTooLarge { .. } => "sketchmap::ingest::payload_too_large",
            SketchError::Decode(_) => "sketchmap::ingest::decode",
            SketchError::EmptySketch => "sketchmap::extract::empty_sketch",
            SketchError::Style(_) => "sketchmap::style",
            SketchError::Dump(_) => "sketchmap::dump",
            SketchError::Export(_) => "sketchmap::export",
            SketchError::Task(_) => "sketchmap::task",
            SketchError::Io(_) => "sketchmap::io",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help: String = match &self.0 {
            SketchError::UnsupportedFormat { allowed, .. } => {
                format!("convert the sketch to one of: {}", allowed.join(", "))
            }
            SketchError::PayloadTooLarge { limit, .. } => format!(
                "downscale the image below {limit} bytes or raise `ingest.max_bytes` in the configuration"
            ),
            SketchError::EmptySketch => {
                "draw shapes with darker, continuous strokes; specks and dust are ignored".to_string()
            }
            SketchError::Style(_) => {
                "colors must be `#rgb` or `#rrggbb`, nodeSize 10-40 and fontSize 8-24".to_string()
            }
            SketchError::Dump(_) => {
                "a dump needs `nodes` with id, label, x, y and `edges` with source, target"
                    .to_string()
            }
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// Convert a [`SketchError`] into the list of errors to render.
///
/// Pipeline errors carry no source snippets, so this is always a single
/// adapter.
pub fn to_reportables(err: &SketchError) -> Vec<ErrorAdapter<'_>> {
    vec![ErrorAdapter(err)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(err: &SketchError) -> String {
        ErrorAdapter(err).code().unwrap().to_string()
    }

    #[test]
    fn test_stable_codes() {
        let unsupported = SketchError::UnsupportedFormat {
            mime: "image/bmp".to_string(),
            allowed: vec!["image/png".to_string()],
        };
        assert_eq!(code(&unsupported), "sketchmap::ingest::unsupported_format");
        assert_eq!(code(&SketchError::EmptySketch), "sketchmap::extract::empty_sketch");
        assert_eq!(
            code(&SketchError::Decode("truncated".to_string())),
            "sketchmap::ingest::decode"
        );
    }

    #[test]
    fn test_help_mentions_accepted_formats() {
        let err = SketchError::UnsupportedFormat {
            mime: "image/bmp".to_string(),
            allowed: vec!["image/png".to_string(), "image/gif".to_string()],
        };
        let adapter = ErrorAdapter(&err);
        let help = adapter.help().unwrap().to_string();
        assert!(help.contains("image/png, image/gif"));
        assert_eq!(adapter.to_string(), err.to_string());
    }

    #[test]
    fn test_single_reportable_renders() {
        let err = SketchError::EmptySketch;
        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);

        let mut out = String::new();
        miette::GraphicalReportHandler::new_themed(miette::GraphicalTheme::unicode_nocolor())
            .render_report(&mut out, &reportables[0])
            .unwrap();
        assert!(out.contains("No shapes found"));
        assert!(out.contains("empty_sketch"));
    }

    #[test]
    fn test_io_has_no_help() {
        let err = SketchError::Io(std::io::Error::other("disk full"));
        assert!(ErrorAdapter(&err).help().is_none());
    }
}
