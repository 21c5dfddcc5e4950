//! CLI logic for the SketchMap tool.
//!
//! Reads a sketch image (or a previously exported JSON dump), runs it through
//! the pipeline and writes SVG, PNG or JSON.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, OutputFormat};

use std::{fs, path::Path};

use log::{info, warn};

use sketchmap::{SketchError, SketchPipeline, graph::Graph};

/// MIME type for an input path, by extension.
fn input_mime(path: &str) -> String {
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png".to_string(),
        "jpg" | "jpeg" => "image/jpeg".to_string(),
        "gif" => "image/gif".to_string(),
        "json" => "application/json".to_string(),
        "" => "application/octet-stream".to_string(),
        other => format!("image/{other}"),
    }
}

/// Output format from the flag, else from the output extension, else SVG.
fn output_format(args: &Args) -> OutputFormat {
    if let Some(format) = args.format {
        return format;
    }
    match Path::new(&args.output)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => OutputFormat::Png,
        Some("json") => OutputFormat::Json,
        _ => OutputFormat::Svg,
    }
}

/// Run the SketchMap CLI application
///
/// Processes the input through the pipeline and writes the rendered result
/// to the output file.
///
/// # Errors
///
/// Returns `SketchError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Ingest, extraction and inference errors
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), SketchError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing sketch"
    );

    let app_config = config::load_config(args.config.as_ref())?;
    let pipeline = SketchPipeline::new(app_config);

    let bytes = fs::read(&args.input)?;
    let mime = input_mime(&args.input);
    let graph = if mime == "application/json" {
        let json = String::from_utf8(bytes)
            .map_err(|err| SketchError::Decode(format!("dump is not UTF-8: {err}")))?;
        pipeline.import_json(&json)?
    } else {
        let sketch = pipeline.process(&bytes, &mime)?;
        if let Some(warning) = sketch.report().warning() {
            warn!("{warning}");
        }
        sketch.into_graph()
    };

    let format = output_format(args);
    let output = render(&pipeline, &graph, format)?;
    fs::write(&args.output, output)?;

    info!(output_file = args.output, format:?; "Output exported successfully");

    Ok(())
}

fn render(
    pipeline: &SketchPipeline,
    graph: &Graph,
    format: OutputFormat,
) -> Result<Vec<u8>, SketchError> {
    match format {
        OutputFormat::Svg => Ok(pipeline.render_svg(graph)?.into_bytes()),
        OutputFormat::Png => pipeline.render_png(graph),
        OutputFormat::Json => pipeline.render_json(graph),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(output: &str, format: Option<OutputFormat>) -> Args {
        Args {
            input: "sketch.png".to_string(),
            output: output.to_string(),
            format,
            config: None,
            log_level: "off".to_string(),
        }
    }

    #[test]
    fn test_input_mime_by_extension() {
        assert_eq!(input_mime("board.PNG"), "image/png");
        assert_eq!(input_mime("board.jpg"), "image/jpeg");
        assert_eq!(input_mime("board.gif"), "image/gif");
        assert_eq!(input_mime("map.json"), "application/json");
        assert_eq!(input_mime("board.bmp"), "image/bmp");
        assert_eq!(input_mime("board"), "application/octet-stream");
    }

    #[test]
    fn test_output_format_selection() {
        assert_eq!(output_format(&args("out.svg", None)), OutputFormat::Svg);
        assert_eq!(output_format(&args("out.PNG", None)), OutputFormat::Png);
        assert_eq!(output_format(&args("map.json", None)), OutputFormat::Json);
        assert_eq!(output_format(&args("out", None)), OutputFormat::Svg);
        assert_eq!(
            output_format(&args("out.svg", Some(OutputFormat::Json))),
            OutputFormat::Json
        );
    }
}
