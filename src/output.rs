//! Output format dispatch and the Graphviz bridge.

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::dot::{self, DotConfig};
use crate::mermaid;
use crate::model::{Relation, Table};
use crate::serializer;

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Unknown mode: {0}. Valid options: auto, er, dot, mermaid, mermaid_er, graph")]
    UnknownMode(String),
    #[error("Mode 'graph' needs an output file with an image extension")]
    MissingImageFormat,
    #[error("Graphviz 'dot' command not found. Install Graphviz or write .er, .dot or .mmd output instead.")]
    GraphvizNotFound,
    #[error("Graphviz dot command failed with status: {status}\n{stderr}")]
    GraphvizFailed { status: String, stderr: String },
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    Er,
    Dot,
    Mermaid,
    MermaidEr,
    /// Rendered by Graphviz into the named format (`png`, `svg`, `pdf`, ...).
    Image(String),
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Er => write!(f, "er"),
            OutputFormat::Dot => write!(f, "dot"),
            OutputFormat::Mermaid => write!(f, "mermaid"),
            OutputFormat::MermaidEr => write!(f, "mermaid_er"),
            OutputFormat::Image(format) => write!(f, "{}", format),
        }
    }
}

impl OutputFormat {
    /// Format implied by an output file name; anything unknown is an image
    /// format handed to Graphviz.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "er" => OutputFormat::Er,
            "dot" | "gv" => OutputFormat::Dot,
            "mmd" | "md" | "mermaid" => OutputFormat::Mermaid,
            "" => OutputFormat::Image("png".to_string()),
            other => OutputFormat::Image(other.to_string()),
        }
    }

    /// Resolve a `--mode` value. `auto` and `graph` defer to the output path;
    /// without one, `auto` means er markup.
    pub fn from_mode(mode: &str, output: Option<&Path>) -> Result<Self, OutputError> {
        match mode.to_lowercase().as_str() {
            "auto" => Ok(output.map(Self::from_path).unwrap_or(OutputFormat::Er)),
            "er" => Ok(OutputFormat::Er),
            "dot" => Ok(OutputFormat::Dot),
            "mermaid" => Ok(OutputFormat::Mermaid),
            "mermaid_er" => Ok(OutputFormat::MermaidEr),
            "graph" => match output.map(Self::from_path) {
                Some(format @ OutputFormat::Image(_)) => Ok(format),
                _ => Err(OutputError::MissingImageFormat),
            },
            _ => Err(OutputError::UnknownMode(mode.to_string())),
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, OutputFormat::Image(_))
    }
}

/// Render a textual format; images render through DOT.
pub fn render_text(
    format: &OutputFormat,
    tables: &[Table],
    relations: &[Relation],
    config: &DotConfig,
) -> String {
    match format {
        OutputFormat::Er => serializer::to_markup(tables, relations),
        OutputFormat::Dot | OutputFormat::Image(_) => dot::to_dot(tables, relations, config),
        OutputFormat::Mermaid => mermaid::to_mermaid(tables, relations),
        OutputFormat::MermaidEr => mermaid::to_mermaid_er(tables, relations),
    }
}

/// Write rendered text to `path`.
pub fn write_text(text: &str, path: &Path) -> Result<(), OutputError> {
    std::fs::write(path, text).map_err(|source| OutputError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Pipe DOT source through `dot -T<format> -o <path>`.
pub fn render_image(dot_source: &str, format: &str, path: &Path) -> Result<(), OutputError> {
    let io_error = |source| OutputError::Io {
        path: path.display().to_string(),
        source,
    };

    let mut child = Command::new("dot")
        .arg(format!("-T{}", format))
        .arg("-o")
        .arg(path)
        .stdin(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                OutputError::GraphvizNotFound
            } else {
                io_error(e)
            }
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(dot_source.as_bytes()).map_err(io_error)?;
    }

    let output = child.wait_with_output().map_err(io_error)?;
    if !output.status.success() {
        return Err(OutputError::GraphvizFailed {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}
