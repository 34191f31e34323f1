//! Schema sources: anything that can produce tables and relations.

use std::fs;
use std::path::{Path, PathBuf};

use crate::model::Schema;
use crate::parser::{self, MarkupError};
use crate::sql::{self, Dialect, SqlOptions, SqlParseError};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error(transparent)]
    Markup(#[from] MarkupError),
    #[error("Failed to parse SQL: {0}")]
    Sql(#[from] SqlParseError),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Unsupported input: {0}. Expected a .er or .sql file")]
    UnsupportedInput(String),
}

/// Produces the canonical tables and relations of a schema.
pub trait SchemaSource {
    fn load(&self) -> Result<Schema, SourceError>;
}

/// Where a source reads its text from.
#[derive(Debug, Clone)]
pub enum Input {
    Text(String),
    Path(PathBuf),
}

impl Input {
    fn read(&self) -> Result<String, SourceError> {
        match self {
            Input::Text(text) => Ok(text.clone()),
            Input::Path(path) => fs::read_to_string(path).map_err(|source| SourceError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarkupSource {
    pub input: Input,
}

impl MarkupSource {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            input: Input::Text(text.into()),
        }
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            input: Input::Path(path.into()),
        }
    }
}

impl SchemaSource for MarkupSource {
    fn load(&self) -> Result<Schema, SourceError> {
        match &self.input {
            Input::Text(text) => Ok(parser::parse_str(text)?),
            Input::Path(path) => Ok(parser::parse_file(path)?),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqlSource {
    pub input: Input,
    pub options: SqlOptions,
}

impl SqlSource {
    pub fn from_text(text: impl Into<String>, options: SqlOptions) -> Self {
        Self {
            input: Input::Text(text.into()),
            options,
        }
    }

    pub fn from_file(path: impl Into<PathBuf>, options: SqlOptions) -> Self {
        Self {
            input: Input::Path(path.into()),
            options,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.options.dialect
    }
}

impl SchemaSource for SqlSource {
    fn load(&self) -> Result<Schema, SourceError> {
        let text = self.input.read()?;
        Ok(sql::parse_sql(&text, &self.options)?)
    }
}

/// Pick a source for `path` by its extension.
pub fn from_path(path: &Path, options: SqlOptions) -> Result<Box<dyn SchemaSource>, SourceError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "er" => Ok(Box::new(MarkupSource::from_file(path))),
        "sql" => Ok(Box::new(SqlSource::from_file(path, options))),
        _ => Err(SourceError::UnsupportedInput(path.display().to_string())),
    }
}
