//! er markup parser.
//!
//! Lines are scanned left to right. Each code line becomes an [`Entity`]
//! which is applied to a [`ParserState`]. Failures are collected per line and
//! reported together once the whole input has been read.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::lexer::{self, LineMatchError};
use crate::model::{Column, Entity, ModelError, Relation, Schema, Table};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineErrorKind {
    #[error("Line \"{0}\" could not be parsed to an object")]
    UnparsableLine(String),
    #[error("Cannot add table named \"{0}\" which is already present in the schema")]
    DuplicateTable(String),
    #[error("Cannot add column named \"{column}\" which is already present in table \"{table}\"")]
    DuplicateColumn { table: String, column: String },
    #[error("Cannot add column \"{0}\" before adding a table")]
    NoCurrentTable(String),
    #[error("Cannot add a relation with table \"{0}\" which is undefined")]
    UndefinedTableInRelation(String),
    #[error(transparent)]
    InvalidCardinality(#[from] ModelError),
}

impl LineErrorKind {
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            LineErrorKind::NoCurrentTable(_) => {
                Some("Try to declare the tables before the relationships and columns.")
            }
            LineErrorKind::UndefinedTableInRelation(_) => {
                Some("Try to declare the tables before the relationships.")
            }
            _ => None,
        }
    }
}

/// A failure tied to one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineError {
    /// 1-based.
    pub line_nb: usize,
    /// The line as written, comments included.
    pub line: String,
    pub kind: LineErrorKind,
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error on line {}: {}\n{}", self.line_nb, self.line, self.kind)?;
        if let Some(hint) = self.kind.hint() {
            write!(f, "\nHINT: {}", hint)?;
        }
        Ok(())
    }
}

impl std::error::Error for LineError {}

#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    #[error("couldn't complete the generation due to the {} following errors\n\n{}", .0.len(), join_errors(.0))]
    Lines(Vec<LineError>),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl MarkupError {
    /// Line errors carried by this error, empty for I/O failures.
    pub fn line_errors(&self) -> &[LineError] {
        match self {
            MarkupError::Lines(errors) => errors,
            MarkupError::Io { .. } => &[],
        }
    }
}

fn join_errors(errors: &[LineError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Parser state threaded through every line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParserState {
    /// Index of the current table in `tables`.
    pub current: Option<usize>,
    pub tables: Vec<Table>,
    pub relations: Vec<Relation>,
}

impl ParserState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_table(&self) -> Option<&Table> {
        self.current.and_then(|i| self.tables.get(i))
    }

    fn has_table(&self, name: &str) -> bool {
        self.tables.iter().any(|t| t.name == name)
    }

    /// Apply one entity. On error the state is left untouched.
    pub fn apply(&mut self, entity: Entity) -> Result<(), LineErrorKind> {
        match entity {
            Entity::Table(table) => self.add_table(table),
            Entity::Column(column) => self.add_column(column),
            Entity::Relation(relation) => self.add_relation(relation),
        }
    }

    fn add_table(&mut self, table: Table) -> Result<(), LineErrorKind> {
        if self.has_table(&table.name) {
            return Err(LineErrorKind::DuplicateTable(table.name));
        }
        self.tables.push(table);
        self.current = Some(self.tables.len() - 1);
        Ok(())
    }

    fn add_column(&mut self, column: Column) -> Result<(), LineErrorKind> {
        let Some(index) = self.current else {
            return Err(LineErrorKind::NoCurrentTable(column.name));
        };
        let table = &mut self.tables[index];
        if table.has_column(&column.name) {
            return Err(LineErrorKind::DuplicateColumn {
                table: table.name.clone(),
                column: column.name,
            });
        }
        table.columns.push(column);
        Ok(())
    }

    fn add_relation(&mut self, relation: Relation) -> Result<(), LineErrorKind> {
        for name in [&relation.left_table, &relation.right_table] {
            if !self.has_table(name) {
                return Err(LineErrorKind::UndefinedTableInRelation(name.clone()));
            }
        }
        self.relations.push(relation);
        Ok(())
    }

    /// Table names unique, current table in range, relation endpoints declared.
    pub fn check_invariants(&self) -> bool {
        let unique = self
            .tables
            .iter()
            .enumerate()
            .all(|(i, t)| !self.tables[..i].iter().any(|o| o.name == t.name));
        let current_ok = self.current.is_none_or(|i| i < self.tables.len());
        let relations_ok = self
            .relations
            .iter()
            .all(|r| self.has_table(&r.left_table) && self.has_table(&r.right_table));
        unique && current_ok && relations_ok
    }

    pub fn into_schema(self) -> Schema {
        Schema::new(self.tables, self.relations)
    }
}

/// Parse markup lines into tables and relations.
pub fn parse_lines<'a, I>(lines: I) -> Result<Schema, MarkupError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut state = ParserState::new();
    let mut errors = Vec::new();

    for line in lexer::code_lines(lines) {
        let result = match lexer::parse_line(&line.text) {
            Ok(entity) => state.apply(entity),
            Err(LineMatchError::NoGrammar) => Err(LineErrorKind::UnparsableLine(line.text.clone())),
            Err(LineMatchError::Model(e)) => Err(LineErrorKind::InvalidCardinality(e)),
        };
        match result {
            Ok(()) => debug_assert!(state.check_invariants()),
            Err(kind) => errors.push(LineError {
                line_nb: line.line_nb,
                line: line.raw.to_string(),
                kind,
            }),
        }
    }

    if errors.is_empty() {
        Ok(state.into_schema())
    } else {
        Err(MarkupError::Lines(errors))
    }
}

pub fn parse_str(input: &str) -> Result<Schema, MarkupError> {
    parse_lines(input.lines())
}

pub fn parse_file(path: &Path) -> Result<Schema, MarkupError> {
    let input = fs::read_to_string(path).map_err(|source| MarkupError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_str(&input)
}
