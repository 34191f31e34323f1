//! Canonical entity/relationship model shared by every source and renderer.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::dot::{self, DotConfig};
use crate::serializer;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("Cardinality \"{0}\" should be one of \"*\", \"?\", \"+\", \"1\" or empty")]
    InvalidCardinality(String),
}

/// Anything that can be written out as er markup or as a DOT fragment.
pub trait Drawable {
    fn to_markup(&self) -> String;
    fn to_dot(&self, config: &DotConfig) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    /// Free-text type, `None` when unknown.
    pub typ: Option<String>,
    pub is_key: bool,
    pub is_null: bool,
}

impl Column {
    /// `is_null` defaults to `!is_key` when not given.
    pub fn new(
        name: impl Into<String>,
        typ: Option<String>,
        is_key: bool,
        is_null: Option<bool>,
    ) -> Self {
        Self {
            name: name.into(),
            typ,
            is_key,
            is_null: is_null.unwrap_or(!is_key),
        }
    }

    pub fn key_symbol(&self) -> &'static str {
        if self.is_key { "*" } else { "" }
    }
}

impl Ord for Column {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .is_key
            .cmp(&self.is_key)
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.typ.cmp(&other.typ))
            .then_with(|| self.is_null.cmp(&other.is_null))
    }
}

impl PartialOrd for Column {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Drawable for Column {
    fn to_markup(&self) -> String {
        serializer::column_line(self)
    }

    fn to_dot(&self, config: &DotConfig) -> String {
        dot::column_row(self, config)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_markup())
    }
}

#[derive(Debug, Clone, Eq)]
pub struct Table {
    pub name: String,
    /// Declaration order, kept for rendering.
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Columns in canonical order: keys first, then alphabetical.
    pub fn sorted_columns(&self) -> Vec<&Column> {
        let mut columns: Vec<&Column> = self.columns.iter().collect();
        columns.sort();
        columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.sorted_columns() == other.sorted_columns()
    }
}

impl Drawable for Table {
    fn to_markup(&self) -> String {
        serializer::table_block(self)
    }

    fn to_dot(&self, config: &DotConfig) -> String {
        dot::table_node(self, config)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serializer::table_header(self))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cardinality {
    Many,      // *
    ZeroOrOne, // ?
    OneOrMore, // +
    One,       // 1
    #[default]
    Unspecified,
}

impl Cardinality {
    pub fn from_symbol(symbol: &str) -> Result<Self, ModelError> {
        match symbol {
            "*" => Ok(Self::Many),
            "?" => Ok(Self::ZeroOrOne),
            "+" => Ok(Self::OneOrMore),
            "1" => Ok(Self::One),
            "" => Ok(Self::Unspecified),
            other => Err(ModelError::InvalidCardinality(other.to_string())),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Many => "*",
            Self::ZeroOrOne => "?",
            Self::OneOrMore => "+",
            Self::One => "1",
            Self::Unspecified => "",
        }
    }

    pub fn is_specified(self) -> bool {
        self != Self::Unspecified
    }
}

impl FromStr for Cardinality {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_symbol(s)
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// An undirected link between two tables with independently labelled ends.
#[derive(Debug, Clone, Eq)]
pub struct Relation {
    pub left_table: String,
    pub right_table: String,
    pub left_column: Option<String>,
    pub right_column: Option<String>,
    pub left_cardinality: Cardinality,
    pub right_cardinality: Cardinality,
}

impl Relation {
    pub fn new(
        left_table: impl Into<String>,
        right_table: impl Into<String>,
        left_cardinality: Cardinality,
        right_cardinality: Cardinality,
    ) -> Self {
        Self {
            left_table: left_table.into(),
            right_table: right_table.into(),
            left_column: None,
            right_column: None,
            left_cardinality,
            right_cardinality,
        }
    }

    /// Build a relation from textual cardinality symbols, as found in markup
    /// or produced by schema adapters.
    pub fn from_symbols(
        left_table: impl Into<String>,
        right_table: impl Into<String>,
        left_cardinality: &str,
        right_cardinality: &str,
    ) -> Result<Self, ModelError> {
        Ok(Self::new(
            left_table,
            right_table,
            Cardinality::from_symbol(left_cardinality)?,
            Cardinality::from_symbol(right_cardinality)?,
        ))
    }

    pub fn with_columns(mut self, left_column: Option<String>, right_column: Option<String>) -> Self {
        self.left_column = left_column.filter(|c| !c.is_empty());
        self.right_column = right_column.filter(|c| !c.is_empty());
        self
    }

    /// The same relation seen from the other end.
    pub fn reversed(&self) -> Self {
        Self {
            left_table: self.right_table.clone(),
            right_table: self.left_table.clone(),
            left_column: self.right_column.clone(),
            right_column: self.left_column.clone(),
            left_cardinality: self.right_cardinality,
            right_cardinality: self.left_cardinality,
        }
    }

    fn same_orientation(&self, other: &Self) -> bool {
        self.left_table == other.left_table
            && self.right_table == other.right_table
            && self.left_column == other.left_column
            && self.right_column == other.right_column
            && self.left_cardinality == other.left_cardinality
            && self.right_cardinality == other.right_cardinality
    }
}

impl PartialEq for Relation {
    fn eq(&self, other: &Self) -> bool {
        self.same_orientation(other) || self.same_orientation(&other.reversed())
    }
}

impl Drawable for Relation {
    fn to_markup(&self) -> String {
        serializer::relation_line(self)
    }

    fn to_dot(&self, config: &DotConfig) -> String {
        dot::relation_edge(self, config)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_markup())
    }
}

/// One parsed markup line.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Table(Table),
    Column(Column),
    Relation(Relation),
}

impl Drawable for Entity {
    fn to_markup(&self) -> String {
        match self {
            Entity::Table(t) => t.to_markup(),
            Entity::Column(c) => c.to_markup(),
            Entity::Relation(r) => r.to_markup(),
        }
    }

    fn to_dot(&self, config: &DotConfig) -> String {
        match self {
            Entity::Table(t) => t.to_dot(config),
            Entity::Column(c) => c.to_dot(config),
            Entity::Relation(r) => r.to_dot(config),
        }
    }
}

/// Tables and relations as produced by a schema source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub tables: Vec<Table>,
    pub relations: Vec<Relation>,
}

impl Schema {
    pub fn new(tables: Vec<Table>, relations: Vec<Relation>) -> Self {
        Self { tables, relations }
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }
}
