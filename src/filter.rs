//! Table and column selection by name pattern.

use regex::Regex;

use crate::model::{Relation, Table};

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("Invalid pattern \"{pattern}\": {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A set of fully anchored name patterns.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Regex>,
}

impl PatternSet {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, FilterError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                let p = p.as_ref();
                Regex::new(&format!("^(?:{})$", p)).map_err(|source| FilterError::InvalidPattern {
                    pattern: p.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(name))
    }
}

/// Include/exclude rules; `None` means no constraint.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub include_tables: Option<PatternSet>,
    pub exclude_tables: Option<PatternSet>,
    pub include_columns: Option<PatternSet>,
    pub exclude_columns: Option<PatternSet>,
}

impl Filter {
    pub fn new<S: AsRef<str>>(
        include_tables: Option<&[S]>,
        exclude_tables: Option<&[S]>,
        include_columns: Option<&[S]>,
        exclude_columns: Option<&[S]>,
    ) -> Result<Self, FilterError> {
        let compile = |p: Option<&[S]>| p.map(PatternSet::new).transpose();
        Ok(Self {
            include_tables: compile(include_tables)?,
            exclude_tables: compile(exclude_tables)?,
            include_columns: compile(include_columns)?,
            exclude_columns: compile(exclude_columns)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.include_tables.is_none()
            && self.exclude_tables.is_none()
            && self.include_columns.is_none()
            && self.exclude_columns.is_none()
    }

    pub fn keeps_table(&self, name: &str) -> bool {
        selected(name, self.include_tables.as_ref(), self.exclude_tables.as_ref())
    }

    pub fn keeps_column(&self, name: &str) -> bool {
        selected(name, self.include_columns.as_ref(), self.exclude_columns.as_ref())
    }
}

fn selected(name: &str, include: Option<&PatternSet>, exclude: Option<&PatternSet>) -> bool {
    include.is_none_or(|set| set.matches(name)) && !exclude.is_some_and(|set| set.matches(name))
}

/// Apply `filter` to copies of the given tables and relations.
///
/// Relations survive when both endpoint tables survive; column rules never
/// drop a relation.
pub fn filter_resources(
    tables: &[Table],
    relations: &[Relation],
    filter: &Filter,
) -> (Vec<Table>, Vec<Relation>) {
    let kept_tables: Vec<Table> = tables
        .iter()
        .filter(|t| filter.keeps_table(&t.name))
        .map(|t| {
            let columns = t
                .columns
                .iter()
                .filter(|c| filter.keeps_column(&c.name))
                .cloned()
                .collect();
            Table::new(t.name.clone(), columns)
        })
        .collect();

    let kept_relations = relations
        .iter()
        .filter(|r| filter.keeps_table(&r.left_table) && filter.keeps_table(&r.right_table))
        .cloned()
        .collect();

    (kept_tables, kept_relations)
}
