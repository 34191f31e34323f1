//! Line-level scanning of er markup: comment stripping and grammar matching.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::model::{Column, Entity, ModelError, Relation, Table};

static TABLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[(?P<name>[^\]]+)\]$").unwrap());

static RELATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?x)
        ^
        (?P<left_table>\S+?)
        (?:\."(?P<left_column>[^"]+)")?
        \s*
        (?P<left_cardinality>[*?+1]?)
        --
        (?P<right_cardinality>[*?+1]?)
        \s*
        (?P<right_table>\S+?)
        (?:\."(?P<right_column>[^"]+)")?
        \s*
        $
        "#,
    )
    .unwrap()
});

static COLUMN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?x)
        ^
        (?P<primary>\*?)
        \s*
        (?P<name>[^\s{}"*\[\]](?:[^{}"\[\]]*[^\s{}"\[\]])?)
        \s*
        (?:\{label:\s*"(?P<label>[^"]*)"\s*\})?
        $
        "#,
    )
    .unwrap()
});

/// A non-comment line ready for classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine<'a> {
    /// 1-based line number.
    pub line_nb: usize,
    pub text: String,
    pub raw: &'a str,
}

/// Remove everything from the first unescaped `#`, then trim.
///
/// `\#` is kept as is, so stripping twice gives the same result.
pub fn strip_comments(line: &str) -> &str {
    let mut prev = None;
    for (i, c) in line.char_indices() {
        if c == '#' && prev != Some('\\') {
            return line[..i].trim();
        }
        prev = Some(c);
    }
    line.trim()
}

/// Iterate over the code lines of a document, skipping blank and comment-only lines.
pub fn code_lines<'a, I>(lines: I) -> impl Iterator<Item = SourceLine<'a>>
where
    I: IntoIterator<Item = &'a str>,
{
    lines.into_iter().enumerate().filter_map(|(i, raw)| {
        let text = strip_comments(raw);
        if text.is_empty() {
            None
        } else {
            Some(SourceLine {
                line_nb: i + 1,
                text: text.to_string(),
                raw,
            })
        }
    })
}

pub fn escape_markup(text: &str) -> String {
    text.replace('#', "\\#")
}

pub fn unescape_markup(text: &str) -> String {
    text.replace("\\#", "#")
}

/// Why a line could not become an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineMatchError {
    NoGrammar,
    Model(ModelError),
}

impl From<ModelError> for LineMatchError {
    fn from(e: ModelError) -> Self {
        LineMatchError::Model(e)
    }
}

type Build = fn(&Captures<'_>) -> Result<Entity, ModelError>;

/// Grammars in priority order; the first match wins.
static GRAMMARS: Lazy<[(&'static Regex, Build); 3]> = Lazy::new(|| {
    [
        (&*TABLE_RE, build_table as Build),
        (&*RELATION_RE, build_relation as Build),
        (&*COLUMN_RE, build_column as Build),
    ]
});

/// Turn one comment-stripped line into an entity.
pub fn parse_line(line: &str) -> Result<Entity, LineMatchError> {
    for (re, build) in GRAMMARS.iter() {
        if let Some(caps) = re.captures(line) {
            return Ok(build(&caps)?);
        }
    }
    Err(LineMatchError::NoGrammar)
}

fn group(caps: &Captures<'_>, name: &str) -> Option<String> {
    caps.name(name).map(|m| unescape_markup(m.as_str()))
}

fn build_table(caps: &Captures<'_>) -> Result<Entity, ModelError> {
    let name = group(caps, "name").unwrap_or_default();
    Ok(Entity::Table(Table::new(name, Vec::new())))
}

fn build_relation(caps: &Captures<'_>) -> Result<Entity, ModelError> {
    let relation = Relation::from_symbols(
        group(caps, "left_table").unwrap_or_default(),
        group(caps, "right_table").unwrap_or_default(),
        &group(caps, "left_cardinality").unwrap_or_default(),
        &group(caps, "right_cardinality").unwrap_or_default(),
    )?
    .with_columns(group(caps, "left_column"), group(caps, "right_column"));
    Ok(Entity::Relation(relation))
}

fn build_column(caps: &Captures<'_>) -> Result<Entity, ModelError> {
    let is_key = caps.name("primary").is_some_and(|m| m.as_str() == "*");
    Ok(Entity::Column(Column::new(
        group(caps, "name").unwrap_or_default(),
        group(caps, "label"),
        is_key,
        None,
    )))
}
