//! Serializer for converting the model back to er markup.
//!
//! The output is read back by [`crate::parser`] into an equal model.

use crate::lexer::escape_markup;
use crate::model::{Column, Drawable, Relation, Table};

/// Serialize tables and relations to er markup.
pub fn to_markup(tables: &[Table], relations: &[Relation]) -> String {
    let mut output = String::new();

    for (i, table) in tables.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        output.push_str(&table.to_markup());
        output.push('\n');
    }

    if !relations.is_empty() {
        if !tables.is_empty() {
            output.push('\n');
        }
        for relation in relations {
            output.push_str(&relation.to_markup());
            output.push('\n');
        }
    }

    output
}

pub fn table_header(table: &Table) -> String {
    format!("[{}]", escape_markup(&table.name))
}

/// Header line followed by one line per column, without trailing newline.
pub fn table_block(table: &Table) -> String {
    let mut lines = vec![table_header(table)];
    lines.extend(table.columns.iter().map(column_line));
    lines.join("\n")
}

pub fn column_line(column: &Column) -> String {
    let mut line = format!("    {}{}", column.key_symbol(), escape_markup(&column.name));
    if let Some(typ) = &column.typ {
        line.push_str(&format!(" {{label:\"{}\"}}", escape_markup(typ)));
    }
    line
}

pub fn relation_line(relation: &Relation) -> String {
    format!(
        "{}{} {}--{} {}{}",
        escape_markup(&relation.left_table),
        qualifier(relation.left_column.as_deref()),
        relation.left_cardinality,
        relation.right_cardinality,
        escape_markup(&relation.right_table),
        qualifier(relation.right_column.as_deref()),
    )
}

fn qualifier(column: Option<&str>) -> String {
    match column {
        Some(c) => format!(".\"{}\"", escape_markup(c)),
        None => String::new(),
    }
}
