//! Mermaid output: class diagram and erDiagram flavours.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{Cardinality, Column, Relation, Table};

static DISALLOWED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9a-zA-Z_-]+").unwrap());

/// Mermaid does not allow special characters in names.
///
/// erDiagram names may not start with a digit or a dash either.
pub fn sanitize_mermaid(text: &str, is_er: bool) -> String {
    if text.is_empty() {
        return String::new();
    }
    let prefixed = if is_er && text.starts_with(|c: char| c.is_ascii_digit() || c == '-') {
        format!("_{}", text)
    } else {
        text.to_string()
    };
    DISALLOWED_RE.replace_all(&prefixed, "_").into_owned()
}

/// Generate a Mermaid classDiagram.
pub fn to_mermaid(tables: &[Table], relations: &[Relation]) -> String {
    let mut output = String::from("classDiagram\n");

    for table in tables {
        output.push_str(&class_block(table));
        output.push('\n');
    }

    for relation in relations {
        output.push_str(&class_relation(relation));
        output.push('\n');
    }

    output
}

/// Generate a Mermaid erDiagram.
pub fn to_mermaid_er(tables: &[Table], relations: &[Relation]) -> String {
    let mut output = String::from("erDiagram\n");

    for table in tables {
        output.push_str(&entity_block(table));
        output.push('\n');
    }

    for relation in relations {
        output.push_str(&entity_relation(relation));
        output.push('\n');
    }

    output
}

fn class_block(table: &Table) -> String {
    let mut block = format!("class {}{{\n", sanitize_mermaid(&table.name, false));
    for column in &table.columns {
        block.push_str("  ");
        block.push_str(&class_member(column));
        block.push('\n');
    }
    block.push('}');
    block
}

fn class_member(column: &Column) -> String {
    let mut member = column.key_symbol().to_string();
    if let Some(typ) = &column.typ {
        member.push_str(&typ.replace('(', "<").replace(')', ">"));
        member.push(' ');
    }
    member.push_str(&sanitize_mermaid(&column.name, false));
    if !column.is_null {
        member.push_str(" NOT NULL");
    }
    member
}

fn class_relation(relation: &Relation) -> String {
    format!(
        "{} \"{}\" -- \"{}\" {}",
        sanitize_mermaid(&relation.left_table, false),
        class_cardinality(relation.left_cardinality),
        class_cardinality(relation.right_cardinality),
        sanitize_mermaid(&relation.right_table, false),
    )
}

fn class_cardinality(c: Cardinality) -> &'static str {
    match c {
        Cardinality::Many => "0..n",
        Cardinality::ZeroOrOne => "0..1",
        Cardinality::OneOrMore => "1..n",
        Cardinality::One => "1",
        Cardinality::Unspecified => "",
    }
}

fn entity_block(table: &Table) -> String {
    let mut block = format!("{} {{\n", sanitize_mermaid(&table.name, true));
    for column in &table.columns {
        block.push_str("  ");
        block.push_str(&entity_attribute(column));
        block.push('\n');
    }
    block.push('}');
    block
}

fn entity_attribute(column: &Column) -> String {
    let typ = column
        .typ
        .as_deref()
        .map(|t| t.replace(' ', "_"))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "unknown".to_string());
    let mut attribute = format!("{} {}", typ, sanitize_mermaid(&column.name, true));
    if column.is_key {
        attribute.push_str(" PK");
    }
    attribute
}

fn entity_relation(relation: &Relation) -> String {
    format!(
        "{} {}--{} {} : has",
        sanitize_mermaid(&relation.left_table, true),
        crowfoot_left(relation.left_cardinality),
        crowfoot_right(relation.right_cardinality),
        sanitize_mermaid(&relation.right_table, true),
    )
}

// erDiagram markers are written outward-facing on each side of `--`.
fn crowfoot_left(c: Cardinality) -> &'static str {
    match c {
        Cardinality::Many => "}o",
        Cardinality::ZeroOrOne => "|o",
        Cardinality::OneOrMore => "}|",
        Cardinality::One | Cardinality::Unspecified => "||",
    }
}

fn crowfoot_right(c: Cardinality) -> &'static str {
    match c {
        Cardinality::Many => "o{",
        Cardinality::ZeroOrOne => "o|",
        Cardinality::OneOrMore => "|{",
        Cardinality::One | Cardinality::Unspecified => "||",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_mermaid() {
        assert_eq!(sanitize_mermaid("0", false), "0");
        assert_eq!(sanitize_mermaid("0", true), "_0");
        assert_eq!(sanitize_mermaid("-", true), "_-");
        assert_eq!(sanitize_mermaid("-", false), "-");
        assert_eq!(sanitize_mermaid("left/right", false), "left_right");
        assert_eq!(sanitize_mermaid("test", false), "test");
        assert_eq!(sanitize_mermaid("test7", true), "test7");
        assert_eq!(sanitize_mermaid("public.table.column", false), "public_table_column");
        assert_eq!(sanitize_mermaid("public%table!column", false), "public_table_column");
        assert_eq!(sanitize_mermaid("", true), "");
    }

    fn sample() -> (Vec<Table>, Vec<Relation>) {
        let tables = vec![
            Table::new(
                "shop.parent",
                vec![
                    Column::new("id", Some("INTEGER".into()), true, None),
                    Column::new("name", Some("VARCHAR(255)".into()), false, None),
                ],
            ),
            Table::new(
                "child",
                vec![Column::new("parent id", Some("DOUBLE PRECISION".into()), false, Some(false))],
            ),
        ];
        let relations = vec![Relation::new(
            "shop.parent",
            "child",
            Cardinality::One,
            Cardinality::Many,
        )];
        (tables, relations)
    }

    #[test]
    fn test_class_diagram() {
        let (tables, relations) = sample();
        let output = to_mermaid(&tables, &relations);
        assert!(output.starts_with("classDiagram\n"));
        assert!(output.contains("class shop_parent{\n  *INTEGER id NOT NULL\n  VARCHAR<255> name\n}"));
        assert!(output.contains("DOUBLE PRECISION parent_id NOT NULL"));
        assert!(output.contains("shop_parent \"1\" -- \"0..n\" child"));
    }

    #[test]
    fn test_er_diagram() {
        let (tables, relations) = sample();
        let output = to_mermaid_er(&tables, &relations);
        assert!(output.starts_with("erDiagram\n"));
        assert!(output.contains("shop_parent {\n  INTEGER id PK\n  VARCHAR(255) name\n}"));
        assert!(output.contains("DOUBLE_PRECISION parent_id"));
        assert!(output.contains("shop_parent ||--o{ child : has"));
    }

    #[test]
    fn test_class_untyped_column() {
        assert_eq!(class_member(&Column::new("note", None, false, None)), "note");
        assert_eq!(class_member(&Column::new("id", None, true, None)), "*id NOT NULL");
    }

    #[test]
    fn test_er_untyped_column() {
        let column = Column::new("note", None, false, None);
        assert_eq!(entity_attribute(&column), "unknown note");
    }
}
