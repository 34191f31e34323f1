//! Graphviz DOT output.
//!
//! Tables become HTML-like label nodes, relations become edges carrying the
//! cardinality of each end. Styling is driven by [`DotConfig`].

use std::fmt;
use std::str::FromStr;

use crate::model::{Cardinality, Column, Drawable, Relation, Table};

const TABLE_OPEN: &str = "<FONT FACE=\"Helvetica\"><TABLE BORDER=\"0\" CELLBORDER=\"1\" CELLPADDING=\"4\" CELLSPACING=\"0\">";
const TABLE_CLOSE: &str = "</TABLE></FONT>";

/// How key columns are marked inside a table node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyMarker {
    #[default]
    Underline,
    Asterisk,
}

impl KeyMarker {
    fn opening(self) -> &'static str {
        match self {
            KeyMarker::Underline => "<u>",
            KeyMarker::Asterisk => "*",
        }
    }

    fn closing(self) -> &'static str {
        match self {
            KeyMarker::Underline => "</u>",
            KeyMarker::Asterisk => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    LR,
    TB,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphKind {
    #[default]
    Graph,
    Digraph,
}

impl GraphKind {
    fn keyword(self) -> &'static str {
        match self {
            GraphKind::Graph => "graph",
            GraphKind::Digraph => "digraph",
        }
    }

    fn edge_op(self) -> &'static str {
        match self {
            GraphKind::Graph => "--",
            GraphKind::Digraph => "->",
        }
    }
}

/// How cardinalities are drawn on edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelationStyle {
    /// Text labels at each end (`0..N`, `{0,1}`, ...).
    #[default]
    Label,
    /// Crow's foot arrow shapes.
    Crowfoot,
}

/// Rendering options for [`to_dot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DotConfig {
    pub key_marker: KeyMarker,
    pub direction: Direction,
    pub graph_kind: GraphKind,
    pub relation_style: RelationStyle,
}

macro_rules! impl_option_parsing {
    ($ty:ident, $what:literal, { $($text:literal => $variant:ident),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($text => Ok($ty::$variant),)+
                    _ => Err(format!(
                        concat!("Unknown ", $what, ": {}. Valid options: {}"),
                        s,
                        [$($text),+].join(", ")
                    )),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $($ty::$variant => f.write_str($text),)+
                }
            }
        }
    };
}

impl_option_parsing!(KeyMarker, "key marker", { "underline" => Underline, "asterisk" => Asterisk });
impl_option_parsing!(GraphKind, "graph kind", { "graph" => Graph, "digraph" => Digraph });
impl_option_parsing!(RelationStyle, "relation style", { "label" => Label, "crowfoot" => Crowfoot });

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LR" => Ok(Direction::LR),
            "TB" => Ok(Direction::TB),
            _ => Err(format!("Unknown direction: {}. Valid options: LR, TB", s)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::LR => f.write_str("LR"),
            Direction::TB => f.write_str("TB"),
        }
    }
}

/// Generate a complete DOT document.
pub fn to_dot(tables: &[Table], relations: &[Relation], config: &DotConfig) -> String {
    let mut output = preamble(config);

    for table in tables {
        output.push_str("    ");
        output.push_str(&table.to_dot(config));
        output.push('\n');
    }

    for relation in relations {
        output.push_str("    ");
        output.push_str(&with_known_ports(relation, tables).to_dot(config));
        output.push('\n');
    }

    output.push_str("}\n");
    output
}

/// Drop edge ports whose column is not drawn, e.g. after column filtering.
fn with_known_ports(relation: &Relation, tables: &[Table]) -> Relation {
    let known = |table: &str, column: &Option<String>| {
        column
            .clone()
            .filter(|c| tables.iter().any(|t| t.name == table && t.has_column(c)))
    };
    let mut relation = relation.clone();
    relation.left_column = known(&relation.left_table, &relation.left_column);
    relation.right_column = known(&relation.right_table, &relation.right_column);
    relation
}

fn preamble(config: &DotConfig) -> String {
    format!(
        "{} {{\n\
         \x20   graph [rankdir={}];\n\
         \x20   node [label=\"\\N\",\n\
         \x20       shape=plaintext\n\
         \x20   ];\n\
         \x20   edge [color=gray50,\n\
         \x20       minlen=2,\n\
         \x20       style=dashed\n\
         \x20   ];\n",
        config.graph_kind.keyword(),
        config.direction
    )
}

pub fn table_node(table: &Table, config: &DotConfig) -> String {
    let header = format!(
        "<TR><TD><B><FONT POINT-SIZE=\"16\">{}</FONT></B></TD></TR>",
        escape_html(&table.name)
    );
    let body: String = table.columns.iter().map(|c| c.to_dot(config)).collect();
    format!(
        "{} [label=<{}{}{}{}>];",
        quote_id(&table.name),
        TABLE_OPEN,
        header,
        body,
        TABLE_CLOSE
    )
}

pub fn column_row(column: &Column, config: &DotConfig) -> String {
    let (opening, closing) = if column.is_key {
        (config.key_marker.opening(), config.key_marker.closing())
    } else {
        ("", "")
    };
    let typ = column
        .typ
        .as_deref()
        .map(|t| format!("<FONT> [{}]</FONT>", escape_html(t)))
        .unwrap_or_default();
    let null = if column.is_null { "" } else { " NOT NULL" };
    format!(
        "<TR><TD ALIGN=\"LEFT\" PORT=\"{}\">{}<FONT>{}</FONT>{}{}{}</TD></TR>",
        escape_attr(&column.name),
        opening,
        escape_html(&column.name),
        closing,
        typ,
        null
    )
}

pub fn relation_edge(relation: &Relation, config: &DotConfig) -> String {
    let edge = format!(
        "{}{} {} {}{}",
        quote_id(&relation.left_table),
        port(relation.left_column.as_deref()),
        config.graph_kind.edge_op(),
        quote_id(&relation.right_table),
        port(relation.right_column.as_deref()),
    );

    let attrs = match config.relation_style {
        RelationStyle::Label => label_attrs(relation),
        RelationStyle::Crowfoot => crowfoot_attrs(relation),
    };

    if attrs.is_empty() {
        format!("{};", edge)
    } else {
        format!("{} [{}];", edge, attrs.join(","))
    }
}

fn label_attrs(relation: &Relation) -> Vec<String> {
    let mut attrs = Vec::new();
    if let Some(text) = cardinality_text(relation.left_cardinality) {
        attrs.push(format!("taillabel=<<FONT>{}</FONT>>", text));
    }
    if let Some(text) = cardinality_text(relation.right_cardinality) {
        attrs.push(format!("headlabel=<<FONT>{}</FONT>>", text));
    }
    attrs
}

fn crowfoot_attrs(relation: &Relation) -> Vec<String> {
    let tail = crowfoot_shape(relation.left_cardinality);
    let head = crowfoot_shape(relation.right_cardinality);
    if tail.is_none() && head.is_none() {
        return Vec::new();
    }
    vec![
        format!("arrowtail={}", tail.unwrap_or("none")),
        format!("arrowhead={}", head.unwrap_or("none")),
        "dir=both".to_string(),
    ]
}

pub fn cardinality_text(c: Cardinality) -> Option<&'static str> {
    match c {
        Cardinality::Many => Some("0..N"),
        Cardinality::ZeroOrOne => Some("{0,1}"),
        Cardinality::OneOrMore => Some("1..N"),
        Cardinality::One => Some("1"),
        Cardinality::Unspecified => None,
    }
}

fn crowfoot_shape(c: Cardinality) -> Option<&'static str> {
    match c {
        Cardinality::Many => Some("crowodot"),
        Cardinality::ZeroOrOne => Some("teeodot"),
        Cardinality::OneOrMore => Some("crowtee"),
        Cardinality::One => Some("teetee"),
        Cardinality::Unspecified => None,
    }
}

fn port(column: Option<&str>) -> String {
    column.map(|c| format!(":{}", quote_id(c))).unwrap_or_default()
}

/// Quote a DOT identifier.
fn quote_id(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Escape text placed inside an HTML-like label.
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape an attribute value inside an HTML-like label.
fn escape_attr(s: &str) -> String {
    escape_html(s).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    fn simple() -> (Vec<Table>, Vec<Relation>) {
        let schema = parse_str(
            "[parent]\n*id {label:\"INTEGER\"}\nname {label:\"VARCHAR(255)\"}\n\
             [child]\n*id {label:\"INTEGER\"}\nparent_id {label:\"INTEGER\"}\n\
             parent.\"id\" *--? child.\"parent_id\"\n",
        )
        .unwrap();
        (schema.tables, schema.relations)
    }

    #[test]
    fn test_column_row_key() {
        let id = Column::new("id", Some("INTEGER".into()), true, None);
        assert_eq!(
            column_row(&id, &DotConfig::default()),
            "<TR><TD ALIGN=\"LEFT\" PORT=\"id\"><u><FONT>id</FONT></u><FONT> [INTEGER]</FONT> NOT NULL</TD></TR>"
        );

        let config = DotConfig {
            key_marker: KeyMarker::Asterisk,
            ..DotConfig::default()
        };
        assert!(column_row(&id, &config).contains("*<FONT>id</FONT><FONT>"));
    }

    #[test]
    fn test_column_row_plain() {
        let name = Column::new("name", None, false, None);
        assert_eq!(
            column_row(&name, &DotConfig::default()),
            "<TR><TD ALIGN=\"LEFT\" PORT=\"name\"><FONT>name</FONT></TD></TR>"
        );
    }

    #[test]
    fn test_html_is_escaped_in_labels() {
        let col = Column::new("a<b", Some("MAP<TEXT, INT>".into()), false, None);
        let row = column_row(&col, &DotConfig::default());
        assert!(row.contains("<FONT>a&lt;b</FONT>"));
        assert!(row.contains("[MAP&lt;TEXT, INT&gt;]"));
    }

    #[test]
    fn test_port_attributes_are_escaped() {
        let schema = parse_str(
            "[budget]\n*id {label:\"INT\"}\nR&D cost {label:\"INT\"}\na<b\n\
             [other]\n*id\nbudget.\"R&D cost\" 1--* other.\"id\"\n",
        )
        .unwrap();
        let mut tables = schema.tables;
        tables[0].columns.push(Column::new("a\"b", None, false, None));

        let dot = to_dot(&tables, &schema.relations, &DotConfig::default());
        assert!(dot.contains("PORT=\"R&amp;D cost\"><FONT>R&amp;D cost</FONT>"));
        assert!(dot.contains("PORT=\"a&lt;b\"><FONT>a&lt;b</FONT>"));
        assert!(dot.contains("PORT=\"a&quot;b\">"));
        assert!(!dot.contains("PORT=\"R&D"));
        // edge ports are DOT identifiers, not HTML
        assert!(dot.contains("\"budget\":\"R&D cost\" -- \"other\":\"id\""));
    }

    #[test]
    fn test_edge_ports_follow_drawn_columns() {
        let (tables, relations) = simple();
        let filter = crate::filter::Filter::new(None, None, None, Some(&["id"][..])).unwrap();
        let (tables, relations) = crate::filter::filter_resources(&tables, &relations, &filter);
        assert_eq!(relations[0].left_column.as_deref(), Some("id"));

        let dot = to_dot(&tables, &relations, &DotConfig::default());
        assert!(dot.contains("\"parent\" -- \"child\":\"parent_id\" [taillabel="));
        assert!(!dot.contains(":\"id\""));
    }

    #[test]
    fn test_relation_edge_labels() {
        let (_, relations) = simple();
        assert_eq!(
            relation_edge(&relations[0], &DotConfig::default()),
            "\"parent\":\"id\" -- \"child\":\"parent_id\" [taillabel=<<FONT>0..N</FONT>>,headlabel=<<FONT>{0,1}</FONT>>];"
        );
    }

    #[test]
    fn test_relation_edge_without_cardinality() {
        let r = Relation::new("a", "b", Cardinality::Unspecified, Cardinality::Unspecified);
        assert_eq!(relation_edge(&r, &DotConfig::default()), "\"a\" -- \"b\";");

        let crow = DotConfig {
            relation_style: RelationStyle::Crowfoot,
            ..DotConfig::default()
        };
        assert_eq!(relation_edge(&r, &crow), "\"a\" -- \"b\";");
    }

    #[test]
    fn test_relation_edge_crowfoot_digraph() {
        let r = Relation::new("a", "b", Cardinality::One, Cardinality::Many);
        let config = DotConfig {
            graph_kind: GraphKind::Digraph,
            relation_style: RelationStyle::Crowfoot,
            ..DotConfig::default()
        };
        assert_eq!(
            relation_edge(&r, &config),
            "\"a\" -> \"b\" [arrowtail=teetee,arrowhead=crowodot,dir=both];"
        );
    }

    #[test]
    fn test_document_structure() {
        let (tables, relations) = simple();
        let dot = to_dot(&tables, &relations, &DotConfig::default());
        assert!(dot.starts_with("graph {\n"));
        assert!(dot.contains("rankdir=LR"));
        assert!(dot.ends_with("}\n"));
        assert_eq!(dot.matches("[label=<").count(), 2);
        assert_eq!(dot.matches('{').count(), dot.matches('}').count());
        assert!(dot.contains("<u><FONT>id</FONT></u>"));
    }

    #[test]
    fn test_document_options() {
        let config = DotConfig {
            direction: Direction::TB,
            graph_kind: GraphKind::Digraph,
            ..DotConfig::default()
        };
        let dot = to_dot(&[], &[], &config);
        assert!(dot.starts_with("digraph {\n"));
        assert!(dot.contains("rankdir=TB"));
    }

    #[test]
    fn test_qualified_names_are_quoted() {
        let table = Table::new("shop.order \"items\"", vec![]);
        let node = table_node(&table, &DotConfig::default());
        assert!(node.starts_with("\"shop.order \\\"items\\\"\" [label=<"));
    }

    #[test]
    fn test_option_parsing() {
        assert_eq!("tb".parse::<Direction>(), Ok(Direction::TB));
        assert_eq!("Asterisk".parse::<KeyMarker>(), Ok(KeyMarker::Asterisk));
        assert_eq!("digraph".parse::<GraphKind>(), Ok(GraphKind::Digraph));
        assert!("sideways".parse::<Direction>().is_err());
        assert_eq!(RelationStyle::Crowfoot.to_string(), "crowfoot");
    }
}
