//! DDL reader: `CREATE TABLE` and `ALTER TABLE ... FOREIGN KEY` into the
//! entity model.

use super::dialect::Dialect;
use super::lexer::{Lexer, Token};
use super::types::normalize_type;
use crate::model::{Cardinality, Column, Relation, Schema, Table};

#[derive(Debug, thiserror::Error)]
pub enum SqlParseError {
    #[error("Expected {expected} in {context}, found {found:?}")]
    Expected {
        expected: &'static str,
        context: String,
        found: Token,
    },
    #[error("Unexpected end of input in {0}")]
    UnexpectedEof(String),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SqlOptions {
    pub dialect: Dialect,
    /// Collapse dialect type spellings (`int4`, `character varying`, ...)
    /// onto one family name instead of keeping the declared text.
    pub normalize_types: bool,
}

/// Read a SQL dump into tables and relations.
pub fn parse_sql(input: &str, options: &SqlOptions) -> Result<Schema, SqlParseError> {
    let dialect = options.dialect.resolve(input);
    let tokens = Lexer::new(input).tokenize();
    let tables = Reader::new(tokens).read_statements()?;
    Ok(build_schema(tables, options.normalize_types.then_some(dialect)))
}

// Words that may follow the first word of a column type.
const TYPE_WORDS: &[&str] = &[
    "PRECISION", "VARYING", "WITH", "WITHOUT", "TIME", "ZONE", "UNSIGNED", "SIGNED", "ZEROFILL",
    "VARCHAR",
];

// Table elements that open with an identifier but declare no column.
const NON_COLUMN_ELEMENTS: &[&str] = &["FULLTEXT", "SPATIAL", "EXCLUDE", "LIKE", "PERIOD"];

/// Text of a token usable as a column name. Keywords that are not reserved
/// in column position come back lower-cased, as unquoted names fold.
fn column_name(token: &Token) -> Option<String> {
    let keyword = match token {
        Token::Ident(name) => return Some(name.clone()),
        Token::Key => "key",
        Token::Index => "index",
        Token::Generated => "generated",
        Token::Collate => "collate",
        Token::Default => "default",
        _ => return None,
    };
    Some(keyword.to_string())
}

fn is_word(word: &str, set: &[&str]) -> bool {
    set.iter().any(|w| w.eq_ignore_ascii_case(word))
}

#[derive(Debug)]
struct ColumnDef {
    name: String,
    typ: String,
    primary: bool,
    not_null: bool,
    unique: bool,
}

impl ColumnDef {
    fn nullable(&self) -> bool {
        !self.primary && !self.not_null
    }
}

#[derive(Debug)]
struct ForeignKey {
    columns: Vec<String>,
    target: String,
    target_columns: Vec<String>,
}

#[derive(Debug)]
struct TableDef {
    name: String,
    columns: Vec<ColumnDef>,
    foreign_keys: Vec<ForeignKey>,
}

impl TableDef {
    fn new(name: String) -> Self {
        Self {
            name,
            columns: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    fn mark_primary(&mut self, names: &[String]) {
        for column in self.columns.iter_mut().filter(|c| names.contains(&c.name)) {
            column.primary = true;
        }
    }

    fn mark_unique(&mut self, names: &[String]) {
        // A composite unique constraint does not make any single column unique.
        if let [name] = names {
            for column in self.columns.iter_mut().filter(|c| &c.name == name) {
                column.unique = true;
            }
        }
    }

    fn primary_key(&self) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.primary)
    }

    fn into_table(self, normalize: Option<Dialect>) -> Table {
        let columns = self
            .columns
            .into_iter()
            .map(|c| {
                let nullable = c.nullable();
                let typ = match normalize {
                    _ if c.typ.is_empty() => None,
                    Some(dialect) => Some(normalize_type(&c.typ, dialect)),
                    None => Some(c.typ),
                };
                Column::new(c.name, typ, c.primary, Some(nullable))
            })
            .collect();
        Table::new(self.name, columns)
    }
}

fn unqualified(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Find a table by exact name, falling back to the unqualified name so that
/// `REFERENCES users` finds `public.users`.
fn resolve(tables: &[TableDef], name: &str) -> Option<usize> {
    tables.iter().position(|t| t.name == name).or_else(|| {
        tables
            .iter()
            .position(|t| unqualified(&t.name) == unqualified(name))
    })
}

struct Reader {
    tokens: Vec<Token>,
    pos: usize,
}

impl Reader {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.current() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek(&self, offset: usize) -> &Token {
        self.tokens.get(self.pos + offset).unwrap_or(&Token::Eof)
    }

    /// `KEY [name] (col, ...)` or `INDEX [name] USING ...` rather than a
    /// column called `key` or `index`.
    fn at_index_definition(&self) -> bool {
        match (self.peek(1), self.peek(2), self.peek(3)) {
            (Token::LParen, _, _) => true,
            (Token::Ident(_), Token::LParen, next) => column_name(next).is_some(),
            (Token::Ident(_), Token::Ident(word), _) => word.eq_ignore_ascii_case("USING"),
            _ => false,
        }
    }

    fn skip_ident(&mut self) {
        if let Token::Ident(_) = self.current() {
            self.advance();
        }
    }

    fn expected(&self, expected: &'static str, context: &str) -> SqlParseError {
        match self.current() {
            Token::Eof => SqlParseError::UnexpectedEof(context.to_string()),
            found => SqlParseError::Expected {
                expected,
                context: context.to_string(),
                found: found.clone(),
            },
        }
    }

    fn skip_statement(&mut self) {
        while !matches!(self.current(), Token::Semicolon | Token::Eof) {
            self.advance();
        }
        self.eat(&Token::Semicolon);
    }

    /// Skip the rest of a table element, stopping before the `,` or `)` that
    /// ends it.
    fn skip_element(&mut self, context: &str) -> Result<(), SqlParseError> {
        let mut depth = 0usize;
        loop {
            match self.current() {
                Token::Eof => return Err(SqlParseError::UnexpectedEof(context.to_string())),
                Token::Comma | Token::RParen if depth == 0 => return Ok(()),
                Token::LParen => depth += 1,
                Token::RParen => depth -= 1,
                _ => {}
            }
            self.advance();
        }
    }

    fn skip_group(&mut self, context: &str) -> Result<(), SqlParseError> {
        let mut depth = 0usize;
        loop {
            match self.current() {
                Token::Eof => return Err(SqlParseError::UnexpectedEof(context.to_string())),
                Token::LParen => depth += 1,
                Token::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return Ok(());
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }

    fn read_statements(&mut self) -> Result<Vec<TableDef>, SqlParseError> {
        let mut tables: Vec<TableDef> = Vec::new();

        loop {
            match self.current() {
                Token::Eof => break,
                Token::Create => {
                    self.advance();
                    // TEMPORARY, UNLOGGED, ...
                    while let Token::Ident(_) = self.current() {
                        self.advance();
                    }
                    if !self.eat(&Token::Table) {
                        self.skip_statement();
                        continue;
                    }
                    if self.eat(&Token::If) {
                        self.eat(&Token::Not);
                        self.eat(&Token::Exists);
                    }
                    if let Some(table) = self.read_create_table()? {
                        match resolve(&tables, &table.name).filter(|&i| tables[i].name == table.name) {
                            Some(i) => tables[i] = table,
                            None => tables.push(table),
                        }
                    }
                }
                Token::Alter => {
                    self.advance();
                    if self.eat(&Token::Table) {
                        self.read_alter_table(&mut tables)?;
                    } else {
                        self.skip_statement();
                    }
                }
                _ => self.advance(),
            }
        }

        Ok(tables)
    }

    fn read_qualified_name(&mut self, context: &str) -> Result<String, SqlParseError> {
        let Token::Ident(first) = self.current() else {
            return Err(self.expected("a name", context));
        };
        let mut name = first.clone();
        self.advance();
        while self.eat(&Token::Dot) {
            let Token::Ident(part) = self.current() else {
                return Err(self.expected("a name after '.'", context));
            };
            name.push('.');
            name.push_str(part);
            self.advance();
        }
        Ok(name)
    }

    /// `(a, b DESC, c(10))` -> `[a, b, c]`
    fn read_column_list(&mut self, context: &str) -> Result<Vec<String>, SqlParseError> {
        if !self.eat(&Token::LParen) {
            return Err(self.expected("'('", context));
        }
        let mut columns = Vec::new();
        let mut depth = 1usize;
        let mut expect_name = true;
        loop {
            match self.current() {
                Token::Eof => return Err(SqlParseError::UnexpectedEof(context.to_string())),
                token if expect_name && depth == 1 && column_name(token).is_some() => {
                    columns.extend(column_name(token));
                    expect_name = false;
                }
                Token::Comma if depth == 1 => expect_name = true,
                Token::LParen => depth += 1,
                Token::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return Ok(columns);
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }

    fn read_create_table(&mut self) -> Result<Option<TableDef>, SqlParseError> {
        let name = self.read_qualified_name("CREATE TABLE")?;
        let context = format!("CREATE TABLE {}", name);

        // CREATE TABLE ... AS SELECT, PARTITION OF, ...
        if !self.eat(&Token::LParen) {
            self.skip_statement();
            return Ok(None);
        }

        let mut table = TableDef::new(name);
        loop {
            match self.current() {
                Token::RParen => {
                    self.advance();
                    break;
                }
                Token::Eof => return Err(SqlParseError::UnexpectedEof(context)),
                Token::Comma => self.advance(),
                Token::Constraint => {
                    self.advance();
                    self.skip_ident();
                }
                Token::Primary => {
                    self.advance();
                    self.eat(&Token::Key);
                    let columns = self.read_column_list(&context)?;
                    table.mark_primary(&columns);
                    self.skip_element(&context)?;
                }
                Token::Unique => {
                    self.advance();
                    if !self.eat(&Token::Key) {
                        self.eat(&Token::Index);
                    }
                    self.skip_ident();
                    let columns = self.read_column_list(&context)?;
                    table.mark_unique(&columns);
                    self.skip_element(&context)?;
                }
                Token::Foreign => {
                    let fk = self.read_foreign_key(&context)?;
                    table.foreign_keys.push(fk);
                    self.skip_element(&context)?;
                }
                Token::Ident(word) if !is_word(word, NON_COLUMN_ELEMENTS) => {
                    self.read_column(&context, &mut table)?;
                }
                Token::Key | Token::Index if self.at_index_definition() => {
                    self.skip_element(&context)?;
                }
                Token::Key | Token::Index | Token::Generated | Token::Collate | Token::Default => {
                    self.read_column(&context, &mut table)?;
                }
                _ => self.skip_element(&context)?,
            }
        }

        // ENGINE=..., PARTITION BY ...
        self.skip_statement();
        Ok(Some(table))
    }

    fn read_column(&mut self, context: &str, table: &mut TableDef) -> Result<(), SqlParseError> {
        let name = match self.current() {
            Token::Ident(_) => self.read_qualified_name(context)?,
            token => {
                let name = column_name(token).ok_or_else(|| self.expected("a column name", context))?;
                self.advance();
                name
            }
        };
        let typ = self.read_type();
        let mut column = ColumnDef {
            name,
            typ,
            primary: false,
            not_null: false,
            unique: false,
        };

        loop {
            match self.current() {
                Token::Comma | Token::RParen => break,
                Token::Eof => return Err(SqlParseError::UnexpectedEof(context.to_string())),
                Token::Primary => {
                    self.advance();
                    self.eat(&Token::Key);
                    column.primary = true;
                }
                Token::Not => {
                    self.advance();
                    if self.eat(&Token::Null) {
                        column.not_null = true;
                    }
                }
                Token::Unique => {
                    self.advance();
                    self.eat(&Token::Key);
                    column.unique = true;
                }
                Token::References => {
                    self.advance();
                    let (target, target_columns) = self.read_reference(context)?;
                    table.foreign_keys.push(ForeignKey {
                        columns: vec![column.name.clone()],
                        target,
                        target_columns,
                    });
                }
                // CHECK (...), DEFAULT (...), GENERATED ... AS (...)
                Token::LParen => self.skip_group(context)?,
                _ => self.advance(),
            }
        }

        table.columns.push(column);
        Ok(())
    }

    /// Column type text as declared, e.g. `NUMERIC(10,2)`,
    /// `TIMESTAMP WITH TIME ZONE`, `integer[]`. Empty when the column has no
    /// type.
    fn read_type(&mut self) -> String {
        let mut typ = String::new();
        loop {
            match self.current() {
                Token::Ident(word) if typ.is_empty() || is_word(word, TYPE_WORDS) => {
                    if !typ.is_empty() {
                        typ.push(' ');
                    }
                    typ.push_str(word);
                }
                Token::LParen if !typ.is_empty() && !typ.ends_with(')') => {
                    let args = self.read_type_args();
                    typ.push_str(&args);
                    continue;
                }
                Token::LBracket if !typ.is_empty() => {
                    self.advance();
                    if let Token::Num(_) = self.current() {
                        self.advance();
                    }
                    self.eat(&Token::RBracket);
                    typ.push_str("[]");
                    continue;
                }
                _ => break,
            }
            self.advance();
        }
        typ
    }

    fn read_type_args(&mut self) -> String {
        let mut args = String::new();
        let mut depth = 0usize;
        loop {
            match self.current() {
                Token::Eof => break,
                Token::LParen => {
                    depth += 1;
                    args.push('(');
                }
                Token::RParen => {
                    depth -= 1;
                    args.push(')');
                    if depth == 0 {
                        self.advance();
                        break;
                    }
                }
                Token::Comma => args.push(','),
                Token::Num(text) | Token::Ident(text) => args.push_str(text),
                Token::Str(text) => {
                    args.push('\'');
                    args.push_str(&text.replace('\'', "''"));
                    args.push('\'');
                }
                _ => {}
            }
            self.advance();
        }
        args
    }

    fn read_reference(&mut self, context: &str) -> Result<(String, Vec<String>), SqlParseError> {
        let target = self.read_qualified_name(context)?;
        let columns = if self.current() == &Token::LParen {
            self.read_column_list(context)?
        } else {
            Vec::new()
        };
        Ok((target, columns))
    }

    fn read_foreign_key(&mut self, context: &str) -> Result<ForeignKey, SqlParseError> {
        self.advance(); // FOREIGN
        if !self.eat(&Token::Key) {
            return Err(self.expected("KEY", context));
        }
        // MySQL allows an index name here.
        self.skip_ident();
        let columns = self.read_column_list(context)?;
        if !self.eat(&Token::References) {
            return Err(self.expected("REFERENCES", context));
        }
        let (target, target_columns) = self.read_reference(context)?;
        Ok(ForeignKey {
            columns,
            target,
            target_columns,
        })
    }

    fn read_alter_table(&mut self, tables: &mut [TableDef]) -> Result<(), SqlParseError> {
        if self.eat(&Token::If) {
            self.eat(&Token::Exists);
        }
        self.eat(&Token::Only);
        let name = self.read_qualified_name("ALTER TABLE")?;
        let context = format!("ALTER TABLE {}", name);
        let index = resolve(tables, &name);

        loop {
            match self.current() {
                Token::Semicolon | Token::Eof => break,
                Token::Add => {
                    self.advance();
                    if self.eat(&Token::Constraint) {
                        self.skip_ident();
                    }
                    match self.current() {
                        Token::Foreign => {
                            let fk = self.read_foreign_key(&context)?;
                            if let Some(i) = index {
                                tables[i].foreign_keys.push(fk);
                            }
                        }
                        Token::Primary => {
                            self.advance();
                            self.eat(&Token::Key);
                            let columns = self.read_column_list(&context)?;
                            if let Some(i) = index {
                                tables[i].mark_primary(&columns);
                            }
                        }
                        Token::Unique => {
                            self.advance();
                            if !self.eat(&Token::Key) {
                                self.eat(&Token::Index);
                            }
                            self.skip_ident();
                            let columns = self.read_column_list(&context)?;
                            if let Some(i) = index {
                                tables[i].mark_unique(&columns);
                            }
                        }
                        // ADD COLUMN and friends
                        _ => {}
                    }
                }
                _ => self.advance(),
            }
        }

        self.eat(&Token::Semicolon);
        Ok(())
    }
}

fn build_schema(tables: Vec<TableDef>, normalize: Option<Dialect>) -> Schema {
    let relations = tables
        .iter()
        .flat_map(|child| {
            child
                .foreign_keys
                .iter()
                .filter_map(|fk| infer_relation(&tables, child, fk))
                .collect::<Vec<_>>()
        })
        .collect();

    let tables = tables.into_iter().map(|t| t.into_table(normalize)).collect();
    Schema::new(tables, relations)
}

/// One relation per foreign key: left is the referenced table, right the
/// referencing one. Keys to undeclared tables or columns yield nothing.
fn infer_relation(tables: &[TableDef], child: &TableDef, fk: &ForeignKey) -> Option<Relation> {
    let parent_index = resolve(tables, &fk.target)?;
    let parent = &tables[parent_index];
    let column = child.column(fk.columns.first()?)?;

    let target_column = fk
        .target_columns
        .first()
        .cloned()
        .or_else(|| parent.primary_key().map(|c| c.name.clone()));

    let right = if is_one_to_one(tables, child, column, parent_index) {
        Cardinality::One
    } else {
        Cardinality::Many
    };
    let left = if column.nullable() {
        Cardinality::ZeroOrOne
    } else {
        Cardinality::One
    };

    Some(
        Relation::new(&parent.name, &child.name, left, right)
            .with_columns(target_column, Some(column.name.clone())),
    )
}

fn is_one_to_one(tables: &[TableDef], child: &TableDef, column: &ColumnDef, parent: usize) -> bool {
    let key_count = child.columns.iter().filter(|c| c.primary).count();
    if (key_count == 1 && column.primary) || column.unique {
        return true;
    }

    // Every column is a foreign key into the same parent.
    child.columns.iter().all(|c| {
        child
            .foreign_keys
            .iter()
            .filter(|fk| fk.columns.contains(&c.name))
            .any(|fk| resolve(tables, &fk.target) == Some(parent))
    }) && child
        .foreign_keys
        .iter()
        .all(|fk| resolve(tables, &fk.target) == Some(parent))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(sql: &str) -> Schema {
        parse_sql(sql, &SqlOptions::default()).unwrap()
    }

    fn only_relation(schema: &Schema) -> &Relation {
        assert_eq!(schema.relations.len(), 1, "{:?}", schema.relations);
        &schema.relations[0]
    }

    #[test]
    fn test_simple_table() {
        let schema = parse(
            r#"
            CREATE TABLE users (
                id INTEGER PRIMARY KEY,
                email VARCHAR(255) NOT NULL UNIQUE,
                nickname TEXT
            );
            "#,
        );

        assert_eq!(schema.tables.len(), 1);
        let users = &schema.tables[0];
        assert_eq!(users.name, "users");
        assert_eq!(
            users.columns,
            vec![
                Column::new("id", Some("INTEGER".into()), true, Some(false)),
                Column::new("email", Some("VARCHAR(255)".into()), false, Some(false)),
                Column::new("nickname", Some("TEXT".into()), false, Some(true)),
            ]
        );
        assert!(schema.relations.is_empty());
    }

    #[test]
    fn test_types_are_kept_verbatim() {
        let schema = parse(
            "CREATE TABLE t (
                a DOUBLE PRECISION,
                b NUMERIC(10, 2) DEFAULT 0,
                c TIMESTAMP WITH TIME ZONE DEFAULT now(),
                d integer[],
                e INT(11) UNSIGNED AUTO_INCREMENT,
                f character varying(40) COLLATE pg_catalog.\"default\",
                g ENUM('on', 'off')
            );",
        );
        let types: Vec<_> = schema.tables[0]
            .columns
            .iter()
            .map(|c| c.typ.clone().unwrap_or_default())
            .collect();
        assert_eq!(
            types,
            vec![
                "DOUBLE PRECISION",
                "NUMERIC(10,2)",
                "TIMESTAMP WITH TIME ZONE",
                "integer[]",
                "INT(11) UNSIGNED",
                "character varying(40)",
                "ENUM('on','off')",
            ]
        );
    }

    #[test]
    fn test_normalized_types() {
        let sql = "-- PostgreSQL database dump\nCREATE TABLE t (id serial PRIMARY KEY, at timestamptz);";
        let options = SqlOptions {
            normalize_types: true,
            ..SqlOptions::default()
        };
        let schema = parse_sql(sql, &options).unwrap();
        let columns = &schema.tables[0].columns;
        assert_eq!(columns[0].typ.as_deref(), Some("INTEGER"));
        assert_eq!(columns[1].typ.as_deref(), Some("TIMESTAMP"));
    }

    #[test]
    fn test_keyword_column_names() {
        let schema = parse(
            "CREATE TABLE settings (key TEXT PRIMARY KEY, value TEXT, generated BOOLEAN, \"default\" INT);
             CREATE TABLE overrides (
                 id INT PRIMARY KEY,
                 setting TEXT NOT NULL REFERENCES settings(key),
                 index INT,
                 KEY idx_setting (setting),
                 INDEX (index),
                 UNIQUE (index)
             );",
        );
        let settings = schema.table("settings").unwrap();
        let names: Vec<&str> = settings.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["key", "value", "generated", "default"]);
        assert!(settings.column("key").unwrap().is_key);

        let overrides = schema.table("overrides").unwrap();
        let names: Vec<&str> = overrides.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "setting", "index"]);
        assert_eq!(overrides.column("index").unwrap().typ.as_deref(), Some("INT"));

        let relation = only_relation(&schema);
        assert_eq!(relation.left_column.as_deref(), Some("key"));
        assert_eq!(relation.left_cardinality, Cardinality::One);
    }

    #[test]
    fn test_untyped_column() {
        let schema = parse("CREATE TABLE t (id PRIMARY KEY, note);");
        assert_eq!(schema.tables[0].columns[0].typ, None);
        assert!(schema.tables[0].columns[0].is_key);
        assert_eq!(schema.tables[0].columns[1].name, "note");
    }

    #[test]
    fn test_nullable_foreign_key() {
        let schema = parse(
            "CREATE TABLE parent (id INTEGER PRIMARY KEY);
             CREATE TABLE child (
                 id INTEGER PRIMARY KEY,
                 parent_id INTEGER REFERENCES parent(id)
             );",
        );
        let relation = only_relation(&schema);
        assert_eq!(relation.left_table, "parent");
        assert_eq!(relation.right_table, "child");
        assert_eq!(relation.left_column.as_deref(), Some("id"));
        assert_eq!(relation.right_column.as_deref(), Some("parent_id"));
        assert_eq!(relation.left_cardinality, Cardinality::ZeroOrOne);
        assert_eq!(relation.right_cardinality, Cardinality::Many);
    }

    #[test]
    fn test_compound_key_with_foreign_key() {
        let schema = parse(
            "CREATE TABLE parent (id INTEGER PRIMARY KEY);
             CREATE TABLE child (
                 id INTEGER,
                 parent INTEGER REFERENCES parent(id),
                 PRIMARY KEY (id, parent)
             );",
        );
        let relation = only_relation(&schema);
        assert_eq!(relation.left_cardinality, Cardinality::One);
        assert_eq!(relation.right_cardinality, Cardinality::Many);
    }

    #[test]
    fn test_unique_foreign_key_is_one_to_one() {
        let schema = parse(
            "CREATE TABLE users (id INT PRIMARY KEY);
             CREATE TABLE profiles (
                 id INT PRIMARY KEY,
                 user_id INT NOT NULL,
                 CONSTRAINT uq_user UNIQUE (user_id),
                 CONSTRAINT fk_user FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
             );",
        );
        let relation = only_relation(&schema);
        assert_eq!(relation.left_cardinality, Cardinality::One);
        assert_eq!(relation.right_cardinality, Cardinality::One);
    }

    #[test]
    fn test_shared_primary_key_is_one_to_one() {
        let schema = parse(
            "CREATE TABLE users (id INT PRIMARY KEY);
             CREATE TABLE settings (user_id INT PRIMARY KEY REFERENCES users, theme TEXT);",
        );
        let relation = only_relation(&schema);
        assert_eq!(relation.right_cardinality, Cardinality::One);
        // no column list: the parent's primary key
        assert_eq!(relation.left_column.as_deref(), Some("id"));
    }

    #[test]
    fn test_all_columns_to_same_parent() {
        let schema = parse(
            "CREATE TABLE node (id INT PRIMARY KEY);
             CREATE TABLE edge (
                 a INT REFERENCES node(id),
                 b INT REFERENCES node(id),
                 PRIMARY KEY (a, b)
             );
             CREATE TABLE tag (id INT PRIMARY KEY);
             CREATE TABLE node_tag (
                 node_id INT REFERENCES node(id),
                 tag_id INT REFERENCES tag(id),
                 PRIMARY KEY (node_id, tag_id)
             );",
        );
        assert_eq!(schema.relations.len(), 4);
        for relation in &schema.relations {
            let expected = if relation.right_table == "edge" {
                Cardinality::One
            } else {
                Cardinality::Many
            };
            assert_eq!(relation.right_cardinality, expected, "{}", relation);
            assert_eq!(relation.left_cardinality, Cardinality::One);
        }
    }

    #[test]
    fn test_alter_table_foreign_key() {
        let schema = parse(
            r#"
            -- PostgreSQL database dump
            CREATE TABLE public.parent (id integer NOT NULL);
            CREATE TABLE public.child (id integer NOT NULL, parent_id integer NOT NULL);
            ALTER TABLE ONLY public.parent ADD CONSTRAINT parent_pkey PRIMARY KEY (id);
            ALTER TABLE ONLY public.child
                ADD CONSTRAINT child_parent_fkey FOREIGN KEY (parent_id) REFERENCES public.parent(id);
            "#,
        );
        assert_eq!(schema.tables[0].name, "public.parent");
        assert!(schema.tables[0].columns[0].is_key);
        let relation = only_relation(&schema);
        assert_eq!(relation.left_table, "public.parent");
        assert_eq!(relation.right_table, "public.child");
        assert_eq!(relation.left_cardinality, Cardinality::One);
        assert_eq!(relation.right_cardinality, Cardinality::Many);
    }

    #[test]
    fn test_unqualified_reference_resolves() {
        let schema = parse(
            "CREATE TABLE app.users (id INT PRIMARY KEY);
             CREATE TABLE app.posts (id INT PRIMARY KEY, author INT REFERENCES users(id));",
        );
        assert_eq!(only_relation(&schema).left_table, "app.users");
    }

    #[test]
    fn test_mysql_dump() {
        let schema = parse(
            r#"
            CREATE TABLE `orders` (
              `id` int(11) NOT NULL AUTO_INCREMENT,
              `customer_id` int(11) DEFAULT NULL,
              PRIMARY KEY (`id`),
              KEY `idx_customer` (`customer_id`),
              FULLTEXT KEY `ft` (`id`),
              CONSTRAINT `fk_customer` FOREIGN KEY (`customer_id`) REFERENCES `customers` (`id`)
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4;
            CREATE TABLE `customers` (`id` int(11) NOT NULL, PRIMARY KEY (`id`));
            "#,
        );
        let orders = schema.table("orders").unwrap();
        assert_eq!(orders.columns.len(), 2);
        assert!(orders.column("id").unwrap().is_key);
        assert!(orders.column("customer_id").unwrap().is_null);
        let relation = only_relation(&schema);
        assert_eq!(relation.left_table, "customers");
        assert_eq!(relation.left_cardinality, Cardinality::ZeroOrOne);
    }

    #[test]
    fn test_foreign_key_to_undeclared_table_is_skipped() {
        let schema = parse("CREATE TABLE child (id INT PRIMARY KEY, p INT REFERENCES missing(id));");
        assert!(schema.relations.is_empty());
    }

    #[test]
    fn test_other_statements_are_skipped() {
        let schema = parse(
            "SET client_encoding = 'UTF8';
             CREATE INDEX idx ON t (a);
             CREATE TABLE IF NOT EXISTS t (a INT);
             CREATE VIEW v AS SELECT * FROM t;
             INSERT INTO t VALUES (1);",
        );
        assert_eq!(schema.tables.len(), 1);
        assert_eq!(schema.tables[0].name, "t");
    }

    #[test]
    fn test_unterminated_table() {
        let err = parse_sql("CREATE TABLE t (id INT", &SqlOptions::default()).unwrap_err();
        assert!(matches!(err, SqlParseError::UnexpectedEof(ref ctx) if ctx == "CREATE TABLE t"));
    }

    #[test]
    fn test_missing_table_name() {
        let err = parse_sql("CREATE TABLE (id INT);", &SqlOptions::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected a name in CREATE TABLE, found LParen"
        );
    }

    #[test]
    fn test_sql_schema_round_trips_through_markup() {
        let schema = parse(
            "CREATE TABLE parent (id INTEGER PRIMARY KEY, name VARCHAR(255));
             CREATE TABLE child (id INTEGER PRIMARY KEY, parent_id INTEGER REFERENCES parent(id));",
        );
        let markup = crate::serializer::to_markup(&schema.tables, &schema.relations);
        let reparsed = crate::parser::parse_str(&markup).unwrap();
        assert_eq!(reparsed.tables, schema.tables);
        assert_eq!(reparsed.relations, schema.relations);
    }
}
