//! SQL tokenizer for DDL statements.

use std::iter::Peekable;
use std::str::Chars;

/// SQL token types. Only the keywords the DDL reader branches on get their
/// own variant; everything else is an identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Create,
    Alter,
    Add,
    Table,
    Only,
    If,
    Not,
    Exists,
    Primary,
    Key,
    Foreign,
    References,
    Unique,
    Null,
    Default,
    Constraint,
    Check,
    On,
    Index,
    AutoIncrement,
    Generated,
    Collate,

    Ident(String),
    Str(String),
    Num(String),

    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Dot,

    Eof,
}

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    fn skip_line(&mut self) {
        for c in self.chars.by_ref() {
            if c == '\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) {
        let mut prev = None;
        for c in self.chars.by_ref() {
            if prev == Some('*') && c == '/' {
                break;
            }
            prev = Some(c);
        }
    }

    fn read_word(&mut self, first: char) -> String {
        let mut s = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                s.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        s
    }

    fn read_number(&mut self, first: char) -> String {
        let mut s = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() || c == '.' {
                s.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        s
    }

    /// Read up to `close`; a doubled closing character stands for itself.
    fn read_quoted(&mut self, close: char) -> String {
        let mut s = String::new();
        while let Some(c) = self.chars.next() {
            if c == close {
                if self.chars.peek() == Some(&close) {
                    s.push(c);
                    self.chars.next();
                } else {
                    break;
                }
            } else if c == '\\' && close == '\'' {
                if let Some(escaped) = self.chars.next() {
                    s.push(escaped);
                }
            } else {
                s.push(c);
            }
        }
        s
    }

    fn keyword_or_ident(word: String) -> Token {
        match word.to_uppercase().as_str() {
            "CREATE" => Token::Create,
            "ALTER" => Token::Alter,
            "ADD" => Token::Add,
            "TABLE" => Token::Table,
            "ONLY" => Token::Only,
            "IF" => Token::If,
            "NOT" => Token::Not,
            "EXISTS" => Token::Exists,
            "PRIMARY" => Token::Primary,
            "KEY" => Token::Key,
            "FOREIGN" => Token::Foreign,
            "REFERENCES" => Token::References,
            "UNIQUE" => Token::Unique,
            "NULL" => Token::Null,
            "DEFAULT" => Token::Default,
            "CONSTRAINT" => Token::Constraint,
            "CHECK" => Token::Check,
            "ON" => Token::On,
            "INDEX" => Token::Index,
            "AUTO_INCREMENT" | "AUTOINCREMENT" | "IDENTITY" => Token::AutoIncrement,
            "GENERATED" => Token::Generated,
            "COLLATE" => Token::Collate,
            _ => Token::Ident(word),
        }
    }

    pub fn next_token(&mut self) -> Token {
        loop {
            let Some(c) = self.chars.next() else {
                return Token::Eof;
            };

            let tok = match c {
                c if c.is_whitespace() => continue,
                '-' if self.chars.peek() == Some(&'-') => {
                    self.skip_line();
                    continue;
                }
                '#' => {
                    self.skip_line();
                    continue;
                }
                '/' if self.chars.peek() == Some(&'*') => {
                    self.chars.next();
                    self.skip_block_comment();
                    continue;
                }
                '(' => Token::LParen,
                ')' => Token::RParen,
                '[' => Token::LBracket,
                ']' => Token::RBracket,
                ',' => Token::Comma,
                ';' => Token::Semicolon,
                '.' => Token::Dot,
                '"' => Token::Ident(self.read_quoted('"')),
                '`' => Token::Ident(self.read_quoted('`')),
                '\'' => Token::Str(self.read_quoted('\'')),
                c if c.is_ascii_digit() => Token::Num(self.read_number(c)),
                c if c.is_alphabetic() || c == '_' => Self::keyword_or_ident(self.read_word(c)),
                // Operators and casts carry no schema information.
                _ => continue,
            };
            return tok;
        }
    }

    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let done = tok == Token::Eof;
            tokens.push(tok);
            if done {
                break;
            }
        }
        tokens
    }
}
