//! SQL DDL schema source.

mod dialect;
mod lexer;
mod parser;
mod types;

pub use dialect::Dialect;
pub use parser::{parse_sql, SqlOptions, SqlParseError};
pub use types::normalize_type;
