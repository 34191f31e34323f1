//! SQL dialect detection.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Detect from the dump content.
    #[default]
    Auto,
    Generic,
    PostgreSQL,
    MySQL,
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "generic" => Ok(Self::Generic),
            "postgres" | "postgresql" => Ok(Self::PostgreSQL),
            "mysql" | "mariadb" => Ok(Self::MySQL),
            _ => Err(format!(
                "Unknown dialect: {}. Valid options: auto, generic, postgres, mysql",
                s
            )),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Generic => "generic",
            Self::PostgreSQL => "postgres",
            Self::MySQL => "mysql",
        };
        f.write_str(name)
    }
}

impl Dialect {
    /// Guess the dialect from dump headers and type keywords.
    pub fn detect(content: &str) -> Self {
        let lower = content.to_lowercase();

        if ["postgresql database dump", "pg_dump", "-- postgres"]
            .iter()
            .any(|m| lower.contains(m))
        {
            return Self::PostgreSQL;
        }
        if ["mysql dump", "mysqldump", "-- mysql", "mariadb dump"]
            .iter()
            .any(|m| lower.contains(m))
        {
            return Self::MySQL;
        }

        if ["serial", "text[]", "::text", "timestamptz", "jsonb"]
            .iter()
            .any(|m| lower.contains(m))
        {
            return Self::PostgreSQL;
        }
        if ["auto_increment", "tinyint", "engine=", "unsigned", "`"]
            .iter()
            .any(|m| lower.contains(m))
        {
            return Self::MySQL;
        }

        Self::Generic
    }

    /// Resolve `Auto` to a concrete dialect.
    pub fn resolve(self, content: &str) -> Self {
        match self {
            Self::Auto => Self::detect(content),
            other => other,
        }
    }
}
