//! Column type normalization.
//!
//! Dialect spellings collapse onto one upper-case family name; a length or
//! precision argument list is kept as written.

use super::Dialect;

/// Normalize a declared column type, e.g. `int4` -> `INTEGER`,
/// `character varying(40)` -> `VARCHAR(40)`.
pub fn normalize_type(sql_type: &str, dialect: Dialect) -> String {
    let trimmed = sql_type.trim();
    if let Some(inner) = trimmed.strip_suffix("[]") {
        return format!("{}[]", normalize_type(inner, dialect));
    }

    let (base, args) = match trimmed.find('(') {
        Some(idx) => (trimmed[..idx].trim(), &trimmed[idx..]),
        None => (trimmed, ""),
    };
    let lower = base.to_lowercase();

    if dialect == Dialect::MySQL && lower == "tinyint" && args.replace(' ', "") == "(1)" {
        return "BOOLEAN".to_string();
    }

    let family = family(&lower, dialect).map(str::to_string);
    let mut out = family.unwrap_or_else(|| base.to_uppercase());
    // Serial and identity families never carry a width.
    if !args.is_empty() && !lower.contains("serial") {
        out.push_str(&args.replace(' ', ""));
    }
    out
}

fn family(base: &str, dialect: Dialect) -> Option<&'static str> {
    let common = match base {
        "int" | "integer" => "INTEGER",
        "bigint" => "BIGINT",
        "smallint" => "SMALLINT",
        "real" | "float" => "FLOAT",
        "double" | "double precision" => "DOUBLE",
        "decimal" | "numeric" => "DECIMAL",
        "varchar" | "character varying" => "VARCHAR",
        "char" | "character" => "CHAR",
        "text" => "TEXT",
        "date" => "DATE",
        "time" => "TIME",
        "timestamp" | "timestamp without time zone" => "TIMESTAMP",
        "boolean" | "bool" => "BOOLEAN",
        "blob" => "BLOB",
        "json" => "JSON",
        _ => "",
    };
    if !common.is_empty() {
        return Some(common);
    }

    let specific = match dialect {
        Dialect::PostgreSQL => match base {
            "int4" | "serial" | "serial4" => "INTEGER",
            "int8" | "bigserial" | "serial8" => "BIGINT",
            "int2" | "smallserial" | "serial2" => "SMALLINT",
            "float4" => "FLOAT",
            "float8" => "DOUBLE",
            "timestamptz" | "timestamp with time zone" => "TIMESTAMP",
            "timetz" | "time with time zone" | "time without time zone" => "TIME",
            "jsonb" => "JSON",
            "bytea" => "BLOB",
            "uuid" => "UUID",
            _ => return None,
        },
        Dialect::MySQL => match base {
            "mediumint" | "tinyint" => "SMALLINT",
            "datetime" => "TIMESTAMP",
            "longtext" | "mediumtext" | "tinytext" => "TEXT",
            "longblob" | "mediumblob" | "tinyblob" | "binary" | "varbinary" => "BLOB",
            "enum" | "set" => "ENUM",
            _ => return None,
        },
        Dialect::Generic | Dialect::Auto => match base {
            "datetime" => "TIMESTAMP",
            "serial" => "INTEGER",
            _ => return None,
        },
    };
    Some(specific)
}
