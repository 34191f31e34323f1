pub mod dot;
pub mod filter;
pub mod lexer;
pub mod mermaid;
pub mod model;
pub mod output;
pub mod parser;
pub mod serializer;
pub mod source;
pub mod sql;

use wasm_bindgen::prelude::*;

use dot::{Direction, DotConfig};
use sql::{Dialect, SqlOptions};

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

fn js_error(message: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&message.to_string()).into()
}

/// Render er markup to Graphviz DOT
#[wasm_bindgen(js_name = "erToDot")]
pub fn er_to_dot(source: &str, direction: Option<String>) -> Result<String, JsValue> {
    let schema = parser::parse_str(source).map_err(js_error)?;
    let direction = direction
        .as_deref()
        .map(str::parse::<Direction>)
        .transpose()
        .map_err(js_error)?
        .unwrap_or_default();
    let config = DotConfig {
        direction,
        ..DotConfig::default()
    };
    Ok(dot::to_dot(&schema.tables, &schema.relations, &config))
}

/// Render er markup to Mermaid; `er` selects erDiagram over classDiagram
#[wasm_bindgen(js_name = "erToMermaid")]
pub fn er_to_mermaid(source: &str, er: Option<bool>) -> Result<String, JsValue> {
    let schema = parser::parse_str(source).map_err(js_error)?;
    let output = if er.unwrap_or(false) {
        mermaid::to_mermaid_er(&schema.tables, &schema.relations)
    } else {
        mermaid::to_mermaid(&schema.tables, &schema.relations)
    };
    Ok(output)
}

/// Convert a SQL dump to er markup
#[wasm_bindgen(js_name = "sqlToEr")]
pub fn sql_to_er(sql: &str, dialect: Option<String>) -> Result<String, JsValue> {
    let dialect = dialect
        .as_deref()
        .map(str::parse::<Dialect>)
        .transpose()
        .map_err(js_error)?
        .unwrap_or_default();
    let options = SqlOptions {
        dialect,
        ..SqlOptions::default()
    };
    let schema = sql::parse_sql(sql, &options).map_err(js_error)?;
    Ok(serializer::to_markup(&schema.tables, &schema.relations))
}
