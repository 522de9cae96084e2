//! The shared Type Mapper.
//!
//! One fixed table maps DSL primitive type names to both target surfaces
//! (C# for records and view models, SQL for the schema). Keeping both
//! mappings in this module is what guarantees that every generator agrees
//! on what a DSL type means.
//!
//! Unrecognized types never fail a compile: they fall back to the string
//! type of the target surface and emit a generation warning via `log`.

use log::warn;

/// Map a DSL primitive type to its C# rendering.
///
/// The mapping is idempotent: target type names are fixed points, so
/// `map_type(map_type(t)) == map_type(t)` for any input.
///
/// Unrecognized input falls back to `string` with a warning.
pub fn map_type(dsl_type: &str) -> String {
    if dsl_type.starts_with("VARCHAR") {
        return "string".to_string();
    }
    if dsl_type.starts_with("DECIMAL") {
        return "decimal".to_string();
    }

    match dsl_type {
        "UUID" => "Guid",
        "STRING" => "string",
        "INT" => "int",
        "BIGINT" => "long",
        "TIMESTAMP" => "DateTime",
        "BOOLEAN" => "bool",
        // Target names are fixed points so the mapping is idempotent.
        "Guid" | "string" | "decimal" | "int" | "long" | "DateTime" | "bool" => dsl_type,
        other => {
            warn!(dsl_type = other; "Unmapped DSL type, falling back to string");
            "string"
        }
    }
    .to_string()
}

/// Map a DSL primitive type to its SQL rendering.
///
/// Parameterized types (`VARCHAR(n)`, `DECIMAL(p,s)`) are kept verbatim;
/// unrecognized input falls back to `TEXT` with a warning.
pub fn sql_type(dsl_type: &str) -> String {
    if dsl_type.starts_with("VARCHAR") || dsl_type.starts_with("DECIMAL") {
        return dsl_type.to_string();
    }

    match dsl_type {
        "UUID" => "UUID",
        "STRING" => "TEXT",
        "INT" => "INTEGER",
        "BIGINT" => "BIGINT",
        "TIMESTAMP" => "TIMESTAMP",
        "BOOLEAN" => "BOOLEAN",
        other => {
            warn!(dsl_type = other; "Unmapped DSL type, falling back to TEXT");
            "TEXT"
        }
    }
    .to_string()
}
