//! The Data-Vault SQL schema generator.
//!
//! Emits one `CREATE TABLE` per declared table, prefixed by kind
//! (`Hub_`, `Sat_..._Attributes`, `Link_`). Identifiers are double-quoted
//! verbatim, case preserved. Every hub gets an implicit hash-key primary
//! key (see `ziggurat_core::hashkey` for the scheme); a user-declared
//! PRIMARY KEY inside a hub is demoted to `NOT NULL UNIQUE` so the hash key
//! stays the only primary key.

use std::fmt::Write;

use log::debug;

use ziggurat_core::{
    ast::{Column, Program, Table},
    audit, casing,
    hashkey::HASH_KEY_SQL_TYPE,
    types,
};

const AUDIT_SOURCE_TYPE: &str = "VARCHAR(100)";

pub(crate) fn generate(program: &Program) -> Option<String> {
    let mut out = String::new();
    let mut emitted = false;

    for context in &program.contexts {
        let Some(storage) = &context.storage else {
            continue;
        };
        if storage.is_empty() {
            continue;
        }
        emitted = true;

        debug!(context = context.name; "Generating schema");
        let _ = writeln!(out, "-- =============================================");
        let _ = writeln!(out, "-- Data Vault schema for context: {}", context.name);
        let _ = writeln!(out, "-- =============================================");
        out.push('\n');

        for hub in storage.hubs() {
            write_hub(&mut out, hub);
        }
        for satellite in storage.satellites() {
            write_satellite(&mut out, satellite);
        }
        for link in storage.links() {
            write_link(&mut out, link);
        }
    }

    emitted.then_some(out)
}

/// The implicit surrogate key column name for an entity: `PersonHash`.
fn hash_column(entity: &str) -> String {
    format!("{}Hash", casing::pascal_case(entity))
}

fn write_hub(out: &mut String, hub: &Table) {
    let mut lines = vec![format!(
        "\"{}\" {HASH_KEY_SQL_TYPE} PRIMARY KEY",
        hash_column(&hub.name)
    )];
    for column in &hub.columns {
        // The hash key is the only hub primary key.
        lines.push(render_column(column, true));
    }
    push_audit_columns(&mut lines);

    write_table(out, &format!("Hub_{}", hub.name), &lines);
}

fn write_satellite(out: &mut String, satellite: &Table) {
    let mut lines: Vec<String> = satellite
        .columns
        .iter()
        .map(|column| render_column(column, false))
        .collect();
    push_audit_columns(&mut lines);

    if satellite.temporal_tracking {
        // The temporal triple always appears together, never individually.
        lines.push(format!("\"{}\" TIMESTAMP NOT NULL", audit::VALID_FROM));
        lines.push(format!("\"{}\" TIMESTAMP NULL", audit::VALID_TO));
        lines.push(format!("\"{}\" BOOLEAN NOT NULL", audit::IS_CURRENT));
    }

    write_table(out, &format!("Sat_{}_Attributes", satellite.name), &lines);
}

fn write_link(out: &mut String, link: &Table) {
    let mut lines = vec![format!(
        "\"{}\" {HASH_KEY_SQL_TYPE} PRIMARY KEY",
        hash_column(&link.name)
    )];
    for hub in &link.connects {
        lines.push(format!(
            "\"{}\" {HASH_KEY_SQL_TYPE} NOT NULL REFERENCES \"Hub_{hub}\" (\"{}\")",
            hash_column(hub),
            hash_column(hub)
        ));
    }
    for column in &link.columns {
        lines.push(render_column(column, false));
    }
    push_audit_columns(&mut lines);

    write_table(out, &format!("Link_{}", link.name), &lines);
}

fn push_audit_columns(lines: &mut Vec<String>) {
    lines.push(format!("\"{}\" TIMESTAMP NOT NULL", audit::LOAD_DATE));
    lines.push(format!(
        "\"{}\" {AUDIT_SOURCE_TYPE} NOT NULL",
        audit::RECORD_SOURCE
    ));
}

/// Render one declared column. With `demote_primary_key`, a PRIMARY KEY
/// constraint becomes `NOT NULL UNIQUE` (used inside hubs, where the hash
/// key owns the primary key).
fn render_column(column: &Column, demote_primary_key: bool) -> String {
    let mut sql = format!("\"{}\" {}", column.name, types::sql_type(&column.data_type));
    if column.primary_key {
        if demote_primary_key {
            sql.push_str(" NOT NULL UNIQUE");
        } else {
            sql.push_str(" PRIMARY KEY");
        }
    } else if column.unique {
        sql.push_str(" UNIQUE");
    }
    sql
}

fn write_table(out: &mut String, table_name: &str, lines: &[String]) {
    let _ = writeln!(out, "CREATE TABLE \"{table_name}\" (");
    let _ = writeln!(out, "    {}", lines.join(",\n    "));
    let _ = writeln!(out, ");");
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_from(source: &str) -> Option<String> {
        let program = ziggurat_parser::parse(source).expect("should parse");
        generate(&program)
    }

    #[test]
    fn test_hub_gets_hash_key_primary_key() {
        let sql = generate_from(
            "CONTEXT Najaf { STORAGE { HUB Person WITH { tax_id: VARCHAR(20) } } }",
        )
        .expect("schema artifact");
        assert!(sql.contains("CREATE TABLE \"Hub_Person\""));
        assert!(sql.contains("\"PersonHash\" CHAR(64) PRIMARY KEY"));
    }

    #[test]
    fn test_declared_hub_primary_key_is_demoted() {
        let sql = generate_from(
            "CONTEXT C { STORAGE { HUB hub_customer WITH {
                customer_key: UUID PRIMARY KEY,
                name: VARCHAR(200) UNIQUE
            } } }",
        )
        .expect("schema artifact");
        assert!(sql.contains("\"HubCustomerHash\" CHAR(64) PRIMARY KEY"));
        assert!(sql.contains("\"customer_key\" UUID NOT NULL UNIQUE"));
        assert!(sql.contains("\"name\" VARCHAR(200) UNIQUE"));
        // Exactly one primary key per hub table.
        assert_eq!(sql.matches("PRIMARY KEY").count(), 1);
    }

    #[test]
    fn test_satellite_with_temporal_tracking() {
        let sql = generate_from(
            "CONTEXT C { STORAGE { SATELLITE sat_customer_details WITH temporal_tracking {
                email: VARCHAR(100)
            } } }",
        )
        .expect("schema artifact");
        assert!(sql.contains("CREATE TABLE \"Sat_sat_customer_details_Attributes\""));
        assert!(sql.contains("\"ValidFrom\" TIMESTAMP NOT NULL"));
        assert!(sql.contains("\"ValidTo\" TIMESTAMP NULL"));
        assert!(sql.contains("\"IsCurrent\" BOOLEAN NOT NULL"));
    }

    #[test]
    fn test_satellite_without_temporal_tracking_has_no_triple() {
        let sql = generate_from(
            "CONTEXT C { STORAGE { SATELLITE s WITH { email: VARCHAR(100) } } }",
        )
        .expect("schema artifact");
        assert!(!sql.contains("ValidFrom"));
        assert!(!sql.contains("ValidTo"));
        assert!(!sql.contains("IsCurrent"));
        assert!(sql.contains("\"LoadDate\" TIMESTAMP NOT NULL"));
        assert!(sql.contains("\"RecordSource\" VARCHAR(100) NOT NULL"));
    }

    #[test]
    fn test_link_references_connected_hubs() {
        let sql = generate_from(
            "CONTEXT C { STORAGE {
                HUB hub_customer WITH { k: UUID }
                HUB hub_plot WITH { k: UUID }
                LINK link_customer_plot CONNECTS (hub_customer, hub_plot) WITH {
                    assigned_at: TIMESTAMP
                }
            } }",
        )
        .expect("schema artifact");
        assert!(sql.contains("CREATE TABLE \"Link_link_customer_plot\""));
        assert!(sql.contains("\"LinkCustomerPlotHash\" CHAR(64) PRIMARY KEY"));
        assert!(sql.contains(
            "\"HubCustomerHash\" CHAR(64) NOT NULL REFERENCES \"Hub_hub_customer\" (\"HubCustomerHash\")"
        ));
        assert!(sql.contains(
            "\"HubPlotHash\" CHAR(64) NOT NULL REFERENCES \"Hub_hub_plot\" (\"HubPlotHash\")"
        ));
        assert!(sql.contains("\"assigned_at\" TIMESTAMP"));
    }

    #[test]
    fn test_identifiers_are_quoted_verbatim() {
        let sql = generate_from(
            "CONTEXT C { STORAGE { HUB MixedCase_name WITH { SomeColumn: INT } } }",
        )
        .expect("schema artifact");
        assert!(sql.contains("\"Hub_MixedCase_name\""));
        assert!(sql.contains("\"SomeColumn\" INTEGER"));
    }

    #[test]
    fn test_no_storage_means_no_artifact() {
        assert!(generate_from("CONTEXT C { COMMAND X { } }").is_none());
        assert!(generate_from("CONTEXT C { STORAGE { } }").is_none());
    }

    #[test]
    fn test_context_banner_per_storage_context() {
        let sql = generate_from(
            "CONTEXT A { STORAGE { HUB h WITH { k: UUID } } }
             CONTEXT B { STORAGE { HUB g WITH { k: UUID } } }",
        )
        .expect("schema artifact");
        assert!(sql.contains("-- Data Vault schema for context: A"));
        assert!(sql.contains("-- Data Vault schema for context: B"));
    }
}
