//! The C# domain-model generator.
//!
//! One plain data class per declared table of any kind, in namespace
//! `<Pascal(context)>.Domain`. Property names are PascalCase; property
//! types come from the shared type mapper, so this artifact and the SQL
//! schema always agree on what a DSL type means. Audit and temporal
//! properties use the same shared column names as the schema generator.

use std::fmt::Write;

use log::debug;

use ziggurat_core::{
    ast::{Program, Table},
    audit, casing, types,
};

pub(crate) fn generate(program: &Program) -> Option<String> {
    let mut out = String::new();
    out.push_str("// =============================================\n");
    out.push_str("// ZIGGURAT GENERATED C# DOMAIN MODELS\n");
    out.push_str("// =============================================\n");
    out.push_str("using System;\n\n");

    let mut emitted = false;
    for context in &program.contexts {
        let Some(storage) = &context.storage else {
            continue;
        };
        if storage.is_empty() {
            continue;
        }
        emitted = true;

        debug!(context = context.name; "Generating domain models");
        let _ = writeln!(out, "namespace {}.Domain", casing::pascal_case(&context.name));
        out.push_str("{\n");

        for table in storage.iter_all() {
            write_class(&mut out, table);
        }

        out.push_str("}\n");
    }

    emitted.then_some(out)
}

fn write_class(out: &mut String, table: &Table) {
    let class_name = casing::pascal_case(&table.name);

    out.push_str("    /// <summary>\n");
    let _ = writeln!(out, "    /// Represents the {} : {}", table.kind, table.name);
    out.push_str("    /// </summary>\n");
    let _ = writeln!(out, "    public class {class_name}");
    out.push_str("    {\n");

    // 1. Declared properties
    for column in &table.columns {
        let _ = writeln!(
            out,
            "        public {} {} {{ get; set; }}",
            types::map_type(&column.data_type),
            casing::pascal_case(&column.name)
        );
    }

    // 2. Standard audit properties
    let _ = writeln!(
        out,
        "        public DateTime {} {{ get; set; }}",
        audit::LOAD_DATE
    );
    let _ = writeln!(
        out,
        "        public string {} {{ get; set; }}",
        audit::RECORD_SOURCE
    );

    // 3. Temporal properties, always the full triple
    if table.temporal_tracking {
        let _ = writeln!(
            out,
            "        public DateTime {} {{ get; set; }}",
            audit::VALID_FROM
        );
        let _ = writeln!(
            out,
            "        public DateTime? {} {{ get; set; }}",
            audit::VALID_TO
        );
        let _ = writeln!(
            out,
            "        public bool {} {{ get; set; }}",
            audit::IS_CURRENT
        );
    }

    out.push_str("    }\n\n");
}
