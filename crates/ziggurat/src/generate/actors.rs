//! The Akka.NET actor-skeleton generator.
//!
//! Per context with at least one command: an ingestion actor with one
//! `ReceiveAsync` registration and handler per command, plus one command
//! DTO per command (`Guid RequestId`, loosely-typed `string Payload`).
//! Validation rules become placeholder `CheckRule` guards; execution steps
//! become comment stubs — no expression evaluator exists at this layer.
//! A program with no commands at all produces no artifact.

use std::fmt::Write;

use log::debug;

use ziggurat_core::{
    ast::{Command, Context, Program},
    casing,
};

pub(crate) fn generate(program: &Program) -> Option<String> {
    let mut out = String::new();
    out.push_str("using Akka.Actor;\n");
    out.push_str("using System;\n");
    out.push_str("using System.Threading.Tasks;\n\n");

    let mut emitted = false;
    for context in &program.contexts {
        if context.commands.is_empty() {
            continue;
        }
        emitted = true;

        debug!(context = context.name, commands = context.commands.len(); "Generating actors");
        write_context(&mut out, context);
    }

    emitted.then_some(out)
}

fn write_context(out: &mut String, context: &Context) {
    let context_pascal = casing::pascal_case(&context.name);
    let actor_name = format!("{context_pascal}IngestionActor");

    let _ = writeln!(out, "namespace {context_pascal}.Actors");
    out.push_str("{\n");

    let _ = writeln!(out, "    public class {actor_name} : ReceiveActor");
    out.push_str("    {\n");
    let _ = writeln!(out, "        public {actor_name}()");
    out.push_str("        {\n");
    for command in &context.commands {
        let command_pascal = casing::pascal_case(&command.name);
        let _ = writeln!(
            out,
            "            ReceiveAsync<{command_pascal}Command>(Handle{command_pascal});"
        );
    }
    out.push_str("        }\n\n");

    for command in &context.commands {
        write_handler(out, command);
    }

    out.push_str("        private bool CheckRule(string rule) => true;\n");
    out.push_str("    }\n\n");

    for command in &context.commands {
        write_dto(out, command);
    }

    out.push_str("}\n");
}

fn write_handler(out: &mut String, command: &Command) {
    let command_pascal = casing::pascal_case(&command.name);

    let _ = writeln!(
        out,
        "        private async Task Handle{command_pascal}({command_pascal}Command cmd)"
    );
    out.push_str("        {\n");

    if !command.validations.is_empty() {
        out.push_str("            // 1. Validation Phase\n");
        for check in &command.validations {
            let _ = writeln!(out, "            // Rule: {check}");
            let _ = writeln!(
                out,
                "            if (!CheckRule(\"{check}\")) throw new Exception(\"Validation Failed: {check}\");"
            );
        }
    }

    out.push_str("            // 2. Execution Phase (Write to Data Vault)\n");
    for step in &command.steps {
        let _ = writeln!(
            out,
            "            // Action: {} -> Target: {}",
            step.action, step.target
        );
    }
    out.push_str("            await Task.CompletedTask;\n");
    out.push_str("        }\n\n");
}

fn write_dto(out: &mut String, command: &Command) {
    let command_pascal = casing::pascal_case(&command.name);

    let _ = writeln!(out, "    public class {command_pascal}Command");
    out.push_str("    {\n");
    out.push_str("        public Guid RequestId { get; set; }\n");
    out.push_str("        public string Payload { get; set; }\n");
    out.push_str("    }\n\n");
}
