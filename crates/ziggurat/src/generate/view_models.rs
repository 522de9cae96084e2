//! The Avalonia view-model generator.
//!
//! Per context with storage or presentation content: one base observable
//! node view-model (mutable position, visibility, default color and shape)
//! plus one derived view-model per hub. A hub's `STYLE` overrides the base
//! color/shape; absent presentation is not an error, the defaults apply.
//! Declared columns become `[ObservableProperty]` fields.

use std::fmt::Write;

use log::debug;

use ziggurat_core::{
    ast::{Context, Program, Table},
    casing, types,
};

/// Base view-model appearance when no style matches.
const DEFAULT_COLOR: &str = "#808080";
const DEFAULT_SHAPE: &str = "CIRCLE";

pub(crate) fn generate(program: &Program) -> Option<String> {
    let mut out = String::new();
    out.push_str("using CommunityToolkit.Mvvm.ComponentModel;\n");
    out.push_str("using Avalonia.Media;\n");
    out.push_str("using System;\n\n");

    let mut emitted = false;
    for context in &program.contexts {
        // An empty storage block is no content, same as the schema generator.
        let has_storage = context.storage.as_ref().is_some_and(|s| !s.is_empty());
        if context.presentation.is_none() && !has_storage {
            continue;
        }
        emitted = true;

        debug!(context = context.name; "Generating view models");
        write_context(&mut out, context);
    }

    emitted.then_some(out)
}

fn write_context(out: &mut String, context: &Context) {
    let context_pascal = casing::pascal_case(&context.name);

    let _ = writeln!(out, "namespace {context_pascal}.UI.ViewModels");
    out.push_str("{\n");

    // Base node view-model for this context
    let _ = writeln!(
        out,
        "    public partial class {context_pascal}NodeViewModel : ObservableObject"
    );
    out.push_str("    {\n");
    out.push_str("        [ObservableProperty] private double _x;\n");
    out.push_str("        [ObservableProperty] private double _y;\n");
    out.push_str("        [ObservableProperty] private bool _isVisible = true;\n");
    let _ = writeln!(out, "        public virtual string Color => \"{DEFAULT_COLOR}\";");
    let _ = writeln!(out, "        public virtual string Shape => \"{DEFAULT_SHAPE}\";");
    out.push_str("    }\n\n");

    if let Some(storage) = &context.storage {
        for hub in storage.hubs() {
            write_hub_view_model(out, context, hub);
        }
    }

    out.push_str("}\n");
}

fn write_hub_view_model(out: &mut String, context: &Context, hub: &Table) {
    let context_pascal = casing::pascal_case(&context.name);
    let class_name = format!("{}ViewModel", casing::pascal_case(&hub.name));

    let _ = writeln!(
        out,
        "    public partial class {class_name} : {context_pascal}NodeViewModel"
    );
    out.push_str("    {\n");

    let style = context
        .presentation
        .as_ref()
        .and_then(|p| p.style_for(&hub.name));
    if let Some(style) = style {
        let _ = writeln!(out, "        public override string Color => \"{}\";", style.color);
        let _ = writeln!(out, "        public override string Shape => \"{}\";", style.shape);
    }

    for column in &hub.columns {
        let _ = writeln!(
            out,
            "        [ObservableProperty] private {} _{};",
            types::map_type(&column.data_type),
            casing::camel_case(&column.name)
        );
    }

    out.push_str("    }\n\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_from(source: &str) -> Option<String> {
        let program = ziggurat_parser::parse(source).expect("should parse");
        generate(&program)
    }

    #[test]
    fn test_base_view_model_with_defaults() {
        let cs = generate_from(
            "CONTEXT Najaf { STORAGE { HUB hub_customer WITH { name: VARCHAR(200) } } }",
        )
        .expect("view-model artifact");
        assert!(cs.contains("namespace Najaf.UI.ViewModels"));
        assert!(cs.contains("public partial class NajafNodeViewModel : ObservableObject"));
        assert!(cs.contains("[ObservableProperty] private double _x;"));
        assert!(cs.contains("[ObservableProperty] private bool _isVisible = true;"));
        assert!(cs.contains("public virtual string Color => \"#808080\";"));
        assert!(cs.contains("public virtual string Shape => \"CIRCLE\";"));
    }

    #[test]
    fn test_styled_hub_overrides_color_and_shape() {
        let cs = generate_from(
            "CONTEXT C {
                STORAGE { HUB hub_customer WITH { name: VARCHAR(200) } }
                PRESENTATION {
                    STYLE hub_customer { COLOR: '#2E86AB'; SHAPE: HEXAGON; }
                }
            }",
        )
        .expect("view-model artifact");
        assert!(cs.contains("public partial class HubCustomerViewModel : CNodeViewModel"));
        assert!(cs.contains("public override string Color => \"#2E86AB\";"));
        assert!(cs.contains("public override string Shape => \"HEXAGON\";"));
    }

    #[test]
    fn test_unstyled_hub_inherits_defaults() {
        let cs = generate_from(
            "CONTEXT C { STORAGE { HUB hub_plot WITH { location: VARCHAR(50) } } }",
        )
        .expect("view-model artifact");
        assert!(cs.contains("public partial class HubPlotViewModel : CNodeViewModel"));
        // No override: the base defaults apply through inheritance.
        assert!(!cs.contains("override string Color"));
        assert!(!cs.contains("override string Shape"));
    }

    #[test]
    fn test_observable_field_per_column() {
        let cs = generate_from(
            "CONTEXT C { STORAGE { HUB h WITH { customer_key: UUID, name: VARCHAR(10) } } }",
        )
        .expect("view-model artifact");
        assert!(cs.contains("[ObservableProperty] private Guid _customerKey;"));
        assert!(cs.contains("[ObservableProperty] private string _name;"));
    }

    #[test]
    fn test_presentation_only_context_still_emits_base() {
        let cs = generate_from(
            "CONTEXT C { PRESENTATION { STYLE hub_x { COLOR: '#123456'; } } }",
        )
        .expect("view-model artifact");
        assert!(cs.contains("CNodeViewModel"));
    }

    #[test]
    fn test_no_storage_or_presentation_means_no_artifact() {
        assert!(generate_from("CONTEXT C { COMMAND X { } }").is_none());
    }

    #[test]
    fn test_empty_storage_block_is_no_content() {
        assert!(generate_from("CONTEXT C { STORAGE { } }").is_none());
    }
}
