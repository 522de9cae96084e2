//! Lowering from the parse tree to the semantic AST.
//!
//! Lowering decodes every [`parser_types`](crate::parser_types) node
//! exhaustively into `ziggurat_core::ast` nodes while running the semantic
//! checks (`E2xx`). The pass never stops at the first problem: all
//! diagnostics are accumulated and the whole compile fails if any error was
//! emitted.

use std::collections::HashMap;

use ziggurat_core::ast;

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    parser_types as types,
    span::{Span, Spanned},
};

/// Fallback spatial-id algorithm when `ALGORITHM` is omitted.
const DEFAULT_SPATIAL_ALGORITHM: &str = "EXTENDED_COLOR_64";

/// Fallback spatial-id precision when `PRECISION` is omitted.
const DEFAULT_SPATIAL_PRECISION: u32 = 64;

/// Fallback style values when a `STYLE` block omits them.
const DEFAULT_STYLE_COLOR: &str = "#808080";
const DEFAULT_STYLE_SHAPE: &str = "CIRCLE";

/// Lower a parse tree into a semantic [`ast::Program`].
///
/// Accumulates all semantic diagnostics before failing, so a single run
/// reports every invalid threshold, duplicate block, and misplaced modifier
/// at once.
pub fn lower(source: &types::SourceProgram<'_>) -> Result<ast::Program, ParseError> {
    let mut collector = DiagnosticCollector::new();
    let mut program = ast::Program::default();

    for context in &source.contexts {
        program.contexts.push(lower_context(context, &mut collector));
    }

    collector.finish().map(|()| program)
}

/// Tracks the singleton blocks of a context so a second declaration can
/// point back at the first one.
#[derive(Default)]
struct SingletonSpans {
    storage: Option<Span>,
    vectorization: Option<Span>,
    rule_set: Option<Span>,
    presentation: Option<Span>,
}

fn lower_context(
    decl: &types::ContextDecl<'_>,
    collector: &mut DiagnosticCollector,
) -> ast::Context {
    let mut context = ast::Context::new(*decl.name.inner());
    let mut seen = SingletonSpans::default();

    for item in &decl.items {
        match item {
            types::ContextItem::Identity(identity) => {
                context.identities.push(lower_identity(identity, collector));
            }
            types::ContextItem::Storage(storage) => {
                if let Some(first) = seen.storage {
                    collector.emit(duplicate_block_error(
                        ErrorCode::E201,
                        "STORAGE",
                        &context.name,
                        storage.keyword_span,
                        first,
                    ));
                } else {
                    seen.storage = Some(storage.keyword_span);
                    context.storage = Some(lower_storage(storage, collector));
                }
            }
            types::ContextItem::Command(command) => {
                context.commands.push(lower_command(command));
            }
            types::ContextItem::Vectorization(vectorization) => {
                if let Some(first) = seen.vectorization {
                    collector.emit(duplicate_block_error(
                        ErrorCode::E202,
                        "VECTORIZATION",
                        &context.name,
                        vectorization.keyword_span,
                        first,
                    ));
                } else {
                    seen.vectorization = Some(vectorization.keyword_span);
                    context.vectorization = Some(lower_vectorization(vectorization));
                }
            }
            types::ContextItem::RuleSet(rule_set) => {
                if let Some(first) = seen.rule_set {
                    collector.emit(duplicate_block_error(
                        ErrorCode::E202,
                        "RULESET",
                        &context.name,
                        rule_set.keyword_span,
                        first,
                    ));
                } else {
                    seen.rule_set = Some(rule_set.keyword_span);
                    context.rule_set = Some(lower_rule_set(rule_set));
                }
            }
            types::ContextItem::Presentation(presentation) => {
                if let Some(first) = seen.presentation {
                    collector.emit(duplicate_block_error(
                        ErrorCode::E202,
                        "PRESENTATION",
                        &context.name,
                        presentation.keyword_span,
                        first,
                    ));
                } else {
                    seen.presentation = Some(presentation.keyword_span);
                    context.presentation = Some(lower_presentation(presentation));
                }
            }
            types::ContextItem::RagQuery(query) => {
                context.rag_queries.push(lower_rag_query(query));
            }
        }
    }

    context
}

fn duplicate_block_error(
    code: ErrorCode,
    block: &str,
    context_name: &str,
    duplicate: Span,
    first: Span,
) -> Diagnostic {
    Diagnostic::error(format!(
        "duplicate {block} block in context `{context_name}`"
    ))
    .with_code(code)
    .with_label(duplicate, "duplicate block")
    .with_secondary_label(first, "first declared here")
    .with_help(format!("a context may declare at most one {block} block"))
}

/// Shared key-list lowering: strips spans off an identifier list.
fn lower_keys(keys: &[Spanned<&str>]) -> Vec<String> {
    keys.iter().map(|key| (*key.inner()).to_string()).collect()
}

fn lower_identity(
    decl: &types::IdentityDecl<'_>,
    collector: &mut DiagnosticCollector,
) -> ast::Identity {
    let fuzzy_rules = decl
        .fuzzy_rules
        .iter()
        .map(|rule| {
            let threshold = *rule.threshold.inner();
            if !(0.0..=1.0).contains(&threshold) {
                collector.emit(
                    Diagnostic::error(format!(
                        "fuzzy threshold {threshold} is outside the valid range"
                    ))
                    .with_code(ErrorCode::E200)
                    .with_label(rule.threshold.span(), "must be between 0 and 1")
                    .with_help("thresholds are similarity ratios in [0, 1]"),
                );
            }
            ast::FuzzyRule {
                fields: lower_keys(&rule.fields),
                algorithm: (*rule.algorithm.inner()).to_string(),
                threshold,
            }
        })
        .collect();

    let spatial_id = decl.spatial_id.as_ref().map(|spatial| ast::SpatialId {
        algorithm: spatial
            .algorithm
            .map(|a| (*a.inner()).to_string())
            .unwrap_or_else(|| DEFAULT_SPATIAL_ALGORITHM.to_string()),
        dimensions: lower_keys(&spatial.dimensions),
        precision: spatial
            .precision
            .map(|p| u32::try_from(*p.inner()).unwrap_or(u32::MAX))
            .unwrap_or(DEFAULT_SPATIAL_PRECISION),
    });

    ast::Identity {
        name: (*decl.name.inner()).to_string(),
        business_keys: lower_keys(&decl.business_keys),
        fuzzy_rules,
        spatial_id,
    }
}

fn lower_storage(
    decl: &types::StorageDecl<'_>,
    collector: &mut DiagnosticCollector,
) -> ast::Storage {
    let mut storage = ast::Storage::new();
    let mut table_names: HashMap<&str, Span> = HashMap::new();

    for table in &decl.tables {
        let name = *table.name.inner();
        if let Some(&first) = table_names.get(name) {
            collector.emit(
                Diagnostic::error(format!("table `{name}` is declared more than once"))
                    .with_code(ErrorCode::E205)
                    .with_label(table.name.span(), "duplicate table name")
                    .with_secondary_label(first, "first declared here"),
            );
        } else {
            table_names.insert(name, table.name.span());
        }

        storage.push(lower_table(table, collector));
    }

    storage
}

fn lower_table(
    decl: &types::TableDecl<'_>,
    collector: &mut DiagnosticCollector,
) -> ast::Table {
    let kind = *decl.kind.inner();
    let name = *decl.name.inner();

    let mut temporal_tracking = false;
    if let Some(span) = decl.temporal_tracking {
        if kind == ast::TableKind::Satellite {
            temporal_tracking = true;
        } else {
            collector.emit(
                Diagnostic::error(format!(
                    "`temporal_tracking` is not allowed on a {kind} table"
                ))
                .with_code(ErrorCode::E203)
                .with_label(span, "only satellites track history")
                .with_help("move the flag to a SATELLITE table or remove it"),
            );
        }
    }

    let mut connects = Vec::new();
    if let Some(clause) = &decl.connects {
        if kind == ast::TableKind::Link {
            connects = lower_keys(clause.inner());
        } else {
            collector.emit(
                Diagnostic::error(format!(
                    "`CONNECTS` is not allowed on a {kind} table"
                ))
                .with_code(ErrorCode::E204)
                .with_label(clause.span(), "only links connect hubs")
                .with_help("move the clause to a LINK table or remove it"),
            );
        }
    }

    let mut column_names: HashMap<&str, Span> = HashMap::new();
    let columns = decl
        .columns
        .iter()
        .map(|column| {
            let column_name = *column.name.inner();
            if let Some(&first) = column_names.get(column_name) {
                collector.emit(
                    Diagnostic::error(format!(
                        "column `{column_name}` is declared more than once in table `{name}`"
                    ))
                    .with_code(ErrorCode::E206)
                    .with_label(column.name.span(), "duplicate column name")
                    .with_secondary_label(first, "first declared here"),
                );
            } else {
                column_names.insert(column_name, column.name.span());
            }

            ast::Column {
                name: column_name.to_string(),
                data_type: column.data_type.inner().clone(),
                primary_key: column.primary_key,
                unique: column.unique,
            }
        })
        .collect();

    ast::Table {
        name: name.to_string(),
        kind,
        temporal_tracking,
        partition_strategy: decl.partition_by.as_ref().map(|p| p.inner().clone()),
        clustered_by: decl.clustered_by.map(|c| (*c.inner()).to_string()),
        connects,
        columns,
    }
}

fn lower_command(decl: &types::CommandDecl<'_>) -> ast::Command {
    ast::Command {
        name: (*decl.name.inner()).to_string(),
        validations: lower_keys(&decl.validations),
        steps: decl
            .steps
            .iter()
            .map(|step| ast::ExecutionStep {
                action: (*step.action.inner()).to_string(),
                target: (*step.target.inner()).to_string(),
                payload: step.payload.as_ref().map(|p| p.inner().clone()),
            })
            .collect(),
    }
}

fn lower_vectorization(decl: &types::VectorizationDecl<'_>) -> ast::Vectorization {
    ast::Vectorization {
        model: decl
            .model
            .as_ref()
            .map(|m| m.inner().clone())
            .unwrap_or_default(),
        embeddings: decl
            .embeddings
            .iter()
            .map(|e| ((*e.name.inner()).to_string(), lower_keys(&e.fields)))
            .collect(),
    }
}

fn lower_rule_set(decl: &types::RuleSetDecl<'_>) -> ast::RuleSet {
    ast::RuleSet {
        name: (*decl.name.inner()).to_string(),
        algorithm: decl
            .algorithm
            .map(|a| (*a.inner()).to_string())
            .unwrap_or_else(|| ast::RuleSet::DEFAULT_ALGORITHM.to_string()),
        rules: decl.rules.iter().map(|r| r.inner().clone()).collect(),
    }
}

fn lower_presentation(decl: &types::PresentationDecl<'_>) -> ast::Presentation {
    ast::Presentation {
        styles: decl
            .styles
            .iter()
            .map(|style| ast::Style {
                target_entity: (*style.target.inner()).to_string(),
                color: style
                    .color
                    .as_ref()
                    .map(|c| c.inner().clone())
                    .unwrap_or_else(|| DEFAULT_STYLE_COLOR.to_string()),
                shape: style
                    .shape
                    .map(|s| (*s.inner()).to_string())
                    .unwrap_or_else(|| DEFAULT_STYLE_SHAPE.to_string()),
                icon: style.icon.as_ref().map(|i| i.inner().clone()),
                label_field: style.label.map(|l| (*l.inner()).to_string()),
            })
            .collect(),
    }
}

fn lower_rag_query(decl: &types::RagQueryDecl<'_>) -> ast::RagQuery {
    ast::RagQuery {
        name: (*decl.name.inner()).to_string(),
        description: decl
            .description
            .as_ref()
            .map(|d| d.inner().clone())
            .unwrap_or_default(),
        retrieval: decl.retrieval.as_ref().map(|r| ast::Retrieval {
            vector_target: r
                .vector_target
                .map(|v| (*v.inner()).to_string())
                .unwrap_or_default(),
            // Missing counts default to zero, matching the record field
            // defaults the generated C# side assumes.
            top_k: r
                .top_k
                .map(|k| u32::try_from(*k.inner()).unwrap_or(u32::MAX))
                .unwrap_or(0),
            graph_hops: r
                .graph_hops
                .map(|h| u32::try_from(*h.inner()).unwrap_or(u32::MAX))
                .unwrap_or(0),
            graph_edges: lower_keys(&r.graph_edges),
            temporal_window: r.temporal_window.as_ref().map(|w| w.inner().clone()),
        }),
        generation: decl.generation.as_ref().map(|g| ast::Generation {
            model: g.model.as_ref().map(|m| m.inner().clone()).unwrap_or_default(),
            prompt_template: g
                .prompt
                .as_ref()
                .map(|p| p.inner().clone())
                .unwrap_or_default(),
        }),
    }
}
