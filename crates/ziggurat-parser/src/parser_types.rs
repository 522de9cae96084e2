//! Parse-tree (CST) types produced by the [`parser`](crate::parser).
//!
//! These types stay close to the surface syntax: identifiers borrow from the
//! source, every name-bearing node is [`Spanned`] so the lowering pass can
//! attach precise locations to its diagnostics, and context bodies are a
//! closed sum ([`ContextItem`]) that lowering matches exhaustively — an
//! unhandled declaration kind fails the build rather than being silently
//! dropped.

use ziggurat_core::ast::TableKind;

use crate::span::{Span, Spanned};

/// A parsed source file: an ordered sequence of context declarations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceProgram<'src> {
    pub contexts: Vec<ContextDecl<'src>>,
}

/// `CONTEXT <name> { <items> }`
#[derive(Debug, Clone, PartialEq)]
pub struct ContextDecl<'src> {
    pub name: Spanned<&'src str>,
    pub items: Vec<ContextItem<'src>>,
}

/// One declaration inside a context body.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextItem<'src> {
    Identity(IdentityDecl<'src>),
    Storage(StorageDecl<'src>),
    Command(CommandDecl<'src>),
    Vectorization(VectorizationDecl<'src>),
    RuleSet(RuleSetDecl<'src>),
    Presentation(PresentationDecl<'src>),
    RagQuery(RagQueryDecl<'src>),
}

/// `IDENTITY <name> { BUSINESS_KEY: ...; FUZZY_RESOLUTION {...} SPATIAL_ID {...} }`
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityDecl<'src> {
    pub name: Spanned<&'src str>,
    pub business_keys: Vec<Spanned<&'src str>>,
    pub fuzzy_rules: Vec<FuzzyRuleDecl<'src>>,
    pub spatial_id: Option<SpatialIdDecl<'src>>,
}

/// `MATCH: <fields> USING <algorithm> THRESHOLD <float>;`
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyRuleDecl<'src> {
    pub fields: Vec<Spanned<&'src str>>,
    pub algorithm: Spanned<&'src str>,
    pub threshold: Spanned<f64>,
}

/// `SPATIAL_ID { ALGORITHM: ...; DIMENSIONS: ...; PRECISION: ...; }`
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialIdDecl<'src> {
    pub algorithm: Option<Spanned<&'src str>>,
    pub dimensions: Vec<Spanned<&'src str>>,
    pub precision: Option<Spanned<u64>>,
}

/// `STORAGE [<name>] { <tables> }`
///
/// The keyword span feeds duplicate-block diagnostics (E201).
#[derive(Debug, Clone, PartialEq)]
pub struct StorageDecl<'src> {
    pub keyword_span: Span,
    pub name: Option<Spanned<&'src str>>,
    pub tables: Vec<TableDecl<'src>>,
}

/// `HUB|SATELLITE|LINK <name> [CONNECTS (...)] WITH [modifiers] { <columns> }`
#[derive(Debug, Clone, PartialEq)]
pub struct TableDecl<'src> {
    pub kind: Spanned<TableKind>,
    pub name: Spanned<&'src str>,
    /// Span of the `temporal_tracking` modifier, when present (E203).
    pub temporal_tracking: Option<Span>,
    pub partition_by: Option<Spanned<String>>,
    pub clustered_by: Option<Spanned<&'src str>>,
    /// Hub names from the `CONNECTS (...)` clause; the outer span covers the
    /// clause for E204 labeling.
    pub connects: Option<Spanned<Vec<Spanned<&'src str>>>>,
    pub columns: Vec<ColumnDecl<'src>>,
}

/// `<name>: <type> [PRIMARY KEY] [UNIQUE]`
///
/// The data type is re-assembled verbatim from tokens, so `VARCHAR(200)`
/// survives as the string `VARCHAR(200)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDecl<'src> {
    pub name: Spanned<&'src str>,
    pub data_type: Spanned<String>,
    pub primary_key: bool,
    pub unique: bool,
}

/// `COMMAND <name> { VALIDATION {...} EXECUTION {...} }`
#[derive(Debug, Clone, PartialEq)]
pub struct CommandDecl<'src> {
    pub name: Spanned<&'src str>,
    pub validations: Vec<Spanned<&'src str>>,
    pub steps: Vec<StepDecl<'src>>,
}

/// `ACTION: <action> -> TARGET: <target> [PAYLOAD: '<template>'];`
#[derive(Debug, Clone, PartialEq)]
pub struct StepDecl<'src> {
    pub action: Spanned<&'src str>,
    pub target: Spanned<&'src str>,
    pub payload: Option<Spanned<String>>,
}

/// `VECTORIZATION { MODEL: '<model>'; EMBEDDINGS { <name>: [fields]; } }`
#[derive(Debug, Clone, PartialEq)]
pub struct VectorizationDecl<'src> {
    pub keyword_span: Span,
    pub model: Option<Spanned<String>>,
    pub embeddings: Vec<EmbeddingDecl<'src>>,
}

/// One `<name>: [field, field]` entry of an `EMBEDDINGS` block.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingDecl<'src> {
    pub name: Spanned<&'src str>,
    pub fields: Vec<Spanned<&'src str>>,
}

/// `RULESET <name> { ALGORITHM: <id>; RULE: '<text>'; ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSetDecl<'src> {
    pub keyword_span: Span,
    pub name: Spanned<&'src str>,
    pub algorithm: Option<Spanned<&'src str>>,
    pub rules: Vec<Spanned<String>>,
}

/// `PRESENTATION { STYLE <entity> {...} ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct PresentationDecl<'src> {
    pub keyword_span: Span,
    pub styles: Vec<StyleDecl<'src>>,
}

/// `STYLE <entity> { COLOR: ...; SHAPE: ...; ICON: ...; LABEL: ...; }`
#[derive(Debug, Clone, PartialEq)]
pub struct StyleDecl<'src> {
    pub target: Spanned<&'src str>,
    pub color: Option<Spanned<String>>,
    pub shape: Option<Spanned<&'src str>>,
    pub icon: Option<Spanned<String>>,
    pub label: Option<Spanned<&'src str>>,
}

/// `RAG_QUERY <name> { DESCRIPTION: ...; RETRIEVAL {...} GENERATION {...} }`
#[derive(Debug, Clone, PartialEq)]
pub struct RagQueryDecl<'src> {
    pub name: Spanned<&'src str>,
    pub description: Option<Spanned<String>>,
    pub retrieval: Option<RetrievalDecl<'src>>,
    pub generation: Option<GenerationDecl>,
}

/// Retrieval half of a RAG query declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RetrievalDecl<'src> {
    pub vector_target: Option<Spanned<&'src str>>,
    pub top_k: Option<Spanned<u64>>,
    pub graph_hops: Option<Spanned<u64>>,
    pub graph_edges: Vec<Spanned<&'src str>>,
    pub temporal_window: Option<Spanned<String>>,
}

/// Generation half of a RAG query declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerationDecl {
    pub model: Option<Spanned<String>>,
    pub prompt: Option<Spanned<String>>,
}
