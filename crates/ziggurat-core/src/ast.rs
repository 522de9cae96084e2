//! The semantic AST for Ziggurat programs.
//!
//! These are plain owned data nodes produced by the parser crate's lowering
//! pass. Nothing from the grammar survives into this representation: no
//! spans, no tokens, no untyped child lists. Every node is owned exclusively
//! by its parent, and the whole tree is immutable once built — generators
//! only ever borrow it.

use indexmap::IndexMap;

/// Root of a compiled program: an ordered sequence of contexts.
///
/// Source order is preserved because it determines generator output order,
/// but it carries no other meaning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub contexts: Vec<Context>,
}

/// A named namespace grouping identity, storage, behavior, and
/// presentation declarations.
///
/// Every section is optional. A context with no commands produces no actor
/// artifact; a context with no storage produces no schema. Generators treat
/// "empty" as "skip", never as an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    pub name: String,
    pub identities: Vec<Identity>,
    pub storage: Option<Storage>,
    pub vectorization: Option<Vectorization>,
    pub rule_set: Option<RuleSet>,
    pub presentation: Option<Presentation>,
    pub commands: Vec<Command>,
    pub rag_queries: Vec<RagQuery>,
}

impl Context {
    /// Create an empty context with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// How entities in a context are keyed and resolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Identity {
    pub name: String,
    /// Ordered business-key field names. Ordering is significant: the hub
    /// hash key is an order-sensitive function of these fields.
    pub business_keys: Vec<String>,
    pub fuzzy_rules: Vec<FuzzyRule>,
    pub spatial_id: Option<SpatialId>,
}

/// A similarity-threshold-based resolution rule.
///
/// The threshold is validated to lie in `[0, 1]` at lowering time; a value
/// outside that range fails the compile before any generator runs.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyRule {
    pub fields: Vec<String>,
    pub algorithm: String,
    pub threshold: f64,
}

/// Spatial identifier configuration (algorithm, dimensions, bit precision).
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialId {
    pub algorithm: String,
    pub dimensions: Vec<String>,
    pub precision: u32,
}

/// The kind tag of a storage table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Hub,
    Satellite,
    Link,
}

impl TableKind {
    /// The uppercase keyword as written in source.
    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Hub => "HUB",
            TableKind::Satellite => "SATELLITE",
            TableKind::Link => "LINK",
        }
    }
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The storage section of a context: tables partitioned by kind.
///
/// Tables are routed into the matching sequence by [`Storage::push`], so a
/// table's kind tag and the sequence holding it cannot disagree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Storage {
    hubs: Vec<Table>,
    satellites: Vec<Table>,
    links: Vec<Table>,
}

impl Storage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table to the sequence matching its kind tag.
    pub fn push(&mut self, table: Table) {
        match table.kind {
            TableKind::Hub => self.hubs.push(table),
            TableKind::Satellite => self.satellites.push(table),
            TableKind::Link => self.links.push(table),
        }
    }

    pub fn hubs(&self) -> &[Table] {
        &self.hubs
    }

    pub fn satellites(&self) -> &[Table] {
        &self.satellites
    }

    pub fn links(&self) -> &[Table] {
        &self.links
    }

    /// All tables in hub, satellite, link order.
    pub fn iter_all(&self) -> impl Iterator<Item = &Table> {
        self.hubs
            .iter()
            .chain(self.satellites.iter())
            .chain(self.links.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.hubs.is_empty() && self.satellites.is_empty() && self.links.is_empty()
    }
}

/// One Hub, Satellite, or Link table.
///
/// Constructed once during lowering, immutable thereafter; consumed by the
/// schema and domain-model generators independently.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub kind: TableKind,
    /// Point-in-time versioning flag. Only ever set on satellites; the
    /// lowering pass rejects it elsewhere.
    pub temporal_tracking: bool,
    pub partition_strategy: Option<String>,
    pub clustered_by: Option<String>,
    /// Hubs this link references. Only ever populated on links.
    pub connects: Vec<String>,
    pub columns: Vec<Column>,
}

impl Table {
    /// Create a table of the given kind with no columns or options.
    pub fn new(name: impl Into<String>, kind: TableKind) -> Self {
        Self {
            name: name.into(),
            kind,
            temporal_tracking: false,
            partition_strategy: None,
            clustered_by: None,
            connects: Vec::new(),
            columns: Vec::new(),
        }
    }
}

/// A declared column. The hub hash key is *not* part of this sequence; it
/// is an implicit column the schema generator adds on top.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    /// The DSL type exactly as written, e.g. `VARCHAR(200)`.
    pub data_type: String,
    pub primary_key: bool,
    pub unique: bool,
}

/// A DSL `COMMAND`: validation-rule descriptions and execution steps.
///
/// Validation rules are opaque strings at this layer; no expression parser
/// exists yet, and the actor generator emits placeholder guards for them.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub name: String,
    pub validations: Vec<String>,
    pub steps: Vec<ExecutionStep>,
}

/// One execution step of a command: action, target, optional payload
/// template.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionStep {
    pub action: String,
    pub target: String,
    pub payload: Option<String>,
}

/// Embedding-model configuration for a context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vectorization {
    pub model: String,
    /// Embedding name → ordered source fields. Declaration order preserved.
    pub embeddings: IndexMap<String, Vec<String>>,
}

/// A named fuzzy rule set attached to a context.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    pub name: String,
    pub algorithm: String,
    pub rules: Vec<String>,
}

impl RuleSet {
    /// The inference algorithm used when none is declared.
    pub const DEFAULT_ALGORITHM: &'static str = "MAMDANI";
}

/// Per-entity rendering hints, consumed only by the view-model generator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Presentation {
    pub styles: Vec<Style>,
}

impl Presentation {
    /// Find the style declared for an entity, if any.
    pub fn style_for(&self, entity: &str) -> Option<&Style> {
        self.styles.iter().find(|s| s.target_entity == entity)
    }
}

/// One `STYLE` entry of a presentation block.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub target_entity: String,
    pub color: String,
    pub shape: String,
    pub icon: Option<String>,
    pub label_field: Option<String>,
}

/// A declared retrieval-augmented query. Parsed and carried in the AST;
/// no generator back end consumes it yet.
#[derive(Debug, Clone, PartialEq)]
pub struct RagQuery {
    pub name: String,
    pub description: String,
    pub retrieval: Option<Retrieval>,
    pub generation: Option<Generation>,
}

/// Retrieval half of a RAG query.
#[derive(Debug, Clone, PartialEq)]
pub struct Retrieval {
    pub vector_target: String,
    pub top_k: u32,
    pub graph_hops: u32,
    pub graph_edges: Vec<String>,
    pub temporal_window: Option<String>,
}

/// Generation half of a RAG query.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub model: String,
    pub prompt_template: String,
}
