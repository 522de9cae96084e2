//! Parser for Ziggurat source tokens.
//!
//! This module transforms a token stream from the [`lexer`](crate::lexer) into
//! a parse tree defined in [`parser_types`](crate::parser_types). The public
//! entry point is [`build_program`], which recovers at context granularity:
//! when a context fails to parse, its diagnostic is recorded and parsing
//! resumes at the next top-level `CONTEXT` keyword.

use winnow::{
    Parser as _,
    combinator::{alt, opt, preceded, repeat, separated},
    error::{ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use ziggurat_core::ast::TableKind;

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    parser_types as types,
    span::{Span, Spanned},
    tokens::{PositionedToken, Token},
};

/// Context type for parser errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    /// Description of what is currently being parsed
    Label(&'static str),
    /// Remaining token count (`eof_offset()`) at error start position
    ///
    /// Used to calculate start_offset as: `tokens.len() - start_offset_value`
    StartOffset(usize),
}

type Input<'src> = TokenSlice<'src, PositionedToken<'src>>;
type IResult<O> = std::result::Result<O, ErrMode<ContextError<Context>>>;

fn cut_err<'src, O, F>(input: &mut Input<'src>, f: F) -> IResult<O>
where
    F: FnOnce(&mut Input<'src>) -> IResult<O>,
{
    let start_remaining = input.eof_offset();

    match f(input) {
        Ok(o) => Ok(o),
        Err(ErrMode::Backtrack(mut e)) | Err(ErrMode::Cut(mut e)) => {
            e.push(Context::StartOffset(start_remaining));
            Err(ErrMode::Cut(e))
        }
        Err(e) => Err(e),
    }
}

/// Parse whitespace and comments
fn ws_comment<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| {
        matches!(
            token.token,
            Token::Whitespace | Token::Newline | Token::LineComment(_)
        )
    })
    .void()
    .parse_next(input)
}

/// Parse zero or more whitespace/comments
fn ws_comments0<'src>(input: &mut Input<'src>) -> IResult<()> {
    repeat(0.., ws_comment).parse_next(input)
}

/// Parse one specific keyword token, skipping leading trivia.
///
/// All token-level helpers skip leading whitespace and comments, so grammar
/// functions rarely need explicit trivia handling.
fn keyword<'src>(
    input: &mut Input<'src>,
    pred: fn(&Token<'src>) -> bool,
    label: &'static str,
) -> IResult<Span> {
    preceded(
        ws_comments0,
        any.verify(move |token: &PositionedToken<'src>| pred(&token.token)),
    )
    .map(|token: &PositionedToken<'src>| token.span)
    .context(Context::Label(label))
    .parse_next(input)
}

fn semicolon<'src>(input: &mut Input<'src>) -> IResult<Span> {
    keyword(input, |t| matches!(*t, Token::Semicolon), "';'")
}

fn colon<'src>(input: &mut Input<'src>) -> IResult<Span> {
    keyword(input, |t| matches!(*t, Token::Colon), "':'")
}

fn comma<'src>(input: &mut Input<'src>) -> IResult<Span> {
    keyword(input, |t| matches!(*t, Token::Comma), "','")
}

fn arrow<'src>(input: &mut Input<'src>) -> IResult<Span> {
    keyword(input, |t| matches!(*t, Token::Arrow), "'->'")
}

fn lbrace<'src>(input: &mut Input<'src>) -> IResult<Span> {
    keyword(input, |t| matches!(*t, Token::LeftBrace), "'{'")
}

fn rbrace<'src>(input: &mut Input<'src>) -> IResult<Span> {
    keyword(input, |t| matches!(*t, Token::RightBrace), "'}'")
}

fn lparen<'src>(input: &mut Input<'src>) -> IResult<Span> {
    keyword(input, |t| matches!(*t, Token::LeftParen), "'('")
}

fn rparen<'src>(input: &mut Input<'src>) -> IResult<Span> {
    keyword(input, |t| matches!(*t, Token::RightParen), "')'")
}

fn lbracket<'src>(input: &mut Input<'src>) -> IResult<Span> {
    keyword(input, |t| matches!(*t, Token::LeftBracket), "'['")
}

fn rbracket<'src>(input: &mut Input<'src>) -> IResult<Span> {
    keyword(input, |t| matches!(*t, Token::RightBracket), "']'")
}

/// Parse an identifier with span preservation
fn identifier<'src>(input: &mut Input<'src>) -> IResult<Spanned<&'src str>> {
    preceded(
        ws_comments0,
        any.verify_map(|token: &PositionedToken<'src>| match &token.token {
            Token::Identifier(name) => Some(Spanned::new(*name, token.span)),
            _ => None,
        }),
    )
    .context(Context::Label("identifier"))
    .parse_next(input)
}

/// Parse a string literal
fn string_literal<'src>(input: &mut Input<'src>) -> IResult<Spanned<String>> {
    preceded(
        ws_comments0,
        any.verify_map(|token: &PositionedToken<'_>| match &token.token {
            Token::StringLiteral(s) => Some(Spanned::new(s.clone(), token.span)),
            _ => None,
        }),
    )
    .context(Context::Label("string literal"))
    .parse_next(input)
}

/// Parse an integer literal
fn int_value<'src>(input: &mut Input<'src>) -> IResult<Spanned<u64>> {
    preceded(
        ws_comments0,
        any.verify_map(|token: &PositionedToken<'_>| match &token.token {
            Token::IntLiteral(n) => Some(Spanned::new(*n, token.span)),
            _ => None,
        }),
    )
    .context(Context::Label("integer"))
    .parse_next(input)
}

/// Parse a numeric literal as f64 (integer or float)
fn float_value<'src>(input: &mut Input<'src>) -> IResult<Spanned<f64>> {
    preceded(
        ws_comments0,
        any.verify_map(|token: &PositionedToken<'_>| match &token.token {
            Token::FloatLiteral(f) => Some(Spanned::new(*f, token.span)),
            Token::IntLiteral(n) => Some(Spanned::new(*n as f64, token.span)),
            _ => None,
        }),
    )
    .context(Context::Label("number"))
    .parse_next(input)
}

/// Parse an attribute directive head: `<NAME>:`.
///
/// Directives are the `NAME: value;` statements inside blocks (`COLOR`,
/// `ALGORITHM`, `TOP_K`, ...). They are plain identifiers in the token
/// stream; this helper matches one by name and consumes the colon.
fn directive<'src>(name: &'static str) -> impl FnMut(&mut Input<'src>) -> IResult<Span> {
    move |input: &mut Input<'src>| {
        let span = preceded(
            ws_comments0,
            any.verify_map(|token: &PositionedToken<'src>| match &token.token {
                Token::Identifier(n) if *n == name => Some(token.span),
                _ => None,
            }),
        )
        .context(Context::Label(name))
        .parse_next(input)?;
        colon.parse_next(input)?;
        Ok(span)
    }
}

/// Parse a comma-separated identifier list: `a, b, c`
///
/// The single list parser shared by business keys, fuzzy fields, spatial
/// dimensions, connects clauses, embedding fields, and graph edges.
fn key_list<'src>(input: &mut Input<'src>) -> IResult<Vec<Spanned<&'src str>>> {
    separated(1.., identifier, comma)
        .context(Context::Label("identifier list"))
        .parse_next(input)
}

/// Parse a bracketed identifier list: `[a, b, c]` (possibly empty)
fn bracketed_key_list<'src>(input: &mut Input<'src>) -> IResult<Vec<Spanned<&'src str>>> {
    lbracket.parse_next(input)?;
    let keys = separated(0.., identifier, comma).parse_next(input)?;
    rbracket.parse_next(input)?;
    Ok(keys)
}

/// Parse a column data type, reassembled verbatim from tokens.
///
/// `VARCHAR(200)` lexes as four tokens; this rebuilds the original spelling
/// so the type survives into the AST exactly as written.
fn data_type<'src>(input: &mut Input<'src>) -> IResult<Spanned<String>> {
    let base = identifier
        .context(Context::Label("data type"))
        .parse_next(input)?;

    let args: Option<(Span, Vec<Spanned<u64>>, Span)> =
        opt((lparen, separated(1.., int_value, comma), rparen)).parse_next(input)?;

    match args {
        Some((_, values, close)) => {
            let rendered: Vec<String> = values.iter().map(|v| v.inner().to_string()).collect();
            let text = format!("{}({})", base.inner(), rendered.join(","));
            Ok(Spanned::new(text, base.span().union(close)))
        }
        None => Ok(base.map(|name| (*name).to_string())),
    }
}

/// Parse one column declaration: `<name>: <type> [PRIMARY KEY] [UNIQUE]`
fn column<'src>(input: &mut Input<'src>) -> IResult<types::ColumnDecl<'src>> {
    let name = identifier.parse_next(input)?;
    colon.parse_next(input)?;
    let data_type = data_type.parse_next(input)?;

    enum Flag {
        Primary,
        Unique,
    }

    let flags: Vec<Flag> = repeat(
        0..,
        alt((
            |input: &mut Input<'src>| {
                keyword(input, |t| matches!(*t, Token::Primary), "PRIMARY")?;
                keyword(input, |t| matches!(*t, Token::Key), "KEY")?;
                Ok(Flag::Primary)
            },
            |input: &mut Input<'src>| {
                keyword(input, |t| matches!(*t, Token::Unique), "UNIQUE")?;
                Ok(Flag::Unique)
            },
        )),
    )
    .parse_next(input)?;

    let mut decl = types::ColumnDecl {
        name,
        data_type,
        primary_key: false,
        unique: false,
    };
    for flag in flags {
        match flag {
            Flag::Primary => decl.primary_key = true,
            Flag::Unique => decl.unique = true,
        }
    }
    Ok(decl)
}

/// Parse a `CONNECTS (hub_a, hub_b)` clause; the span covers the whole clause
fn connects_clause<'src>(
    input: &mut Input<'src>,
) -> IResult<Spanned<Vec<Spanned<&'src str>>>> {
    let kw = keyword(input, |t| matches!(*t, Token::Connects), "CONNECTS")?;
    lparen.parse_next(input)?;
    let hubs = key_list.parse_next(input)?;
    let close = rparen.parse_next(input)?;
    Ok(Spanned::new(hubs, kw.union(close)))
}

/// Parse one table declaration inside a storage block.
///
/// `HUB <name> WITH { columns }` with optional `CONNECTS (...)` before
/// `WITH` and optional `temporal_tracking`, `PARTITION BY '<strategy>'`,
/// `CLUSTERED BY <field>` modifiers before the column block. Kind-specific
/// restrictions (satellite-only, link-only) are the lowering pass's job; the
/// grammar accepts every combination so lowering can report precise errors.
fn table_decl<'src>(input: &mut Input<'src>) -> IResult<types::TableDecl<'src>> {
    let kind = preceded(
        ws_comments0,
        any.verify_map(|token: &PositionedToken<'_>| match &token.token {
            Token::Hub => Some(Spanned::new(TableKind::Hub, token.span)),
            Token::Satellite => Some(Spanned::new(TableKind::Satellite, token.span)),
            Token::Link => Some(Spanned::new(TableKind::Link, token.span)),
            _ => None,
        }),
    )
    .context(Context::Label("table declaration"))
    .parse_next(input)?;

    cut_err(input, |input| {
        let name = identifier
            .context(Context::Label("table name"))
            .parse_next(input)?;

        let connects = opt(connects_clause).parse_next(input)?;

        keyword(input, |t| matches!(*t, Token::With), "WITH")?;

        let mut temporal_tracking = None;
        let mut partition_by = None;
        let mut clustered_by = None;
        loop {
            if let Some(span) = opt(|input: &mut Input<'src>| {
                keyword(
                    input,
                    |t| matches!(*t, Token::TemporalTracking),
                    "temporal_tracking",
                )
            })
            .parse_next(input)?
            {
                temporal_tracking = Some(span);
                continue;
            }
            if opt(|input: &mut Input<'src>| {
                keyword(input, |t| matches!(*t, Token::Partition), "PARTITION")
            })
            .parse_next(input)?
            .is_some()
            {
                keyword(input, |t| matches!(*t, Token::By), "BY")?;
                partition_by = Some(
                    string_literal
                        .context(Context::Label("partition strategy"))
                        .parse_next(input)?,
                );
                continue;
            }
            if opt(|input: &mut Input<'src>| {
                keyword(input, |t| matches!(*t, Token::Clustered), "CLUSTERED")
            })
            .parse_next(input)?
            .is_some()
            {
                keyword(input, |t| matches!(*t, Token::By), "BY")?;
                clustered_by = Some(
                    identifier
                        .context(Context::Label("clustering field"))
                        .parse_next(input)?,
                );
                continue;
            }
            break;
        }

        lbrace.parse_next(input)?;
        let columns = separated(0.., column, comma).parse_next(input)?;
        rbrace.parse_next(input)?;

        Ok(types::TableDecl {
            kind,
            name,
            temporal_tracking,
            partition_by,
            clustered_by,
            connects,
            columns,
        })
    })
}

/// Parse `STORAGE [<name>] { <tables> }`
fn storage_decl<'src>(input: &mut Input<'src>) -> IResult<types::StorageDecl<'src>> {
    let keyword_span = keyword(input, |t| matches!(*t, Token::Storage), "STORAGE")?;

    cut_err(input, |input| {
        let name = opt(identifier).parse_next(input)?;
        lbrace.parse_next(input)?;
        let tables = repeat(0.., table_decl).parse_next(input)?;
        rbrace.parse_next(input)?;

        Ok(types::StorageDecl {
            keyword_span,
            name,
            tables,
        })
    })
}

/// Parse one `MATCH: <fields> USING <algorithm> THRESHOLD <value>;` rule
fn fuzzy_rule<'src>(input: &mut Input<'src>) -> IResult<types::FuzzyRuleDecl<'src>> {
    keyword(input, |t| matches!(*t, Token::Match), "MATCH")?;
    colon.parse_next(input)?;
    let fields = key_list.parse_next(input)?;
    keyword(input, |t| matches!(*t, Token::Using), "USING")?;
    let algorithm = identifier
        .context(Context::Label("matching algorithm"))
        .parse_next(input)?;
    keyword(input, |t| matches!(*t, Token::Threshold), "THRESHOLD")?;
    let threshold = float_value
        .context(Context::Label("threshold value"))
        .parse_next(input)?;
    semicolon.parse_next(input)?;

    Ok(types::FuzzyRuleDecl {
        fields,
        algorithm,
        threshold,
    })
}

/// Parse a `SPATIAL_ID { ... }` block body (directives in any order)
fn spatial_id_decl<'src>(input: &mut Input<'src>) -> IResult<types::SpatialIdDecl<'src>> {
    lbrace.parse_next(input)?;

    let mut decl = types::SpatialIdDecl {
        algorithm: None,
        dimensions: Vec::new(),
        precision: None,
    };
    loop {
        if opt(directive("ALGORITHM")).parse_next(input)?.is_some() {
            decl.algorithm = Some(identifier.parse_next(input)?);
            semicolon.parse_next(input)?;
            continue;
        }
        if opt(directive("DIMENSIONS")).parse_next(input)?.is_some() {
            decl.dimensions = key_list.parse_next(input)?;
            semicolon.parse_next(input)?;
            continue;
        }
        if opt(directive("PRECISION")).parse_next(input)?.is_some() {
            decl.precision = Some(int_value.parse_next(input)?);
            semicolon.parse_next(input)?;
            continue;
        }
        break;
    }

    rbrace.parse_next(input)?;
    Ok(decl)
}

/// Parse `IDENTITY <name> { ... }`
fn identity_decl<'src>(input: &mut Input<'src>) -> IResult<types::IdentityDecl<'src>> {
    keyword(input, |t| matches!(*t, Token::Identity), "IDENTITY")?;

    cut_err(input, |input| {
        let name = identifier
            .context(Context::Label("identity name"))
            .parse_next(input)?;
        lbrace.parse_next(input)?;

        let mut business_keys = Vec::new();
        let mut fuzzy_rules = Vec::new();
        let mut spatial_id = None;
        loop {
            if opt(|input: &mut Input<'src>| {
                keyword(input, |t| matches!(*t, Token::BusinessKey), "BUSINESS_KEY")
            })
            .parse_next(input)?
            .is_some()
            {
                colon.parse_next(input)?;
                business_keys.extend(key_list.parse_next(input)?);
                semicolon.parse_next(input)?;
                continue;
            }
            if opt(|input: &mut Input<'src>| {
                keyword(
                    input,
                    |t| matches!(*t, Token::FuzzyResolution),
                    "FUZZY_RESOLUTION",
                )
            })
            .parse_next(input)?
            .is_some()
            {
                lbrace.parse_next(input)?;
                let rules: Vec<types::FuzzyRuleDecl<'src>> =
                    repeat(0.., fuzzy_rule).parse_next(input)?;
                fuzzy_rules.extend(rules);
                rbrace.parse_next(input)?;
                continue;
            }
            if opt(|input: &mut Input<'src>| {
                keyword(input, |t| matches!(*t, Token::SpatialId), "SPATIAL_ID")
            })
            .parse_next(input)?
            .is_some()
            {
                spatial_id = Some(spatial_id_decl.parse_next(input)?);
                continue;
            }
            break;
        }

        rbrace.parse_next(input)?;

        Ok(types::IdentityDecl {
            name,
            business_keys,
            fuzzy_rules,
            spatial_id,
        })
    })
}

/// Parse one `ACTION: <id> -> TARGET: <id> [PAYLOAD: '<tpl>'];` step
fn execution_step<'src>(input: &mut Input<'src>) -> IResult<types::StepDecl<'src>> {
    keyword(input, |t| matches!(*t, Token::Action), "ACTION")?;
    colon.parse_next(input)?;
    let action = identifier
        .context(Context::Label("action name"))
        .parse_next(input)?;
    arrow.parse_next(input)?;
    keyword(input, |t| matches!(*t, Token::Target), "TARGET")?;
    colon.parse_next(input)?;
    let target = identifier
        .context(Context::Label("target name"))
        .parse_next(input)?;

    let payload = opt(|input: &mut Input<'src>| {
        keyword(input, |t| matches!(*t, Token::Payload), "PAYLOAD")?;
        colon.parse_next(input)?;
        string_literal.parse_next(input)
    })
    .parse_next(input)?;

    semicolon.parse_next(input)?;

    Ok(types::StepDecl {
        action,
        target,
        payload,
    })
}

/// Parse one `CHECK: <rule_name>;` statement
fn check_rule<'src>(input: &mut Input<'src>) -> IResult<Spanned<&'src str>> {
    keyword(input, |t| matches!(*t, Token::Check), "CHECK")?;
    colon.parse_next(input)?;
    let rule = identifier
        .context(Context::Label("validation rule name"))
        .parse_next(input)?;
    semicolon.parse_next(input)?;
    Ok(rule)
}

/// Parse `COMMAND <name> { VALIDATION {...} EXECUTION {...} }`
fn command_decl<'src>(input: &mut Input<'src>) -> IResult<types::CommandDecl<'src>> {
    keyword(input, |t| matches!(*t, Token::Command), "COMMAND")?;

    cut_err(input, |input| {
        let name = identifier
            .context(Context::Label("command name"))
            .parse_next(input)?;
        lbrace.parse_next(input)?;

        let mut validations = Vec::new();
        let mut steps = Vec::new();
        loop {
            if opt(|input: &mut Input<'src>| {
                keyword(input, |t| matches!(*t, Token::Validation), "VALIDATION")
            })
            .parse_next(input)?
            .is_some()
            {
                lbrace.parse_next(input)?;
                let checks: Vec<Spanned<&'src str>> =
                    repeat(0.., check_rule).parse_next(input)?;
                validations.extend(checks);
                rbrace.parse_next(input)?;
                continue;
            }
            if opt(|input: &mut Input<'src>| {
                keyword(input, |t| matches!(*t, Token::Execution), "EXECUTION")
            })
            .parse_next(input)?
            .is_some()
            {
                lbrace.parse_next(input)?;
                let parsed: Vec<types::StepDecl<'src>> =
                    repeat(0.., execution_step).parse_next(input)?;
                steps.extend(parsed);
                rbrace.parse_next(input)?;
                continue;
            }
            break;
        }

        rbrace.parse_next(input)?;

        Ok(types::CommandDecl {
            name,
            validations,
            steps,
        })
    })
}

/// Parse one `<name>: [field, field];` embedding entry
fn embedding_entry<'src>(input: &mut Input<'src>) -> IResult<types::EmbeddingDecl<'src>> {
    let name = identifier.parse_next(input)?;
    colon.parse_next(input)?;
    let fields = bracketed_key_list.parse_next(input)?;
    semicolon.parse_next(input)?;
    Ok(types::EmbeddingDecl { name, fields })
}

/// Parse `VECTORIZATION { MODEL: '<model>'; EMBEDDINGS { ... } }`
fn vectorization_decl<'src>(input: &mut Input<'src>) -> IResult<types::VectorizationDecl<'src>> {
    let keyword_span = keyword(input, |t| matches!(*t, Token::Vectorization), "VECTORIZATION")?;

    cut_err(input, |input| {
        lbrace.parse_next(input)?;

        let mut model = None;
        let mut embeddings = Vec::new();
        loop {
            if opt(|input: &mut Input<'src>| {
                keyword(input, |t| matches!(*t, Token::Model), "MODEL")
            })
            .parse_next(input)?
            .is_some()
            {
                colon.parse_next(input)?;
                model = Some(
                    string_literal
                        .context(Context::Label("model name"))
                        .parse_next(input)?,
                );
                semicolon.parse_next(input)?;
                continue;
            }
            if opt(|input: &mut Input<'src>| {
                keyword(input, |t| matches!(*t, Token::Embeddings), "EMBEDDINGS")
            })
            .parse_next(input)?
            .is_some()
            {
                lbrace.parse_next(input)?;
                let entries: Vec<types::EmbeddingDecl<'src>> =
                    repeat(0.., embedding_entry).parse_next(input)?;
                embeddings.extend(entries);
                rbrace.parse_next(input)?;
                continue;
            }
            break;
        }

        rbrace.parse_next(input)?;

        Ok(types::VectorizationDecl {
            keyword_span,
            model,
            embeddings,
        })
    })
}

/// Parse `RULESET <name> { ALGORITHM: <id>; RULE: '<text>'; ... }`
fn rule_set_decl<'src>(input: &mut Input<'src>) -> IResult<types::RuleSetDecl<'src>> {
    let keyword_span = keyword(input, |t| matches!(*t, Token::RuleSet), "RULESET")?;

    cut_err(input, |input| {
        let name = identifier
            .context(Context::Label("rule set name"))
            .parse_next(input)?;
        lbrace.parse_next(input)?;

        let mut algorithm = None;
        let mut rules = Vec::new();
        loop {
            if opt(directive("ALGORITHM")).parse_next(input)?.is_some() {
                algorithm = Some(identifier.parse_next(input)?);
                semicolon.parse_next(input)?;
                continue;
            }
            if opt(directive("RULE")).parse_next(input)?.is_some() {
                rules.push(string_literal.parse_next(input)?);
                semicolon.parse_next(input)?;
                continue;
            }
            break;
        }

        rbrace.parse_next(input)?;

        Ok(types::RuleSetDecl {
            keyword_span,
            name,
            algorithm,
            rules,
        })
    })
}

/// Parse one `STYLE <entity> { ... }` block
fn style_decl<'src>(input: &mut Input<'src>) -> IResult<types::StyleDecl<'src>> {
    keyword(input, |t| matches!(*t, Token::Style), "STYLE")?;

    cut_err(input, |input| {
        let target = identifier
            .context(Context::Label("style target entity"))
            .parse_next(input)?;
        lbrace.parse_next(input)?;

        let mut decl = types::StyleDecl {
            target,
            color: None,
            shape: None,
            icon: None,
            label: None,
        };
        loop {
            if opt(directive("COLOR")).parse_next(input)?.is_some() {
                decl.color = Some(string_literal.parse_next(input)?);
                semicolon.parse_next(input)?;
                continue;
            }
            if opt(directive("SHAPE")).parse_next(input)?.is_some() {
                decl.shape = Some(identifier.parse_next(input)?);
                semicolon.parse_next(input)?;
                continue;
            }
            if opt(directive("ICON")).parse_next(input)?.is_some() {
                decl.icon = Some(string_literal.parse_next(input)?);
                semicolon.parse_next(input)?;
                continue;
            }
            if opt(directive("LABEL")).parse_next(input)?.is_some() {
                decl.label = Some(identifier.parse_next(input)?);
                semicolon.parse_next(input)?;
                continue;
            }
            break;
        }

        rbrace.parse_next(input)?;
        Ok(decl)
    })
}

/// Parse `PRESENTATION { STYLE ... }`
fn presentation_decl<'src>(input: &mut Input<'src>) -> IResult<types::PresentationDecl<'src>> {
    let keyword_span = keyword(input, |t| matches!(*t, Token::Presentation), "PRESENTATION")?;

    cut_err(input, |input| {
        lbrace.parse_next(input)?;
        let styles = repeat(0.., style_decl).parse_next(input)?;
        rbrace.parse_next(input)?;

        Ok(types::PresentationDecl {
            keyword_span,
            styles,
        })
    })
}

/// Parse a `RETRIEVAL { ... }` block body
fn retrieval_decl<'src>(input: &mut Input<'src>) -> IResult<types::RetrievalDecl<'src>> {
    lbrace.parse_next(input)?;

    let mut decl = types::RetrievalDecl::default();
    loop {
        if opt(directive("VECTOR_TARGET")).parse_next(input)?.is_some() {
            decl.vector_target = Some(identifier.parse_next(input)?);
            semicolon.parse_next(input)?;
            continue;
        }
        if opt(directive("TOP_K")).parse_next(input)?.is_some() {
            decl.top_k = Some(int_value.parse_next(input)?);
            semicolon.parse_next(input)?;
            continue;
        }
        if opt(directive("GRAPH_HOPS")).parse_next(input)?.is_some() {
            decl.graph_hops = Some(int_value.parse_next(input)?);
            semicolon.parse_next(input)?;
            continue;
        }
        if opt(directive("GRAPH_EDGES")).parse_next(input)?.is_some() {
            decl.graph_edges = bracketed_key_list.parse_next(input)?;
            semicolon.parse_next(input)?;
            continue;
        }
        if opt(directive("TEMPORAL_WINDOW")).parse_next(input)?.is_some() {
            decl.temporal_window = Some(string_literal.parse_next(input)?);
            semicolon.parse_next(input)?;
            continue;
        }
        break;
    }

    rbrace.parse_next(input)?;
    Ok(decl)
}

/// Parse a `GENERATION { ... }` block body
fn generation_decl(input: &mut Input<'_>) -> IResult<types::GenerationDecl> {
    lbrace.parse_next(input)?;

    let mut decl = types::GenerationDecl::default();
    loop {
        if opt(|input: &mut Input<'_>| keyword(input, |t| matches!(*t, Token::Model), "MODEL"))
            .parse_next(input)?
            .is_some()
        {
            colon.parse_next(input)?;
            decl.model = Some(string_literal.parse_next(input)?);
            semicolon.parse_next(input)?;
            continue;
        }
        if opt(directive("PROMPT")).parse_next(input)?.is_some() {
            decl.prompt = Some(string_literal.parse_next(input)?);
            semicolon.parse_next(input)?;
            continue;
        }
        break;
    }

    rbrace.parse_next(input)?;
    Ok(decl)
}

/// Parse `RAG_QUERY <name> { ... }`
fn rag_query_decl<'src>(input: &mut Input<'src>) -> IResult<types::RagQueryDecl<'src>> {
    keyword(input, |t| matches!(*t, Token::RagQuery), "RAG_QUERY")?;

    cut_err(input, |input| {
        let name = identifier
            .context(Context::Label("query name"))
            .parse_next(input)?;
        lbrace.parse_next(input)?;

        let mut description = None;
        let mut retrieval = None;
        let mut generation = None;
        loop {
            if opt(directive("DESCRIPTION")).parse_next(input)?.is_some() {
                description = Some(string_literal.parse_next(input)?);
                semicolon.parse_next(input)?;
                continue;
            }
            if opt(|input: &mut Input<'src>| {
                keyword(input, |t| matches!(*t, Token::Retrieval), "RETRIEVAL")
            })
            .parse_next(input)?
            .is_some()
            {
                retrieval = Some(retrieval_decl.parse_next(input)?);
                continue;
            }
            if opt(|input: &mut Input<'src>| {
                keyword(input, |t| matches!(*t, Token::Generation), "GENERATION")
            })
            .parse_next(input)?
            .is_some()
            {
                generation = Some(generation_decl.parse_next(input)?);
                continue;
            }
            break;
        }

        rbrace.parse_next(input)?;

        Ok(types::RagQueryDecl {
            name,
            description,
            retrieval,
            generation,
        })
    })
}

/// Parse one declaration of a context body
fn context_item<'src>(input: &mut Input<'src>) -> IResult<types::ContextItem<'src>> {
    alt((
        identity_decl.map(types::ContextItem::Identity),
        storage_decl.map(types::ContextItem::Storage),
        command_decl.map(types::ContextItem::Command),
        vectorization_decl.map(types::ContextItem::Vectorization),
        rule_set_decl.map(types::ContextItem::RuleSet),
        presentation_decl.map(types::ContextItem::Presentation),
        rag_query_decl.map(types::ContextItem::RagQuery),
    ))
    .context(Context::Label("context declaration"))
    .parse_next(input)
}

/// Parse a complete `CONTEXT <name> { ... }` declaration
fn context_decl<'src>(input: &mut Input<'src>) -> IResult<types::ContextDecl<'src>> {
    keyword(input, |t| matches!(*t, Token::Context), "CONTEXT")?;

    cut_err(input, |input| {
        let name = identifier
            .context(Context::Label("context name"))
            .parse_next(input)?;
        lbrace.parse_next(input)?;
        let items = repeat(0.., context_item).parse_next(input)?;
        rbrace.parse_next(input)?;

        Ok(types::ContextDecl { name, items })
    })
}

/// Skip forward to the next top-level `CONTEXT` keyword.
///
/// Always consumes at least one token so recovery makes progress even when
/// the failure happened at a `CONTEXT` keyword itself.
fn synchronize(input: &mut Input<'_>) {
    if !input.is_empty() {
        let _ = input.next_token();
    }
    while !input.is_empty() {
        let checkpoint = input.checkpoint();
        match any::<_, ErrMode<ContextError<Context>>>.parse_next(input) {
            Ok(token) => {
                if matches!(token.token, Token::Context) {
                    input.reset(&checkpoint);
                    break;
                }
            }
            Err(_) => break,
        }
    }
}

/// Utility function to convert winnow errors to our custom error format
///
/// Extracts position information from error context (StartOffset) and
/// calculates precise error spans using the token array.
fn convert_error(
    error: ErrMode<ContextError<Context>>,
    tokens: &[PositionedToken],
    current_remaining: usize,
) -> Diagnostic {
    // Extract start offset from error context if available
    let start_remaining = match &error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e.context().find_map(|ctx| match ctx {
            Context::StartOffset(n) => Some(*n),
            _ => None,
        }),
        _ => None,
    };

    // Calculate offsets from remaining token counts
    let end_offset = tokens.len() - current_remaining;
    let start_offset = start_remaining.map(|r| tokens.len() - r).unwrap_or(0);

    match error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => {
            // Extract context information for better error messages
            let contexts: Vec<String> = e
                .context()
                .filter_map(|ctx| match ctx {
                    Context::Label(label) => Some(format!("expected {label}")),
                    _ => None,
                })
                .collect();

            let message = if contexts.is_empty() {
                "unexpected token or end of input".to_string()
            } else {
                contexts.join(", ")
            };

            // Calculate error span from token positions
            let error_span = {
                let examine_range = if start_offset < end_offset {
                    // Parser consumed tokens - examine that range
                    start_offset..end_offset
                } else if end_offset < tokens.len() {
                    if matches!(
                        tokens[end_offset].token,
                        Token::RightBrace | Token::RightParen | Token::RightBracket
                    ) {
                        // At delimiter without consuming - examine everything
                        // before it (e.g., missing semicolon before })
                        0..end_offset
                    } else {
                        // At specific non-delimiter token - examine just that token
                        end_offset..end_offset + 1
                    }
                } else {
                    // EOF - examine all tokens
                    0..tokens.len()
                };

                let slice = &tokens[examine_range];
                if slice.is_empty() {
                    tokens
                        .get(end_offset)
                        .map(|t| t.span)
                        .unwrap_or_default()
                } else {
                    let first = slice
                        .iter()
                        .find(|t| !matches!(t.token, Token::Whitespace | Token::Newline))
                        .map(|t| t.span)
                        .unwrap_or(slice[0].span);
                    let last = slice
                        .iter()
                        .rev()
                        .find(|t| !matches!(t.token, Token::Whitespace | Token::Newline))
                        .map(|t| t.span)
                        .unwrap_or(slice[slice.len() - 1].span);
                    first.union(last)
                }
            };

            Diagnostic::error(format!("unexpected token: {message}"))
                .with_code(ErrorCode::E100)
                .with_label(error_span, "unexpected token")
                .with_help("check syntax and token positioning")
        }
        ErrMode::Incomplete(_) => {
            // This should not happen as we are not supporting streaming input.
            let error_span = if end_offset < tokens.len() {
                tokens[end_offset].span
            } else {
                tokens
                    .iter()
                    .rev()
                    .find(|t| !matches!(t.token, Token::Whitespace | Token::Newline))
                    .map(|t| t.span)
                    .unwrap_or_default()
            };

            Diagnostic::error("incomplete input, more tokens expected")
                .with_code(ErrorCode::E101)
                .with_label(error_span, "incomplete")
                .with_help("ensure input is complete")
        }
    }
}

/// Build a parse tree from tokens, recovering at context granularity.
///
/// Each failed context contributes one diagnostic; parsing resumes at the
/// next top-level `CONTEXT` keyword. Any diagnostic fails the overall parse.
pub fn build_program<'src>(
    tokens: &'src [PositionedToken<'src>],
) -> Result<types::SourceProgram<'src>, ParseError> {
    let mut input = TokenSlice::new(tokens);
    let mut contexts = Vec::new();
    let mut diagnostics = DiagnosticCollector::new();

    loop {
        let _ = ws_comments0.parse_next(&mut input);
        if input.is_empty() {
            break;
        }

        match context_decl.parse_next(&mut input) {
            Ok(context) => contexts.push(context),
            Err(e) => {
                let current_remaining = input.eof_offset();
                diagnostics.emit(convert_error(e, tokens, current_remaining));
                synchronize(&mut input);
            }
        }
    }

    diagnostics.finish().map(|()| types::SourceProgram { contexts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse_tokens(input: &str) -> Vec<PositionedToken<'_>> {
        tokenize(input).expect("failed to tokenize input")
    }

    #[test]
    fn test_empty_source() {
        let tokens = parse_tokens("  \n // just a comment\n");
        let program = build_program(&tokens).expect("should parse");
        assert!(program.contexts.is_empty());
    }

    #[test]
    fn test_empty_context() {
        let tokens = parse_tokens("CONTEXT Sales { }");
        let program = build_program(&tokens).expect("should parse");
        assert_eq!(program.contexts.len(), 1);
        assert_eq!(*program.contexts[0].name.inner(), "Sales");
        assert!(program.contexts[0].items.is_empty());
    }

    #[test]
    fn test_identity_declaration() {
        let source = "CONTEXT Sales {
            IDENTITY MasterEntity {
                BUSINESS_KEY: tax_id, registry_no;
                FUZZY_RESOLUTION {
                    MATCH: full_name USING levenshtein THRESHOLD 0.85;
                    MATCH: street, city USING jaro_winkler THRESHOLD 0.9;
                }
                SPATIAL_ID {
                    ALGORITHM: geohash;
                    DIMENSIONS: lat, lon;
                    PRECISION: 12;
                }
            }
        }";
        let tokens = parse_tokens(source);
        let program = build_program(&tokens).expect("should parse");

        let types::ContextItem::Identity(identity) = &program.contexts[0].items[0] else {
            panic!("expected identity declaration");
        };
        assert_eq!(*identity.name.inner(), "MasterEntity");
        assert_eq!(
            identity
                .business_keys
                .iter()
                .map(|k| *k.inner())
                .collect::<Vec<_>>(),
            vec!["tax_id", "registry_no"]
        );
        assert_eq!(identity.fuzzy_rules.len(), 2);
        assert_eq!(*identity.fuzzy_rules[0].threshold.inner(), 0.85);
        assert_eq!(*identity.fuzzy_rules[1].algorithm.inner(), "jaro_winkler");
        assert_eq!(identity.fuzzy_rules[1].fields.len(), 2);

        let spatial = identity.spatial_id.as_ref().expect("spatial id");
        assert_eq!(spatial.algorithm.map(|a| *a.inner()), Some("geohash"));
        assert_eq!(*spatial.precision.unwrap().inner(), 12);
        assert_eq!(spatial.dimensions.len(), 2);
    }

    #[test]
    fn test_storage_tables() {
        let source = "CONTEXT Sales {
            STORAGE {
                HUB hub_customer WITH {
                    customer_key: UUID PRIMARY KEY,
                    name: VARCHAR(200) UNIQUE
                }
                SATELLITE sat_customer_details WITH temporal_tracking
                    PARTITION BY 'monthly' CLUSTERED BY load_date {
                    email: VARCHAR(100)
                }
                LINK link_customer_plot CONNECTS (hub_customer, hub_plot) WITH {
                    assigned_at: TIMESTAMP
                }
            }
        }";
        let tokens = parse_tokens(source);
        let program = build_program(&tokens).expect("should parse");

        let types::ContextItem::Storage(storage) = &program.contexts[0].items[0] else {
            panic!("expected storage declaration");
        };
        assert_eq!(storage.tables.len(), 3);

        let hub = &storage.tables[0];
        assert_eq!(*hub.kind.inner(), TableKind::Hub);
        assert_eq!(*hub.name.inner(), "hub_customer");
        assert!(hub.columns[0].primary_key);
        assert!(!hub.columns[0].unique);
        assert_eq!(*hub.columns[1].data_type.inner(), "VARCHAR(200)");
        assert!(hub.columns[1].unique);

        let sat = &storage.tables[1];
        assert_eq!(*sat.kind.inner(), TableKind::Satellite);
        assert!(sat.temporal_tracking.is_some());
        assert_eq!(
            sat.partition_by.as_ref().map(|p| p.inner().as_str()),
            Some("monthly")
        );
        assert_eq!(sat.clustered_by.map(|c| *c.inner()), Some("load_date"));

        let link = &storage.tables[2];
        assert_eq!(*link.kind.inner(), TableKind::Link);
        let connects = link.connects.as_ref().expect("connects clause");
        assert_eq!(
            connects.inner().iter().map(|h| *h.inner()).collect::<Vec<_>>(),
            vec!["hub_customer", "hub_plot"]
        );
    }

    #[test]
    fn test_named_storage_block() {
        let source = "CONTEXT Sales { STORAGE DataVault { } }";
        let tokens = parse_tokens(source);
        let program = build_program(&tokens).expect("should parse");

        let types::ContextItem::Storage(storage) = &program.contexts[0].items[0] else {
            panic!("expected storage declaration");
        };
        assert_eq!(storage.name.map(|n| *n.inner()), Some("DataVault"));
        assert!(storage.tables.is_empty());
    }

    #[test]
    fn test_decimal_data_type_reassembly() {
        let source = "CONTEXT C { STORAGE { HUB h WITH { amount: DECIMAL(10,2) } } }";
        let tokens = parse_tokens(source);
        let program = build_program(&tokens).expect("should parse");

        let types::ContextItem::Storage(storage) = &program.contexts[0].items[0] else {
            panic!("expected storage declaration");
        };
        assert_eq!(
            *storage.tables[0].columns[0].data_type.inner(),
            "DECIMAL(10,2)"
        );
    }

    #[test]
    fn test_command_declaration() {
        let source = "CONTEXT Sales {
            COMMAND IngestCustomerData {
                VALIDATION {
                    CHECK: email_is_valid;
                    CHECK: name_not_empty;
                }
                EXECUTION {
                    ACTION: insert_event -> TARGET: sat_customer_details
                        PAYLOAD: '{\"email\": \"x\"}';
                    ACTION: update_index -> TARGET: hub_customer;
                }
            }
        }";
        let tokens = parse_tokens(source);
        let program = build_program(&tokens).expect("should parse");

        let types::ContextItem::Command(command) = &program.contexts[0].items[0] else {
            panic!("expected command declaration");
        };
        assert_eq!(*command.name.inner(), "IngestCustomerData");
        assert_eq!(command.validations.len(), 2);
        assert_eq!(*command.validations[0].inner(), "email_is_valid");
        assert_eq!(command.steps.len(), 2);
        assert_eq!(*command.steps[0].action.inner(), "insert_event");
        assert!(command.steps[0].payload.is_some());
        assert!(command.steps[1].payload.is_none());
    }

    #[test]
    fn test_vectorization_declaration() {
        let source = "CONTEXT Sales {
            VECTORIZATION {
                MODEL: 'all-MiniLM-L6-v2';
                EMBEDDINGS {
                    customer_profile: [name, bio];
                    plot_profile: [location];
                }
            }
        }";
        let tokens = parse_tokens(source);
        let program = build_program(&tokens).expect("should parse");

        let types::ContextItem::Vectorization(vec_decl) = &program.contexts[0].items[0] else {
            panic!("expected vectorization declaration");
        };
        assert_eq!(
            vec_decl.model.as_ref().map(|m| m.inner().as_str()),
            Some("all-MiniLM-L6-v2")
        );
        assert_eq!(vec_decl.embeddings.len(), 2);
        assert_eq!(*vec_decl.embeddings[0].name.inner(), "customer_profile");
        assert_eq!(vec_decl.embeddings[0].fields.len(), 2);
    }

    #[test]
    fn test_rule_set_declaration() {
        let source = "CONTEXT Sales {
            RULESET CustomerQuality {
                ALGORITHM: MAMDANI;
                RULE: 'IF completeness IS low THEN review IS required';
                RULE: 'IF age IS high THEN priority IS low';
            }
        }";
        let tokens = parse_tokens(source);
        let program = build_program(&tokens).expect("should parse");

        let types::ContextItem::RuleSet(rule_set) = &program.contexts[0].items[0] else {
            panic!("expected rule set declaration");
        };
        assert_eq!(*rule_set.name.inner(), "CustomerQuality");
        assert_eq!(rule_set.algorithm.map(|a| *a.inner()), Some("MAMDANI"));
        assert_eq!(rule_set.rules.len(), 2);
    }

    #[test]
    fn test_presentation_declaration() {
        let source = "CONTEXT Sales {
            PRESENTATION {
                STYLE hub_customer {
                    COLOR: '#2E86AB';
                    SHAPE: HEXAGON;
                    ICON: 'person';
                    LABEL: name;
                }
                STYLE hub_plot {
                    COLOR: '#E63946';
                }
            }
        }";
        let tokens = parse_tokens(source);
        let program = build_program(&tokens).expect("should parse");

        let types::ContextItem::Presentation(presentation) = &program.contexts[0].items[0]
        else {
            panic!("expected presentation declaration");
        };
        assert_eq!(presentation.styles.len(), 2);
        let style = &presentation.styles[0];
        assert_eq!(*style.target.inner(), "hub_customer");
        assert_eq!(
            style.color.as_ref().map(|c| c.inner().as_str()),
            Some("#2E86AB")
        );
        assert_eq!(style.shape.map(|s| *s.inner()), Some("HEXAGON"));
        assert!(presentation.styles[1].shape.is_none());
    }

    #[test]
    fn test_rag_query_declaration() {
        let source = "CONTEXT Sales {
            RAG_QUERY FindRelatives {
                DESCRIPTION: 'Locate likely relatives';
                RETRIEVAL {
                    VECTOR_TARGET: customer_profile;
                    TOP_K: 8;
                    GRAPH_HOPS: 2;
                    GRAPH_EDGES: [link_customer_plot];
                    TEMPORAL_WINDOW: '5y';
                }
                GENERATION {
                    MODEL: 'gpt-4o-mini';
                    PROMPT: 'Summarise the relationship evidence.';
                }
            }
        }";
        let tokens = parse_tokens(source);
        let program = build_program(&tokens).expect("should parse");

        let types::ContextItem::RagQuery(query) = &program.contexts[0].items[0] else {
            panic!("expected rag query declaration");
        };
        assert_eq!(*query.name.inner(), "FindRelatives");
        let retrieval = query.retrieval.as_ref().expect("retrieval block");
        assert_eq!(retrieval.top_k.map(|k| *k.inner()), Some(8));
        assert_eq!(retrieval.graph_hops.map(|h| *h.inner()), Some(2));
        assert_eq!(retrieval.graph_edges.len(), 1);
        let generation = query.generation.as_ref().expect("generation block");
        assert_eq!(
            generation.model.as_ref().map(|m| m.inner().as_str()),
            Some("gpt-4o-mini")
        );
    }

    #[test]
    fn test_multiple_contexts() {
        let source = "CONTEXT A { } CONTEXT B { } CONTEXT C { }";
        let tokens = parse_tokens(source);
        let program = build_program(&tokens).expect("should parse");
        let names: Vec<_> = program
            .contexts
            .iter()
            .map(|c| *c.name.inner())
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let source = "CONTEXT Sales {
            STORAGE {
                HUB hub_customer WITH { customer_key: UUID PRIMARY KEY }
            }
            COMMAND Ingest {
                EXECUTION { ACTION: a -> TARGET: hub_customer; }
            }
        }";
        let tokens = parse_tokens(source);
        let first = build_program(&tokens).expect("should parse");
        let second = build_program(&tokens).expect("should parse");
        assert_eq!(first, second);
    }

    #[test]
    fn test_error_missing_context_name() {
        let tokens = parse_tokens("CONTEXT { }");
        let err = build_program(&tokens).expect_err("should fail");
        assert_eq!(err.diagnostics().len(), 1);
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E100));
    }

    #[test]
    fn test_error_garbage_at_top_level() {
        let tokens = parse_tokens("notacontext");
        let err = build_program(&tokens).expect_err("should fail");
        assert_eq!(err.diagnostics().len(), 1);
    }

    #[test]
    fn test_recovery_collects_multiple_context_errors() {
        // Two malformed contexts and a valid one in between: recovery should
        // resume at each CONTEXT keyword and report both failures.
        let source = "CONTEXT { }\nCONTEXT Good { }\nCONTEXT Bad STORAGE { }";
        let tokens = parse_tokens(source);
        let err = build_program(&tokens).expect_err("should fail");
        assert_eq!(err.diagnostics().len(), 2);
        assert!(err
            .diagnostics()
            .iter()
            .all(|d| d.code() == Some(ErrorCode::E100)));
    }

    #[test]
    fn test_error_unclosed_context() {
        let tokens = parse_tokens("CONTEXT Sales { IDENTITY Person {");
        let err = build_program(&tokens).expect_err("should fail");
        assert!(!err.diagnostics().is_empty());
    }

    #[test]
    fn test_comments_are_skipped_everywhere() {
        let source = "// header\nCONTEXT Sales { // inline\n  STORAGE { } // after\n}";
        let tokens = parse_tokens(source);
        let program = build_program(&tokens).expect("should parse");
        assert_eq!(program.contexts.len(), 1);
        assert_eq!(program.contexts[0].items.len(), 1);
    }
}
