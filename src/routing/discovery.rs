//! Route discovery.
//!
//! # Responsibilities
//! - Ask every registered source for its declarations
//! - Normalize path strings into segment patterns
//! - Validate each declaration and turn it into a `RouteDefinition`
//! - Assemble the bucketed `RouteTable`
//!
//! # Design Decisions
//! - Best effort: a bad declaration is logged and skipped, never fatal
//! - Ordinals are assigned across all sources in iteration order, so the
//!   order sources are registered in is the tie-break order
//! - Duplicate `(method, pattern)` pairs are kept; the later one is shadowed

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use crate::config::schema::RoutingConfig;
use crate::observability::metrics;
use crate::routing::declaration::{RouteDeclaration, RouteSource};
use crate::routing::definition::{
    DefinitionError, HandlerId, HttpMethod, RouteDefinition, Segment, UnsupportedMethod,
};
use crate::routing::table::RouteTable;

/// Why a declaration was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    #[error(transparent)]
    Method(#[from] UnsupportedMethod),

    #[error("cannot parse path '{path}': {reason}")]
    Path { path: String, reason: String },

    #[error(
        "{names} parameter names given for {wildcards} wildcards in {segments} segments"
    )]
    ParameterCount {
        names: usize,
        wildcards: usize,
        segments: usize,
    },

    #[error("handler class and method must both be non-empty")]
    MissingHandler,

    #[error(transparent)]
    Shape(#[from] DefinitionError),
}

/// A declaration that did not make it into the table.
#[derive(Debug, Clone)]
pub struct Rejection {
    pub source: String,
    pub declaration: RouteDeclaration,
    pub error: DeclarationError,
}

/// Outcome of one discovery run.
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    pub sources: usize,
    pub accepted: usize,
    pub rejected: Vec<Rejection>,
    pub shadowed: usize,
}

/// Split a path on `/`, dropping leading and trailing empty segments.
///
/// `""` and `"/"` both give an empty list. Interior empty segments are kept
/// so callers can decide what they mean.
pub fn split_path(path: &str) -> Vec<&str> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    }
}

/// Parse a declared path into segments plus the names carried inline by
/// `:name` wildcards (empty for anonymous ones and literals).
pub fn parse_pattern(
    path: &str,
    wildcard_token: &str,
) -> Result<(Vec<Segment>, Vec<String>), DeclarationError> {
    let fail = |reason: String| DeclarationError::Path {
        path: path.to_string(),
        reason,
    };

    let mut segments = Vec::new();
    let mut inline_names = Vec::new();

    for (position, raw) in split_path(path).into_iter().enumerate() {
        if raw.is_empty() {
            return Err(fail(format!("empty segment at position {}", position)));
        }
        if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(fail(format!("segment '{}' contains whitespace", raw)));
        }

        if raw == wildcard_token {
            segments.push(Segment::Wildcard);
            inline_names.push(String::new());
        } else if let Some(name) = raw.strip_prefix(':') {
            if name.is_empty() {
                return Err(fail(format!("unnamed ':' wildcard at position {}", position)));
            }
            segments.push(Segment::Wildcard);
            inline_names.push(name.to_string());
        } else if raw.contains(wildcard_token) {
            return Err(fail(format!(
                "segment '{}' mixes the wildcard token into a literal",
                raw
            )));
        } else {
            segments.push(Segment::Literal(raw.to_string()));
            inline_names.push(String::new());
        }
    }

    Ok((segments, inline_names))
}

/// Spread explicit names over segment positions.
///
/// Accepts one name per wildcard, or one name per segment with the empty
/// placeholder at literal positions (the `/?/?/link/?` form).
fn align_parameter_names(
    segments: &[Segment],
    explicit: &[String],
) -> Result<Vec<String>, DeclarationError> {
    let wildcards = segments.iter().filter(|s| s.is_wildcard()).count();

    if explicit.len() == wildcards {
        let mut names = explicit.iter();
        return Ok(segments
            .iter()
            .map(|segment| match segment {
                Segment::Wildcard => names.next().cloned().unwrap_or_default(),
                Segment::Literal(_) => String::new(),
            })
            .collect());
    }

    if explicit.len() == segments.len() {
        return Ok(explicit.to_vec());
    }

    Err(DeclarationError::ParameterCount {
        names: explicit.len(),
        wildcards,
        segments: segments.len(),
    })
}

/// Turn one declaration into a definition.
pub fn compile_declaration(
    declaration: &RouteDeclaration,
    ordinal: usize,
    source: &str,
    wildcard_token: &str,
) -> Result<RouteDefinition, DeclarationError> {
    let method: HttpMethod = declaration.method.trim().parse()?;

    if declaration.handler_class.trim().is_empty() || declaration.handler_method.trim().is_empty()
    {
        return Err(DeclarationError::MissingHandler);
    }

    let (segments, inline_names) = parse_pattern(&declaration.path, wildcard_token)?;
    let parameter_names = match &declaration.parameter_names {
        Some(explicit) => align_parameter_names(&segments, explicit)?,
        None => inline_names,
    };

    Ok(RouteDefinition::new(
        method,
        segments,
        parameter_names,
        HandlerId::new(
            declaration.handler_class.clone(),
            declaration.handler_method.clone(),
        ),
        ordinal,
        source,
    )?)
}

/// Runs discovery over a fixed list of route sources.
#[derive(Debug, Clone)]
pub struct RouteDiscoverer {
    sources: Vec<Arc<dyn RouteSource>>,
    wildcard_token: String,
    case_insensitive: bool,
}

impl RouteDiscoverer {
    pub fn new(wildcard_token: impl Into<String>) -> Self {
        Self {
            sources: Vec::new(),
            wildcard_token: wildcard_token.into(),
            case_insensitive: false,
        }
    }

    pub fn from_config(config: &RoutingConfig) -> Self {
        Self::new(config.wildcard_token.clone()).case_insensitive(config.case_insensitive)
    }

    /// Treat literals differing only in ASCII case as the same pattern when
    /// looking for duplicates. Must agree with the scorer's setting.
    pub fn case_insensitive(mut self, enabled: bool) -> Self {
        self.case_insensitive = enabled;
        self
    }

    fn duplicate_key(&self, definition: &RouteDefinition) -> (HttpMethod, Vec<Segment>) {
        let pattern = definition
            .pattern()
            .iter()
            .map(|segment| match segment {
                Segment::Literal(literal) if self.case_insensitive => {
                    Segment::Literal(literal.to_ascii_lowercase())
                }
                other => other.clone(),
            })
            .collect();
        (definition.method(), pattern)
    }

    /// Register a source. Registration order is declaration order.
    pub fn with_source(mut self, source: Arc<dyn RouteSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn add_source(&mut self, source: Arc<dyn RouteSource>) {
        self.sources.push(source);
    }

    pub fn sources(&self) -> usize {
        self.sources.len()
    }

    /// Discover every route. Never fails; rejections end up in the report.
    pub fn discover(&self) -> (RouteTable, DiscoveryReport) {
        let start = Instant::now();
        let mut report = DiscoveryReport {
            sources: self.sources.len(),
            ..DiscoveryReport::default()
        };
        let mut definitions = Vec::new();
        let mut seen: HashSet<(HttpMethod, Vec<Segment>)> = HashSet::new();
        let mut ordinal = 0;

        for source in &self.sources {
            let declarations = source.register_routes();
            tracing::debug!(
                source = %source.name(),
                declarations = declarations.len(),
                "Collecting route declarations"
            );

            for declaration in declarations {
                match compile_declaration(&declaration, ordinal, source.name(), &self.wildcard_token)
                {
                    Ok(definition) => {
                        ordinal += 1;
                        if !seen.insert(self.duplicate_key(&definition)) {
                            report.shadowed += 1;
                            tracing::warn!(
                                source = %source.name(),
                                route = %definition,
                                "Duplicate route pattern; earlier declaration takes precedence"
                            );
                        }
                        definitions.push(definition);
                    }
                    Err(error) => {
                        tracing::warn!(
                            source = %source.name(),
                            declaration = %declaration,
                            error = %error,
                            "Skipping malformed route declaration"
                        );
                        metrics::record_rejected_declaration();
                        report.rejected.push(Rejection {
                            source: source.name().to_string(),
                            declaration,
                            error,
                        });
                    }
                }
            }
        }

        report.accepted = definitions.len();
        let table = RouteTable::from_definitions(definitions);

        tracing::info!(
            sources = report.sources,
            routes = report.accepted,
            rejected = report.rejected.len(),
            buckets = table.bucket_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Route discovery complete"
        );

        (table, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::sources::StaticRouteSource;

    #[test]
    fn test_split_path() {
        assert!(split_path("").is_empty());
        assert!(split_path("/").is_empty());
        assert_eq!(split_path("/Users/123/"), vec!["Users", "123"]);
        assert_eq!(split_path("Users"), vec!["Users"]);
        assert_eq!(split_path("/a//b"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_parse_pattern_tokens() {
        let (segments, names) = parse_pattern("/Users/?/:field", "?").unwrap();
        assert_eq!(
            segments,
            vec![Segment::Literal("Users".into()), Segment::Wildcard, Segment::Wildcard]
        );
        assert_eq!(names, vec!["", "", "field"]);

        let (segments, _) = parse_pattern("/", "?").unwrap();
        assert!(segments.is_empty());
    }

    #[test]
    fn test_parse_pattern_rejects_garbage() {
        assert!(parse_pattern("/a//b", "?").is_err());
        assert!(parse_pattern("/a b", "?").is_err());
        assert!(parse_pattern("/ab?c", "?").is_err());
        assert!(parse_pattern("/:", "?").is_err());
    }

    #[test]
    fn test_custom_wildcard_token() {
        let (segments, _) = parse_pattern("/Users/*", "*").unwrap();
        assert_eq!(segments[1], Segment::Wildcard);

        // With a custom token, `?` is just a character.
        let (segments, _) = parse_pattern("/faq?", "*").unwrap();
        assert_eq!(segments[0], Segment::Literal("faq?".into()));
    }

    #[test]
    fn test_parameter_names_per_wildcard() {
        let decl = RouteDeclaration::new("GET", "/Users/?", "B", "read").with_params(["id"]);
        let def = compile_declaration(&decl, 0, "test", "?").unwrap();
        assert_eq!(def.parameter_names(), &["".to_string(), "id".to_string()]);
    }

    #[test]
    fn test_parameter_names_per_position() {
        let decl = RouteDeclaration::new("GET", "/?/?/link/?", "A", "listRelated")
            .with_params(["modelName", "id", "", "relationship"]);
        let def = compile_declaration(&decl, 0, "test", "?").unwrap();
        assert_eq!(def.parameter_names()[2], "");
        assert_eq!(def.parameter_names()[3], "relationship");
    }

    #[test]
    fn test_parameter_names_binding_a_literal() {
        let decl = RouteDeclaration::new("GET", "/?/?/link/?", "A", "listRelated")
            .with_params(["modelName", "id", "link", "relationship"]);
        let err = compile_declaration(&decl, 0, "test", "?").unwrap_err();
        assert!(matches!(err, DeclarationError::Shape(DefinitionError::BoundLiteral { .. })));
    }

    #[test]
    fn test_parameter_count_mismatch() {
        let decl = RouteDeclaration::new("GET", "/?/?", "A", "retrieve").with_params(["id"]);
        let err = compile_declaration(&decl, 0, "test", "?").unwrap_err();
        assert_eq!(
            err,
            DeclarationError::ParameterCount {
                names: 1,
                wildcards: 2,
                segments: 2
            }
        );
    }

    #[test]
    fn test_rejects_unknown_method_and_missing_handler() {
        let decl = RouteDeclaration::new("FETCH", "/?", "A", "list");
        assert!(matches!(
            compile_declaration(&decl, 0, "test", "?"),
            Err(DeclarationError::Method(_))
        ));

        let decl = RouteDeclaration::new("GET", "/?", "", "list");
        assert_eq!(
            compile_declaration(&decl, 0, "test", "?").unwrap_err(),
            DeclarationError::MissingHandler
        );
    }

    #[test]
    fn test_discovery_skips_bad_declarations() {
        let source = StaticRouteSource::new(
            "mixed",
            vec![
                RouteDeclaration::new("GET", "/?", "A", "list").with_params(["modelName"]),
                RouteDeclaration::new("GET", "/?/?", "A", "retrieve").with_params(["id"]),
                RouteDeclaration::new("POST", "/?", "A", "create").with_params(["modelName"]),
            ],
        );
        let discoverer = RouteDiscoverer::new("?").with_source(Arc::new(source));
        let (table, report) = discoverer.discover();

        assert_eq!(table.len(), 2);
        assert_eq!(report.accepted, 2);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].declaration.handler_method, "retrieve");
    }

    #[test]
    fn test_discovery_ordinals_span_sources() {
        let first = StaticRouteSource::new(
            "first",
            vec![RouteDeclaration::new("GET", "/?", "A", "list")],
        );
        let second = StaticRouteSource::new(
            "second",
            vec![RouteDeclaration::new("GET", "/?", "B", "list")],
        );
        let (table, report) = RouteDiscoverer::new("?")
            .with_source(Arc::new(first))
            .with_source(Arc::new(second))
            .discover();

        let bucket = table.bucket(HttpMethod::Get, 1);
        assert_eq!(bucket[0].source(), "first");
        assert_eq!(bucket[0].ordinal(), 0);
        assert_eq!(bucket[1].ordinal(), 1);
        assert_eq!(report.shadowed, 1);
    }

    #[test]
    fn test_repeated_parameter_names_rejected() {
        let explicit = RouteDeclaration::new("GET", "/Orders/?/items/?", "Orders", "item")
            .with_params(["id", "id"]);
        let err = compile_declaration(&explicit, 0, "test", "?").unwrap_err();
        assert!(matches!(
            err,
            DeclarationError::Shape(DefinitionError::DuplicateParameter { ref name, .. }) if name == "id"
        ));

        let inline = RouteDeclaration::new("GET", "/Orders/:id/items/:id", "Orders", "item");
        let err = compile_declaration(&inline, 0, "test", "?").unwrap_err();
        assert!(matches!(
            err,
            DeclarationError::Shape(DefinitionError::DuplicateParameter { first: 1, second: 3, .. })
        ));

        // Empty placeholders may repeat.
        let placeholders = RouteDeclaration::new("GET", "/?/?/link/?", "A", "listRelated")
            .with_params(["", "id", "", "relationship"]);
        assert!(compile_declaration(&placeholders, 0, "test", "?").is_ok());
    }

    #[test]
    fn test_discovery_skips_repeated_parameter_names() {
        let source = StaticRouteSource::new(
            "orders",
            vec![
                RouteDeclaration::new("GET", "/Orders/?/items/?", "Orders", "item")
                    .with_params(["id", "id"]),
                RouteDeclaration::new("GET", "/Orders/?", "Orders", "read").with_params(["id"]),
            ],
        );
        let (table, report) = RouteDiscoverer::new("?").with_source(Arc::new(source)).discover();

        assert_eq!(table.len(), 1);
        assert_eq!(report.rejected.len(), 1);
        assert!(table.bucket(HttpMethod::Get, 4).is_empty());
    }

    #[test]
    fn test_case_insensitive_duplicates_are_shadowed() {
        let routes = vec![
            RouteDeclaration::new("GET", "/Users/?", "A", "read").with_params(["id"]),
            RouteDeclaration::new("GET", "/users/?", "B", "read").with_params(["id"]),
        ];

        let (_, report) = RouteDiscoverer::new("?")
            .with_source(Arc::new(StaticRouteSource::new("mixed", routes.clone())))
            .discover();
        assert_eq!(report.shadowed, 0);

        let (table, report) = RouteDiscoverer::new("?")
            .case_insensitive(true)
            .with_source(Arc::new(StaticRouteSource::new("mixed", routes)))
            .discover();
        assert_eq!(report.shadowed, 1);
        assert_eq!(table.len(), 2);
    }
}
