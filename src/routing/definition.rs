//! Route definitions.
//!
//! # Responsibilities
//! - Represent a declared route: method, segment pattern, bound names, handler
//! - Enforce the shape invariants once, at construction
//!
//! # Design Decisions
//! - Immutable after construction (fields are private, accessors only)
//! - `parameter_names` has one entry per segment position; an empty string
//!   marks a position that binds nothing
//! - Handlers are opaque `(class, method)` pairs, never interpreted here

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// HTTP methods a route can be declared for.
///
/// `Delete` routes mean soft delete by convention; handlers own that contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a method string is outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported HTTP method '{0}'")]
pub struct UnsupportedMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnsupportedMethod;

    /// ASCII case-insensitive: `get` and `GET` are the same method.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnsupportedMethod(s.to_string()))
    }
}

/// One position of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    /// Must equal the request segment at this position.
    Literal(String),
    /// Matches any single non-empty request segment.
    Wildcard,
}

impl Segment {
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Segment::Wildcard)
    }
}

/// Opaque handler identifier a route resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandlerId {
    pub class: String,
    pub method: String,
}

impl HandlerId {
    pub fn new(class: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            method: method.into(),
        }
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.class, self.method)
    }
}

/// Shape violation found while assembling a [`RouteDefinition`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    #[error("{names} parameter names for a {segments}-segment pattern")]
    ArityMismatch { names: usize, segments: usize },

    #[error("literal segment '{segment}' at position {position} cannot bind '{name}'")]
    BoundLiteral {
        position: usize,
        segment: String,
        name: String,
    },

    #[error("parameter name '{name}' is bound at positions {first} and {second}")]
    DuplicateParameter {
        name: String,
        first: usize,
        second: usize,
    },
}

/// An immutable declared route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDefinition {
    method: HttpMethod,
    pattern: Vec<Segment>,
    parameter_names: Vec<String>,
    handler: HandlerId,
    ordinal: usize,
    source: String,
}

impl RouteDefinition {
    /// Assemble a definition, checking the per-position invariants.
    ///
    /// `ordinal` is the declaration order across the whole discovery run and
    /// decides ties between equally specific routes.
    pub fn new(
        method: HttpMethod,
        pattern: Vec<Segment>,
        parameter_names: Vec<String>,
        handler: HandlerId,
        ordinal: usize,
        source: impl Into<String>,
    ) -> Result<Self, DefinitionError> {
        let definition = Self {
            method,
            pattern,
            parameter_names,
            handler,
            ordinal,
            source: source.into(),
        };
        definition.check()?;
        Ok(definition)
    }

    /// Re-check invariants. Used when a definition comes back from a
    /// persisted snapshot rather than through [`RouteDefinition::new`].
    pub fn check(&self) -> Result<(), DefinitionError> {
        if self.parameter_names.len() != self.pattern.len() {
            return Err(DefinitionError::ArityMismatch {
                names: self.parameter_names.len(),
                segments: self.pattern.len(),
            });
        }

        let mut bound: HashMap<&str, usize> = HashMap::new();
        for (position, (segment, name)) in
            self.pattern.iter().zip(&self.parameter_names).enumerate()
        {
            if name.is_empty() {
                continue;
            }
            if let Segment::Literal(literal) = segment {
                return Err(DefinitionError::BoundLiteral {
                    position,
                    segment: literal.clone(),
                    name: name.clone(),
                });
            }
            // Each name binds exactly one position.
            if let Some(first) = bound.insert(name, position) {
                return Err(DefinitionError::DuplicateParameter {
                    name: name.clone(),
                    first,
                    second: position,
                });
            }
        }
        Ok(())
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn pattern(&self) -> &[Segment] {
        &self.pattern
    }

    pub fn path_length(&self) -> usize {
        self.pattern.len()
    }

    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }

    pub fn handler(&self) -> &HandlerId {
        &self.handler
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Name of the route source that declared this route.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn literal_count(&self) -> usize {
        self.pattern.iter().filter(|s| !s.is_wildcard()).count()
    }

    /// Render the pattern back to its `/`-delimited form, wildcards as `?`.
    pub fn display_pattern(&self) -> String {
        let rendered: Vec<&str> = self
            .pattern
            .iter()
            .map(|segment| match segment {
                Segment::Literal(literal) => literal.as_str(),
                Segment::Wildcard => "?",
            })
            .collect();
        format!("/{}", rendered.join("/"))
    }
}

impl fmt::Display for RouteDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.method, self.display_pattern(), self.handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(s: &str) -> Segment {
        Segment::Literal(s.to_string())
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("GET".parse::<HttpMethod>(), Ok(HttpMethod::Get));
        assert_eq!("patch".parse::<HttpMethod>(), Ok(HttpMethod::Patch));
        assert_eq!(
            "HEAD".parse::<HttpMethod>(),
            Err(UnsupportedMethod("HEAD".to_string()))
        );
    }

    #[test]
    fn test_definition_invariants() {
        let def = RouteDefinition::new(
            HttpMethod::Get,
            vec![lit("Users"), Segment::Wildcard],
            vec![String::new(), "id".to_string()],
            HandlerId::new("UsersController", "read"),
            0,
            "users",
        )
        .unwrap();
        assert_eq!(def.path_length(), 2);
        assert_eq!(def.literal_count(), 1);
        assert_eq!(def.display_pattern(), "/Users/?");
        assert_eq!(def.to_string(), "GET /Users/? -> UsersController::read");

        let err = RouteDefinition::new(
            HttpMethod::Get,
            vec![Segment::Wildcard],
            vec![],
            HandlerId::new("A", "list"),
            0,
            "a",
        )
        .unwrap_err();
        assert_eq!(err, DefinitionError::ArityMismatch { names: 0, segments: 1 });

        let err = RouteDefinition::new(
            HttpMethod::Get,
            vec![lit("Users")],
            vec!["model".to_string()],
            HandlerId::new("A", "list"),
            0,
            "a",
        )
        .unwrap_err();
        assert!(matches!(err, DefinitionError::BoundLiteral { position: 0, .. }));
    }

    #[test]
    fn test_repeated_parameter_name_rejected() {
        let err = RouteDefinition::new(
            HttpMethod::Get,
            vec![lit("Orders"), Segment::Wildcard, lit("items"), Segment::Wildcard],
            vec![String::new(), "id".to_string(), String::new(), "id".to_string()],
            HandlerId::new("Orders", "item"),
            0,
            "orders",
        )
        .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::DuplicateParameter {
                name: "id".to_string(),
                first: 1,
                second: 3
            }
        );
    }

    #[test]
    fn test_root_pattern_display() {
        let def = RouteDefinition::new(
            HttpMethod::Get,
            vec![],
            vec![],
            HandlerId::new("Home", "index"),
            0,
            "home",
        )
        .unwrap();
        assert_eq!(def.display_pattern(), "/");
    }
}
