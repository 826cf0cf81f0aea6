//! Path parameter extraction.

use std::collections::HashMap;

use crate::routing::definition::RouteDefinition;
use crate::routing::error::RoutingError;

/// Extracted `name → value` bindings for a matched route.
pub type PathParams = HashMap<String, String>;

/// Bind each named position of `route` to the request segment at that position.
///
/// Positions with the empty placeholder are skipped. A length mismatch means
/// discovery or bucketing is broken, so it is reported as an invariant
/// violation rather than a routing miss.
pub fn extract_parameters(
    route: &RouteDefinition,
    segments: &[&str],
) -> Result<PathParams, RoutingError> {
    let names = route.parameter_names();
    if names.len() != segments.len() {
        return Err(RoutingError::ParameterArity {
            route: route.to_string(),
            expected: names.len(),
            actual: segments.len(),
        });
    }

    Ok(names
        .iter()
        .zip(segments)
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, value)| (name.clone(), (*value).to_string()))
        .collect())
}
