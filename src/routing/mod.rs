//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Discovery (startup / maintenance):
//!     RouteSource[] (CRUD controller, models, configured controllers)
//!     → declaration.rs (raw method/path/handler strings)
//!     → discovery.rs (normalize, validate, skip-and-log bad ones)
//!     → table.rs (bucket by method + path length)
//!     → cache (persist, publish)
//!
//! Incoming Request (method, path):
//!     → router.rs (normalize, bucket lookup)
//!     → scorer.rs (literal = 2, wildcard = 1, highest wins)
//!     → params.rs (bind named positions)
//!     → Return: ResolvedRoute or RoutingError::NotFound
//! ```
//!
//! # Design Decisions
//! - Declarations are validated at discovery, never at request time
//! - A specific route from one source outranks a generic one from another
//!   without either knowing about the other
//! - Deterministic: equal scores resolve to the earliest declaration

pub mod declaration;
pub mod definition;
pub mod discovery;
pub mod error;
pub mod params;
pub mod router;
pub mod scorer;
pub mod sources;
pub mod table;

pub use declaration::{RouteDeclaration, RouteSource};
pub use definition::{HandlerId, HttpMethod, RouteDefinition, Segment};
pub use discovery::{DeclarationError, DiscoveryReport, RouteDiscoverer};
pub use error::RoutingError;
pub use params::PathParams;
pub use router::{ResolvedRoute, Router};
pub use scorer::PathScorer;
pub use sources::{CrudControllerSource, ModelRouteSource, StaticRouteSource};
pub use table::{BucketKey, RouteTable};
