//! Route table: registration, lookup and reverse lookup.
//!
//! # Responsibilities
//! - Store routes in declaration order
//! - Look up the first route whose pattern matches a request path
//! - Build URLs from route names (reverse lookup)
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in declaration order; first match wins
//! - Explicit `None` on no match rather than a silent default
//! - Duplicate patterns and names are rejected when the table is built

use std::collections::HashSet;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use thiserror::Error;

use crate::routing::handler::View;
use crate::routing::matcher::{Converter, PathParams, PathPattern, PatternError, Segment};

/// Characters escaped in a reversed path, `/` included.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}')
    .add(b'/');

/// Like [`SEGMENT`], but `/` is kept for `path` captures.
const PATH: &AsciiSet = &SEGMENT.remove(b'/');

/// A single entry of the route table.
#[derive(Debug, Clone)]
pub struct Route {
    pattern: PathPattern,
    view: View,
    name: Option<String>,
}

impl Route {
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Register `view` under `pattern`, optionally naming the route for reverse lookup.
pub fn path(pattern: &str, view: View, name: Option<&str>) -> Result<Route, PatternError> {
    Ok(Route {
        pattern: PathPattern::parse(pattern)?,
        view,
        name: name.map(str::to_string),
    })
}

/// Error raised when routes cannot form a table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTableError {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("pattern {0:?} is registered more than once")]
    DuplicatePattern(String),

    #[error("route name {0:?} is registered more than once")]
    DuplicateName(String),
}

/// Error raised by reverse lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReverseError {
    #[error("no route named {0:?}")]
    UnknownName(String),

    #[error("route {route:?} requires parameter {param:?}")]
    MissingParameter { route: String, param: String },

    #[error("route {route:?} has no parameter {param:?}")]
    UnexpectedParameter { route: String, param: String },

    #[error("value {value:?} is not a valid {converter} for parameter {param:?} of route {route:?}")]
    InvalidValue {
        route: String,
        param: String,
        converter: &'static str,
        value: String,
    },
}

/// A successful lookup.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    /// Position of the route in the table.
    pub index: usize,
    pub route: &'a Route,
    pub params: PathParams,
}

impl RouteMatch<'_> {
    /// Name of the handler the route is bound to.
    pub fn view_name(&self) -> &str {
        self.route.view().name()
    }

    pub fn route_name(&self) -> Option<&str> {
        self.route.name()
    }
}

/// Immutable, ordered table of routes.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Build a table, checking that patterns and names are unique.
    pub fn new(routes: Vec<Route>) -> Result<Self, RouteTableError> {
        let mut patterns = HashSet::new();
        let mut names = HashSet::new();

        for route in &routes {
            if !patterns.insert(route.pattern.as_str()) {
                return Err(RouteTableError::DuplicatePattern(
                    route.pattern.as_str().to_string(),
                ));
            }
            if let Some(name) = route.name() {
                if !names.insert(name) {
                    return Err(RouteTableError::DuplicateName(name.to_string()));
                }
            }
        }

        Ok(Self { routes })
    }

    /// All routes in declaration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Find the first route matching `path`.
    ///
    /// A single leading `/` is ignored, so `/chat/` and `chat/` resolve alike.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        self.resolve_from(path, 0)
    }

    /// Like [`RouteTable::resolve`], skipping routes before `start`.
    pub fn resolve_from(&self, path: &str, start: usize) -> Option<RouteMatch<'_>> {
        let path = path.strip_prefix('/').unwrap_or(path);
        self.routes
            .iter()
            .enumerate()
            .skip(start)
            .find_map(|(index, route)| {
                route.pattern.match_path(path).map(|params| RouteMatch {
                    index,
                    route,
                    params,
                })
            })
    }

    /// Route registered under `name`.
    pub fn by_name(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.name() == Some(name))
    }

    /// Pattern registered under `name`.
    pub fn pattern_for(&self, name: &str) -> Option<&PathPattern> {
        self.by_name(name).map(Route::pattern)
    }

    /// Build the absolute URL path for the route named `name`.
    ///
    /// Parameter values are percent-encoded; `path` captures keep their slashes.
    pub fn reverse(&self, name: &str, params: &[(&str, &str)]) -> Result<String, ReverseError> {
        let route = self
            .by_name(name)
            .ok_or_else(|| ReverseError::UnknownName(name.to_string()))?;

        for (param, _) in params {
            if !route.pattern.param_names().any(|p| p == *param) {
                return Err(ReverseError::UnexpectedParameter {
                    route: name.to_string(),
                    param: param.to_string(),
                });
            }
        }

        let mut url = String::from("/");
        for segment in route.pattern.segments() {
            match segment {
                Segment::Literal(lit) => url.push_str(lit),
                Segment::Param { name: param, converter } => {
                    let value = params
                        .iter()
                        .find(|(p, _)| *p == param.as_str())
                        .map(|(_, v)| *v)
                        .ok_or_else(|| ReverseError::MissingParameter {
                            route: name.to_string(),
                            param: param.clone(),
                        })?;
                    if !converter.accepts(value) {
                        return Err(ReverseError::InvalidValue {
                            route: name.to_string(),
                            param: param.clone(),
                            converter: converter.as_str(),
                            value: value.to_string(),
                        });
                    }
                    let escape = match converter {
                        Converter::Path => PATH,
                        _ => SEGMENT,
                    };
                    url.extend(utf8_percent_encode(value, escape));
                }
            }
        }
        Ok(url)
    }
}
