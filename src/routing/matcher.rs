//! Route matching logic.
//!
//! # Responsibilities
//! - Strip the mount prefix
//! - Classify API routes (`/api/...` minus artifact files)
//! - Match literal paths verbatim
//! - Match scope-parameterized paths, extracting placeholders and the
//!   multi-segment scope identifier
//!
//! # Design Decisions
//! - Pure function over the route slice; no state, no allocation for
//!   literal hits
//! - First match in registration order wins
//! - Path matching is case-sensitive
//! - The `:repo` segment of a pattern fixes where the scope sits; patterns
//!   without one take the scope right after the start index
//! - The scope never starts before the start index, so it cannot swallow
//!   the `api` marker

use axum::http;

use super::pattern::{PathPattern, Segment, SCOPE_PARAM};
use super::route::{PathParams, Route};

/// Prefix marking API-style calls.
pub const API_PREFIX: &str = "/api/";

/// Artifact files that are never API calls, even under `/api/`.
const ARTIFACT_EXTENSIONS: [&str; 3] = [".yaml", ".tgz", ".prov"];

/// Everything the matcher needs about one request.
#[derive(Debug, Clone, Copy)]
pub struct MatchRequest<'a> {
    pub method: &'a http::Method,
    pub path: &'a str,
    /// Empty when the router is mounted at `/`.
    pub mount_prefix: &'a str,
    /// Number of path segments forming the scope identifier.
    pub scope_depth: usize,
}

/// A matched route and the parameters bound from the URL.
#[derive(Debug)]
pub struct RouteMatch<'t, H> {
    pub route: &'t Route<H>,
    pub params: PathParams,
}

/// True for `/api/...` paths that do not name an artifact file.
pub fn is_api_route(path: &str) -> bool {
    path.starts_with(API_PREFIX) && !ARTIFACT_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Path relative to the mount prefix, or `None` when the request is not
/// under the mount.
pub fn strip_mount_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return Some(path);
    }
    if path == prefix {
        return Some("/");
    }
    match path.strip_prefix(prefix) {
        Some(rest) if rest.starts_with('/') => Some(rest),
        _ => None,
    }
}

/// Find the first route in `routes` matching `req`.
pub fn match_route<'t, H>(routes: &'t [Route<H>], req: &MatchRequest<'_>) -> Option<RouteMatch<'t, H>> {
    let path = strip_mount_prefix(req.path, req.mount_prefix)?;

    let api = is_api_route(path);
    let start = if api { 2 } else { 1 };
    let parts: Vec<&str> = path.split('/').collect();
    let scoped = parts.len() >= req.scope_depth + start;

    for route in routes {
        if !route.method.accepts(req.method) {
            continue;
        }

        if route.pattern.as_str() == path {
            return Some(RouteMatch {
                route,
                params: PathParams::new(),
            });
        }

        if !scoped {
            continue;
        }

        if let Some(params) = match_scoped(&route.pattern, &parts, api, req.scope_depth) {
            return Some(RouteMatch { route, params });
        }
    }

    None
}

/// Compare `pattern` against the URL segments with `depth` of them taken
/// out as the scope.
fn match_scoped(pattern: &PathPattern, parts: &[&str], api: bool, depth: usize) -> Option<PathParams> {
    // API patterns only serve API routes.
    if !api && pattern.as_str().starts_with(API_PREFIX) {
        return None;
    }

    let start = if api { 2 } else { 1 };
    let segments = pattern.segments();
    if parts.len() != segments.len() + depth {
        return None;
    }

    let scope_at = pattern.scope_at().unwrap_or(start);
    if scope_at < start || scope_at > segments.len() {
        return None;
    }

    let mut params = PathParams::new();
    for (i, segment) in segments.iter().enumerate() {
        let value = if i < scope_at { parts[i] } else { parts[i + depth] };
        match segment {
            Segment::Literal(literal) => {
                if literal != value {
                    return None;
                }
            }
            Segment::Param(name) => params.push(name.as_str(), value),
        }
    }

    params.push(SCOPE_PARAM, parts[scope_at..scope_at + depth].join("/"));
    Some(params)
}
