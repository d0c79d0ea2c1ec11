//! Route definitions and the type-erased handler they carry.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::FromRequestParts,
    handler::Handler,
    http::{self, request::Parts, Request},
    response::Response,
};
use futures_util::future::{BoxFuture, FutureExt};
use serde::Serialize;

use super::pattern::PathPattern;

/// HTTP methods a route can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Delete,
    /// Accepts every request method.
    Any,
}

impl Method {
    pub fn accepts(&self, method: &http::Method) -> bool {
        match self {
            Method::Get => *method == http::Method::GET,
            Method::Post => *method == http::Method::POST,
            Method::Delete => *method == http::Method::DELETE,
            Method::Any => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
            Method::Any => "ANY",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a method string is not one of GET, POST, DELETE or ANY.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported route method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "DELETE" => Ok(Method::Delete),
            "ANY" => Ok(Method::Any),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

/// A registered route. Immutable once built.
///
/// `H` is whatever the dispatch engine invokes; the route table and the
/// matcher never call it.
#[derive(Clone)]
pub struct Route<H> {
    pub method: Method,
    pub pattern: PathPattern,
    pub handler: H,
    pub action: String,
}

impl<H> Route<H> {
    pub fn new(method: Method, path: impl Into<PathPattern>, handler: H) -> Self {
        Self {
            method,
            pattern: path.into(),
            handler,
            action: String::new(),
        }
    }

    /// Label used in logs and metrics.
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    pub fn path(&self) -> &str {
        self.pattern.as_str()
    }
}

impl<H> fmt::Debug for Route<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.pattern.as_str())
            .field("action", &self.action)
            .finish()
    }
}

type HandlerFn = dyn Fn(Request<Body>) -> BoxFuture<'static, Response> + Send + Sync;

/// Any axum handler, erased so routes with different handler types can
/// live in one table.
#[derive(Clone)]
pub struct BoxedHandler(Arc<HandlerFn>);

impl BoxedHandler {
    pub fn new<F, T>(handler: F) -> Self
    where
        F: Handler<T, ()>,
        T: 'static,
    {
        Self(Arc::new(move |req| {
            <F as Handler<T, ()>>::call(handler.clone(), req, ()).boxed()
        }))
    }

    pub fn call(&self, req: Request<Body>) -> BoxFuture<'static, Response> {
        (self.0)(req)
    }
}

impl fmt::Debug for BoxedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BoxedHandler")
    }
}

/// Route served by an axum handler.
pub type HttpRoute = Route<BoxedHandler>;

pub fn get<F, T>(path: &str, handler: F) -> HttpRoute
where
    F: Handler<T, ()>,
    T: 'static,
{
    Route::new(Method::Get, path, BoxedHandler::new(handler))
}

pub fn post<F, T>(path: &str, handler: F) -> HttpRoute
where
    F: Handler<T, ()>,
    T: 'static,
{
    Route::new(Method::Post, path, BoxedHandler::new(handler))
}

pub fn delete<F, T>(path: &str, handler: F) -> HttpRoute
where
    F: Handler<T, ()>,
    T: 'static,
{
    Route::new(Method::Delete, path, BoxedHandler::new(handler))
}

pub fn any<F, T>(path: &str, handler: F) -> HttpRoute
where
    F: Handler<T, ()>,
    T: 'static,
{
    Route::new(Method::Any, path, BoxedHandler::new(handler))
}

/// Parameters extracted by the matcher, in binding order.
///
/// The scope identifier, when present, is always last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<S: Send + Sync> FromRequestParts<S> for PathParams {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<PathParams>().cloned().unwrap_or_default())
    }
}
