//! Testing utilities for ghx
//!
//! This module provides [`FakeTransport`], a scripted in-memory stand-in for
//! the REST API that records every call it receives.
//!
//! Only available when compiled with `cfg(test)`.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use serde_json::{Value, json};

use crate::api::{ApiError, Method, Result, Transport};
use crate::scope::Scope;

/// A request seen by the fake
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

/// Scripted transport
///
/// Responses are queued per `(method, path)`; the query string is ignored
/// when matching. Each call consumes the front of its queue, except that the
/// last queued response is sticky and answers every later call.
///
/// Unscripted `GET`s answer 404. Unscripted writes succeed with `null`, so a
/// test only has to script the failures it cares about.
#[derive(Default)]
pub struct FakeTransport {
    routes: RefCell<HashMap<(Method, String), VecDeque<Result<Value>>>>,
    calls: RefCell<Vec<Call>>,
}

impl FakeTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for `method path`
    #[must_use]
    pub fn respond(self, method: Method, path: &str, response: Result<Value>) -> Self {
        self.routes
            .borrow_mut()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(response);
        self
    }

    /// Queue a failure for `method path`
    #[must_use]
    pub fn fail(self, method: Method, path: &str, error: ApiError) -> Self {
        self.respond(method, path, Err(error))
    }

    /// Queue the label collection for `scope`
    #[must_use]
    pub fn with_labels(self, scope: &Scope, labels: &[(&str, u64)]) -> Self {
        let body = labels
            .iter()
            .map(|(name, id)| json!({"id": id, "name": name, "color": "ededed"}))
            .collect();
        let path = format!("{}/labels", scope.api_path());
        self.respond(Method::Get, &path, Ok(Value::Array(body)))
    }

    /// Queue the label collection returned by the next fetch
    #[must_use]
    pub fn then_labels(self, scope: &Scope, labels: &[(&str, u64)]) -> Self {
        self.with_labels(scope, labels)
    }

    /// Queue the milestone collection for `scope`
    #[must_use]
    pub fn with_milestones(self, scope: &Scope, milestones: &[(&str, u64)]) -> Self {
        let body = milestones
            .iter()
            .map(|(title, number)| json!({"number": number, "title": title, "state": "open"}))
            .collect();
        let path = format!("{}/milestones", scope.api_path());
        self.respond(Method::Get, &path, Ok(Value::Array(body)))
    }

    /// Every call received, in order
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Calls other than `GET`
    #[must_use]
    pub fn mutations(&self) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.method != Method::Get)
            .cloned()
            .collect()
    }

    /// Number of `GET`s against `path` (query string ignored)
    #[must_use]
    pub fn get_count(&self, path: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.method == Method::Get && strip_query(&c.path) == path)
            .count()
    }
}

impl Transport for FakeTransport {
    fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        self.calls.borrow_mut().push(Call {
            method,
            path: path.to_string(),
            body: body.cloned(),
        });

        let key = (method, strip_query(path).to_string());
        let mut routes = self.routes.borrow_mut();
        match routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(Ok(Value::Null)),
            Some(queue) => queue.front().cloned().unwrap_or(Ok(Value::Null)),
            None if method == Method::Get => Err(ApiError::NotFound(format!("no route for {path}"))),
            None => Ok(Value::Null),
        }
    }
}

fn strip_query(path: &str) -> &str {
    path.split_once('?').map_or(path, |(p, _)| p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_response_is_sticky() {
        let fake = FakeTransport::new()
            .respond(Method::Get, "/a", Ok(json!(1)))
            .respond(Method::Get, "/a", Ok(json!(2)));
        assert_eq!(fake.request(Method::Get, "/a", None).unwrap(), json!(1));
        assert_eq!(fake.request(Method::Get, "/a?page=2", None).unwrap(), json!(2));
        assert_eq!(fake.request(Method::Get, "/a", None).unwrap(), json!(2));
        assert_eq!(fake.get_count("/a"), 3);
    }

    #[test]
    fn test_unscripted_defaults() {
        let fake = FakeTransport::new();
        assert!(matches!(
            fake.request(Method::Get, "/missing", None),
            Err(ApiError::NotFound(_))
        ));
        assert_eq!(
            fake.request(Method::Post, "/anything", Some(&json!({"x": 1}))).unwrap(),
            Value::Null
        );
        assert_eq!(fake.mutations().len(), 1);
        assert_eq!(fake.mutations()[0].body, Some(json!({"x": 1})));
    }
}
