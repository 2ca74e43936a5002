//! GitHub REST API access
//!
//! The rest of the crate talks to the remote service only through the
//! [`Transport`] trait. [`HttpTransport`] is the production implementation;
//! tests substitute a scripted in-memory transport.

mod client;
mod error;
pub mod issues;
pub mod repo;
pub mod types;

pub use client::HttpTransport;
pub use error::{ApiError, FailureCause};

use serde_json::Value;

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Page size used for collection endpoints (the API maximum)
pub const PER_PAGE: usize = 100;

/// HTTP verbs used against the REST API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A blocking REST transport
///
/// `path` is relative to the API root (e.g. `/repos/o/r/labels`). A
/// successful response with an empty body yields `Value::Null`.
pub trait Transport {
    /// Issue a single request
    ///
    /// # Errors
    /// Returns `ApiError` for non-success statuses, connectivity failures and
    /// undecodable bodies.
    fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value>;

    /// Fetch every page of a collection endpoint
    ///
    /// Walks `page=1,2,..` with [`PER_PAGE`] items per page and stops at the
    /// first short page.
    ///
    /// # Errors
    /// Propagates request errors, and returns `ApiError::Decode` if a page is
    /// not a JSON array.
    fn get_paginated(&self, path: &str) -> Result<Vec<Value>> {
        let sep = if path.contains('?') { '&' } else { '?' };
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            let url = format!("{path}{sep}per_page={PER_PAGE}&page={page}");
            let Value::Array(batch) = self.request(Method::Get, &url, None)? else {
                return Err(ApiError::Decode(format!("expected a JSON array from {path}")));
            };
            let len = batch.len();
            items.extend(batch);
            if len < PER_PAGE {
                return Ok(items);
            }
            page += 1;
        }
    }
}
