//! Repository-level collection endpoints

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::types::{Label, Milestone, NewLabel};
use super::{Method, Result, Transport};
use crate::scope::Scope;

/// Every label defined in the repository
///
/// # Errors
/// Propagates transport and decode errors.
pub fn list_labels(transport: &dyn Transport, scope: &Scope) -> Result<Vec<Label>> {
    decode_all(transport.get_paginated(&format!("{}/labels", scope.api_path()))?)
}

/// Every milestone in the repository, open and closed
///
/// # Errors
/// Propagates transport and decode errors.
pub fn list_milestones(transport: &dyn Transport, scope: &Scope) -> Result<Vec<Milestone>> {
    decode_all(transport.get_paginated(&format!(
        "{}/milestones?state=all",
        scope.api_path()
    ))?)
}

/// Create a label and return it as stored by the server
///
/// # Errors
/// Propagates transport and decode errors; an existing name yields
/// `ApiError::Validation`.
pub fn create_label(transport: &dyn Transport, scope: &Scope, label: &NewLabel<'_>) -> Result<Label> {
    let body = serde_json::to_value(label)?;
    let created = transport.request(
        Method::Post,
        &format!("{}/labels", scope.api_path()),
        Some(&body),
    )?;
    Ok(serde_json::from_value(created)?)
}

fn decode_all<T: DeserializeOwned>(values: Vec<Value>) -> Result<Vec<T>> {
    values
        .into_iter()
        .map(|v| serde_json::from_value(v).map_err(Into::into))
        .collect()
}
