// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-resource detail records.
//!
//! Operators drop JSON documents describing clusters and networks next to the
//! provider, one file per resource, named `<kind>-<name>.json`:
//!
//! ```json
//! {"uuid": "00000000-0000-0000-0000-000000000000", "allowed_repos": ["platform-builds"]}
//! ```
//!
//! The reconciler only sees the [`DetailStore`] trait; [`FileDetailStore`]
//! reads the files from a directory.

use crate::errors::DetailError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A detail record: arbitrary JSON object fields.
pub type Details = Map<String, Value>;

/// Named lookup of detail records.
#[async_trait]
pub trait DetailStore: Send + Sync {
    /// Fetch the record for the resource `name` of the given `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`DetailError::NotFound`] if there is no record, or an I/O or
    /// parse error if the record cannot be read.
    async fn lookup(&self, kind: &str, name: &str) -> Result<Details, DetailError>;
}

/// Detail store backed by `<root>/<kind>-<name>.json` files.
#[derive(Debug, Clone)]
pub struct FileDetailStore {
    root: PathBuf,
}

impl FileDetailStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the record for `kind`/`name`.
    #[must_use]
    pub fn record_path(&self, kind: &str, name: &str) -> PathBuf {
        self.root.join(format!("{kind}-{name}.json"))
    }
}

/// Whether `name` can only address a file directly under the root.
fn is_plain_record_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && !name.contains("..")
}

#[async_trait]
impl DetailStore for FileDetailStore {
    async fn lookup(&self, kind: &str, name: &str) -> Result<Details, DetailError> {
        if !is_plain_record_name(kind) || !is_plain_record_name(name) {
            debug!(kind = %kind, name = %name, "Rejecting detail record name outside the root");
            return Err(DetailError::NotFound {
                kind: kind.to_string(),
                name: name.to_string(),
            });
        }

        let path = self.record_path(kind, name);
        debug!(path = %path.display(), "Reading detail record");

        let contents = match tokio::fs::read(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DetailError::NotFound {
                    kind: kind.to_string(),
                    name: name.to_string(),
                });
            }
            Err(e) => {
                return Err(DetailError::Io {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                });
            }
        };

        serde_json::from_slice(&contents).map_err(|e| DetailError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

/// Read a string field from a detail record.
///
/// # Errors
///
/// [`DetailError::MissingField`] if the key is absent, and
/// [`DetailError::NotAString`] if it holds anything other than a string.
pub fn string_field<'a>(details: &'a Details, key: &str) -> Result<&'a str, DetailError> {
    match details.get(key) {
        None => Err(DetailError::MissingField {
            field: key.to_string(),
        }),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(DetailError::NotAString {
            field: key.to_string(),
        }),
    }
}

/// Read a restricting list from a detail record.
///
/// A missing key, a non-array value or an empty array yields `None`. Any other
/// array yields its string entries; non-string entries are dropped, so an
/// array holding none yields `Some` of an empty list.
#[must_use]
pub fn string_list(details: &Details, key: &str) -> Option<Vec<String>> {
    details
        .get(key)
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty())
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
}

#[cfg(test)]
#[path = "details_tests.rs"]
mod details_tests;
