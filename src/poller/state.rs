//! Local mirror of one remote resource.

use crate::api::error::ErrorKind;
use std::fmt::Display;

/// Why the most recent settled fetch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub kind: ErrorKind,
    /// Human readable, never empty.
    pub message: String,
}

impl Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// What a view knows about its resource at any moment.
///
/// After a settled fetch either `data` is present with no `error`, or `error`
/// is present. A failure never clears `data`: the last good value stays
/// visible next to the error.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub data: Option<T>,
    pub error: Option<FetchFailure>,
    /// True only while a request is outstanding.
    pub loading: bool,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            loading: false,
        }
    }
}

impl<T> FetchState<T> {
    pub(crate) fn apply_success(&mut self, data: T) {
        self.data = Some(data);
        self.error = None;
    }

    pub(crate) fn apply_failure(&mut self, failure: FetchFailure) {
        self.error = Some(failure);
    }
}
