// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for room lookup and model operations.

use crate::model::ElementId;

/// Result type alias for space operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while querying rooms or updating a model.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A room boundary cannot be used for containment tests.
    #[error("room {room} has a degenerate boundary: {reason}")]
    DegenerateBoundary { room: ElementId, reason: String },

    /// A query point has NaN or infinite coordinates.
    #[error("query point is not finite: ({0}, {1}, {2})")]
    NonFinitePoint(f64, f64, f64),

    /// A room-code write targets a window that is not in the model.
    #[error("window not found: {0}")]
    WindowNotFound(ElementId),

    /// A room-code batch writes the same window more than once.
    #[error("window {0} appears more than once in the write batch")]
    DuplicateWrite(ElementId),

    /// Spatial index cell size must be positive and finite.
    #[error("invalid index cell size: {0}")]
    InvalidCellSize(f64),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
