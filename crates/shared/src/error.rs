use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::VenueId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOp {
    Create,
    Update,
    Delete,
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

/// Listing the collection failed. An empty collection is not an error.
#[derive(Debug, Clone, Error)]
#[error("failed to list venues: {message}")]
pub struct FetchError {
    pub message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum WriteError {
    #[error("venue {0} does not exist")]
    NotFound(VenueId),
    #[error("{op} rejected by store: {message}")]
    Rejected { op: WriteOp, message: String },
    #[error("{op} failed: {message}")]
    Transport { op: WriteOp, message: String },
}

impl WriteError {
    pub fn transport(op: WriteOp, message: impl Into<String>) -> Self {
        Self::Transport {
            op,
            message: message.into(),
        }
    }

    pub fn rejected(op: WriteOp, message: impl Into<String>) -> Self {
        Self::Rejected {
            op,
            message: message.into(),
        }
    }

    pub fn op(&self) -> WriteOp {
        match self {
            Self::NotFound(_) => WriteOp::Update,
            Self::Rejected { op, .. } | Self::Transport { op, .. } => *op,
        }
    }
}
