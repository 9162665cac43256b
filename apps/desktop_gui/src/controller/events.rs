//! UI/backend events and error modeling for desktop GUI controller.

use client_core::{StoreError, StoreOutcome, SubmitError};
use shared::error::WriteError;

pub enum UiEvent {
    Info(String),
    Error(UiError),
    Store(StoreOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    NotFound,
    Rejected,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Settings,
    LoadVenues,
    SaveVenue,
    DeleteVenue,
}

impl UiErrorContext {
    pub fn for_outcome(outcome: &StoreOutcome) -> Self {
        match outcome {
            StoreOutcome::Listed(_) => Self::LoadVenues,
            StoreOutcome::Created(_) | StoreOutcome::Updated { .. } => Self::SaveVenue,
            StoreOutcome::Deleted { .. } => Self::DeleteVenue,
        }
    }
}

pub fn describe_load_failure(message: &str) -> String {
    let lower = message.to_ascii_lowercase();
    if lower.contains("venue store is unavailable") {
        "No venue store configured; fix the settings file and restart.".to_string()
    } else if lower.contains("failed to connect")
        || lower.contains("connection refused")
        || lower.contains("dns")
        || lower.contains("timed out")
    {
        "Venue store unreachable; check network settings and reload.".to_string()
    } else {
        format!("Could not load venues: {message}")
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("invalid") {
            UiErrorCategory::Validation
        } else if message_lower.contains("startup failure")
            || message_lower.contains("disconnect")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn from_store(context: UiErrorContext, err: &StoreError) -> Self {
        let category = match err {
            StoreError::Fetch(_) => UiErrorCategory::Transport,
            StoreError::Write(WriteError::NotFound(_)) => UiErrorCategory::NotFound,
            StoreError::Write(WriteError::Rejected { .. }) => UiErrorCategory::Rejected,
            StoreError::Write(WriteError::Transport { .. }) => UiErrorCategory::Transport,
        };
        let message = match (context, err) {
            (UiErrorContext::LoadVenues, StoreError::Fetch(fetch)) => {
                describe_load_failure(&fetch.message)
            }
            _ => err.to_string(),
        };
        Self {
            category,
            context,
            message,
        }
    }

    pub fn from_submit(err: SubmitError) -> Self {
        Self {
            category: UiErrorCategory::Validation,
            context: UiErrorContext::SaveVenue,
            message: err.to_string(),
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
