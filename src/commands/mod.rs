//! Commands: natural language in, board mutations out.
//!
//! DESIGN
//! ======
//! A command string is first offered to the local intent recognizer
//! (regex rules for short everyday commands). Anything it does not claim
//! goes to the LLM translator, which answers with `tool_use` calls drawn
//! from a fixed operation vocabulary. Either way the result is a list of
//! [`Operation`]s that the dispatcher applies to the board as one undo step.
//!
//! `summarizeBoard` is answered by the runner from the board itself and
//! never reaches the dispatcher.

pub mod dispatch;
pub mod intent;
pub mod runner;
pub mod translator;

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;

use serde::{Deserialize, Serialize};

use crate::llm::types::LlmError;

pub use runner::{CommandOutcome, CommandRunner, CommandStatus, OutcomeSource};

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("command translator unreachable: {0}")]
    Unreachable(#[from] LlmError),
    #[error("malformed translator response: {0}")]
    MalformedResponse(String),
    #[error("no operations for command")]
    NoOperations { reply: String },
    #[error("LLM not configured")]
    LlmNotConfigured,
    #[error("invalid intent pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl crate::error::ErrorCode for CommandError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unreachable(_) => "E_TRANSLATOR_UNREACHABLE",
            Self::MalformedResponse(_) => "E_TRANSLATOR_RESPONSE",
            Self::NoOperations { .. } => "E_NO_OPERATIONS",
            Self::LlmNotConfigured => "E_LLM_NOT_CONFIGURED",
            Self::Pattern(_) => "E_INTENT_PATTERN",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Unreachable(e) if e.retryable())
    }
}

impl CommandError {
    /// Message shown to the user while the failure is displayed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NoOperations { reply } if !reply.trim().is_empty() => reply.trim().to_string(),
            Self::NoOperations { .. } => "I couldn't turn that into a board change.".into(),
            Self::LlmNotConfigured => "AI commands are not configured.".into(),
            Self::Unreachable(_) => "The AI service is unreachable. Try again.".into(),
            Self::MalformedResponse(_) | Self::Pattern(_) => "Something went wrong handling that command.".into(),
        }
    }
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// One named board operation with its JSON arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

impl Operation {
    #[must_use]
    pub fn new(name: impl Into<String>, args: serde_json::Value) -> Self {
        Self { name: name.into(), args }
    }

    /// Operation without arguments.
    #[must_use]
    pub fn bare(name: OperationName) -> Self {
        Self::new(name.as_str(), serde_json::json!({}))
    }

    #[must_use]
    pub fn with_args(name: OperationName, args: serde_json::Value) -> Self {
        Self::new(name.as_str(), args)
    }

    /// The recognized vocabulary entry, if any.
    #[must_use]
    pub fn kind(&self) -> Option<OperationName> {
        OperationName::parse(&self.name)
    }
}

/// The operation vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationName {
    CreateStickyNote,
    CreateRectangle,
    CreateCircle,
    CreateFrame,
    CreateText,
    CreateConnector,
    MoveObject,
    DeleteObject,
    DeleteObjects,
    UpdateStickyNote,
    UpdateObject,
    ClearBoard,
    ChangeColor,
    ArrangeInGrid,
    AlignObjects,
    DistributeObjects,
    CreateTemplate,
    SetZoom,
    PanView,
    ResetView,
    FitToView,
    SummarizeBoard,
    // Produced only by the local intent recognizer.
    MoveSelection,
    DeleteSelected,
    ZoomBy,
    Undo,
    Redo,
    SelectAll,
    SelectObjects,
    Deselect,
}

impl OperationName {
    pub const ALL: [Self; 30] = [
        Self::CreateStickyNote,
        Self::CreateRectangle,
        Self::CreateCircle,
        Self::CreateFrame,
        Self::CreateText,
        Self::CreateConnector,
        Self::MoveObject,
        Self::DeleteObject,
        Self::DeleteObjects,
        Self::UpdateStickyNote,
        Self::UpdateObject,
        Self::ClearBoard,
        Self::ChangeColor,
        Self::ArrangeInGrid,
        Self::AlignObjects,
        Self::DistributeObjects,
        Self::CreateTemplate,
        Self::SetZoom,
        Self::PanView,
        Self::ResetView,
        Self::FitToView,
        Self::SummarizeBoard,
        Self::MoveSelection,
        Self::DeleteSelected,
        Self::ZoomBy,
        Self::Undo,
        Self::Redo,
        Self::SelectAll,
        Self::SelectObjects,
        Self::Deselect,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateStickyNote => "createStickyNote",
            Self::CreateRectangle => "createRectangle",
            Self::CreateCircle => "createCircle",
            Self::CreateFrame => "createFrame",
            Self::CreateText => "createText",
            Self::CreateConnector => "createConnector",
            Self::MoveObject => "moveObject",
            Self::DeleteObject => "deleteObject",
            Self::DeleteObjects => "deleteObjects",
            Self::UpdateStickyNote => "updateStickyNote",
            Self::UpdateObject => "updateObject",
            Self::ClearBoard => "clearBoard",
            Self::ChangeColor => "changeColor",
            Self::ArrangeInGrid => "arrangeInGrid",
            Self::AlignObjects => "alignObjects",
            Self::DistributeObjects => "distributeObjects",
            Self::CreateTemplate => "createTemplate",
            Self::SetZoom => "setZoom",
            Self::PanView => "panView",
            Self::ResetView => "resetView",
            Self::FitToView => "fitToView",
            Self::SummarizeBoard => "summarizeBoard",
            Self::MoveSelection => "moveSelection",
            Self::DeleteSelected => "deleteSelected",
            Self::ZoomBy => "zoomBy",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::SelectAll => "selectAll",
            Self::SelectObjects => "selectObjects",
            Self::Deselect => "deselect",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == raw)
    }

    /// Whether the operation is offered to the LLM as a tool.
    #[must_use]
    pub fn offered_to_llm(self) -> bool {
        !matches!(
            self,
            Self::MoveSelection
                | Self::DeleteSelected
                | Self::ZoomBy
                | Self::Undo
                | Self::Redo
                | Self::SelectAll
                | Self::SelectObjects
                | Self::Deselect
        )
    }

    /// Undo and redo walk history and cannot share a batch with edits.
    #[must_use]
    pub fn is_history_step(self) -> bool {
        matches!(self, Self::Undo | Self::Redo)
    }
}
