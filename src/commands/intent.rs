//! Local intent recognizer.
//!
//! Rule-based regex parse of short everyday commands ("add a red circle",
//! "undo", "zoom in 50%", "delete all notes"). Rules are tried in a fixed
//! order; the first match wins. A command no rule claims returns `None` and
//! goes to the LLM translator instead.

#[cfg(test)]
#[path = "intent_test.rs"]
mod intent_test;

use regex::{Captures, Regex};
use serde_json::json;

use super::{CommandError, Operation, OperationName};
use crate::consts::{DEFAULT_NUDGE_PX, DEFAULT_ZOOM_STEP};
use crate::doc::ObjectKind;

const COLORS: &str = r"(red|blue|green|yellow|orange|purple|pink|black|white|gray|grey|cyan|teal|magenta|brown|lime|indigo|violet|gold|silver|dark\s+\w+|light\s+\w+)";
const SHAPES: &str = r"(rectangle|square|circle|oval|ellipse|sticky\s+note|note|line|arrow|connector|triangle|frame|text)";
const VERBS_CREATE: &str = r"(?:create|add|make|draw|insert)";

// =============================================================================
// INTENT
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Create { kind: ObjectKind, color: Option<String> },
    DeleteSelected,
    DeleteKind(ObjectKind),
    DeleteAll,
    MoveTo { x: f64, y: f64 },
    MoveBy { dx: f64, dy: f64 },
    SetColor(String),
    Resize { width: f64, height: f64 },
    SetText(String),
    Undo,
    Redo,
    Clear,
    ZoomIn(Option<f64>),
    ZoomOut(Option<f64>),
    ZoomTo(f64),
    ZoomReset,
    SelectAll,
    SelectKind(ObjectKind),
    Deselect,
}

impl Intent {
    /// Operations that carry out this intent on the current selection or view.
    #[must_use]
    pub fn operations(&self) -> Vec<Operation> {
        let op = match self {
            Self::Create { kind, color } => {
                let name = match kind {
                    ObjectKind::StickyNote => OperationName::CreateStickyNote,
                    ObjectKind::Circle => OperationName::CreateCircle,
                    ObjectKind::Frame => OperationName::CreateFrame,
                    ObjectKind::Text => OperationName::CreateText,
                    _ => OperationName::CreateRectangle,
                };
                match color {
                    Some(color) => Operation::with_args(name, json!({ "color": color })),
                    None => Operation::bare(name),
                }
            }
            Self::DeleteSelected => Operation::bare(OperationName::DeleteSelected),
            Self::DeleteKind(kind) => Operation::with_args(OperationName::DeleteObjects, json!({ "kind": kind.as_str() })),
            Self::DeleteAll | Self::Clear => Operation::bare(OperationName::ClearBoard),
            Self::MoveTo { x, y } => Operation::with_args(OperationName::MoveObject, json!({ "x": x, "y": y })),
            Self::MoveBy { dx, dy } => Operation::with_args(OperationName::MoveSelection, json!({ "dx": dx, "dy": dy })),
            Self::SetColor(color) => Operation::with_args(OperationName::ChangeColor, json!({ "color": color })),
            Self::Resize { width, height } => {
                Operation::with_args(OperationName::UpdateObject, json!({ "width": width, "height": height }))
            }
            Self::SetText(text) => Operation::with_args(OperationName::UpdateObject, json!({ "text": text })),
            Self::Undo => Operation::bare(OperationName::Undo),
            Self::Redo => Operation::bare(OperationName::Redo),
            Self::ZoomIn(percent) => {
                Operation::with_args(OperationName::ZoomBy, json!({ "factor": step_factor(*percent) }))
            }
            Self::ZoomOut(percent) => {
                Operation::with_args(OperationName::ZoomBy, json!({ "factor": 1.0 / step_factor(*percent) }))
            }
            Self::ZoomTo(percent) => Operation::with_args(OperationName::SetZoom, json!({ "zoom": percent / 100.0 })),
            Self::ZoomReset => Operation::bare(OperationName::ResetView),
            Self::SelectAll => Operation::bare(OperationName::SelectAll),
            Self::SelectKind(kind) => Operation::with_args(OperationName::SelectObjects, json!({ "kind": kind.as_str() })),
            Self::Deselect => Operation::bare(OperationName::Deselect),
        };
        vec![op]
    }
}

fn step_factor(percent: Option<f64>) -> f64 {
    match percent {
        Some(p) if p > 0.0 => 1.0 + p / 100.0,
        _ => DEFAULT_ZOOM_STEP,
    }
}

// =============================================================================
// RECOGNIZER
// =============================================================================

pub struct IntentRecognizer {
    undo: Regex,
    redo: Regex,
    clear: Regex,
    create_full: Regex,
    create_shape: Regex,
    delete_kind: Regex,
    delete_selected: Regex,
    delete_all: Regex,
    move_to: Regex,
    move_dir: Regex,
    update_color: Regex,
    update_size: Regex,
    update_text: Regex,
    select_kind: Regex,
    select_all: Regex,
    deselect: Regex,
    zoom_reset: Regex,
    zoom_pct: Regex,
    zoom_in: Regex,
    zoom_out: Regex,
}

fn ci(pattern: &str) -> Result<Regex, CommandError> {
    Ok(Regex::new(&format!("(?i){pattern}"))?)
}

impl IntentRecognizer {
    /// Compile the rule set.
    ///
    /// # Errors
    ///
    /// Returns `Pattern` if a rule fails to compile.
    pub fn new() -> Result<Self, CommandError> {
        Ok(Self {
            undo: ci(r"^\s*undo\s*$")?,
            redo: ci(r"^\s*redo\s*$")?,
            clear: ci(r"(?:clear|reset|wipe)\s+(?:the\s+)?(?:board|canvas|all|everything)")?,
            create_full: ci(&format!(r"^\s*(?:please\s+)?{VERBS_CREATE}\s+(?:an?\s+)?{COLORS}\s+{SHAPES}\s*[.!]?\s*$"))?,
            create_shape: ci(&format!(r"^\s*(?:please\s+)?{VERBS_CREATE}\s+(?:an?\s+)?{SHAPES}\s*[.!]?\s*$"))?,
            delete_kind: ci(&format!(r"(?:delete|remove|erase)\s+(?:all\s+)?(?:the\s+)?{SHAPES}s?\b"))?,
            delete_selected: ci(r"(?:delete|remove|erase|clear)\s+(?:the\s+)?(?:selected|highlighted|it|them)\b")?,
            delete_all: ci(r"(?:delete|remove|erase)\s+(?:every(?:thing)?|all)\b")?,
            move_to: ci(r"move\s+(?:it|selected|them|the\s+\w+)?\s*to\s+\(?(-?\d+(?:\.\d+)?)[,\s]+(-?\d+(?:\.\d+)?)\)?")?,
            move_dir: ci(r"move\s+(?:it|selected|them|the\s+\w+)?\s*(up|down|left|right)(?:\s+by\s+(\d+(?:\.\d+)?)(?:\s*px)?)?")?,
            update_color: ci(&format!(
                r"(?:change|set|make|color|colour|paint)\s+(?:it\s+|them\s+)?(?:(?:the\s+)?(?:color|colour|fill|background)\s+(?:to|=)\s*)?{COLORS}\b"
            ))?,
            update_size: ci(r"(?:resize|set\s+size|change\s+size)\s+(?:it\s+|them\s+)?(?:to\s+)?(\d+(?:\.\d+)?)(?:\s*[x×]\s*(\d+(?:\.\d+)?))?")?,
            update_text: ci(r#"(?:set|change|update)\s+(?:the\s+)?text\s+(?:to\s+)?["']?(.+?)["']?\s*$"#)?,
            select_kind: ci(&format!(r"select\s+(?:all\s+)?(?:the\s+)?{SHAPES}s?\b"))?,
            select_all: ci(r"select\s+(?:all|everything)")?,
            deselect: ci(r"(?:deselect|unselect|clear\s+(?:the\s+)?selection)")?,
            zoom_reset: ci(r"(?:zoom\s+)?reset\s+(?:zoom|view)")?,
            zoom_pct: ci(r"zoom\s+(?:to\s+)?(\d+(?:\.\d+)?)\s*%")?,
            zoom_in: ci(r"zoom\s+in(?:\s+(?:by\s+)?(\d+(?:\.\d+)?)%?)?")?,
            zoom_out: ci(r"zoom\s+out(?:\s+(?:by\s+)?(\d+(?:\.\d+)?)%?)?")?,
        })
    }

    /// Match `command` against the rules in priority order.
    #[must_use]
    pub fn recognize(&self, command: &str) -> Option<Intent> {
        let cmd = command.trim();
        if cmd.is_empty() {
            return None;
        }

        if self.undo.is_match(cmd) {
            return Some(Intent::Undo);
        }
        if self.redo.is_match(cmd) {
            return Some(Intent::Redo);
        }
        if self.clear.is_match(cmd) {
            return Some(Intent::Clear);
        }

        // Creates are claimed only when nothing follows the shape; "add a note
        // saying hi" carries content the rules cannot place.
        if let Some(c) = self.create_full.captures(cmd) {
            return creatable(group(&c, 2)).map(|kind| Intent::Create { kind, color: group(&c, 1).map(color_value) });
        }
        if let Some(c) = self.create_shape.captures(cmd) {
            return creatable(group(&c, 1)).map(|kind| Intent::Create { kind, color: None });
        }

        // "clear selection" drops the selection; it never deletes.
        if self.deselect.is_match(cmd) {
            return Some(Intent::Deselect);
        }

        // Specific kind before "all" so "remove all rectangles" targets rectangles.
        if let Some(kind) = self.delete_kind.captures(cmd).and_then(|c| shape(group(&c, 1))) {
            return Some(Intent::DeleteKind(kind));
        }
        if self.delete_selected.is_match(cmd) {
            return Some(Intent::DeleteSelected);
        }
        if self.delete_all.is_match(cmd) {
            return Some(Intent::DeleteAll);
        }

        if let Some(c) = self.move_to.captures(cmd) {
            if let (Some(x), Some(y)) = (number(&c, 1), number(&c, 2)) {
                return Some(Intent::MoveTo { x, y });
            }
        }
        if let Some(c) = self.move_dir.captures(cmd) {
            let amount = number(&c, 2).unwrap_or(DEFAULT_NUDGE_PX);
            let (dx, dy) = match group(&c, 1).map(str::to_ascii_lowercase).as_deref() {
                Some("up") => (0.0, -amount),
                Some("down") => (0.0, amount),
                Some("left") => (-amount, 0.0),
                _ => (amount, 0.0),
            };
            return Some(Intent::MoveBy { dx, dy });
        }

        if let Some(color) = self.update_color.captures(cmd).and_then(|c| group(&c, 1).map(color_value)) {
            return Some(Intent::SetColor(color));
        }
        if let Some(c) = self.update_size.captures(cmd) {
            if let Some(width) = number(&c, 1) {
                let height = number(&c, 2).unwrap_or(width);
                return Some(Intent::Resize { width, height });
            }
        }
        if let Some(text) = self.update_text.captures(cmd).and_then(|c| group(&c, 1).map(str::to_string)) {
            return Some(Intent::SetText(text));
        }

        // Specific kind before "all" so "select all circles" targets circles.
        if let Some(kind) = self.select_kind.captures(cmd).and_then(|c| shape(group(&c, 1))) {
            return Some(Intent::SelectKind(kind));
        }
        if self.select_all.is_match(cmd) {
            return Some(Intent::SelectAll);
        }
        if self.zoom_reset.is_match(cmd) {
            return Some(Intent::ZoomReset);
        }
        if let Some(percent) = self.zoom_pct.captures(cmd).and_then(|c| number(&c, 1)) {
            return Some(Intent::ZoomTo(percent));
        }
        if let Some(c) = self.zoom_in.captures(cmd) {
            return Some(Intent::ZoomIn(number(&c, 1)));
        }
        if let Some(c) = self.zoom_out.captures(cmd) {
            return Some(Intent::ZoomOut(number(&c, 1)));
        }

        None
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn group<'h>(c: &Captures<'h>, i: usize) -> Option<&'h str> {
    c.get(i).map(|m| m.as_str())
}

fn number(c: &Captures<'_>, i: usize) -> Option<f64> {
    // Captures are digit runs; a failed parse just means no number.
    group(c, i)?.parse::<f64>().ok()
}

fn shape(raw: Option<&str>) -> Option<ObjectKind> {
    let raw = raw?.split_whitespace().collect::<Vec<_>>().join(" ");
    ObjectKind::parse(&raw)
}

/// Kinds that can be created without further input. Lines need a path and
/// connectors need endpoints, so those go to the translator.
fn creatable(raw: Option<&str>) -> Option<ObjectKind> {
    shape(raw).filter(|kind| !matches!(kind, ObjectKind::Line | ObjectKind::Connector))
}

/// Hex for a named color. Anything else ("dark blue") collapses to its CSS
/// keyword form ("darkblue").
fn color_value(raw: &str) -> String {
    let name = raw.split_whitespace().collect::<String>().to_ascii_lowercase();
    let hex = match name.as_str() {
        "red" => "#F44336",
        "blue" => "#2196F3",
        "green" => "#4CAF50",
        "yellow" => "#FFEB3B",
        "orange" => "#FF9800",
        "purple" | "violet" => "#9C27B0",
        "pink" => "#E91E63",
        "black" => "#000000",
        "white" => "#FFFFFF",
        "gray" | "grey" | "silver" => "#9E9E9E",
        "cyan" => "#00BCD4",
        "teal" => "#009688",
        "magenta" => "#FF00FF",
        "brown" => "#795548",
        "lime" => "#CDDC39",
        "indigo" => "#3F51B5",
        "gold" => "#FFC107",
        _ => return name,
    };
    hex.to_string()
}
