//! Board tool definitions offered to the command translator.
//!
//! One tool per LLM-facing entry of the operation vocabulary; tool names are
//! the operation names verbatim so a `tool_use` block maps straight back to an
//! [`Operation`](crate::commands::Operation).

#[cfg(test)]
#[path = "tools_test.rs"]
mod tools_test;

use serde_json::{Value, json};

use super::types::Tool;
use crate::commands::OperationName;

/// Build the tools available to the translator, in vocabulary order.
#[must_use]
pub fn operation_tools() -> Vec<Tool> {
    OperationName::ALL
        .into_iter()
        .filter(|op| op.offered_to_llm())
        .filter_map(|op| {
            let (description, schema) = definition(op)?;
            Some(Tool { name: op.as_str().into(), description: description.into(), input_schema: schema })
        })
        .collect()
}

fn object_schema(properties: Value, required: &[&str]) -> Value {
    json!({ "type": "object", "properties": properties, "required": required })
}

fn ids_property() -> Value {
    json!({
        "type": "array",
        "items": { "type": "string" },
        "description": "Object ids. Omit to use the current selection, or every object when nothing is selected."
    })
}

#[allow(clippy::too_many_lines)]
fn definition(op: OperationName) -> Option<(&'static str, Value)> {
    let def = match op {
        OperationName::CreateStickyNote => (
            "Create a sticky note on the board.",
            object_schema(
                json!({
                    "text": { "type": "string", "description": "Text content of the sticky note" },
                    "x": { "type": "number", "description": "X position on canvas" },
                    "y": { "type": "number", "description": "Y position on canvas" },
                    "color": { "type": "string", "description": "Background color (hex, e.g. #FFEB3B)" }
                }),
                &["text"],
            ),
        ),
        OperationName::CreateRectangle => (
            "Create a rectangle on the board.",
            object_schema(
                json!({
                    "x": { "type": "number", "description": "Left edge on canvas" },
                    "y": { "type": "number", "description": "Top edge on canvas" },
                    "width": { "type": "number", "description": "Width in pixels" },
                    "height": { "type": "number", "description": "Height in pixels" },
                    "color": { "type": "string", "description": "Fill color (hex)" }
                }),
                &[],
            ),
        ),
        OperationName::CreateCircle => (
            "Create a circle on the board, positioned by its center.",
            object_schema(
                json!({
                    "x": { "type": "number", "description": "Center X on canvas" },
                    "y": { "type": "number", "description": "Center Y on canvas" },
                    "radius": { "type": "number", "description": "Radius in pixels" },
                    "color": { "type": "string", "description": "Fill color (hex)" }
                }),
                &[],
            ),
        ),
        OperationName::CreateFrame => (
            "Create a frame: a titled region that groups content and paints behind it.",
            object_schema(
                json!({
                    "title": { "type": "string", "description": "Frame title displayed at the top" },
                    "x": { "type": "number", "description": "Left edge on canvas" },
                    "y": { "type": "number", "description": "Top edge on canvas" },
                    "width": { "type": "number", "description": "Width in pixels" },
                    "height": { "type": "number", "description": "Height in pixels" }
                }),
                &["title"],
            ),
        ),
        OperationName::CreateText => (
            "Create a free-standing text block.",
            object_schema(
                json!({
                    "text": { "type": "string", "description": "Text content" },
                    "x": { "type": "number", "description": "Left edge on canvas" },
                    "y": { "type": "number", "description": "Top edge on canvas" }
                }),
                &["text"],
            ),
        ),
        OperationName::CreateConnector => (
            "Create a connector line or arrow between two existing objects.",
            object_schema(
                json!({
                    "fromId": { "type": "string", "description": "ID of the source object" },
                    "toId": { "type": "string", "description": "ID of the target object" },
                    "fromPoint": { "type": "string", "enum": ["top", "bottom", "left", "right", "center"] },
                    "toPoint": { "type": "string", "enum": ["top", "bottom", "left", "right", "center"] },
                    "arrow": { "type": "string", "enum": ["none", "one-way", "two-way"], "description": "Arrowhead style" }
                }),
                &["fromId", "toId"],
            ),
        ),
        OperationName::MoveObject => (
            "Move an object to an absolute position. Without an id, moves the selected objects.",
            object_schema(
                json!({
                    "id": { "type": "string", "description": "ID of the object to move" },
                    "x": { "type": "number", "description": "New X position" },
                    "y": { "type": "number", "description": "New Y position" }
                }),
                &["x", "y"],
            ),
        ),
        OperationName::DeleteObject => (
            "Delete one object. Connectors attached to it are removed too.",
            object_schema(json!({ "id": { "type": "string", "description": "ID of the object to delete" } }), &["id"]),
        ),
        OperationName::DeleteObjects => (
            "Delete several objects, by id or by kind.",
            object_schema(
                json!({
                    "ids": ids_property(),
                    "kind": {
                        "type": "string",
                        "enum": ["sticky-note", "rectangle", "circle", "line", "frame", "text", "connector"],
                        "description": "Delete every object of this kind"
                    }
                }),
                &[],
            ),
        ),
        OperationName::UpdateStickyNote => (
            "Replace the text of a sticky note.",
            object_schema(
                json!({
                    "id": { "type": "string", "description": "ID of the sticky note" },
                    "text": { "type": "string", "description": "New text content" }
                }),
                &["id", "text"],
            ),
        ),
        OperationName::UpdateObject => (
            "Update position, size, text or color of an object. Without an id, updates the selection.",
            object_schema(
                json!({
                    "id": { "type": "string", "description": "ID of the object to update" },
                    "x": { "type": "number" },
                    "y": { "type": "number" },
                    "width": { "type": "number" },
                    "height": { "type": "number" },
                    "text": { "type": "string" },
                    "color": { "type": "string", "description": "Fill color (hex)" }
                }),
                &[],
            ),
        ),
        OperationName::ClearBoard => ("Remove every object from the board.", object_schema(json!({}), &[])),
        OperationName::ChangeColor => (
            "Change the color of objects. Connectors change their line color.",
            object_schema(
                json!({
                    "id": { "type": "string", "description": "ID of a single object" },
                    "ids": ids_property(),
                    "color": { "type": "string", "description": "New color (hex)" }
                }),
                &["color"],
            ),
        ),
        OperationName::ArrangeInGrid => (
            "Arrange objects in a grid with uniform spacing.",
            object_schema(
                json!({
                    "ids": ids_property(),
                    "columns": { "type": "integer", "description": "Column count; defaults to a near-square grid" },
                    "spacing": { "type": "number", "description": "Gap between cells in pixels" },
                    "x": { "type": "number", "description": "Grid left edge; defaults to the group's current left" },
                    "y": { "type": "number", "description": "Grid top edge; defaults to the group's current top" }
                }),
                &[],
            ),
        ),
        OperationName::AlignObjects => (
            "Align objects along a shared edge or center line.",
            object_schema(
                json!({
                    "ids": ids_property(),
                    "alignment": {
                        "type": "string",
                        "enum": ["left", "right", "top", "bottom", "center", "middle"]
                    }
                }),
                &["alignment"],
            ),
        ),
        OperationName::DistributeObjects => (
            "Space objects evenly between the outermost two.",
            object_schema(
                json!({
                    "ids": ids_property(),
                    "direction": { "type": "string", "enum": ["horizontal", "vertical"] }
                }),
                &["direction"],
            ),
        ),
        OperationName::CreateTemplate => (
            "Lay out a ready-made board template of frames and notes.",
            object_schema(
                json!({
                    "template": {
                        "type": "string",
                        "enum": ["swot", "retrospective", "kanban", "user-journey"]
                    },
                    "x": { "type": "number", "description": "Template left edge" },
                    "y": { "type": "number", "description": "Template top edge" }
                }),
                &["template"],
            ),
        ),
        OperationName::SetZoom => (
            "Set the view zoom level (1.0 is 100%).",
            object_schema(json!({ "zoom": { "type": "number" } }), &["zoom"]),
        ),
        OperationName::PanView => (
            "Pan the view by a screen-space offset in pixels.",
            object_schema(json!({ "dx": { "type": "number" }, "dy": { "type": "number" } }), &["dx", "dy"]),
        ),
        OperationName::ResetView => ("Reset pan and zoom to the defaults.", object_schema(json!({}), &[])),
        OperationName::FitToView => (
            "Zoom and pan so every object is visible.",
            object_schema(
                json!({
                    "width": { "type": "number", "description": "Screen width in pixels" },
                    "height": { "type": "number", "description": "Screen height in pixels" }
                }),
                &[],
            ),
        ),
        OperationName::SummarizeBoard => (
            "Describe what is on the board. Use when the user asks a question rather than requesting a change.",
            object_schema(json!({}), &[]),
        ),
        OperationName::MoveSelection
        | OperationName::DeleteSelected
        | OperationName::ZoomBy
        | OperationName::Undo
        | OperationName::Redo
        | OperationName::SelectAll
        | OperationName::SelectObjects
        | OperationName::Deselect => return None,
    };
    Some(def)
}
