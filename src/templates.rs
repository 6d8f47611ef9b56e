//! Prebuilt board templates.
//!
//! A template is a list of fresh objects anchored at an origin. Frames
//! carry the section titles; a starter sticky note sits inside each one.
//! The user journey template also chains its stages with connectors.

#[cfg(test)]
#[path = "templates_test.rs"]
mod templates_test;

use crate::camera::Point;
use crate::consts::{FRAME_HEIGHT, FRAME_WIDTH, LAYOUT_SPACING};
use crate::doc::{BoardObject, ConnectionPoint, Endpoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Swot,
    Retrospective,
    Kanban,
    UserJourney,
}

impl Template {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "swot" | "swot-analysis" => Some(Self::Swot),
            "retro" | "retrospective" | "retro-board" => Some(Self::Retrospective),
            "kanban" | "kanban-board" => Some(Self::Kanban),
            "user-journey" | "journey" | "journey-map" | "user-journey-map" => Some(Self::UserJourney),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Swot => "swot",
            Self::Retrospective => "retrospective",
            Self::Kanban => "kanban",
            Self::UserJourney => "user-journey",
        }
    }

    fn sections(self) -> &'static [&'static str] {
        match self {
            Self::Swot => &["Strengths", "Weaknesses", "Opportunities", "Threats"],
            Self::Retrospective => &["What went well", "What could improve", "Action items"],
            Self::Kanban => &["To Do", "In Progress", "Done"],
            Self::UserJourney => &["Discover", "Sign up", "Onboard", "Engage", "Advocate"],
        }
    }

    /// Sections per row. SWOT is a 2x2 grid; the rest are a single row.
    fn columns(self) -> usize {
        match self {
            Self::Swot => 2,
            _ => self.sections().len(),
        }
    }

    /// Build the template's objects with their top-left corner at `origin`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn build(self, origin: Point) -> Vec<BoardObject> {
        let columns = self.columns();
        let mut objects = Vec::new();
        let mut frames = Vec::new();

        for (i, title) in self.sections().iter().enumerate() {
            let col = (i % columns) as f64;
            let row = (i / columns) as f64;
            let x = origin.x + col * (FRAME_WIDTH + LAYOUT_SPACING);
            let y = origin.y + row * (FRAME_HEIGHT + LAYOUT_SPACING);
            let frame = BoardObject::frame(x, y, FRAME_WIDTH, FRAME_HEIGHT, *title);
            frames.push(frame.id);
            objects.push(frame);
            objects.push(BoardObject::sticky_note(x + LAYOUT_SPACING, y + 2.0 * LAYOUT_SPACING, ""));
        }

        if self == Self::UserJourney {
            for pair in frames.windows(2) {
                objects.push(BoardObject::connector(
                    Endpoint::new(pair[0], ConnectionPoint::Right),
                    Endpoint::new(pair[1], ConnectionPoint::Left),
                ));
            }
        }
        objects
    }
}
