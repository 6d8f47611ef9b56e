//! Shared numeric constants for the board-state crate.

// ── Persistence ─────────────────────────────────────────────────

/// Quiet period after the last local mutation before the board is written.
pub const DEFAULT_PERSIST_DEBOUNCE_MS: u64 = 600;

/// How often the persistence task checks for a due write.
pub const DEFAULT_PERSIST_POLL_MS: u64 = 50;

// ── History ─────────────────────────────────────────────────────

/// Maximum number of undoable snapshots kept per board.
pub const DEFAULT_HISTORY_DEPTH: usize = 100;

// ── Clipboard ───────────────────────────────────────────────────

/// World-space step applied per paste (and once per duplicate).
pub const DEFAULT_PASTE_OFFSET: f64 = 20.0;

// ── Viewport ────────────────────────────────────────────────────

/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f64 = 0.1;

/// Largest allowed zoom factor.
pub const MAX_ZOOM: f64 = 5.0;

/// Padding in screen pixels kept around content by fit-to-view.
pub const FIT_PADDING_PX: f64 = 50.0;

// ── Object defaults ─────────────────────────────────────────────

/// Default edge length of a sticky note.
pub const STICKY_NOTE_SIZE: f64 = 200.0;

/// Default sticky note fill.
pub const STICKY_NOTE_FILL: &str = "#FFEB3B";

/// Default rectangle width.
pub const RECT_WIDTH: f64 = 150.0;

/// Default rectangle height.
pub const RECT_HEIGHT: f64 = 100.0;

/// Default shape fill.
pub const SHAPE_FILL: &str = "#4CAF50";

/// Default circle radius.
pub const CIRCLE_RADIUS: f64 = 50.0;

/// Default frame width.
pub const FRAME_WIDTH: f64 = 400.0;

/// Default frame height.
pub const FRAME_HEIGHT: f64 = 300.0;

/// Default stroke / connector color.
pub const STROKE_COLOR: &str = "#1F1A17";

/// Default connector thickness.
pub const CONNECTOR_THICKNESS: f64 = 2.0;

// ── Commands ────────────────────────────────────────────────────

/// How long a failed command message stays visible.
pub const DEFAULT_COMMAND_ERROR_DISPLAY_MS: u64 = 4000;

/// Default gap between objects laid out by grid/distribute operations.
pub const LAYOUT_SPACING: f64 = 20.0;

/// Screen size assumed when a command needs one (fit-to-view, default placement).
pub const DEFAULT_SCREEN_WIDTH: f64 = 1280.0;
pub const DEFAULT_SCREEN_HEIGHT: f64 = 800.0;

/// Zoom factor for "zoom in" / "zoom out" without a percentage.
pub const DEFAULT_ZOOM_STEP: f64 = 1.2;

/// Distance for "move left" and friends without an explicit amount.
pub const DEFAULT_NUDGE_PX: f64 = 50.0;
