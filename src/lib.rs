//! Board state for a collaborative whiteboard.
//!
//! This crate owns the live state of one opened board: its objects,
//! selection, clipboard, viewport and undo history. Every mutation applies
//! in memory first and arms a debounced full-snapshot write to Postgres. A
//! `LISTEN`/`NOTIFY` feed brings other clients' writes back in without
//! touching local undo history. Natural-language commands are turned into
//! board operations by a local regex recognizer or, failing that, an LLM.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`board`] | The board container and its mutation surface |
//! | [`doc`] | Board object types, patches and the connector cascade query |
//! | [`history`] | Bounded undo/redo snapshot stacks with pause/resume |
//! | [`scheduler`] | Debounce scheduler for remote writes |
//! | [`camera`] | Viewport pan/zoom and coordinate conversions |
//! | [`geometry`] | Bounds, connection points and marquee hit-testing |
//! | [`layout`] | Grid, align and distribute placement |
//! | [`templates`] | Prebuilt frame-and-note templates |
//! | [`store`] | Remote store trait with Postgres and in-memory backends |
//! | [`session`] | An opened board wired to its store; persistence task |
//! | [`sync`] | Change-notification feed and inbound snapshot apply |
//! | [`commands`] | Intent recognizer, LLM translator, dispatcher, runner |
//! | [`llm`] | Anthropic client and the board tool vocabulary |
//! | [`db`] | Pool setup and migrations |
//! | [`config`] | Environment-driven settings |
//! | [`error`] | Shared error-code trait |
//! | [`consts`] | Defaults for timing, sizes and zoom limits |

pub mod board;
pub mod camera;
pub mod commands;
pub mod config;
pub mod consts;
pub mod db;
pub mod doc;
pub mod error;
pub mod geometry;
pub mod history;
pub mod layout;
pub mod llm;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod sync;
pub mod templates;
