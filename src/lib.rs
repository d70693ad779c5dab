//! Keyboard overlay that lights up keys as they are pressed.
//!
//! The core (key resolution, highlight tracking, the controller and the
//! rendering surface that talk over a message channel, and the focus
//! visibility heuristic) is independent of the terminal. `app`, `event`,
//! `page` and `ui` host it in a ratatui terminal UI.

pub mod app;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod input;
pub mod keyboard;
pub mod page;
pub mod platform;
pub mod prefs;
pub mod protocol;
pub mod scroll;
pub mod surface;
pub mod ui;
