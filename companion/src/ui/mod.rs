//! UI module for the companion TUI

pub mod render;
pub mod theme;
pub mod widgets;

pub use render::Overlay;
