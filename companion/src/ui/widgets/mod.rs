//! TUI widgets for the companion

pub mod breathing;
pub mod conversation;
pub mod input;
pub mod resources;

pub use breathing::BreathingWidget;
pub use conversation::ConversationWidget;
pub use input::InputWidget;
pub use resources::ResourcesWidget;
