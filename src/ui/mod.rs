pub mod colors;
mod input;
mod layout;
mod picker_view;
mod tree_view;

pub use colors::ColorScheme;
pub use input::{handle_key, Command, InputMode};
pub use layout::render_ui;
pub use tree_view::{TreeViewState, VisibleRow};
