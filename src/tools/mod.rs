//! Named runtime operations for reconfiguring the active provider.

pub mod arguments;
pub mod settings;
pub mod tool;

pub use arguments::ToolArguments;
pub use settings::{find_tool, settings_tools, SettingsContext};
pub use tool::{ArgumentSpec, Tool};
