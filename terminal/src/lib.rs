//! Real-terminal collaborators for `cmdkit-core`.
//!
//! - [`TerminalConsole`] implements the core [`Console`](cmdkit_core::Console):
//!   line editing and history through rustyline, masked password input in
//!   crossterm raw mode, and errors styled with `colored`.
//! - [`render_args_table`] renders a parse result with tabled.

mod console;
mod table;

pub use console::{TerminalConsole, format_error};
pub use table::render_args_table;
