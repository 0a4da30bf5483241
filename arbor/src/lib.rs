// Include the command builder directly from commands.rs so integration
// tests can exercise the CLI surface.
#[path = "commands.rs"]
pub mod commands;

pub use commands::command_argument_builder;
