mod commands;

pub use commands::handle_execute_command;
