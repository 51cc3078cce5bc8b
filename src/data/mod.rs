pub mod fetch;
pub mod git;
pub mod process_runner;
pub mod tmux;
