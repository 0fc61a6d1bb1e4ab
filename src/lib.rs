pub mod cli;
pub mod commands;
pub mod config;
pub mod export;
pub mod session;
pub mod subtitle;
pub mod ui;
