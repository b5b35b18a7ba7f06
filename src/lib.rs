#![forbid(unsafe_code)]

pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod formats;
pub mod logging;
pub mod resolver;
pub mod session;
pub mod store;
