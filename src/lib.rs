pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod matcher;
pub mod pipeline;
pub mod records;
pub mod report;
pub mod scanner;
pub mod server;
