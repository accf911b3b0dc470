pub mod analyzer;
pub mod capture;
pub mod cli;
pub mod config;
pub mod error;
pub mod feedback;
pub mod render;
pub mod session;
