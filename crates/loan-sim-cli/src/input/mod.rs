pub mod config;
pub mod file;
pub mod stdin;
pub mod values;
