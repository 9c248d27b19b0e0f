pub mod brush;
pub mod config;
