pub mod bundle_source;
pub mod commands;
pub mod render;
