pub mod config;
pub mod fire;
pub mod serve;
