pub mod action;
pub mod binder;
pub mod config;
pub mod error;
pub mod events;
pub mod runner;
pub mod scaffold;
pub mod store;

pub use error::{Result, TiddlyError};
