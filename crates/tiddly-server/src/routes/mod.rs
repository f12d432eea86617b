pub mod create;
pub mod pages;
pub mod store;
