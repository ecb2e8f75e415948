pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod scrapers;
pub mod session;
pub mod store;
