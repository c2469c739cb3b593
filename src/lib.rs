pub mod app;
pub mod cli;
pub mod date_provider;
pub mod error;
pub mod keys;
pub mod question;
pub mod quiz;
pub mod report;
pub mod stats;
pub mod store;
pub mod store_factory;
pub mod table;

pub use error::{Error, Result};
