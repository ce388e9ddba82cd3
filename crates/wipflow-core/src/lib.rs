pub mod asana;
pub mod binding;
pub mod cert;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod policy;
pub mod reason;
pub mod recipe;
pub mod report;
pub mod resolve;
pub mod session;
pub mod taxonomy;
pub mod workflows;
pub mod workitem;

#[cfg(test)]
mod testing;

pub use error::{CoreError, Result};
