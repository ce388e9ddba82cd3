pub mod cert;
pub mod config;
pub mod ops;
pub mod recipe;
pub mod resolve;
