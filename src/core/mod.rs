pub mod builder;
pub mod config;
pub mod declaration;
pub mod error;
pub mod search;
pub mod session;
pub mod validate;
