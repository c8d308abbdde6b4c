pub mod error;
pub mod filter;
pub mod model;
pub mod types;
