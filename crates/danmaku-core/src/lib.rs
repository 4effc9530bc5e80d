pub mod config;
pub mod error;
pub mod fingerprint;
pub mod models;
pub mod normalize;
pub mod selector;
