pub mod agent;
pub mod client;
pub mod errors;
pub mod models;
pub mod providers;
pub mod relay;
pub mod session;
pub mod sse;
pub mod tool;
