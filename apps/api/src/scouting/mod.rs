pub mod catalog;
pub mod enrichment;
pub mod generator;
pub mod handlers;
pub mod pipeline;
pub mod session;
pub mod store;
