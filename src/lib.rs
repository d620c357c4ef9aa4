pub mod config;
pub mod ingest;
pub mod model;
pub mod orchestrator;
pub mod scoring;
pub mod store;
