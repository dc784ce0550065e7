pub mod clients;
pub mod configuration;
pub mod domain;
pub mod models;
pub mod prompt;
pub mod publish_job;
pub mod routes;
pub mod scheduler;
pub mod startup;
pub mod telemetry;
pub mod utils;
