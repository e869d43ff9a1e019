pub mod config;
pub mod domain;
pub mod email_client;
pub mod generative_ai;
pub mod newsletter;
pub mod routes;
pub mod services;
pub mod startup;
pub mod subscriber_store;
pub mod telemetry;
pub mod utils;
