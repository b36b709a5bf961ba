pub mod bootstrap;
pub mod config;
pub mod delivery;
pub mod error;
pub mod ingress;
pub mod journal;
pub mod log;
pub mod metrics;
pub mod observer;
pub mod persister;
pub mod store;
