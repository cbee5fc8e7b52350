pub mod config;
pub mod corpus;
pub mod errors;
pub mod exclusion;
pub mod extra_args;
pub mod interactive;
pub mod orchestrator;
pub mod policy;
pub mod settings;
pub mod stories;
pub mod trainer;
pub mod ui;
