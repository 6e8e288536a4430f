pub mod api_connection;
pub mod cli;
pub mod config;
pub mod presentation;
pub mod proxy;
pub mod recipe_aggregator;
pub mod recipe_store;
pub mod session;
pub mod storage;
pub mod unit_converter;
