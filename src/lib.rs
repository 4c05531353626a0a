pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod schemas;

mod openapi_tests;
