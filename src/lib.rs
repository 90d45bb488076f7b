pub mod api;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod observability;
pub mod tools;
pub mod ui;
