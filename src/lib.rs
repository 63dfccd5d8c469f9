pub mod app;
pub mod arr;
pub mod command;
pub mod config;
pub mod form;
pub mod relay;
