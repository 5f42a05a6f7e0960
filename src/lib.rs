pub mod account;
pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod mail;
pub mod storage;
pub mod cli;
