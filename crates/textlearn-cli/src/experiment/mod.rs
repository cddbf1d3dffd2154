//! Configuration loading and run helpers behind the `textlearn` binary.
pub mod config;
pub mod runner;
