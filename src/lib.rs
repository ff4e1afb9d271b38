//! Railway history map server: serves the N05 rail segment and station
//! datasets, optionally narrowed to the features in service in one year.

pub mod cli;
pub mod config;
pub mod data;
pub mod logging;
pub mod server;
