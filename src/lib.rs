pub mod config;
pub mod cycle;
pub mod format;
pub mod model;
pub mod output;
pub mod rankings;
pub mod services;
pub mod session;
pub mod stats;
