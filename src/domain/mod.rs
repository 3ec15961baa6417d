pub mod account;
pub mod breakdown;
pub mod config;
pub mod package;
pub mod ports;
pub mod reservation;
