pub mod config;
pub mod load;
pub mod tables;
