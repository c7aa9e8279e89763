pub mod config;
pub mod join;
pub mod serve;
