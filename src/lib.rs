pub mod analyzer;
pub mod config;
pub mod date_key;
pub mod db;
pub mod photos;
pub mod records;
pub mod session;
