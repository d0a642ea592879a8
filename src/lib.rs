pub mod analyzers;
pub mod config;
pub mod editor;
pub mod error;
pub mod output;
pub mod record;
pub mod repository;
pub mod session;
pub mod storage;
