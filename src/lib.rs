pub mod api;
pub mod config;
pub mod error;
pub mod humanize;
pub mod media;
pub mod observability;
pub mod pipeline;
pub mod sources;
pub mod storage;
pub mod tools;
