pub mod app;
pub mod cache;
pub mod config;
pub mod enrich;
pub mod error;
pub mod genres;
pub mod models;
pub mod pipeline;
pub mod project;
pub mod query;
pub mod tmdb;
