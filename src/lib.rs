pub mod app;
pub mod config;
pub mod people;
pub mod recommend;
pub mod tmdb;
