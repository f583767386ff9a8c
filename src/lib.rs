pub mod agent;
pub mod audit;
pub mod config;
pub mod db;
pub mod dto;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod notify;
pub mod realtime;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
