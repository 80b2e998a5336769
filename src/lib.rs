pub mod commands;
pub mod config;
pub mod cooldown;
pub mod error;
pub mod events;
pub mod http_client;
pub mod matcher;
pub mod months;
pub mod points;
pub mod render;
pub mod report;
pub mod sheet_client;
pub mod table;
