//! MOT Bot Library
//!
//! This module exposes the bot components for testing purposes.

pub mod bot;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod sources;
pub mod transport;
