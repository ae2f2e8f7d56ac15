//! Core domain types and logic.

pub mod bar;
pub mod indicator;
pub mod signal;
pub mod strategy;
pub mod detector;
pub mod risk;
pub mod execution;
pub mod message;
pub mod scan;
pub mod timeframe;
pub mod watchlist;
pub mod config;
pub mod config_validation;
pub mod error;
