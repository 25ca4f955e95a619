//! Core domain types and selection logic.

pub mod backtest;
pub mod calendar;
pub mod config;
pub mod config_validation;
pub mod engine;
pub mod error;
pub mod exit_state;
pub mod feed;
pub mod order;
pub mod record;
pub mod selection;
pub mod tracker;
pub mod universe;
