// src/lib.rs

//! Web crawler, inverted index and keyword search.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
