// src/lib.rs

//! sitewatch library
//!
//! Watches XML sitemaps, keeps a daily snapshot of each one and reports the
//! URLs that appeared since the previous snapshot.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;

#[cfg(test)]
mod test_support;
