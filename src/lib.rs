//! News reading and publishing store with a local persistence mirror.
//!
//! [`news::NewsStore`] holds the canonical state in memory and mirrors every
//! change through a [`storage::KeyValueStore`] adapter.

pub mod config;
pub mod news;
pub mod storage;
pub mod util;
