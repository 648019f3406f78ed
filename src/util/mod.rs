//! Text helpers shared by the store and the command-line shell.
//!
//! - **Reading time**: word-count based estimate stored on each article
//! - **Terminal output**: Unicode-aware width, truncation and control
//!   character stripping for article text that came from remote providers

mod text;

pub use text::{
    display_width, reading_time_minutes, strip_control_chars, truncate_to_width, word_count,
    WORDS_PER_MINUTE,
};
