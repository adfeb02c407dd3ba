//! Common utilities and helpers

pub mod time;

pub use time::{frames_to_time, nearest, next, previous, sorted_set, time_to_frames, TimeParser};
