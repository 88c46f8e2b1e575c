#![forbid(unsafe_code)]

pub mod auto_advance;
pub mod error;
pub mod model;
pub mod navigation;
pub mod progress;
pub mod rbac;
pub mod sequencer;
pub mod time;

pub use error::Error;
pub use time::Clock;
