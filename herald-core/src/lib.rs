#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod announce;
pub mod cursor;
pub mod entities;
pub mod events;
pub mod framework;
pub mod poll;
