//! Rendering and delivery of Discord announcements.
//!
//! [`render`] is pure and infallible short of unusable input, so it is
//! tested exhaustively without any network. [`DiscordSink`] is the only
//! place an HTTP request happens.

pub mod announcer;
pub mod format;
pub mod sink;

pub use announcer::{AnnounceError, Announcer};
pub use format::{
    format_amount, render, short_address, AnnouncementField, AnnouncementPayload, FormatError,
    MISSING_FIELD,
};
pub use sink::{AnnouncementSink, DiscordSink, SinkError};
