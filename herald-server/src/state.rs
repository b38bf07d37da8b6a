use crate::config::runtime::RuntimeConfig;
use herald_core::announce::{Announcer, AnnouncementSink};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub announcer: Arc<Announcer<Arc<dyn AnnouncementSink>>>,
    pub config: RuntimeConfig,
}
