use herald_core::poll::ClassifyConfig;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tokio::sync::RwLock;

/// The reloadable slice of configuration, shared with the poll runners
/// and the announcer. Webhook URLs and the listen address are fixed for
/// the life of the process.
#[derive(Clone)]
pub struct RuntimeConfig {
    pub announce_enabled: Arc<AtomicBool>,
    pub thresholds: Arc<RwLock<ClassifyConfig>>,
}
