use crate::entities::pool_rows::PoolInfo;
use crate::events::{GameEvent, PoolEvent, WinnerEvent};
use crate::poll::source::SourceError;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Thresholds applied before an event is announced.
///
/// Reloaded at runtime, so runners take a snapshot per tick rather than
/// holding the lock across rows.
#[derive(Debug, Clone)]
pub struct ClassifyConfig {
    pub min_winner_prize: Decimal,
    pub min_pool_prize: Decimal,
    pub prize_unit: String,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        ClassifyConfig {
            min_winner_prize: Decimal::ZERO,
            min_pool_prize: Decimal::ZERO,
            prize_unit: "ADA".to_owned(),
        }
    }
}

/// Outcome of classification, with a reason for the log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub notify: bool,
    pub reason: &'static str,
}

impl Decision {
    pub const fn notify(reason: &'static str) -> Self {
        Decision {
            notify: true,
            reason,
        }
    }

    pub const fn suppress(reason: &'static str) -> Self {
        Decision {
            notify: false,
            reason,
        }
    }
}

fn classify_winner(event: &WinnerEvent, config: &ClassifyConfig) -> Decision {
    if event.prize_amount < config.min_winner_prize {
        Decision::suppress("prize below minimum")
    } else {
        Decision::notify("prize meets minimum")
    }
}

fn classify_pool(event: &PoolEvent, config: &ClassifyConfig, info: Option<&PoolInfo>) -> Decision {
    match info {
        Some(info) if info.unit_symbol == config.prize_unit => {
            if event.total_prize < config.min_pool_prize {
                Decision::suppress("pool below minimum")
            } else {
                Decision::notify("pool meets minimum")
            }
        }
        // The threshold is denominated in one unit; pools priced in
        // anything else pass through unfiltered.
        Some(_) => Decision::notify("pool priced in a different unit"),
        None => Decision::notify("pool metadata unavailable"),
    }
}

/// Resolves a game id to its catalog entry, if any.
#[async_trait]
pub trait PoolCatalog: Send + Sync {
    async fn resolve(&self, game_id: &str) -> Result<Option<PoolInfo>, SourceError>;
}

/// Catalog stand-in for streams that never emit pool events.
pub struct NoCatalog;

#[async_trait]
impl PoolCatalog for NoCatalog {
    async fn resolve(&self, _game_id: &str) -> Result<Option<PoolInfo>, SourceError> {
        Ok(None)
    }
}

/// Decides per event whether it should be announced.
pub struct EventClassifier<C> {
    catalog: Option<C>,
}

impl EventClassifier<NoCatalog> {
    pub fn without_catalog() -> Self {
        EventClassifier { catalog: None }
    }
}

impl<C: PoolCatalog> EventClassifier<C> {
    pub fn with_catalog(catalog: C) -> Self {
        EventClassifier {
            catalog: Some(catalog),
        }
    }

    pub async fn classify(&self, event: &GameEvent, config: &ClassifyConfig) -> Decision {
        match event {
            GameEvent::StreakWinner(e) | GameEvent::BlitzWinner(e) => classify_winner(e, config),
            GameEvent::PoolCreated(e) => {
                let info = match &self.catalog {
                    Some(catalog) => match catalog.resolve(&e.game_id).await {
                        Ok(info) => info,
                        Err(err) => {
                            // Lookup failures must not filter the event.
                            tracing::warn!(game_id = %e.game_id, error = %err, "pool catalog lookup failed");
                            None
                        }
                    },
                    None => None,
                };
                classify_pool(e, config, info.as_ref())
            }
        }
    }
}
