use crate::entities::GameKind;
use crate::entities::pool_rows::{GetLatestPool, GetPoolInfo, GetPoolsAfter, PoolInfo};
use crate::entities::winner_rows::{GetLatestWinner, GetWinnersAfter};
use crate::events::{GameEvent, PoolEvent, SourcedEvent, StreamKind, WinnerEvent};
use crate::framework::DatabaseProcessor;
use crate::poll::classifier::PoolCatalog;
use async_trait::async_trait;
use kanau::processor::Processor;
use sqlx::PgPool;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A watched table, abstracted so the runner can be driven by scripted
/// streams in tests.
#[async_trait]
pub trait EventStream: Send + Sync {
    fn kind(&self) -> StreamKind;

    /// The newest row, used only to baseline an unset cursor.
    async fn latest(&self) -> Result<Option<SourcedEvent>, SourceError>;

    /// All rows strictly newer than `last_seen`, oldest first.
    async fn fetch_after(&self, last_seen: i64) -> Result<Vec<SourcedEvent>, SourceError>;
}

/// Winner stream over `game_winners`, parameterised by game kind.
pub struct PgWinnerStream {
    pool: PgPool,
    game: GameKind,
}

impl PgWinnerStream {
    pub fn new(pool: PgPool, game: GameKind) -> Self {
        PgWinnerStream { pool, game }
    }

    fn to_event(&self, row: crate::entities::winner_rows::WinnerRow) -> SourcedEvent {
        let row_id = row.id;
        let event = WinnerEvent::from_row(row);
        let event = match self.game {
            GameKind::GasStreaks => GameEvent::StreakWinner(event),
            GameKind::Blitz => GameEvent::BlitzWinner(event),
        };
        SourcedEvent { row_id, event }
    }

    fn db(&self) -> DatabaseProcessor {
        DatabaseProcessor {
            pool: self.pool.clone(),
        }
    }
}

#[async_trait]
impl EventStream for PgWinnerStream {
    fn kind(&self) -> StreamKind {
        match self.game {
            GameKind::GasStreaks => StreamKind::StreakWinners,
            GameKind::Blitz => StreamKind::BlitzWinners,
        }
    }

    async fn latest(&self) -> Result<Option<SourcedEvent>, SourceError> {
        let row = self.db().process(GetLatestWinner { kind: self.game }).await?;
        Ok(row.map(|row| self.to_event(row)))
    }

    async fn fetch_after(&self, last_seen: i64) -> Result<Vec<SourcedEvent>, SourceError> {
        let rows = self
            .db()
            .process(GetWinnersAfter {
                kind: self.game,
                after_id: last_seen,
            })
            .await?;
        Ok(rows.into_iter().map(|row| self.to_event(row)).collect())
    }
}

/// Pool stream over `prize_pools`.
pub struct PgPoolStream {
    pool: PgPool,
}

impl PgPoolStream {
    pub fn new(pool: PgPool) -> Self {
        PgPoolStream { pool }
    }

    fn db(&self) -> DatabaseProcessor {
        DatabaseProcessor {
            pool: self.pool.clone(),
        }
    }
}

fn pool_event(row: crate::entities::pool_rows::PoolRow) -> SourcedEvent {
    SourcedEvent {
        row_id: row.id,
        event: GameEvent::PoolCreated(PoolEvent::from_row(row)),
    }
}

#[async_trait]
impl EventStream for PgPoolStream {
    fn kind(&self) -> StreamKind {
        StreamKind::PrizePools
    }

    async fn latest(&self) -> Result<Option<SourcedEvent>, SourceError> {
        let row = self.db().process(GetLatestPool).await?;
        Ok(row.map(pool_event))
    }

    async fn fetch_after(&self, last_seen: i64) -> Result<Vec<SourcedEvent>, SourceError> {
        let rows = self
            .db()
            .process(GetPoolsAfter { after_id: last_seen })
            .await?;
        Ok(rows.into_iter().map(pool_event).collect())
    }
}

/// Catalog lookup backed by the `games` table.
pub struct PgGameCatalog {
    pool: PgPool,
}

impl PgGameCatalog {
    pub fn new(pool: PgPool) -> Self {
        PgGameCatalog { pool }
    }
}

#[async_trait]
impl PoolCatalog for PgGameCatalog {
    async fn resolve(&self, game_id: &str) -> Result<Option<PoolInfo>, SourceError> {
        let db = DatabaseProcessor {
            pool: self.pool.clone(),
        };
        Ok(db
            .process(GetPoolInfo {
                game_id: game_id.to_owned(),
            })
            .await?)
    }
}
