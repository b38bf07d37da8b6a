use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use rust_decimal::Decimal;

/// One active prize pool row from the `prize_pools` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PoolRow {
    pub id: i64,
    pub game_id: String,
    pub total_prize: Decimal,
    pub created_at: time::OffsetDateTime,
}

/// Display metadata for a game, resolved from the `games` table.
///
/// The classifier needs the unit symbol before it can compare a pool's
/// prize against the configured threshold.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PoolInfo {
    pub display_name: String,
    pub unit_symbol: String,
}

#[derive(Debug, Clone)]
/// Get the most recent active prize pool, used for cursor baselines.
pub struct GetLatestPool;

impl Processor<GetLatestPool> for DatabaseProcessor {
    type Output = Option<PoolRow>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetLatestPool")]
    async fn process(&self, _query: GetLatestPool) -> Result<Option<PoolRow>, sqlx::Error> {
        sqlx::query_as::<_, PoolRow>(
            r#"
            SELECT id, game_id, total_prize, created_at
            FROM prize_pools
            WHERE status = 'active'
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Get active prize pools newer than a cursor, oldest first.
pub struct GetPoolsAfter {
    pub after_id: i64,
}

impl Processor<GetPoolsAfter> for DatabaseProcessor {
    type Output = Vec<PoolRow>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetPoolsAfter")]
    async fn process(&self, query: GetPoolsAfter) -> Result<Vec<PoolRow>, sqlx::Error> {
        sqlx::query_as::<_, PoolRow>(
            r#"
            SELECT id, game_id, total_prize, created_at
            FROM prize_pools
            WHERE status = 'active'
              AND id > $1
            ORDER BY id ASC
            "#,
        )
        .bind(query.after_id)
        .fetch_all(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Resolve a game id to its display name and prize unit.
pub struct GetPoolInfo {
    pub game_id: String,
}

impl Processor<GetPoolInfo> for DatabaseProcessor {
    type Output = Option<PoolInfo>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetPoolInfo")]
    async fn process(&self, query: GetPoolInfo) -> Result<Option<PoolInfo>, sqlx::Error> {
        sqlx::query_as::<_, PoolInfo>(
            r#"
            SELECT display_name, unit_symbol
            FROM games
            WHERE game_id = $1
            "#,
        )
        .bind(query.game_id)
        .fetch_optional(&self.pool)
        .await
    }
}
