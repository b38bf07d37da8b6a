use crate::entities::GameKind;
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use rust_decimal::Decimal;

/// One settled winner row from the `game_winners` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct WinnerRow {
    pub id: i64,
    pub game_id: String,
    pub winner_address: String,
    pub prize_amount: Decimal,
    pub streak_length: i32,
    pub completed_at: time::OffsetDateTime,
}

#[derive(Debug, Clone)]
/// Get the most recent won game of a kind.
///
/// Used to baseline a stream cursor at startup so pre-existing winners
/// are never replayed.
pub struct GetLatestWinner {
    pub kind: GameKind,
}

impl Processor<GetLatestWinner> for DatabaseProcessor {
    type Output = Option<WinnerRow>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetLatestWinner")]
    async fn process(&self, query: GetLatestWinner) -> Result<Option<WinnerRow>, sqlx::Error> {
        sqlx::query_as::<_, WinnerRow>(
            r#"
            SELECT id, game_id, winner_address, prize_amount, streak_length, completed_at
            FROM game_winners
            WHERE game_kind = $1
              AND status = 'won'
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(query.kind)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Get won games newer than a cursor, oldest first.
pub struct GetWinnersAfter {
    pub kind: GameKind,
    pub after_id: i64,
}

impl Processor<GetWinnersAfter> for DatabaseProcessor {
    type Output = Vec<WinnerRow>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetWinnersAfter")]
    async fn process(&self, query: GetWinnersAfter) -> Result<Vec<WinnerRow>, sqlx::Error> {
        sqlx::query_as::<_, WinnerRow>(
            r#"
            SELECT id, game_id, winner_address, prize_amount, streak_length, completed_at
            FROM game_winners
            WHERE game_kind = $1
              AND status = 'won'
              AND id > $2
            ORDER BY id ASC
            "#,
        )
        .bind(query.kind)
        .bind(query.after_id)
        .fetch_all(&self.pool)
        .await
    }
}
