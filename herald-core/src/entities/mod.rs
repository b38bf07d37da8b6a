pub mod pool_rows;
pub mod winner_rows;

/// Game kind discriminator used in winner queries.
///
/// This is the sqlx::Type version for WHERE clauses; event-side
/// discrimination lives in [`crate::events::GameEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "game_kind", rename_all = "snake_case")]
pub enum GameKind {
    GasStreaks,
    Blitz,
}
