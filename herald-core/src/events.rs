//! Domain events produced by the poll streams and the webhook surface.
//!
//! Every announcement flows through [`GameEvent`] regardless of where it
//! was observed, so formatting and filtering only exist once.

use crate::entities::pool_rows::PoolRow;
use crate::entities::winner_rows::WinnerRow;
use herald_sdk::objects::{NewPoolAnnouncement, WinnerAnnouncement};
use rust_decimal::Decimal;
use time::OffsetDateTime;

/// The three database streams the poll loops watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    StreakWinners,
    BlitzWinners,
    PrizePools,
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamKind::StreakWinners => write!(f, "streak_winners"),
            StreamKind::BlitzWinners => write!(f, "blitz_winners"),
            StreamKind::PrizePools => write!(f, "prize_pools"),
        }
    }
}

/// Which Discord channel an announcement is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Winners,
    NewPools,
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Destination::Winners => write!(f, "winners"),
            Destination::NewPools => write!(f, "new_pools"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WinnerEvent {
    pub game_id: String,
    pub winner_address: String,
    pub prize_amount: Decimal,
    pub streak_length: Option<u32>,
    pub occurred_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct PoolEvent {
    pub game_id: String,
    pub total_prize: Decimal,
    pub occurred_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub enum GameEvent {
    StreakWinner(WinnerEvent),
    BlitzWinner(WinnerEvent),
    PoolCreated(PoolEvent),
}

impl GameEvent {
    pub fn destination(&self) -> Destination {
        match self {
            GameEvent::StreakWinner(_) | GameEvent::BlitzWinner(_) => Destination::Winners,
            GameEvent::PoolCreated(_) => Destination::NewPools,
        }
    }

    pub fn game_id(&self) -> &str {
        match self {
            GameEvent::StreakWinner(e) | GameEvent::BlitzWinner(e) => &e.game_id,
            GameEvent::PoolCreated(e) => &e.game_id,
        }
    }
}

/// An event together with the database row id it came from, which the
/// poll runner uses to advance its cursor.
#[derive(Debug, Clone)]
pub struct SourcedEvent {
    pub row_id: i64,
    pub event: GameEvent,
}

impl WinnerEvent {
    pub fn from_row(row: WinnerRow) -> Self {
        WinnerEvent {
            game_id: row.game_id,
            winner_address: row.winner_address,
            prize_amount: row.prize_amount,
            streak_length: u32::try_from(row.streak_length).ok(),
            occurred_at: row.completed_at,
        }
    }
}

impl PoolEvent {
    pub fn from_row(row: PoolRow) -> Self {
        PoolEvent {
            game_id: row.game_id,
            total_prize: row.total_prize,
            occurred_at: row.created_at,
        }
    }
}

impl From<WinnerAnnouncement> for GameEvent {
    fn from(body: WinnerAnnouncement) -> Self {
        GameEvent::StreakWinner(WinnerEvent {
            game_id: body.game_id,
            winner_address: body.winner_address,
            prize_amount: body.prize_amount,
            streak_length: body.streak_length,
            occurred_at: OffsetDateTime::now_utc(),
        })
    }
}

impl From<NewPoolAnnouncement> for GameEvent {
    fn from(body: NewPoolAnnouncement) -> Self {
        GameEvent::PoolCreated(PoolEvent {
            game_id: body.game_id,
            total_prize: body.total_prize,
            occurred_at: OffsetDateTime::now_utc(),
        })
    }
}
