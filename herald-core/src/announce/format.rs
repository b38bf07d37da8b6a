use crate::events::{Destination, GameEvent, PoolEvent, WinnerEvent};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use time::OffsetDateTime;

/// Placeholder shown when an optional field is absent.
pub const MISSING_FIELD: &str = "N/A";

const WINNER_COLOR: u32 = 0x00ff00;
const POOL_COLOR: u32 = 0x0099ff;

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("winner row for game {game_id} has no address")]
    EmptySubject { game_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnouncementField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// A rendered announcement, ready for any sink.
#[derive(Debug, Clone)]
pub struct AnnouncementPayload {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub fields: Vec<AnnouncementField>,
    pub footer: String,
    pub destination: Destination,
    pub occurred_at: OffsetDateTime,
}

/// Render an event into its announcement. Pure; the only failure is a
/// winner row with no address to name.
pub fn render(event: &GameEvent) -> Result<AnnouncementPayload, FormatError> {
    match event {
        GameEvent::StreakWinner(e) => {
            render_winner(e, "🎉 GAS STREAKS WINNER! 🎉", "Gas Streaks")
        }
        GameEvent::BlitzWinner(e) => render_winner(e, "⚡ BLITZ WINNER! ⚡", "Blitz"),
        GameEvent::PoolCreated(e) => Ok(render_pool(e)),
    }
}

fn render_winner(
    event: &WinnerEvent,
    title: &str,
    game_name: &str,
) -> Result<AnnouncementPayload, FormatError> {
    if event.winner_address.trim().is_empty() {
        return Err(FormatError::EmptySubject {
            game_id: event.game_id.clone(),
        });
    }
    let streak = event
        .streak_length
        .map(|n| n.to_string())
        .unwrap_or_else(|| MISSING_FIELD.to_owned());
    let game_id = if event.game_id.is_empty() {
        MISSING_FIELD.to_owned()
    } else {
        format!("`{}`", event.game_id)
    };
    Ok(AnnouncementPayload {
        title: title.to_owned(),
        description: format!("A {game_name} game just paid out!"),
        color: WINNER_COLOR,
        fields: vec![
            AnnouncementField {
                name: "🏆 Winner".to_owned(),
                value: format!("**{}**", short_address(&event.winner_address)),
                inline: false,
            },
            AnnouncementField {
                name: "💰 Prize Won".to_owned(),
                value: format!("**{} ADA**", format_amount(event.prize_amount)),
                inline: true,
            },
            AnnouncementField {
                name: "🎯 Streak Length".to_owned(),
                value: streak,
                inline: true,
            },
            AnnouncementField {
                name: "🎲 Game ID".to_owned(),
                value: game_id,
                inline: false,
            },
        ],
        footer: "Congratulations to the winner!".to_owned(),
        destination: Destination::Winners,
        occurred_at: event.occurred_at,
    })
}

fn render_pool(event: &PoolEvent) -> AnnouncementPayload {
    let game_id = if event.game_id.is_empty() {
        MISSING_FIELD.to_owned()
    } else {
        format!("`{}`", event.game_id)
    };
    AnnouncementPayload {
        title: "🆕 NEW PRIZE POOL CREATED!".to_owned(),
        description: "A fresh prize pool is open for play!".to_owned(),
        color: POOL_COLOR,
        fields: vec![
            AnnouncementField {
                name: "💎 Prize Pool".to_owned(),
                value: format!("**{} ADA**", format_amount(event.total_prize)),
                inline: true,
            },
            AnnouncementField {
                name: "🎮 Game ID".to_owned(),
                value: game_id,
                inline: true,
            },
            AnnouncementField {
                name: "🚀 Status".to_owned(),
                value: "**ACTIVE**".to_owned(),
                inline: true,
            },
        ],
        footer: "Good luck!".to_owned(),
        destination: Destination::NewPools,
        occurred_at: event.occurred_at,
    }
}

/// Shorten a wallet address to its first 8 and last 6 characters.
/// Addresses short enough to show whole are left alone.
pub fn short_address(address: &str) -> String {
    let count = address.chars().count();
    if count <= 8 + 6 + 1 {
        return address.to_owned();
    }
    let head: String = address.chars().take(8).collect();
    let tail: String = address.chars().skip(count - 6).collect();
    format!("{head}…{tail}")
}

/// Format an amount floored to whole units with thousands grouping.
pub fn format_amount(amount: Decimal) -> String {
    let whole = amount.floor();
    match whole.to_i128() {
        Some(value) => group_thousands(value),
        None => whole.to_string(),
    }
}

fn group_thousands(value: i128) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    let offset = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - offset) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
