use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /webhook/winner`.
///
/// Producers are loose with types: amounts arrive as JSON numbers or
/// strings, and the streak length may be either form or absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WinnerAnnouncement {
    pub winner_address: String,
    pub prize_amount: Decimal,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub streak_length: Option<u32>,
    pub game_id: String,
}

/// Body of `POST /webhook/new_pool`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPoolAnnouncement {
    pub total_prize: Decimal,
    pub game_id: String,
}

/// Success acknowledgement returned by the webhook endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub status: String,
}

fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }
    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn string_typed_fields_parse() {
        let body: WinnerAnnouncement = serde_json::from_str(
            r#"{
                "winner_address": "addr1qxyz",
                "prize_amount": "100.5",
                "streak_length": "5",
                "game_id": "abc123"
            }"#,
        )
        .unwrap();
        assert_eq!(body.prize_amount, Decimal::new(1005, 1));
        assert_eq!(body.streak_length, Some(5));
    }

    #[test]
    fn numeric_fields_parse() {
        let body: WinnerAnnouncement = serde_json::from_str(
            r#"{
                "winner_address": "addr1qxyz",
                "prize_amount": 250,
                "streak_length": 3,
                "game_id": "abc123"
            }"#,
        )
        .unwrap();
        assert_eq!(body.prize_amount, Decimal::from(250));
        assert_eq!(body.streak_length, Some(3));
    }

    #[test]
    fn missing_streak_is_none() {
        let body: WinnerAnnouncement = serde_json::from_str(
            r#"{
                "winner_address": "addr1qxyz",
                "prize_amount": "100",
                "game_id": "abc123"
            }"#,
        )
        .unwrap();
        assert_eq!(body.streak_length, None);
    }

    #[test]
    fn pool_announcement_parses() {
        let body: NewPoolAnnouncement = serde_json::from_str(
            r#"{"total_prize": "5000", "game_id": "pool-7"}"#,
        )
        .unwrap();
        assert_eq!(body.total_prize, Decimal::from(5000));
    }
}
