use rust_decimal::Decimal;
use serde::Deserialize;
use std::net::SocketAddr;
use url::Url;

/// On-disk TOML configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerSection,
    pub discord: DiscordSection,
    #[serde(default)]
    pub announce: AnnounceSection,
    #[serde(default)]
    pub polling: PollingSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
}

impl Default for ServerSection {
    fn default() -> Self {
        ServerSection {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5000))
}

/// Channel webhook URLs. Required; there is no useful default.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordSection {
    pub winners_webhook_url: Url,
    pub new_pools_webhook_url: Url,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnnounceSection {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub min_winner_prize: Decimal,
    #[serde(default)]
    pub min_pool_prize: Decimal,
    #[serde(default = "default_prize_unit")]
    pub prize_unit: String,
}

impl Default for AnnounceSection {
    fn default() -> Self {
        AnnounceSection {
            enabled: default_enabled(),
            min_winner_prize: Decimal::ZERO,
            min_pool_prize: Decimal::ZERO,
            prize_unit: default_prize_unit(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_prize_unit() -> String {
    "ADA".to_owned()
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollingSection {
    #[serde(default = "default_winners_interval")]
    pub winners_interval_secs: u64,
    #[serde(default = "default_blitz_interval")]
    pub blitz_interval_secs: u64,
    #[serde(default = "default_pools_interval")]
    pub pools_interval_secs: u64,
}

impl Default for PollingSection {
    fn default() -> Self {
        PollingSection {
            winners_interval_secs: default_winners_interval(),
            blitz_interval_secs: default_blitz_interval(),
            pools_interval_secs: default_pools_interval(),
        }
    }
}

fn default_winners_interval() -> u64 {
    30
}

fn default_blitz_interval() -> u64 {
    120
}

fn default_pools_interval() -> u64 {
    45
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn minimal_config_applies_defaults() {
        let config: FileConfig = toml::from_str(
            r#"
            [discord]
            winners_webhook_url = "https://discord.com/api/webhooks/1/aaa"
            new_pools_webhook_url = "https://discord.com/api/webhooks/2/bbb"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.listen.port(), 5000);
        assert!(config.announce.enabled);
        assert_eq!(config.announce.prize_unit, "ADA");
        assert_eq!(config.polling.winners_interval_secs, 30);
        assert_eq!(config.polling.blitz_interval_secs, 120);
        assert_eq!(config.polling.pools_interval_secs, 45);
    }

    #[test]
    fn full_config_parses() {
        let config: FileConfig = toml::from_str(
            r#"
            [server]
            listen = "127.0.0.1:8080"

            [discord]
            winners_webhook_url = "https://discord.com/api/webhooks/1/aaa"
            new_pools_webhook_url = "https://discord.com/api/webhooks/2/bbb"

            [announce]
            enabled = false
            min_winner_prize = "100000"
            min_pool_prize = "5000"
            prize_unit = "ADA"

            [polling]
            winners_interval_secs = 10
            blitz_interval_secs = 60
            pools_interval_secs = 20
            "#,
        )
        .unwrap();
        assert_eq!(config.server.listen.port(), 8080);
        assert!(!config.announce.enabled);
        assert_eq!(config.announce.min_winner_prize, Decimal::from(100_000));
        assert_eq!(config.polling.winners_interval_secs, 10);
    }

    #[test]
    fn missing_discord_section_is_an_error() {
        assert!(toml::from_str::<FileConfig>("").is_err());
    }
}
