use crate::announce::format::{render, FormatError};
use crate::announce::sink::{AnnouncementSink, SinkError};
use crate::events::GameEvent;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, thiserror::Error)]
pub enum AnnounceError {
    #[error("format error: {0}")]
    Format(#[from] FormatError),
    #[error("delivery error: {0}")]
    Delivery(#[from] SinkError),
}

/// The single render-and-deliver path, shared by the poll runners and
/// the webhook entry point.
pub struct Announcer<K> {
    sink: K,
    enabled: Arc<AtomicBool>,
}

impl<K: AnnouncementSink> Announcer<K> {
    pub fn new(sink: K) -> Self {
        Announcer {
            sink,
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Handle for flipping announcements on and off at runtime.
    pub fn toggle_handle(&self) -> Arc<AtomicBool> {
        self.enabled.clone()
    }

    /// Render and deliver one event. A disabled announcer accepts the
    /// event and drops it silently.
    pub async fn announce(&self, event: &GameEvent) -> Result<(), AnnounceError> {
        if !self.enabled.load(Ordering::Relaxed) {
            tracing::debug!(game_id = %event.game_id(), "announcements disabled, dropping event");
            return Ok(());
        }
        let payload = render(event)?;
        self.sink.send(payload.destination, &payload).await?;
        tracing::debug!(
            game_id = %event.game_id(),
            destination = %payload.destination,
            "announcement delivered"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::announce::format::AnnouncementPayload;
    use crate::events::{Destination, WinnerEvent};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::sync::atomic::AtomicU32;
    use time::OffsetDateTime;

    #[derive(Default)]
    struct CountingSink {
        calls: AtomicU32,
    }

    #[async_trait]
    impl AnnouncementSink for CountingSink {
        async fn send(
            &self,
            _destination: Destination,
            _payload: &AnnouncementPayload,
        ) -> Result<(), SinkError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    fn event() -> GameEvent {
        GameEvent::StreakWinner(WinnerEvent {
            game_id: "game-1".to_owned(),
            winner_address: "addr1qxyz".to_owned(),
            prize_amount: Decimal::from(100),
            streak_length: Some(2),
            occurred_at: OffsetDateTime::now_utc(),
        })
    }

    #[tokio::test]
    async fn disabled_announcer_accepts_and_drops() {
        let announcer = Announcer::new(CountingSink::default());
        let toggle = announcer.toggle_handle();

        announcer.announce(&event()).await.unwrap();
        assert_eq!(announcer.sink.calls.load(Ordering::Relaxed), 1);

        toggle.store(false, Ordering::Relaxed);
        announcer.announce(&event()).await.unwrap();
        assert_eq!(announcer.sink.calls.load(Ordering::Relaxed), 1);

        toggle.store(true, Ordering::Relaxed);
        announcer.announce(&event()).await.unwrap();
        assert_eq!(announcer.sink.calls.load(Ordering::Relaxed), 2);
    }
}
