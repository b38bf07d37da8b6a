use crate::announce::{AnnounceError, Announcer, AnnouncementSink};
use crate::cursor::StreamCursor;
use crate::events::SourcedEvent;
use crate::poll::classifier::{ClassifyConfig, EventClassifier, PoolCatalog};
use crate::poll::interval::error_backoff;
use crate::poll::source::{EventStream, SourceError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, watch};

/// Drives one stream: baseline, fetch, classify, announce, advance.
///
/// One runner per stream, each on its own task, so streams fail and
/// recover independently. Within a runner ticks never overlap because
/// the loop awaits each tick before sleeping again.
pub struct PollRunner<S, K, C> {
    stream: S,
    cursor: StreamCursor,
    classifier: EventClassifier<C>,
    announcer: Arc<Announcer<K>>,
    config: Arc<RwLock<ClassifyConfig>>,
    interval: Duration,
    shutdown_rx: watch::Receiver<bool>,
}

impl<S, K, C> PollRunner<S, K, C>
where
    S: EventStream,
    K: AnnouncementSink,
    C: PoolCatalog,
{
    pub fn new(
        stream: S,
        classifier: EventClassifier<C>,
        announcer: Arc<Announcer<K>>,
        config: Arc<RwLock<ClassifyConfig>>,
        interval: Duration,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        let cursor = StreamCursor::new(stream.kind());
        PollRunner {
            stream,
            cursor,
            classifier,
            announcer,
            config,
            interval,
            shutdown_rx,
        }
    }

    pub fn cursor(&self) -> &StreamCursor {
        &self.cursor
    }

    /// Record the newest existing row so history is never announced.
    pub async fn initialize(&mut self) -> Result<(), SourceError> {
        match self.stream.latest().await? {
            Some(row) => {
                self.cursor.advance(row.row_id);
                tracing::info!(
                    stream = %self.cursor.stream(),
                    row_id = row.row_id,
                    "cursor baselined at latest row"
                );
            }
            None => {
                tracing::info!(stream = %self.cursor.stream(), "stream is empty, starting fresh");
            }
        }
        Ok(())
    }

    /// One poll pass. Returns the number of announcements delivered.
    ///
    /// Row-level failures are logged and skipped; only a fetch failure
    /// surfaces as an error, leaving the cursor untouched for a retry.
    pub async fn tick(&mut self) -> Result<u32, SourceError> {
        let Some(last_seen) = self.cursor.last_seen() else {
            // Unset cursor (empty table at startup, or initialize
            // failed): baseline now, announce nothing.
            if let Some(row) = self.stream.latest().await? {
                self.cursor.advance(row.row_id);
                tracing::info!(
                    stream = %self.cursor.stream(),
                    row_id = row.row_id,
                    "baseline established"
                );
            }
            return Ok(0);
        };

        let rows = self.stream.fetch_after(last_seen).await?;
        let config = self.config.read().await.clone();

        let mut delivered = 0u32;
        for row in rows {
            if row.row_id <= last_seen || Some(row.row_id) <= self.cursor.last_seen() {
                continue;
            }
            if self.handle_row(&row, &config).await {
                delivered += 1;
            }
            self.cursor.advance(row.row_id);
        }
        Ok(delivered)
    }

    async fn handle_row(&self, row: &SourcedEvent, config: &ClassifyConfig) -> bool {
        let decision = self.classifier.classify(&row.event, config).await;
        if !decision.notify {
            tracing::debug!(
                stream = %self.cursor.stream(),
                row_id = row.row_id,
                reason = decision.reason,
                "event suppressed"
            );
            return false;
        }
        match self.announcer.announce(&row.event).await {
            Ok(()) => true,
            Err(AnnounceError::Format(err)) => {
                tracing::warn!(
                    stream = %self.cursor.stream(),
                    row_id = row.row_id,
                    error = %err,
                    "failed to render row, skipping"
                );
                false
            }
            Err(AnnounceError::Delivery(err)) => {
                tracing::warn!(
                    stream = %self.cursor.stream(),
                    row_id = row.row_id,
                    error = %err,
                    "delivery failed, not retrying"
                );
                false
            }
        }
    }

    pub async fn run(mut self) {
        if let Err(err) = self.initialize().await {
            tracing::warn!(
                stream = %self.cursor.stream(),
                error = %err,
                "initial baseline failed, first tick will retry"
            );
        }
        let mut delay = self.interval;
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        tracing::info!(stream = %self.cursor.stream(), "poll runner shutting down");
                        break;
                    }
                }
                _ = tokio::time::sleep(delay) => {
                    delay = match self.tick().await {
                        Ok(delivered) => {
                            if delivered > 0 {
                                tracing::info!(
                                    stream = %self.cursor.stream(),
                                    delivered,
                                    "announcements delivered"
                                );
                            }
                            self.interval
                        }
                        Err(err) => {
                            tracing::error!(
                                stream = %self.cursor.stream(),
                                error = %err,
                                "poll tick failed"
                            );
                            error_backoff(self.interval)
                        }
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::announce::{AnnouncementPayload, SinkError};
    use crate::events::{Destination, GameEvent, StreamKind, WinnerEvent};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use time::OffsetDateTime;
    use tokio::sync::Mutex;

    fn winner_row(id: i64, address: &str) -> SourcedEvent {
        SourcedEvent {
            row_id: id,
            event: GameEvent::StreakWinner(WinnerEvent {
                game_id: format!("game-{id}"),
                winner_address: address.to_owned(),
                prize_amount: Decimal::from(250),
                streak_length: Some(3),
                occurred_at: OffsetDateTime::now_utc(),
            }),
        }
    }

    #[derive(Clone)]
    struct ScriptedStream {
        kind: StreamKind,
        rows: Arc<Mutex<Vec<SourcedEvent>>>,
        fail_fetch: Arc<AtomicBool>,
        replay_all: bool,
    }

    impl ScriptedStream {
        fn new(rows: Vec<SourcedEvent>) -> Self {
            ScriptedStream {
                kind: StreamKind::StreakWinners,
                rows: Arc::new(Mutex::new(rows)),
                fail_fetch: Arc::new(AtomicBool::new(false)),
                replay_all: false,
            }
        }
    }

    #[async_trait]
    impl EventStream for ScriptedStream {
        fn kind(&self) -> StreamKind {
            self.kind
        }

        async fn latest(&self) -> Result<Option<SourcedEvent>, SourceError> {
            let rows = self.rows.lock().await;
            Ok(rows.iter().max_by_key(|r| r.row_id).cloned())
        }

        async fn fetch_after(&self, last_seen: i64) -> Result<Vec<SourcedEvent>, SourceError> {
            if self.fail_fetch.load(Ordering::Relaxed) {
                return Err(SourceError::Database(sqlx::Error::PoolClosed));
            }
            let rows = self.rows.lock().await;
            Ok(rows
                .iter()
                .filter(|r| self.replay_all || r.row_id > last_seen)
                .cloned()
                .collect())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSink {
        sent: Arc<StdMutex<Vec<(Destination, String)>>>,
        fail: Arc<AtomicBool>,
    }

    impl RecordingSink {
        fn sent_titles(&self) -> Vec<String> {
            self.sent.lock().unwrap().iter().map(|(_, t)| t.clone()).collect()
        }
    }

    #[async_trait]
    impl AnnouncementSink for RecordingSink {
        async fn send(
            &self,
            destination: Destination,
            payload: &AnnouncementPayload,
        ) -> Result<(), SinkError> {
            if self.fail.load(Ordering::Relaxed) {
                return Err(SinkError::Rejected {
                    status: 500,
                    body: "simulated outage".to_owned(),
                });
            }
            self.sent
                .lock()
                .unwrap()
                .push((destination, payload.title.clone()));
            Ok(())
        }
    }

    fn runner(
        stream: &ScriptedStream,
        sink: RecordingSink,
    ) -> PollRunner<ScriptedStream, RecordingSink, crate::poll::classifier::NoCatalog> {
        let (_tx, rx) = watch::channel(false);
        PollRunner::new(
            stream.clone(),
            EventClassifier::without_catalog(),
            Arc::new(Announcer::new(sink)),
            Arc::new(RwLock::new(ClassifyConfig::default())),
            Duration::from_secs(30),
            rx,
        )
    }

    #[tokio::test]
    async fn first_tick_baselines_without_announcing() {
        let stream = ScriptedStream::new(vec![
            winner_row(5, "addr1aaa"),
            winner_row(7, "addr1bbb"),
            winner_row(9, "addr1ccc"),
        ]);
        let sink = RecordingSink::default();
        let mut runner = runner(&stream, sink.clone());

        assert_eq!(runner.tick().await.unwrap(), 0);
        assert_eq!(runner.cursor().last_seen(), Some(9));
        assert!(sink.sent_titles().is_empty());

        stream.rows.lock().await.push(winner_row(12, "addr1ddd"));
        assert_eq!(runner.tick().await.unwrap(), 1);
        assert_eq!(runner.cursor().last_seen(), Some(12));
        assert_eq!(sink.sent_titles().len(), 1);
    }

    #[tokio::test]
    async fn initialize_prevents_replay_of_existing_rows() {
        let rows = (1..=10).map(|id| winner_row(id, "addr1aaa")).collect();
        let stream = ScriptedStream::new(rows);
        let sink = RecordingSink::default();
        let mut runner = runner(&stream, sink.clone());

        runner.initialize().await.unwrap();
        assert_eq!(runner.cursor().last_seen(), Some(10));
        assert_eq!(runner.tick().await.unwrap(), 0);
        assert!(sink.sent_titles().is_empty());
    }

    #[tokio::test]
    async fn render_failure_is_isolated_to_its_row() {
        let stream = ScriptedStream::new(vec![winner_row(1, "addr1aaa")]);
        let sink = RecordingSink::default();
        let mut runner = runner(&stream, sink.clone());
        runner.initialize().await.unwrap();

        {
            let mut rows = stream.rows.lock().await;
            rows.push(winner_row(2, "addr1bbb"));
            // Empty address cannot be rendered.
            rows.push(winner_row(3, ""));
            rows.push(winner_row(4, "addr1ccc"));
        }
        assert_eq!(runner.tick().await.unwrap(), 2);
        assert_eq!(runner.cursor().last_seen(), Some(4));
        assert_eq!(sink.sent_titles().len(), 2);
    }

    #[tokio::test]
    async fn rows_at_or_below_cursor_are_skipped() {
        let mut stream = ScriptedStream::new(vec![winner_row(1, "addr1aaa")]);
        stream.replay_all = true;
        let sink = RecordingSink::default();
        let mut runner = runner(&stream, sink.clone());
        runner.initialize().await.unwrap();

        stream.rows.lock().await.push(winner_row(2, "addr1bbb"));
        assert_eq!(runner.tick().await.unwrap(), 1);
        // The stream keeps returning everything; nothing repeats.
        assert_eq!(runner.tick().await.unwrap(), 0);
        assert_eq!(sink.sent_titles().len(), 1);
    }

    #[tokio::test]
    async fn delivery_failure_still_advances_cursor() {
        let stream = ScriptedStream::new(vec![winner_row(1, "addr1aaa")]);
        let sink = RecordingSink::default();
        let mut runner = runner(&stream, sink.clone());
        runner.initialize().await.unwrap();

        stream.rows.lock().await.push(winner_row(2, "addr1bbb"));
        sink.fail.store(true, Ordering::Relaxed);
        assert_eq!(runner.tick().await.unwrap(), 0);
        assert_eq!(runner.cursor().last_seen(), Some(2));

        // Row 2 is gone for good, even once delivery recovers.
        sink.fail.store(false, Ordering::Relaxed);
        assert_eq!(runner.tick().await.unwrap(), 0);
        assert!(sink.sent_titles().is_empty());
    }

    #[tokio::test]
    async fn fetch_error_leaves_cursor_untouched() {
        let stream = ScriptedStream::new(vec![winner_row(1, "addr1aaa")]);
        let sink = RecordingSink::default();
        let mut runner = runner(&stream, sink.clone());
        runner.initialize().await.unwrap();

        stream.rows.lock().await.push(winner_row(2, "addr1bbb"));
        stream.fail_fetch.store(true, Ordering::Relaxed);
        assert!(runner.tick().await.is_err());
        assert_eq!(runner.cursor().last_seen(), Some(1));

        stream.fail_fetch.store(false, Ordering::Relaxed);
        assert_eq!(runner.tick().await.unwrap(), 1);
        assert_eq!(sink.sent_titles().len(), 1);
    }

    #[tokio::test]
    async fn failing_stream_does_not_stall_a_healthy_one() {
        let broken = ScriptedStream::new(vec![winner_row(1, "addr1aaa")]);
        let healthy = ScriptedStream::new(vec![winner_row(1, "addr1aaa")]);
        let sink = RecordingSink::default();
        let mut broken_runner = runner(&broken, sink.clone());
        let mut healthy_runner = runner(&healthy, sink.clone());
        broken_runner.initialize().await.unwrap();
        healthy_runner.initialize().await.unwrap();

        broken.fail_fetch.store(true, Ordering::Relaxed);
        for id in 2..=6 {
            healthy.rows.lock().await.push(winner_row(id, "addr1bbb"));
            assert!(broken_runner.tick().await.is_err());
            assert_eq!(healthy_runner.tick().await.unwrap(), 1);
        }
        assert_eq!(sink.sent_titles().len(), 5);
    }
}
