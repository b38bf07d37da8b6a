use std::time::Duration;

/// Delay before the next tick after a failed one.
///
/// Backed off well past the normal cadence so a struggling database is
/// not hammered, but bounded so recovery is still prompt.
pub fn error_backoff(normal: Duration) -> Duration {
    match normal {
        d if d < Duration::from_secs(30) => Duration::from_secs(120),
        d if d < Duration::from_secs(120) => Duration::from_secs(300),
        _ => Duration::from_secs(600),
    }
}
