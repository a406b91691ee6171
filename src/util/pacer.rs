use tokio::time::{Duration, Instant, sleep_until};

/// Keeps consecutive outbound requests at least `spacing` apart.
#[derive(Debug)]
pub struct Pacer {
    spacing: Duration,
    last: Option<Instant>,
}

impl Pacer {
    pub fn new(spacing: Duration) -> Self {
        Self {
            spacing,
            last: None,
        }
    }

    /// Waits until the next request may go out, then claims the slot.
    pub async fn wait(&mut self) {
        if let Some(last) = self.last {
            sleep_until(last + self.spacing).await;
        }
        self.last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_request_is_immediate() {
        let start = Instant::now();
        Pacer::new(Duration::from_secs(1)).wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn spaces_consecutive_requests() {
        let mut pacer = Pacer::new(Duration::from_millis(500));
        let start = Instant::now();

        for _ in 0..3 {
            pacer.wait().await;
        }

        assert_eq!(start.elapsed(), Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn time_spent_elsewhere_counts_toward_spacing() {
        let mut pacer = Pacer::new(Duration::from_secs(1));
        pacer.wait().await;

        tokio::time::sleep(Duration::from_millis(700)).await;
        let before = Instant::now();
        pacer.wait().await;

        assert_eq!(before.elapsed(), Duration::from_millis(300));
    }
}
