//! Monotonic candidate generator

use primeset_core::Candidate;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Produces every integer of `[start, end)` in increasing order
#[derive(Debug, Clone, Copy)]
pub struct Generator {
    start: u64,
    end: u64,
}

impl Generator {
    /// Create a generator over `[start, end)`
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Feed the work channel, returning how many candidates were sent
    ///
    /// Blocks while the channel is full. The sender is dropped on return,
    /// which closes the channel and tells the workers to finish. Returns
    /// early if every receiver is gone.
    pub async fn run(self, work: mpsc::Sender<Candidate>) -> u64 {
        let mut sent = 0u64;

        for value in self.start..self.end {
            if work.send(Candidate::new(value)).await.is_err() {
                debug!(value, "Work channel closed, stopping generator");
                break;
            }
            sent += 1;
        }

        info!(sent, start = self.start, end = self.end, "Generator finished");
        sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_generates_range_in_order() {
        let (tx, mut rx) = mpsc::channel(4);
        let producer = tokio::spawn(Generator::new(3, 9).run(tx));

        let mut seen = Vec::new();
        while let Some(candidate) = rx.recv().await {
            seen.push(candidate.value);
        }

        assert_eq!(producer.await.unwrap(), 6);
        assert_eq!(seen, vec![3, 4, 5, 6, 7, 8]);
    }

    #[tokio::test]
    async fn test_empty_range_closes_channel() {
        let (tx, mut rx) = mpsc::channel(1);
        assert_eq!(Generator::new(5, 5).run(tx).await, 0);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_stops_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(2);
        drop(rx);
        assert_eq!(Generator::new(0, 1_000).run(tx).await, 0);
    }
}
