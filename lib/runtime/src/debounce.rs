//! Coalescing of host flow events.

use std::time::Duration;
use tokio::sync::mpsc;

/// A debounced trigger: the reason string of the first event that opened
/// the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowsTrigger {
    pub reason: String,
}

/// Runs the coalescing loop: the first event opens a window, every event
/// arriving inside it is absorbed, and exactly one trigger fires when the
/// window closes. An event after the window opens the next one.
pub async fn debounce_loop(
    mut events: mpsc::Receiver<String>,
    triggers: mpsc::Sender<FlowsTrigger>,
    window: Duration,
) {
    while let Some(reason) = events.recv().await {
        tokio::time::sleep(window).await;
        // Absorb everything that queued up during the window; the first
        // reason is the trigger that caused the cycle.
        while events.try_recv().is_ok() {}
        if triggers.send(FlowsTrigger { reason }).await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{advance, pause, Instant};

    #[tokio::test]
    async fn events_inside_the_window_coalesce() {
        pause();
        let (event_tx, event_rx) = mpsc::channel(32);
        let (trigger_tx, mut trigger_rx) = mpsc::channel(32);
        tokio::spawn(debounce_loop(
            event_rx,
            trigger_tx,
            Duration::from_millis(250),
        ));

        // Five events, 50 ms apart, all within one window.
        for n in 0..5 {
            event_tx.send(format!("flows:updated-{n}")).await.unwrap();
            advance(Duration::from_millis(50)).await;
        }
        let trigger = trigger_rx.recv().await.unwrap();
        assert_eq!(trigger.reason, "flows:updated-0");

        // Nothing else fires for this batch.
        advance(Duration::from_millis(500)).await;
        assert!(trigger_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn an_event_after_the_window_starts_a_second_cycle() {
        pause();
        let (event_tx, event_rx) = mpsc::channel(32);
        let (trigger_tx, mut trigger_rx) = mpsc::channel(32);
        tokio::spawn(debounce_loop(
            event_rx,
            trigger_tx,
            Duration::from_millis(250),
        ));

        event_tx.send("first".to_owned()).await.unwrap();
        let started = Instant::now();
        advance(Duration::from_millis(300)).await;
        assert_eq!(trigger_rx.recv().await.unwrap().reason, "first");
        assert!(started.elapsed() >= Duration::from_millis(250));

        event_tx.send("second".to_owned()).await.unwrap();
        advance(Duration::from_millis(300)).await;
        assert_eq!(trigger_rx.recv().await.unwrap().reason, "second");
    }
}
