//! Tick sources for the synchronizer loop.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};

#[async_trait]
pub trait Ticker: Send {
    /// Waits for the next tick. `false` means the source is gone and the loop should end.
    async fn tick(&mut self) -> bool;
}

/// Ticks on a fixed period. A late tick delays the schedule instead of bursting to catch up.
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

/// Ticks whenever its [`ManualTrigger`] fires.
pub struct ManualTicker {
    receiver: mpsc::UnboundedReceiver<()>,
}

#[derive(Clone)]
pub struct ManualTrigger {
    sender: mpsc::UnboundedSender<()>,
}

impl ManualTrigger {
    /// Queues one tick. Returns `false` once the ticker is gone.
    pub fn fire(&self) -> bool {
        self.sender.send(()).is_ok()
    }
}

pub fn manual() -> (ManualTrigger, ManualTicker) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (ManualTrigger { sender }, ManualTicker { receiver })
}

#[async_trait]
impl Ticker for ManualTicker {
    async fn tick(&mut self) -> bool {
        self.receiver.recv().await.is_some()
    }
}
