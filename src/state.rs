use tokio::sync::broadcast;

use crate::ledger::RideLedger;
use crate::models::event::RideEvent;
use crate::observability::metrics::Metrics;

pub struct AppState {
    pub ledger: RideLedger,
    pub ride_events_tx: broadcast::Sender<RideEvent>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(event_buffer_size: usize) -> Self {
        let (ride_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        Self {
            ledger: RideLedger::new(),
            ride_events_tx,
            metrics: Metrics::new(),
        }
    }

    pub fn emit(&self, event: RideEvent) {
        // Nobody listening is fine; the send result only reports that.
        let _ = self.ride_events_tx.send(event);
    }
}
