// libs/scheduling-cell/src/state.rs
use std::sync::Arc;

use tokio::sync::broadcast;

use meeting_cell::MeetingProvisioner;
use shared_config::AppConfig;

use crate::models::SchedulingEvent;
use crate::store::SchedulingStore;

/// Shared state for the scheduling routes: configuration, the store, the
/// meeting provisioner, and the post-commit event channel.
#[derive(Clone)]
pub struct SchedulingState {
    pub config: Arc<AppConfig>,
    pub store: Arc<SchedulingStore>,
    pub provisioner: Arc<dyn MeetingProvisioner>,
    pub events: broadcast::Sender<SchedulingEvent>,
}

impl SchedulingState {
    pub fn new(config: Arc<AppConfig>, provisioner: Arc<dyn MeetingProvisioner>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            config,
            store: Arc::new(SchedulingStore::new()),
            provisioner,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SchedulingEvent> {
        self.events.subscribe()
    }
}
