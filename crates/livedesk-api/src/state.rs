//! Application state wiring the core services to their concrete
//! infrastructure implementations.

use std::sync::Arc;

use livedesk_core::clock::SystemClock;
use livedesk_core::counter::CounterEngine;
use livedesk_core::relay::RelayService;
use livedesk_infra::automation::WebhookNotifier;
use livedesk_infra::counter_file::FileCounterRepository;
use livedesk_infra::telegram::TelegramChannel;

/// Concrete type aliases pinning the core generics to the infra
/// implementations.
pub type ConcreteRelay = RelayService<TelegramChannel, WebhookNotifier>;
pub type ConcreteCounter = CounterEngine<FileCounterRepository, SystemClock>;

/// Shared state handed to every HTTP handler.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<ConcreteRelay>,
    pub counter: Arc<ConcreteCounter>,
    /// Automation channel secret; `None` runs the callback endpoint
    /// unauthenticated (explicit configuration mode).
    pub webhook_secret: Option<String>,
}
