use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::handler::{InterruptHandler, Tasks, listen};
use super::remote::RemoteParams;
use super::state::InterruptState;
use super::{remote, signals, watchdog};
use crate::config::InterruptConfig;
use crate::coordinator::{Coordinator, TcpCoordinator};
use crate::events::Bus;
use crate::stack::{self, StackInspector};
use crate::subscribers::{Subscribe, SubscriberSet};

/// Builder for an [`InterruptHandler`] with optional collaborators.
pub struct InterruptHandlerBuilder {
    cfg: InterruptConfig,
    coordinator: Option<Arc<dyn Coordinator>>,
    inspector: Option<Arc<dyn StackInspector>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl InterruptHandlerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: InterruptConfig) -> Self {
        Self {
            cfg,
            coordinator: None,
            inspector: None,
            subscribers: Vec::new(),
        }
    }

    /// Uses `coordinator` for remote aborts instead of a [`TcpCoordinator`] built
    /// from [`InterruptConfig::coordinator_address`].
    ///
    /// Starts the remote abort watcher even when no address is configured.
    pub fn with_coordinator(mut self, coordinator: Arc<dyn Coordinator>) -> Self {
        self.coordinator = Some(coordinator);
        self
    }

    /// Replaces the default inspector ([`BacktraceInspector`](crate::BacktraceInspector)).
    pub fn with_inspector(mut self, inspector: Arc<dyn StackInspector>) -> Self {
        self.inspector = Some(inspector);
        self
    }

    /// Sets event subscribers for observability.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the handler and starts every configured watcher.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn build(self) -> InterruptHandler {
        let cfg = self.cfg;
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let state = Arc::new(InterruptState::new());

        let listener_token = CancellationToken::new();
        let listener = if self.subscribers.is_empty() {
            None
        } else {
            // Subscribe before any watcher can publish.
            let rx = bus.subscribe();
            let subs = SubscriberSet::new(self.subscribers, bus.clone());
            Some(tokio::spawn(listen(rx, subs, listener_token.clone())))
        };

        let watchers_token = CancellationToken::new();
        let mut watchers = JoinSet::new();

        if let (Some(timeout), Some(every)) = (cfg.watchdog_timeout(), cfg.renotify_interval()) {
            watchers.spawn(watchdog::run(
                state.clone(),
                bus.clone(),
                timeout,
                every,
                watchers_token.child_token(),
            ));
        }

        let coordinator = self.coordinator.or_else(|| {
            cfg.coordinator_address()
                .map(|addr| Arc::new(TcpCoordinator::new(addr)) as Arc<dyn Coordinator>)
        });
        if let Some(coordinator) = coordinator {
            let params = RemoteParams {
                group: cfg.group.clone(),
                poll_interval: cfg.poll_interval,
                request_timeout: cfg.request_timeout,
                backoff: cfg.backoff,
            };
            watchers.spawn(remote::run(
                state.clone(),
                bus.clone(),
                coordinator,
                params,
                watchers_token.child_token(),
            ));
        }

        if cfg.os_signals {
            watchers.spawn(signals::run(
                state.clone(),
                bus.clone(),
                watchers_token.child_token(),
            ));
        }

        let inspector = self.inspector.unwrap_or_else(stack::default_inspector);

        InterruptHandler::from_parts(
            cfg,
            state,
            bus,
            inspector,
            Tasks {
                watchers_token,
                watchers,
                listener_token,
                listener,
            },
        )
    }
}
