//! Daemon Event Loop
//!
//! Drives the decision engine from a backend: pulls events, feeds them
//! through the engine, and applies every decision to the confinement
//! actuator. Also owns the runtime concerns around the engine: the
//! master enable switch, SIGHUP configuration reload, and graceful
//! shutdown.
//!
//! Actuation failures are logged and skipped (a missed clamp shows as a
//! momentary loss of resistance, nothing worse); a failing event source
//! ends the run.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};

use crate::backend::{Backend, BackendEvent};
use crate::config::Config;
use crate::engine::{Decision, EdgeEngine};

/// The daemon: decision engine plus runtime state
pub struct Daemon {
    engine: EdgeEngine,
    config_path: PathBuf,
    enabled: bool,
}

impl Daemon {
    /// Create a daemon from a loaded configuration.
    ///
    /// `config_path` is re-read on SIGHUP.
    pub fn new(config: &Config, config_path: PathBuf) -> Self {
        Self {
            engine: EdgeEngine::new(config.engine_config()),
            config_path,
            enabled: config.enabled(),
        }
    }

    /// Run until the backend is exhausted or an interrupt arrives
    pub async fn run<B: Backend>(mut self, backend: &mut B) -> Result<()> {
        let mut sighup =
            signal(SignalKind::hangup()).context("Failed to install SIGHUP handler")?;

        info!(enabled = self.enabled, "daemon running");
        loop {
            // next_event is cancel safe (a buffered line read in the
            // replay backend), so losing the race against a signal
            // drops no event.
            tokio::select! {
                event = backend.next_event() => {
                    match event? {
                        Some(event) => self.handle_event(backend, event).await,
                        None => {
                            info!("event source exhausted");
                            break;
                        }
                    }
                }
                _ = sighup.recv() => {
                    self.reload(backend).await;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        // Never leave the pointer pinned behind us.
        if let Err(e) = backend.release_pointer().await {
            warn!(error = %e, "release on shutdown failed");
        }
        info!("daemon stopped");
        Ok(())
    }

    /// Feed one backend event through the engine and actuate the decision
    async fn handle_event<B: Backend>(&mut self, backend: &mut B, event: BackendEvent) {
        match event {
            BackendEvent::Layout {
                timestamp,
                monitors,
                position,
            } => {
                info!(monitors = monitors.len(), "monitor layout changed");
                self.engine.on_monitor_set_changed(timestamp, monitors, position);

                // Confinement engaged against the old geometry no longer
                // means anything.
                if let Err(e) = backend.release_pointer().await {
                    warn!(error = %e, "release after layout change failed");
                }
            }
            BackendEvent::Motion {
                timestamp,
                x,
                y,
                dx,
                dy,
            } => {
                if !self.enabled {
                    return;
                }

                let decision = self.engine.on_pointer_moved(timestamp, x, y, dx, dy);
                let applied = match decision {
                    Decision::Held { x, y } => backend.hold_pointer(x, y).await,
                    Decision::Passed(_) | Decision::Free | Decision::NoMonitor => {
                        backend.release_pointer().await
                    }
                };
                if let Err(e) = applied {
                    warn!(error = %e, ?decision, "actuation failed");
                }
            }
        }
    }

    /// Re-read the configuration file and swap it in between events.
    ///
    /// A file that fails to load keeps the previous configuration; only
    /// the successful case touches the engine. Disabling releases any
    /// engaged confinement, otherwise the pointer would stay pinned with
    /// nothing left to free it.
    async fn reload<B: Backend>(&mut self, backend: &mut B) {
        info!(path = %self.config_path.display(), "reloading configuration");
        match Config::load(&self.config_path) {
            Ok(config) => {
                self.enabled = config.enabled();
                self.engine.set_config(config.engine_config());
                info!(enabled = self.enabled, "configuration reloaded");
            }
            Err(e) => {
                warn!(error = %e, "reload failed, keeping previous configuration");
            }
        }

        if !self.enabled {
            if let Err(e) = backend.release_pointer().await {
                warn!(error = %e, "release after disable failed");
            }
        }
    }
}
