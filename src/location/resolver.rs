//! Location resolver
//!
//! Produces one authoritative coordinate for the session. Every failure path
//! resolves to the fallback coordinate plus a descriptive error; nothing here
//! returns an `Err` to the caller.
//!
//! Permission moves `unknown -> prompt -> {granted | denied}`. A transient
//! failure while granted keeps `granted`; only a permission-denied failure
//! sets `denied`, and `denied` is never retried automatically.

use crate::coord::Coordinate;
use crate::error::Error;
use crate::location::{
    LocationErrorKind, LocationPlatform, LocationState, Permission, PositionFix, PositionOptions,
};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Running position watch
struct WatchHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Resolves and tracks the user's location against a platform capability
pub struct LocationResolver<P: LocationPlatform> {
    platform: Arc<P>,
    state: Arc<watch::Sender<LocationState>>,
    fallback: Coordinate,
    options: PositionOptions,
    watch: Mutex<Option<WatchHandle>>,
}

impl<P: LocationPlatform> LocationResolver<P> {
    /// Create a resolver
    ///
    /// # Arguments
    /// * `platform` - The platform location capability
    /// * `fallback` - Coordinate substituted whenever acquisition fails
    /// * `options` - Options used by `initialize` for the full-accuracy fix
    pub fn new(platform: P, fallback: Coordinate, options: PositionOptions) -> Self {
        let (state, _) = watch::channel(LocationState::initial());
        Self {
            platform: Arc::new(platform),
            state: Arc::new(state),
            fallback,
            options,
            watch: Mutex::new(None),
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> LocationState {
        self.state.borrow().clone()
    }

    /// Current coordinate, live or fallback
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.state.borrow().coordinate
    }

    /// The fallback coordinate
    pub fn fallback(&self) -> Coordinate {
        self.fallback
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<LocationState> {
        self.state.subscribe()
    }

    /// The underlying platform
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Check permission without prompting, then acquire a fix
    ///
    /// If the platform reports `prompt`, a cheap low-accuracy request is made
    /// first purely to surface the permission dialog; a full-accuracy fix
    /// follows only if that succeeds or fails for a reason other than denial.
    pub async fn initialize(&self) -> LocationState {
        if !self.platform.is_supported() {
            return self.acquire_once(self.options).await;
        }

        if let Some(Permission::Prompt) = self.platform.query_permission().await {
            self.set_permission(Permission::Prompt);
            let granted = self.request_permission_explicitly().await;
            let denied = self.state.borrow().permission == Permission::Denied;
            if !granted && denied {
                return self.fail(Error::PermissionDenied);
            }
        }

        self.acquire_once(self.options).await
    }

    /// Request the current position once
    ///
    /// On failure the fallback coordinate is substituted so downstream ranking
    /// never sees an absent coordinate.
    pub async fn acquire_once(&self, options: PositionOptions) -> LocationState {
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
            s.error_kind = None;
        });

        if !self.platform.is_supported() {
            return self.fail(Error::LocationUnavailable(
                "Geolocation not supported".to_string(),
            ));
        }

        match self.platform.query_permission().await {
            Some(Permission::Denied) => return self.fail(Error::PermissionDenied),
            Some(permission) => self.set_permission(permission),
            None => {}
        }

        let result =
            match tokio::time::timeout(options.timeout, self.platform.current_position(options))
                .await
            {
                Ok(result) => result.map_err(Error::into_location_error),
                Err(_) => Err(Error::LocationTimeout),
            };

        match result {
            Ok(fix) => {
                debug!(
                    "Acquired position {} (accuracy {:?} m)",
                    fix.coordinate, fix.accuracy_meters
                );
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.error = None;
                    s.error_kind = None;
                    s.permission = Permission::Granted;
                    apply_fix(s, &fix);
                });
                self.state()
            }
            Err(e) => self.fail(e),
        }
    }

    /// Begin continuous position updates
    ///
    /// Each update overwrites coordinate and accuracy only. Update failures
    /// are logged and never surfaced. Returns whether a watch is running.
    pub fn watch(&self, options: PositionOptions) -> bool {
        let mut guard = self.watch.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(handle) = guard.as_ref() {
            if !handle.task.is_finished() {
                return true;
            }
        }

        if !self.platform.is_supported() {
            warn!("Cannot watch position: geolocation not supported");
            return false;
        }

        let mut updates = match self.platform.watch_position(options) {
            Ok(updates) => updates,
            Err(e) => {
                warn!("Failed to start position watch: {}", e);
                return false;
            }
        };

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let state = Arc::clone(&self.state);

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;

                    _ = token.cancelled() => break,

                    update = updates.recv() => match update {
                        Some(Ok(fix)) => {
                            state.send_modify(|s| apply_fix(s, &fix));
                        }
                        Some(Err(e)) => {
                            debug!("Ignoring watch position error: {}", e);
                        }
                        None => {
                            debug!("Position watch ended by platform");
                            break;
                        }
                    }
                }
            }
        });

        info!("Started position watch");
        *guard = Some(WatchHandle { cancel, task });
        true
    }

    /// Stop watching; safe to call when not watching
    pub fn cancel_watch(&self) {
        let handle = self
            .watch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle {
            handle.cancel.cancel();
            debug!("Cancelled position watch");
        }
    }

    /// Whether a watch is currently running
    pub fn is_watching(&self) -> bool {
        self.watch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.task.is_finished())
    }

    /// Ask for permission by making a cheap position request
    ///
    /// Updates the permission state but never the coordinate. Lets a caller
    /// retry after a denial.
    pub async fn request_permission_explicitly(&self) -> bool {
        if !self.platform.is_supported() {
            warn!("Cannot request location permission: geolocation not supported");
            return false;
        }

        let options = PositionOptions::prompt();
        let result =
            match tokio::time::timeout(options.timeout, self.platform.current_position(options))
                .await
            {
                Ok(result) => result.map_err(Error::into_location_error),
                Err(_) => Err(Error::LocationTimeout),
            };

        match result {
            Ok(_) => {
                info!("Location permission granted");
                self.set_permission(Permission::Granted);
                true
            }
            Err(Error::PermissionDenied) => {
                warn!("Location permission denied");
                self.set_permission(Permission::Denied);
                false
            }
            Err(e) => {
                warn!("Location permission request failed: {}", e);
                false
            }
        }
    }

    fn set_permission(&self, permission: Permission) {
        self.state.send_if_modified(|s| {
            if s.permission == permission {
                return false;
            }
            s.permission = permission;
            true
        });
    }

    /// Substitute the fallback coordinate and record the classified error
    fn fail(&self, error: Error) -> LocationState {
        let error = error.into_location_error();
        warn!(
            "Location acquisition failed: {}; using fallback {}",
            error, self.fallback
        );

        let fallback = self.fallback;
        self.state.send_modify(|s| {
            s.coordinate = Some(fallback);
            s.accuracy_meters = None;
            s.fixed_at = None;
            s.loading = false;
            s.error_kind = Some(LocationErrorKind::of(&error));
            s.error = Some(error.to_string());
            if matches!(error, Error::PermissionDenied) {
                s.permission = Permission::Denied;
            }
        });
        self.state()
    }
}

impl<P: LocationPlatform> Drop for LocationResolver<P> {
    fn drop(&mut self) {
        self.cancel_watch();
    }
}

/// Apply a live fix unless it is older than the one already held
fn apply_fix(state: &mut LocationState, fix: &PositionFix) {
    if let Some(current) = state.fixed_at {
        if fix.timestamp < current {
            debug!("Discarding stale position fix from {}", fix.timestamp);
            return;
        }
    }
    state.coordinate = Some(fix.coordinate);
    state.accuracy_meters = fix.accuracy_meters;
    state.fixed_at = Some(fix.timestamp);
}
