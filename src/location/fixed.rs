//! Static location platform
//!
//! Reports a caller-supplied coordinate, e.g. from `--lat/--lng`.

use crate::coord::Coordinate;
use crate::error::Result;
use crate::location::{LocationPlatform, Permission, PositionFix, PositionOptions, PositionUpdates};
use tokio::sync::mpsc;

/// Platform that always reports the same coordinate
#[derive(Debug, Clone, Copy)]
pub struct StaticLocationPlatform {
    coordinate: Coordinate,
}

impl StaticLocationPlatform {
    pub fn new(coordinate: Coordinate) -> Self {
        Self { coordinate }
    }
}

impl LocationPlatform for StaticLocationPlatform {
    async fn query_permission(&self) -> Option<Permission> {
        Some(Permission::Granted)
    }

    async fn current_position(&self, _options: PositionOptions) -> Result<PositionFix> {
        Ok(PositionFix::now(self.coordinate, Some(0.0)))
    }

    fn watch_position(&self, _options: PositionOptions) -> Result<PositionUpdates> {
        // One update, then the stream ends
        let (tx, rx) = mpsc::channel(1);
        let _ = tx.try_send(Ok(PositionFix::now(self.coordinate, Some(0.0))));
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::LocationResolver;

    #[tokio::test]
    async fn test_static_platform_resolves_exactly() {
        let here = Coordinate::new(4.09, 9.714);
        let resolver = LocationResolver::new(
            StaticLocationPlatform::new(here),
            Coordinate::new(3.848, 11.502),
            PositionOptions::default(),
        );

        let state = resolver.initialize().await;

        assert_eq!(state.coordinate, Some(here));
        assert_eq!(state.permission, crate::location::Permission::Granted);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_watch_yields_single_fix() {
        let platform = StaticLocationPlatform::new(Coordinate::new(4.09, 9.714));
        let mut updates = platform.watch_position(PositionOptions::default()).unwrap();

        assert!(updates.recv().await.unwrap().is_ok());
        assert!(updates.recv().await.is_none());
    }
}
