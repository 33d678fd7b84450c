//! Position sources.

use async_trait::async_trait;

use super::{Coordinates, PositionSource};
use crate::config::LocationConfig;

/// A position known ahead of time (config or command line).
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(Coordinates);

impl FixedPosition {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self(Coordinates {
            latitude,
            longitude,
        })
    }

    /// Build from config when both coordinates are set.
    pub fn from_config(config: &LocationConfig) -> Option<Self> {
        Some(Self::new(config.latitude?, config.longitude?))
    }
}

#[async_trait]
impl PositionSource for FixedPosition {
    async fn current_position(&self) -> Option<Coordinates> {
        Some(self.0)
    }
}

/// Geolocation unsupported.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPosition;

#[async_trait]
impl PositionSource for NoPosition {
    async fn current_position(&self) -> Option<Coordinates> {
        None
    }
}
