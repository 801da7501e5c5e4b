//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use thiserror::Error;

/// One reported device location sample
#[derive(Deserialize, Serialize, Clone, PartialEq, Debug)]
pub struct PositionFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Accuracy radius in meters
    #[serde(default)]
    pub accuracy: f64,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub timestamp: Option<u64>,
}

pub type SubscriptionId = u32;

#[derive(Error, Clone, PartialEq, Debug)]
pub enum LocationError {
    #[error("Geolocation not supported.")]
    Unsupported,
    #[error("User denied geolocation")]
    PermissionDenied,
    #[error("Position unavailable")]
    PositionUnavailable,
    #[error("Timeout expired")]
    Timeout,
    #[error("{0}")]
    Other(String),
}

impl LocationError {
    /// Map a Geolocation API error code
    pub fn from_code(code: u16, message: Option<String>) -> LocationError {
        match code {
            1 => LocationError::PermissionDenied,
            2 => LocationError::PositionUnavailable,
            3 => LocationError::Timeout,
            _ => LocationError::Other(
                message
                    .filter(|msg| !msg.is_empty())
                    .unwrap_or_else(|| "GPS error".to_string()),
            ),
        }
    }
}

/// Platform location service delivering a continuous stream of fixes
pub trait LocationService {
    /// Request continuous updates
    fn subscribe(&mut self) -> Result<SubscriptionId, LocationError>;
    fn cancel(&mut self, id: SubscriptionId);
}

/// Location service whose fixes are pushed in by the caller (web client, recorded track)
#[derive(Default)]
pub struct PushedLocation {
    last_id: SubscriptionId,
    active: Option<SubscriptionId>,
}

impl PushedLocation {
    pub fn new() -> PushedLocation {
        PushedLocation::default()
    }
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

impl LocationService for PushedLocation {
    fn subscribe(&mut self) -> Result<SubscriptionId, LocationError> {
        self.last_id += 1;
        self.active = Some(self.last_id);
        Ok(self.last_id)
    }
    fn cancel(&mut self, id: SubscriptionId) {
        if self.active == Some(id) {
            self.active = None;
        }
    }
}
