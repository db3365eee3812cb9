use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

use crate::error::WheelError;

pub const DEFAULT_CONFIG_FILE: &str = "wheel_config.json";

/// Wheel layout and timing. Read once per spin; only `predestined_number`
/// is expected to change during a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    pub total_slots: u32,
    /// Outcome forced on every third spin.
    pub predestined_number: u32,
    pub spin_duration_ms: u64,
    pub min_full_rotations: u32,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            total_slots: 70,
            predestined_number: 7,
            spin_duration_ms: 5000,
            min_full_rotations: 5,
        }
    }
}

impl WheelConfig {
    pub fn validate(&self) -> Result<(), WheelError> {
        if self.total_slots < 2 {
            return Err(WheelError::InvalidConfig(format!(
                "total_slots must be at least 2, got {}",
                self.total_slots
            )));
        }
        if !(1..=self.total_slots).contains(&self.predestined_number) {
            return Err(WheelError::InvalidConfig(format!(
                "predestined_number must be in 1..={}, got {}",
                self.total_slots, self.predestined_number
            )));
        }
        if self.spin_duration_ms == 0 {
            return Err(WheelError::InvalidConfig(
                "spin_duration_ms must be positive".to_string(),
            ));
        }
        if self.min_full_rotations == 0 {
            return Err(WheelError::InvalidConfig(
                "min_full_rotations must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns a copy with a new predestined number, rejecting out-of-range values.
    pub fn with_predestined(&self, number: u32) -> Result<Self, WheelError> {
        let next = Self {
            predestined_number: number,
            ..self.clone()
        };
        next.validate()?;
        Ok(next)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = if path.exists() {
            let content = fs::read_to_string(path).await?;
            serde_json::from_str(&content)?
        } else {
            info!("{} not found, using default wheel config", path.display());
            WheelConfig::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), content).await?;
        Ok(())
    }
}
