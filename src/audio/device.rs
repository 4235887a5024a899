//! Audio device resolution
//!
//! One policy for both directions, evaluated once when an adapter is built:
//! explicit device index, then a case-insensitive name substring, then the
//! host default.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// How the user asked for a device
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSelector {
    /// Position in the host's device list
    pub index: Option<usize>,

    /// Substring of the device name, e.g. "USB PnP Sound Device"
    pub name: Option<String>,
}

impl DeviceSelector {
    /// Parse a single hint: a number selects by index, anything else by name
    pub fn from_hint(hint: &str) -> Self {
        let hint = hint.trim();
        match hint.parse::<usize>() {
            Ok(index) => Self {
                index: Some(index),
                name: None,
            },
            Err(_) if hint.is_empty() => Self::default(),
            Err(_) => Self {
                index: None,
                name: Some(hint.to_string()),
            },
        }
    }

    pub fn is_default(&self) -> bool {
        self.index.is_none() && self.name.is_none()
    }

    /// Pick one of `candidates`, or `None` for the host default
    pub fn resolve(&self, candidates: &[DeviceInfo]) -> Option<usize> {
        if let Some(index) = self.index {
            if candidates.iter().any(|d| d.index == index) {
                return Some(index);
            }
            warn!("Audio device index {} not present", index);
        }

        if let Some(name) = &self.name {
            let needle = name.to_lowercase();
            if let Some(found) = candidates
                .iter()
                .find(|d| d.name.to_lowercase().contains(&needle))
            {
                info!("Matched audio device '{}' (index {})", found.name, found.index);
                return Some(found.index);
            }
            warn!("No audio device matching '{}', using default", name);
        }

        None
    }
}

/// One entry of the host's device list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub index: usize,
    pub name: String,
}

#[cfg(feature = "audio-io")]
mod host {
    use super::{DeviceInfo, DeviceSelector};
    use crate::{Result, TjBotError};
    use cpal::traits::{DeviceTrait, HostTrait};
    use cpal::Device;

    #[derive(Clone, Copy, Debug)]
    pub enum Direction {
        Input,
        Output,
    }

    /// Resolve a selector against the default host's devices
    pub fn open_device(selector: &DeviceSelector, direction: Direction) -> Result<Device> {
        let host = cpal::default_host();

        if !selector.is_default() {
            let listed = match direction {
                Direction::Input => host.input_devices().map(|d| d.collect::<Vec<_>>()),
                Direction::Output => host.output_devices().map(|d| d.collect::<Vec<_>>()),
            };
            let devices: Vec<Device> = listed
                .map_err(|e| TjBotError::AudioDevice(format!("Cannot list devices: {}", e)))?;

            let infos: Vec<DeviceInfo> = devices
                .iter()
                .enumerate()
                .map(|(index, d)| DeviceInfo {
                    index,
                    name: d.name().unwrap_or_default(),
                })
                .collect();

            if let Some(index) = selector.resolve(&infos) {
                if let Some(device) = devices.into_iter().nth(index) {
                    return Ok(device);
                }
            }
        }

        match direction {
            Direction::Input => host.default_input_device(),
            Direction::Output => host.default_output_device(),
        }
        .ok_or_else(|| {
            TjBotError::AudioDevice(format!("No {:?} device available", direction).to_lowercase())
        })
    }
}

#[cfg(feature = "audio-io")]
pub use host::{open_device, Direction};
