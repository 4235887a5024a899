//! Hardware abstraction layer for the arm servo and the pixel strip
//!
//! This module provides:
//! - The `Hardware` trait every actuator backend implements
//! - A canonical color table (`Color`)
//! - Arm positions and the wave/dance choreography shared by all backends
//! - `SimulatedHardware` for hosts without a robot attached
//! - `GpioHardware` driving a Raspberry Pi (feature `gpio`)

pub mod color;
#[cfg(all(feature = "gpio", target_os = "linux"))]
pub mod gpio;
pub mod motion;
pub mod simulated;
pub mod ws2812;

pub use color::{Color, PixelOrder};
#[cfg(all(feature = "gpio", target_os = "linux"))]
pub use gpio::GpioHardware;
pub use motion::{ArmPosition, Step, DANCE_COLORS};
pub use simulated::SimulatedHardware;

use crate::Result;

/// Physical actuator commands.
///
/// Every command blocks until the movement has finished and fails with
/// `TjBotError::Hardware` carrying a human-readable reason.
pub trait Hardware {
    /// Swing the arm back and forth, ending centred
    fn wave(&mut self) -> Result<()>;

    fn raise_arm(&mut self) -> Result<()>;

    fn lower_arm(&mut self) -> Result<()>;

    /// Fill the strip with a named color. Unknown names render as white,
    /// `off` turns the strip dark.
    fn set_color(&mut self, color: &str) -> Result<()>;

    /// Arm swings with a color cycle, ending centred with the strip off
    fn dance(&mut self) -> Result<()>;

    /// Give up exclusive access to the pins. No other command is valid afterwards.
    fn release(&mut self) -> Result<()>;
}

/// Which backend the factory should build
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HardwareBackend {
    #[default]
    Gpio,
    Simulated,
}

impl std::str::FromStr for HardwareBackend {
    type Err = crate::TjBotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gpio" => Ok(HardwareBackend::Gpio),
            "simulated" | "sim" => Ok(HardwareBackend::Simulated),
            other => Err(crate::TjBotError::Configuration(format!(
                "Unknown hardware backend '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for HardwareBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HardwareBackend::Gpio => write!(f, "gpio"),
            HardwareBackend::Simulated => write!(f, "simulated"),
        }
    }
}
