use super::motion::{self, Step};
use super::{ArmPosition, Color, Hardware};
use crate::{Result, TjBotError};
use tracing::{debug, info};

/// Backend for hosts without a robot attached.
///
/// Runs the same choreography as the GPIO backend but only logs each beat.
pub struct SimulatedHardware {
    arm: ArmPosition,
    color: Color,
    released: bool,
    realtime: bool,
}

impl SimulatedHardware {
    pub fn new() -> Self {
        info!("Using simulated hardware");
        Self {
            arm: ArmPosition::Down,
            color: Color::Off,
            released: false,
            realtime: false,
        }
    }

    /// Sleep for each beat so the simulated robot takes as long as the real one
    pub fn with_realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    pub fn arm(&self) -> ArmPosition {
        self.arm
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    fn ensure_attached(&self) -> Result<()> {
        if self.released {
            return Err(TjBotError::Hardware("hardware already released".into()));
        }
        Ok(())
    }

    fn run(&mut self, steps: Vec<Step>) -> Result<()> {
        self.ensure_attached()?;
        for step in steps {
            match step {
                Step::Move(position, hold) => {
                    debug!("arm -> {:?} ({:.1}% duty)", position, position.duty_percent());
                    self.arm = position;
                    if self.realtime {
                        std::thread::sleep(hold);
                    }
                }
                Step::Light(color) => {
                    debug!("strip -> {}", color);
                    self.color = color;
                }
            }
        }
        Ok(())
    }
}

impl Default for SimulatedHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl Hardware for SimulatedHardware {
    fn wave(&mut self) -> Result<()> {
        info!("Waving...");
        self.run(motion::wave())
    }

    fn raise_arm(&mut self) -> Result<()> {
        info!("Raising arm...");
        self.run(motion::raise())
    }

    fn lower_arm(&mut self) -> Result<()> {
        info!("Lowering arm...");
        self.run(motion::lower())
    }

    fn set_color(&mut self, color: &str) -> Result<()> {
        let resolved = Color::from_name(color);
        info!("Shining {} light...", resolved);
        self.run(vec![Step::Light(resolved)])
    }

    fn dance(&mut self) -> Result<()> {
        info!("Dancing...");
        self.run(motion::dance())
    }

    fn release(&mut self) -> Result<()> {
        if !self.released {
            info!("Releasing simulated hardware");
            self.released = true;
        }
        Ok(())
    }
}
