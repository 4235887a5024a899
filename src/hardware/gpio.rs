//! Raspberry Pi backend
//!
//! The arm servo takes a 50 Hz software PWM signal on a BCM pin. The pixel
//! strip's data line is wired to SPI0 MOSI (BCM 10) and fed WS2812 frames.

use super::motion::{self, Step};
use super::ws2812::{self, SPI_CLOCK_HZ};
use super::{Color, Hardware, PixelOrder};
use crate::integration::config::HardwareConfig;
use crate::{Result, TjBotError};
use rppal::gpio::{Gpio, OutputPin};
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use std::thread;
use tracing::{debug, info, warn};

const SERVO_FREQUENCY_HZ: f64 = 50.0;

pub struct GpioHardware {
    servo: Option<OutputPin>,
    strip: Option<Spi>,
    led_count: usize,
    pixel_order: PixelOrder,
}

impl GpioHardware {
    pub fn new(config: &HardwareConfig) -> Result<Self> {
        let gpio = Gpio::new()
            .map_err(|e| TjBotError::Hardware(format!("GPIO unavailable: {}", e)))?;

        let servo = gpio
            .get(config.servo_pin)
            .map_err(|e| {
                TjBotError::Hardware(format!("Servo pin {} busy: {}", config.servo_pin, e))
            })?
            .into_output_low();

        let strip = Spi::new(Bus::Spi0, SlaveSelect::Ss0, SPI_CLOCK_HZ, Mode::Mode0)
            .map_err(|e| TjBotError::Hardware(format!("SPI0 unavailable for LED strip: {}", e)))?;

        info!(
            "GPIO hardware ready: servo on BCM {}, {} pixel(s) on SPI0",
            config.servo_pin, config.led_count
        );

        Ok(Self {
            servo: Some(servo),
            strip: Some(strip),
            led_count: config.led_count,
            pixel_order: config.pixel_order,
        })
    }

    fn move_arm(&mut self, duty_percent: f64) -> Result<()> {
        let servo = self
            .servo
            .as_mut()
            .ok_or_else(|| TjBotError::Hardware("servo released".into()))?;
        servo
            .set_pwm_frequency(SERVO_FREQUENCY_HZ, duty_percent / 100.0)
            .map_err(|e| TjBotError::Hardware(format!("Servo PWM failed: {}", e)))
    }

    /// Drop the PWM signal so the servo does not jitter while idle
    fn stop_servo_signal(&mut self) -> Result<()> {
        if let Some(servo) = self.servo.as_mut() {
            servo
                .clear_pwm()
                .map_err(|e| TjBotError::Hardware(format!("Servo PWM stop failed: {}", e)))?;
        }
        Ok(())
    }

    fn fill(&mut self, color: Color) -> Result<()> {
        let frame = ws2812::encode_fill(color, self.led_count, self.pixel_order);
        let strip = self
            .strip
            .as_mut()
            .ok_or_else(|| TjBotError::Hardware("LED strip released".into()))?;
        strip
            .write(&frame)
            .map_err(|e| TjBotError::Hardware(format!("LED write failed: {}", e)))?;
        Ok(())
    }

    fn run(&mut self, steps: Vec<Step>) -> Result<()> {
        let result = steps.into_iter().try_for_each(|step| match step {
            Step::Move(position, hold) => {
                debug!("arm -> {:?}", position);
                self.move_arm(position.duty_percent())?;
                thread::sleep(hold);
                Ok(())
            }
            Step::Light(color) => self.fill(color),
        });
        // always drop the signal, even after a failed beat
        let stopped = self.stop_servo_signal();
        result.and(stopped)
    }
}

impl Hardware for GpioHardware {
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
        self.fill(resolved)
    }

    fn dance(&mut self) -> Result<()> {
        info!("Dancing...");
        self.run(motion::dance())
    }

    fn release(&mut self) -> Result<()> {
        info!("Cleaning up GPIO...");
        if let Err(e) = self.stop_servo_signal() {
            warn!("{}", e);
        }
        // Dropping the handles resets the pin modes and closes the SPI device
        if let Some(mut servo) = self.servo.take() {
            servo.set_low();
        }
        self.strip.take();
        Ok(())
    }
}

impl Drop for GpioHardware {
    fn drop(&mut self) {
        if self.servo.is_some() || self.strip.is_some() {
            let _ = self.release();
        }
    }
}
