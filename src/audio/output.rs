use super::device::{open_device, DeviceSelector, Direction};
use super::AudioClip;
use crate::{Result, TjBotError};
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{Device, StreamConfig};
use crossbeam_channel::bounded;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Blocking playback on one output device
pub struct Speaker {
    device: Device,
    config: StreamConfig,
}

impl Speaker {
    /// Open the speaker chosen by `selector`
    pub fn new(selector: &DeviceSelector) -> Result<Self> {
        let device = open_device(selector, Direction::Output)?;

        info!(
            "Using output device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let config = device
            .default_output_config()
            .map_err(|e| TjBotError::AudioDevice(format!("Failed to get output config: {}", e)))?
            .into();

        Ok(Self { device, config })
    }

    /// Get the sample rate of the output device
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    /// Play a clip and return once the device has drained it
    pub fn play(&self, clip: &AudioClip) -> Result<()> {
        if clip.is_empty() {
            return Ok(());
        }

        let clip = clip.resampled(self.sample_rate());
        let duration = Duration::from_secs_f32(clip.duration_seconds());
        let channels = self.config.channels as usize;
        let buffer = Arc::new(Mutex::new(VecDeque::from(clip.samples)));
        let (done_tx, done_rx) = bounded::<()>(1);

        let err_fn = |err| {
            error!("Audio output stream error: {}", err);
        };

        let source = Arc::clone(&buffer);
        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut buf = source.lock();
                    for frame in data.chunks_mut(channels) {
                        let sample = buf.pop_front().unwrap_or(0.0);
                        frame.fill(sample);
                    }
                    if buf.is_empty() {
                        let _ = done_tx.try_send(());
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| TjBotError::AudioDevice(format!("Failed to build output stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| TjBotError::AudioDevice(format!("Failed to start output stream: {}", e)))?;

        if done_rx.recv_timeout(duration + Duration::from_secs(2)).is_err() {
            warn!("Playback did not drain in time, {} samples left", buffer.lock().len());
        }
        // let the last callback's frames reach the DAC
        std::thread::sleep(Duration::from_millis(100));
        drop(stream);

        info!("Played {:.2}s of audio", duration.as_secs_f32());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speaker_creation() {
        // This test might fail in CI environments without audio devices
        if let Ok(speaker) = Speaker::new(&DeviceSelector::default()) {
            assert!(speaker.sample_rate() > 0);
        }
    }

    #[test]
    fn test_empty_clip_returns_immediately() {
        if let Ok(speaker) = Speaker::new(&DeviceSelector::default()) {
            assert!(speaker.play(&AudioClip::default()).is_ok());
        }
    }
}
