pub mod device;
#[cfg(feature = "audio-io")]
pub mod input;
#[cfg(feature = "audio-io")]
pub mod output;
pub mod wav;

pub use device::{DeviceInfo, DeviceSelector};
#[cfg(feature = "audio-io")]
pub use input::Microphone;
#[cfg(feature = "audio-io")]
pub use output::Speaker;
pub use wav::{decode_pcm16_le, encode_wav, write_wav};

/// Mono audio held in memory
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AudioClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioClip {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn duration_seconds(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Linear-interpolation resample, good enough for speech playback
    pub fn resampled(&self, target_rate: u32) -> AudioClip {
        if target_rate == self.sample_rate {
            return self.clone();
        }
        if self.samples.is_empty() || self.sample_rate == 0 {
            return AudioClip::new(Vec::new(), target_rate);
        }
        let ratio = self.sample_rate as f64 / target_rate as f64;
        let out_len = ((self.samples.len() as f64) / ratio).floor() as usize;
        let last = self.samples.len() - 1;
        let samples = (0..out_len)
            .map(|i| {
                let pos = i as f64 * ratio;
                let idx = pos.floor() as usize;
                let frac = (pos - idx as f64) as f32;
                let a = self.samples[idx.min(last)];
                let b = self.samples[(idx + 1).min(last)];
                a + (b - a) * frac
            })
            .collect();
        AudioClip::new(samples, target_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration() {
        let clip = AudioClip::new(vec![0.0; 8000], 16000);
        assert_eq!(clip.duration_seconds(), 0.5);
        assert_eq!(AudioClip::default().duration_seconds(), 0.0);
    }

    #[test]
    fn test_resample_doubles_length() {
        let clip = AudioClip::new(vec![0.0, 1.0, 0.0, -1.0], 22050);
        let up = clip.resampled(44100);
        assert_eq!(up.sample_rate, 44100);
        assert_eq!(up.samples.len(), 8);
        assert!((up.samples[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_resample_same_rate_is_identity() {
        let clip = AudioClip::new(vec![0.25; 10], 16000);
        assert_eq!(clip.resampled(16000), clip);
    }
}
