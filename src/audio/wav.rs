use super::AudioClip;
use crate::{Result, TjBotError};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

fn spec_for(clip: &AudioClip) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate: clip.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Encode a mono clip as a 16-bit WAV file in memory
pub fn encode_wav(clip: &AudioClip) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec_for(clip))
            .map_err(|e| TjBotError::Io(format!("Failed to create WAV writer: {}", e)))?;
        for &sample in &clip.samples {
            writer
                .write_sample(to_i16(sample))
                .map_err(|e| TjBotError::Io(format!("Failed to write sample: {}", e)))?;
        }
        writer
            .finalize()
            .map_err(|e| TjBotError::Io(format!("Failed to finalize WAV data: {}", e)))?;
    }
    let bytes = cursor.into_inner();
    debug!("Encoded {} samples into {} WAV bytes", clip.samples.len(), bytes.len());
    Ok(bytes)
}

/// Write a mono clip to a WAV file
pub fn write_wav<P: AsRef<Path>>(path: P, clip: &AudioClip) -> Result<()> {
    let mut writer = WavWriter::create(path.as_ref(), spec_for(clip))
        .map_err(|e| TjBotError::Io(format!("Failed to create WAV writer: {}", e)))?;
    for &sample in &clip.samples {
        writer
            .write_sample(to_i16(sample))
            .map_err(|e| TjBotError::Io(format!("Failed to write sample: {}", e)))?;
    }
    writer
        .finalize()
        .map_err(|e| TjBotError::Io(format!("Failed to finalize WAV file: {}", e)))?;

    info!("Wrote {} samples to WAV file: {:?}", clip.samples.len(), path.as_ref());
    Ok(())
}

/// Decode raw little-endian 16-bit mono PCM
pub fn decode_pcm16_le(bytes: &[u8], sample_rate: u32) -> AudioClip {
    let samples = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / i16::MAX as f32)
        .collect();
    AudioClip::new(samples, sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone() -> AudioClip {
        let samples = (0..1600)
            .map(|i| (i as f32 * 440.0 * 2.0 * std::f32::consts::PI / 16000.0).sin() * 0.5)
            .collect();
        AudioClip::new(samples, 16000)
    }

    #[test]
    fn test_in_memory_wav_has_riff_header() {
        let bytes = encode_wav(&tone()).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        // 44-byte header plus two bytes per sample
        assert_eq!(bytes.len(), 44 + 1600 * 2);
    }

    #[test]
    fn test_encoded_wav_is_mono_16_bit() {
        let clip = tone();
        let bytes = encode_wav(&clip).unwrap();
        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 16000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len() as usize, clip.samples.len());
    }

    #[test]
    fn test_decode_pcm16_le() {
        let bytes = [0x00, 0x00, 0xFF, 0x7F, 0x01, 0x80];
        let clip = decode_pcm16_le(&bytes, 22050);
        assert_eq!(clip.samples.len(), 3);
        assert_eq!(clip.samples[0], 0.0);
        assert!((clip.samples[1] - 1.0).abs() < 1e-6);
        assert!((clip.samples[2] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_write_wav_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.wav");
        write_wav(&path, &tone()).unwrap();
        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.len(), 1600);
    }
}
