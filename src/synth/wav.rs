use std::f64::consts::PI;

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

const HEADER_LEN: usize = 44;
const AMPLITUDE: f64 = 0.5 * 32767.0;

/// Builds a mono 16-bit PCM WAV file containing a pure sine tone.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn build_wav(duration_secs: f64, frequency_hz: f64, sample_rate: u32) -> Vec<u8> {
    let num_samples = (f64::from(sample_rate) * duration_secs.max(0.0)).round() as u32;
    let data_len = num_samples.saturating_mul(2);

    let mut out = Vec::with_capacity(HEADER_LEN + data_len as usize);

    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36u32.saturating_add(data_len)).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&1u16.to_le_bytes()); // mono
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&sample_rate.saturating_mul(2).to_le_bytes()); // byte rate
    out.extend_from_slice(&2u16.to_le_bytes()); // block align
    out.extend_from_slice(&16u16.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());

    let rate = f64::from(sample_rate.max(1));
    for n in 0..num_samples {
        let t = f64::from(n) / rate;
        let sample = (AMPLITUDE * (2.0 * PI * frequency_hz * t).sin()).round() as i16;
        out.extend_from_slice(&sample.to_le_bytes());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn le_u32(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn test_three_second_tone_layout() {
        let data = build_wav(3.0, 440.0, 44_100);
        let num_samples = 44_100 * 3;

        assert_eq!(data.len(), 44 + num_samples * 2);
        assert_eq!(&data[0..4], b"RIFF");
        assert_eq!(&data[8..12], b"WAVE");
        assert_eq!(&data[12..16], b"fmt ");
        assert_eq!(&data[36..40], b"data");
        assert_eq!(le_u32(&data, 4), 36 + num_samples as u32 * 2);
        assert_eq!(le_u32(&data, 40), num_samples as u32 * 2);
        assert_eq!(le_u32(&data, 24), 44_100);
        assert_eq!(le_u32(&data, 28), 88_200);
    }

    #[test]
    fn test_samples_follow_sine() {
        let data = build_wav(0.01, 440.0, 8000);
        let sample = |n: usize| i16::from_le_bytes([data[44 + n * 2], data[45 + n * 2]]);

        assert_eq!(sample(0), 0);
        let peak = (0..80).map(|n| sample(n).unsigned_abs()).max().unwrap();
        assert!(peak <= 16_384);
        assert!(peak > 16_000);
    }

    #[test]
    fn test_zero_duration() {
        let data = build_wav(0.0, 440.0, 44_100);
        assert_eq!(data.len(), 44);
        assert_eq!(le_u32(&data, 4), 36);
        assert_eq!(le_u32(&data, 40), 0);
    }
}
