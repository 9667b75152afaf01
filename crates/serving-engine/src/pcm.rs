//! PCM16LE ↔ f32 conversion and single-chunk WAV framing (§4.3, §4.4).

/// Decode little-endian PCM16 bytes into float32 samples in `[-1, 1]`.
///
/// A trailing odd byte (an incomplete sample) is left in place by the caller — this
/// function only consumes whole 2-byte samples via `chunks_exact`.
#[must_use]
pub fn decode_pcm16le(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| {
            let sample = i16::from_le_bytes([pair[0], pair[1]]);
            f32::from(sample) / 32768.0
        })
        .collect()
}

/// Encode float32 samples to little-endian PCM16 bytes, clipping to `[-1, 1]` first.
#[must_use]
pub fn encode_pcm16le(samples: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 2);
    for &s in samples {
        let clamped = s.clamp(-1.0, 1.0);
        let quantized = (clamped * 32767.0).round() as i16;
        out.extend_from_slice(&quantized.to_le_bytes());
    }
    out
}

/// Wraps raw PCM16LE bytes in a minimal single-chunk WAV container (44-byte canonical
/// header, mono, 16-bit). No re-encoding to MP3 is performed anywhere in this crate — see
/// the spec's documented MP3 mismatch (§9).
#[must_use]
pub fn wrap_wav(pcm: &[u8], sample_rate: u32) -> Vec<u8> {
    let data_len = pcm.len() as u32;
    let byte_rate = sample_rate * 2;
    let mut out = Vec::with_capacity(44 + pcm.len());

    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&1u16.to_le_bytes()); // mono
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes()); // block align
    out.extend_from_slice(&16u16.to_le_bytes()); // bits per sample

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.extend_from_slice(pcm);

    out
}
