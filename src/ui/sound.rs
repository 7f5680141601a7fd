/// Sound engine: procedural blips for what just happened in the level.
///
/// Every effect is synthesized into an in-memory WAV buffer once, at
/// startup, and played fire-and-forget through a detached rodio Sink.
/// A command usually produces several events; only the loudest one
/// (see `Sfx::for_events`) is played.
///
/// Built without the "sound" feature, `SoundEngine` is a silent stub.

use crate::sim::event::LevelEvent;

/// One sound effect. Declaration order is priority order, lowest first.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Sfx {
    Step,
    Push,
    SwitchOff,
    SwitchOn,
    Fall,
    Zap,
    Summon,
    Return,
    Broken,
    Solved,
}

impl Sfx {
    #[cfg_attr(not(feature = "sound"), allow(dead_code))]
    pub const ALL: [Sfx; 10] = [
        Sfx::Step, Sfx::Push, Sfx::SwitchOff, Sfx::SwitchOn, Sfx::Fall,
        Sfx::Zap, Sfx::Summon, Sfx::Return, Sfx::Broken, Sfx::Solved,
    ];

    fn for_event(event: &LevelEvent) -> Sfx {
        match event {
            LevelEvent::Moved { .. } | LevelEvent::StairsReached { .. } => Sfx::Step,
            LevelEvent::Pushed { .. } => Sfx::Push,
            LevelEvent::SwitchReleased { .. } => Sfx::SwitchOff,
            LevelEvent::SwitchPressed { .. } => Sfx::SwitchOn,
            LevelEvent::FellInHole { .. } => Sfx::Fall,
            LevelEvent::Electrocuted { .. } => Sfx::Zap,
            LevelEvent::Summoned { .. } => Sfx::Summon,
            LevelEvent::ReturnResolved { .. } => Sfx::Return,
            LevelEvent::TimelineBroken { .. } => Sfx::Broken,
        }
    }

    /// The effect that best sums up a batch of events.
    pub fn for_events(events: &[LevelEvent]) -> Option<Sfx> {
        events.iter().map(Sfx::for_event).max()
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};
    use tracing::warn;

    use super::Sfx;

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        /// Indexed by `Sfx as usize`.
        buffers: Vec<Arc<Vec<u8>>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(error = %e, "no audio output, running silent");
                    return None;
                }
            };
            let buffers = Sfx::ALL
                .iter()
                .map(|&sfx| Arc::new(make_wav(&synthesize(sfx))))
                .collect();
            Some(SoundEngine { _stream: stream, handle, buffers })
        }

        pub fn play(&self, sfx: Sfx) {
            let buf = &self.buffers[sfx as usize];
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Synthesis: mono f32 samples in -1.0..=1.0
    // ════════════════════════════════════════════════════════════

    fn synthesize(sfx: Sfx) -> Vec<f32> {
        match sfx {
            Sfx::Step => tone(&[(330.0, 0.03)], 0.15),
            Sfx::Push => thud(0.08),
            Sfx::SwitchOn => tone(&[(660.0, 0.04), (990.0, 0.05)], 0.2),
            Sfx::SwitchOff => tone(&[(990.0, 0.04), (660.0, 0.05)], 0.15),
            Sfx::Fall => sweep(700.0, 150.0, 0.25, 0.25),
            Sfx::Zap => buzz(0.18),
            // Rising then falling: something arrives from later on
            Sfx::Summon => {
                let mut s = sweep(200.0, 1200.0, 0.15, 0.2);
                s.extend(sweep(1200.0, 800.0, 0.08, 0.2));
                s
            }
            Sfx::Return => sweep(1200.0, 200.0, 0.2, 0.2),
            Sfx::Broken => tone(&[(311.0, 0.15), (277.0, 0.15), (233.0, 0.3)], 0.3),
            Sfx::Solved => tone(&[(523.0, 0.09), (659.0, 0.09), (784.0, 0.09), (1047.0, 0.3)], 0.3),
        }
    }

    /// A sequence of (frequency, seconds) notes with a soft second harmonic.
    fn tone(notes: &[(f32, f32)], volume: f32) -> Vec<f32> {
        let mut out = Vec::new();
        for &(freq, secs) in notes {
            let n = (SAMPLE_RATE as f32 * secs) as usize;
            out.extend((0..n).map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(2.0);
                let wave = (t * freq * TAU).sin() * 0.8 + (t * freq * 2.0 * TAU).sin() * 0.2;
                wave * env * volume
            }));
        }
        out
    }

    /// Linear pitch glide.
    fn sweep(from: f32, to: f32, secs: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * secs) as usize;
        let mut phase = 0.0f32;
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                phase += (from + (to - from) * p) / SAMPLE_RATE as f32;
                (phase * TAU).sin() * (1.0 - p) * volume
            })
            .collect()
    }

    /// Low tone under a burst of noise.
    fn thud(secs: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * secs) as usize;
        let mut seed: u32 = 0x2545_f491;
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                let t = i as f32 / SAMPLE_RATE as f32;
                seed ^= seed << 13;
                seed ^= seed >> 17;
                seed ^= seed << 5;
                let noise = seed as f32 / u32::MAX as f32 * 2.0 - 1.0;
                ((t * 110.0 * TAU).sin() * 0.6 + noise * 0.4) * (1.0 - p).powf(1.5) * 0.3
            })
            .collect()
    }

    /// Square wave gated on and off.
    fn buzz(secs: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * secs) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let square = if (t * 120.0 * TAU).sin() >= 0.0 { 1.0 } else { -1.0 };
                let gate = if (i / 400) % 2 == 0 { 1.0 } else { 0.3 };
                square * gate * (1.0 - i as f32 / n as f32) * 0.12
            })
            .collect()
    }

    // ════════════════════════════════════════════════════════════
    //  16-bit PCM WAV container
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        const CHANNELS: u16 = 1;
        const BITS: u16 = 16;
        let block_align = CHANNELS * BITS / 8;
        let data_len = samples.len() as u32 * u32::from(block_align);

        let mut buf = Vec::with_capacity(44 + data_len as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_len).to_le_bytes());
        buf.extend_from_slice(b"WAVEfmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&CHANNELS.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&(SAMPLE_RATE * u32::from(block_align)).to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&BITS.to_le_bytes());
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_len.to_le_bytes());
        for &s in samples {
            buf.extend_from_slice(&((s.clamp(-1.0, 1.0) * 32767.0) as i16).to_le_bytes());
        }
        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn wav_header_describes_the_samples() {
            let wav = make_wav(&[0.0, 1.0, -1.0]);
            assert_eq!(wav.len(), 44 + 6);
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(&wav[8..16], b"WAVEfmt ");
            assert_eq!(u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]), 6);
            assert_eq!(i16::from_le_bytes([wav[46], wav[47]]), 32767);
        }

        #[test]
        fn every_effect_has_samples_in_range() {
            for sfx in Sfx::ALL {
                let s = synthesize(sfx);
                assert!(!s.is_empty(), "{sfx:?}");
                assert!(s.iter().all(|v| v.abs() <= 1.0), "{sfx:?}");
            }
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: no-ops when the sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _sfx: Sfx) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::RowCol;
    use crate::domain::tile::DoorColor;

    #[test]
    fn loudest_event_wins() {
        let events = vec![
            LevelEvent::Moved { actor: 0, to: RowCol::new(1, 2) },
            LevelEvent::Pushed { actor: 1, to: RowCol::new(1, 3) },
            LevelEvent::SwitchPressed { color: DoorColor::Blue },
        ];
        assert_eq!(Sfx::for_events(&events), Some(Sfx::SwitchOn));
    }

    #[test]
    fn broken_timeline_beats_a_return() {
        let events = vec![
            LevelEvent::ReturnResolved { actor: 0 },
            LevelEvent::TimelineBroken { actor: 1 },
        ];
        assert_eq!(Sfx::for_events(&events), Some(Sfx::Broken));
    }

    #[test]
    fn nothing_happened_is_silent() {
        assert_eq!(Sfx::for_events(&[]), None);
    }

    #[test]
    fn all_lists_every_effect_in_priority_order() {
        for pair in Sfx::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(Sfx::ALL[Sfx::Solved as usize], Sfx::Solved);
    }
}
