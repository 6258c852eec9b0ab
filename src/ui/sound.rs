/// Sound engine: procedural chiptune effects and looping music via rodio.
///
/// Effects are generated as in-memory WAV buffers at init time and played
/// fire-and-forget. Music tracks are synthesised on first use, cached, and
/// looped on a dedicated sink; only one track plays at a time.
///
/// Unknown track names are ignored. Compile without the "sound" feature to
/// get the stub engine, which does nothing.

#[cfg(feature = "sound")]
mod inner {
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
    use tracing::{debug, warn};

    use super::{track_score, Score};

    const SAMPLE_RATE: u32 = 22050;
    const MUSIC_VOLUME: f32 = 0.35;
    const TAU: f32 = std::f32::consts::TAU;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_enabled: bool,
        sfx_jump: Arc<Vec<u8>>,
        sfx_collect: Arc<Vec<u8>>,
        sfx_key: Arc<Vec<u8>>,
        sfx_hit: Arc<Vec<u8>>,
        sfx_game_over: Arc<Vec<u8>>,
        sfx_door: Arc<Vec<u8>>,
        sfx_locked: Arc<Vec<u8>>,
        sfx_click: Arc<Vec<u8>>,
        sfx_tutorial: Arc<Vec<u8>>,
        music: Option<(&'static str, Sink)>,
        track_cache: HashMap<&'static str, Arc<Vec<u8>>>,
    }

    impl SoundEngine {
        pub fn new(sfx_enabled: bool) -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(error = %e, "no audio output, running silent");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_enabled,
                sfx_jump: Arc::new(make_wav(&gen_sweep(320.0, 720.0, 0.11, 0.25))),
                sfx_collect: Arc::new(make_wav(&gen_arpeggio(&[1047.0, 1319.0, 1568.0], 0.045, 0.25))),
                sfx_key: Arc::new(make_wav(&gen_arpeggio(&[784.0, 1047.0, 1319.0, 1568.0], 0.06, 0.3))),
                sfx_hit: Arc::new(make_wav(&gen_hit())),
                sfx_game_over: Arc::new(make_wav(&gen_arpeggio(&[440.0, 370.0, 311.0, 261.0], 0.14, 0.3))),
                sfx_door: Arc::new(make_wav(&gen_lever())),
                sfx_locked: Arc::new(make_wav(&gen_blip(150.0, 0.09, 0.3))),
                sfx_click: Arc::new(make_wav(&gen_blip(880.0, 0.03, 0.2))),
                sfx_tutorial: Arc::new(make_wav(&gen_sweep(500.0, 900.0, 0.08, 0.2))),
                music: None,
                track_cache: HashMap::new(),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if !self.sfx_enabled { return; }
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        pub fn play_jump(&self) { self.play(&self.sfx_jump); }
        pub fn play_collect(&self) { self.play(&self.sfx_collect); }
        pub fn play_key(&self) { self.play(&self.sfx_key); }
        pub fn play_hit(&self) { self.play(&self.sfx_hit); }
        pub fn play_game_over(&self) { self.play(&self.sfx_game_over); }
        pub fn play_door(&self) { self.play(&self.sfx_door); }
        pub fn play_locked(&self) { self.play(&self.sfx_locked); }
        pub fn play_click(&self) { self.play(&self.sfx_click); }
        pub fn play_tutorial(&self) { self.play(&self.sfx_tutorial); }

        /// Loop `track`, replacing whatever is playing. Same track: no-op.
        pub fn play_music(&mut self, track: &'static str) {
            if matches!(&self.music, Some((name, _)) if *name == track) {
                return;
            }
            let Some(score) = track_score(track) else {
                debug!(track, "unknown music track");
                return;
            };
            self.stop_music();

            let buf = self.track_cache
                .entry(track)
                .or_insert_with(|| Arc::new(make_wav(&render_score(&score))))
                .clone();

            let Ok(sink) = Sink::try_new(&self.handle) else { return };
            let Ok(src) = rodio::Decoder::new(Cursor::new(buf.as_ref().clone())) else { return };
            sink.set_volume(MUSIC_VOLUME);
            sink.append(src.repeat_infinite());
            self.music = Some((track, sink));
        }

        pub fn stop_music(&mut self) {
            if let Some((_, sink)) = self.music.take() {
                sink.stop();
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators (mono f32 samples)
    // ════════════════════════════════════════════════════════════

    fn gen_blip(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32);
                (t * freq * TAU).sin() * env * volume
            })
            .collect()
    }

    /// Linear pitch sweep; rising for jumps, short for UI.
    fn gen_sweep(from: f32, to: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let r = i as f32 / n as f32;
                let freq = from + (to - from) * r;
                phase += freq / SAMPLE_RATE as f32;
                let sq = if (phase * TAU).sin() >= 0.0 { 1.0 } else { -1.0 };
                sq * (1.0 - r) * volume * 0.6
            })
            .collect()
    }

    fn gen_arpeggio(notes: &[f32], note_dur: f32, volume: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &freq in notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = (t * freq * TAU).sin() * 0.7 + (t * freq * 3.0 * TAU).sin() * 0.3;
                samples.push(wave * env * volume);
            }
        }
        samples
    }

    /// Hit: noisy thud with a falling tone.
    fn gen_hit() -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.16) as usize;
        let mut rng: u32 = 9876;
        (0..n)
            .map(|i| {
                let r = i as f32 / n as f32;
                let t = i as f32 / SAMPLE_RATE as f32;
                let tone = (t * (260.0 - r * 180.0) * TAU).sin();
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                (tone * 0.5 + noise * 0.5) * (1.0 - r).powf(1.5) * 0.35
            })
            .collect()
    }

    /// Door lever: two clunks then a rising chime.
    fn gen_lever() -> Vec<f32> {
        let mut samples = gen_blip(120.0, 0.05, 0.4);
        samples.extend(gen_blip(90.0, 0.06, 0.4));
        samples.extend(gen_arpeggio(&[523.0, 659.0, 784.0, 1047.0], 0.08, 0.3));
        samples
    }

    /// Square lead over a triangle bass, one note per step.
    fn render_score(score: &Score) -> Vec<f32> {
        let step_len = (SAMPLE_RATE as f32 * score.step_secs) as usize;
        let mut samples = Vec::with_capacity(step_len * score.lead.len());
        for (i, &lead) in score.lead.iter().enumerate() {
            let bass = score.bass[i % score.bass.len()];
            for s in 0..step_len {
                let t = s as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (s as f32 / step_len as f32) * 0.6;
                let lead_v = if lead > 0.0 {
                    if (t * lead * TAU).sin() >= 0.0 { 0.18 } else { -0.18 }
                } else {
                    0.0
                };
                let bass_v = if bass > 0.0 {
                    let p = (t * bass).fract();
                    (4.0 * (p - 0.5).abs() - 1.0) * 0.22
                } else {
                    0.0
                };
                samples.push((lead_v + bass_v) * env);
            }
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

}

// ════════════════════════════════════════════════════════════
//  Scores
// ════════════════════════════════════════════════════════════

/// A looping tune: lead notes and a bass line (Hz, 0 = rest), one per step.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
pub struct Score {
    pub step_secs: f32,
    pub lead: &'static [f32],
    pub bass: &'static [f32],
}

// Note frequencies, 4th and 5th octave.
const C4: f32 = 261.6; const D4: f32 = 293.7; const E4: f32 = 329.6; const F4: f32 = 349.2;
const G4: f32 = 392.0; const A4: f32 = 440.0; const B4: f32 = 493.9;
const C5: f32 = 523.3; const D5: f32 = 587.3; const E5: f32 = 659.3; const G5: f32 = 784.0;
const EB4: f32 = 311.1; const AB4: f32 = 415.3; const BB4: f32 = 466.2;
const C3: f32 = 130.8; const D3: f32 = 146.8; const E3: f32 = 164.8; const F3: f32 = 174.6;
const G3: f32 = 196.0; const A3: f32 = 220.0; const AB3: f32 = 207.7;
const R: f32 = 0.0;

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
pub fn track_score(name: &str) -> Option<Score> {
    let score = match name {
        "intro_theme" => Score {
            step_secs: 0.2,
            lead: &[C5, E5, G5, E5, D5, C5, D5, R, C5, E5, G5, C5, B4, G4, C5, R],
            bass: &[C3, C3, G3, G3, F3, F3, G3, G3],
        },
        "grasslands_theme" => Score {
            step_secs: 0.16,
            lead: &[E4, G4, A4, G4, E4, G4, C5, R, D5, C5, A4, G4, A4, G4, E4, R],
            bass: &[C3, G3, A3, F3],
        },
        "desert_theme" => Score {
            step_secs: 0.18,
            lead: &[D4, EB4, G4, A4, BB4, A4, G4, EB4, D4, R, D4, EB4, G4, EB4, D4, R],
            bass: &[D3, D3, A3, D3],
        },
        "mushroom_theme" => Score {
            step_secs: 0.14,
            lead: &[C5, G4, E4, G4, A4, F4, A4, C5, B4, G4, D4, G4, C5, R, C5, R],
            bass: &[C3, F3, G3, C3],
        },
        "jungle_theme" => Score {
            step_secs: 0.15,
            lead: &[A4, C5, D5, C5, A4, G4, E4, G4, A4, R, E5, D5, C5, A4, G4, R],
            bass: &[A3, A3, G3, E3],
        },
        "dungeon_theme" => Score {
            step_secs: 0.22,
            lead: &[C4, EB4, G4, AB4, G4, EB4, D4, R, C4, EB4, F4, G4, AB4, G4, C4, R],
            bass: &[C3, AB3, F3, G3],
        },
        "congrats" => Score {
            step_secs: 0.18,
            lead: &[C5, C5, G4, C5, E5, R, G5, R, E5, C5, D5, E5, C5, R, R, R],
            bass: &[C3, G3, C3, G3],
        },
        _ => return None,
    };
    Some(score)
}

// ════════════════════════════════════════════════════════════
//  Public API (no-ops without the sound feature)
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new(_sfx_enabled: bool) -> Option<Self> { Some(SoundEngine) }
    pub fn play_jump(&self) {}
    pub fn play_collect(&self) {}
    pub fn play_key(&self) {}
    pub fn play_hit(&self) {}
    pub fn play_game_over(&self) {}
    pub fn play_door(&self) {}
    pub fn play_locked(&self) {}
    pub fn play_click(&self) {}
    pub fn play_tutorial(&self) {}
    pub fn play_music(&mut self, _track: &'static str) {}
    pub fn stop_music(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::LEVELS;

    #[test]
    fn every_level_track_has_a_score() {
        for level in LEVELS.iter() {
            assert!(track_score(level.track).is_some(), "{}", level.track);
        }
        assert!(track_score("intro_theme").is_some());
        assert!(track_score("congrats").is_some());
    }

    #[test]
    fn unknown_track_is_none() {
        assert!(track_score("polka").is_none());
    }
}
