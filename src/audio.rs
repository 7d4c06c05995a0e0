use std::collections::HashMap;
use std::f32::consts::TAU;

use fundsp::prelude32::*;
use log::{debug, trace, warn};
use rodio::{OutputStream, OutputStreamBuilder, Sink, Source, buffer::SamplesBuffer};

use crate::error::ResourceError;
use crate::services::{AudioTransport, Cue};

const SAMPLE_RATE: u32 = 44_100;

// ── Synthesis ───────────────────────────────────────────────────────────────

fn render(node: &mut dyn AudioUnit, secs: f64) -> Vec<f32> {
    node.set_sample_rate(SAMPLE_RATE as f64);
    node.reset();
    let n = (SAMPLE_RATE as f64 * secs) as usize;
    (0..n).map(|_| node.get_mono()).collect()
}

fn game_over_clip() -> Vec<f32> {
    // 400Hz -> 80Hz sawtooth dive, fading out over half a second
    let freq = lfo(|t: f32| lerp(400.0, 80.0, (t / 0.4).min(1.0)));
    let gain = lfo(|t: f32| lerp(0.15, 0.0, (t / 0.5).min(1.0)));
    let mut sound = (freq >> saw()) * gain;
    render(&mut sound, 0.5)
}

fn pause_clip() -> Vec<f32> {
    // two quick square blips, low then high
    let freq = lfo(|t: f32| if t < 0.08 { 660.0 } else { 880.0 });
    let gain = lfo(|t: f32| if t < 0.16 { 0.08 } else { 0.0 });
    let mut sound = (freq >> square()) * gain;
    render(&mut sound, 0.18)
}

const THEME_NOTES: [f32; 8] = [523.25, 659.25, 783.99, 659.25, 587.33, 698.46, 880.0, 698.46];
const THEME_STEP: f32 = 0.25;

fn theme_loop() -> Vec<f32> {
    let freq = lfo(|t: f32| THEME_NOTES[(t / THEME_STEP) as usize % THEME_NOTES.len()]);
    // plucked envelope, restarting on every note
    let gain = lfo(|t: f32| 0.05 * (1.0 - (t % THEME_STEP) / THEME_STEP) * (0.9 + 0.1 * (t * TAU).sin()));
    let mut sound = (freq >> triangle()) * gain;
    render(&mut sound, (THEME_STEP * THEME_NOTES.len() as f32) as f64)
}

/// Pre-rendered mono clips.
#[derive(Debug, Clone, Default)]
pub struct SoundBank {
    cues: HashMap<Cue, Vec<f32>>,
    theme: Vec<f32>,
}

impl SoundBank {
    pub fn synthesize() -> Self {
        let mut cues = HashMap::new();
        cues.insert(Cue::Pause, pause_clip());
        cues.insert(Cue::GameOver, game_over_clip());
        Self {
            cues,
            theme: theme_loop(),
        }
    }

    pub fn cue(&self, cue: Cue) -> Result<&[f32], ResourceError> {
        self.cues
            .get(&cue)
            .map(Vec::as_slice)
            .ok_or(ResourceError::MissingResource(cue))
    }

    pub fn theme(&self) -> &[f32] {
        &self.theme
    }
}

fn buffer(samples: &[f32]) -> SamplesBuffer {
    SamplesBuffer::new(1, SAMPLE_RATE, samples.to_vec())
}

// ── Transports ──────────────────────────────────────────────────────────────

/// Plays through the default output device.
pub struct SynthAudio {
    stream: OutputStream,
    music: Sink,
    bank: SoundBank,
}

impl SynthAudio {
    pub fn open(bank: SoundBank) -> Result<Self, ResourceError> {
        let mut stream =
            OutputStreamBuilder::open_default_stream().map_err(|_| ResourceError::NoOutputDevice)?;
        stream.log_on_drop(false);
        let music = Sink::connect_new(stream.mixer());
        music.pause();
        Ok(Self {
            stream,
            music,
            bank,
        })
    }
}

impl AudioTransport for SynthAudio {
    fn play_music(&mut self) {
        self.music.clear();
        if self.bank.theme().is_empty() {
            debug!("no theme loaded, playing silence");
            return;
        }
        self.music.append(buffer(self.bank.theme()).repeat_infinite());
        self.music.play();
    }

    fn pause_music(&mut self) {
        self.music.pause();
    }

    fn resume_music(&mut self) {
        self.music.play();
    }

    fn stop_music(&mut self) {
        self.music.clear();
    }

    fn play_one_shot(&mut self, cue: Cue) {
        match self.bank.cue(cue) {
            Ok(samples) => {
                let sink = Sink::connect_new(self.stream.mixer());
                sink.append(buffer(samples));
                sink.detach(); // Play in background
            }
            Err(e) => debug!("skipping one-shot: {e}"),
        }
    }
}

/// Accepts every call and plays nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioTransport for NullAudio {
    fn play_music(&mut self) {
        trace!("music: play (muted)");
    }

    fn pause_music(&mut self) {
        trace!("music: pause (muted)");
    }

    fn resume_music(&mut self) {
        trace!("music: resume (muted)");
    }

    fn stop_music(&mut self) {
        trace!("music: stop (muted)");
    }

    fn play_one_shot(&mut self, cue: Cue) {
        trace!("cue {cue:?} (muted)");
    }
}

/// Real output unless muted; falls back to silence without a device.
pub fn open_transport(mute: bool) -> Box<dyn AudioTransport> {
    if mute {
        return Box::new(NullAudio);
    }
    match SynthAudio::open(SoundBank::synthesize()) {
        Ok(audio) => Box::new(audio),
        Err(e) => {
            warn!("audio disabled: {e}");
            Box::new(NullAudio)
        }
    }
}
