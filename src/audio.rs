//! Oscillator-based audio cues.
//!
//! Each cue is a short sine beep: fixed frequency per cue kind, 0.1 gain
//! decaying exponentially to 0.01 over 0.3 s. A fresh `AudioContext` is
//! created per cue and dropped; callers fire and forget.

use wasm_bindgen::JsValue;
use web_sys::{AudioContext, OscillatorType};

use crate::engine::Cue;

const CUE_DURATION_S: f64 = 0.3;

fn frequency(cue: Cue) -> f32 {
    match cue {
        Cue::LetterSelect => 800.0,
        Cue::Correct => 1200.0,
        Cue::Incorrect => 300.0,
        Cue::NewPuzzle => 600.0,
        Cue::GameComplete => 1000.0,
    }
}

pub fn play_cue(cue: Cue) -> Result<(), JsValue> {
    let ctx = AudioContext::new()?;
    let oscillator = ctx.create_oscillator()?;
    let gain = ctx.create_gain()?;

    oscillator.connect_with_audio_node(&gain)?;
    gain.connect_with_audio_node(&ctx.destination())?;

    let now = ctx.current_time();
    oscillator.frequency().set_value_at_time(frequency(cue), now)?;
    oscillator.set_type(OscillatorType::Sine);

    gain.gain().set_value_at_time(0.1, now)?;
    gain.gain()
        .exponential_ramp_to_value_at_time(0.01, now + CUE_DURATION_S)?;

    oscillator.start()?;
    oscillator.stop_with_when(now + CUE_DURATION_S)?;
    Ok(())
}
