//! Pharma Wordscape core crate.
//!
//! A single-screen word-unscramble game: the player rebuilds an ophthalmic
//! product name from its unique letters, guided by a clinical description
//! and an on-demand reference citation. The gameplay state machine lives in
//! [`engine`] and is pure Rust (natively testable); [`catalog`] holds the
//! compiled-in puzzle set; browser glue (DOM, timers, audio cues) is wired
//! up by `start_game()`.

use wasm_bindgen::prelude::*;

pub mod catalog;
pub mod engine;

mod app;
mod audio;

pub use catalog::{PuzzleEntry, CATALOG};
pub use engine::{
    Cue, LetterPool, LetterToken, Phase, ResolveOutcome, Round, RoundEngine, RoundSummary,
    SubmitOutcome, TokenState,
};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Entry point called from JS once the DOM is ready. Builds the app state,
/// wires the event listeners, and shows the attract screen.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    app::start_app()
}
