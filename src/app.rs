//! Browser presentation layer.
//!
//! Owns the DOM wiring for the three screens (attract, game, results), the
//! reference modal, the letter circle, answer slots, HUD, confetti and the
//! wrong-answer flash. All gameplay decisions live in [`crate::engine`];
//! this module forwards clicks into the engine, reads the resulting state
//! back out, and schedules the engine's deferred resolutions with
//! `setTimeout` using the engine epoch as the cancellation token.

use std::cell::RefCell;
use std::f64::consts::TAU;

use rand::Rng;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{window, Document, HtmlButtonElement, HtmlElement, MouseEvent};

use crate::audio;
use crate::catalog::CATALOG;
use crate::engine::{
    Cue, Phase, ResolveOutcome, RoundEngine, RoundSummary, SubmitOutcome, TokenState,
    ADVANCE_DELAY_MS, ATTRACT_TIMEOUT_MS, INCORRECT_CLEAR_DELAY_MS, PUZZLES_PER_ROUND,
};

// Letter-circle geometry (pixels), matching the 300x300 stage with 60px buttons.
const CIRCLE_RADIUS: f64 = 100.0;
const CIRCLE_CENTER: f64 = 150.0;
const BUTTON_HALF: f64 = 30.0;

const CONFETTI_PIECES: u32 = 50;
const CONFETTI_CLEAR_MS: i32 = 4000;
const CORRECT_ANIMATION_MS: i32 = 600;
const SPACE_SLOT_WIDTH: &str = "20px";

thread_local! {
    static APP: RefCell<Option<App>> = RefCell::new(None);
}

fn with_app<F: FnOnce(&mut App)>(f: F) {
    APP.with(|cell| {
        if let Some(app) = cell.borrow_mut().as_mut() {
            f(app);
        }
    });
}

fn now_ms() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

fn format_clock(elapsed_ms: f64) -> String {
    let total = (elapsed_ms / 1000.0).floor().max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// One-shot timeout; the closure is dropped after it fires.
fn schedule(ms: i32, f: impl FnOnce() + 'static) -> Result<i32, JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let cb = Closure::once_into_js(f);
    win.set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), ms)
}

fn cancel_timeout(handle: i32) {
    if let Some(win) = window() {
        win.clear_timeout_with_handle(handle);
    }
}

/// Permanent listener on a static element; the closure is leaked once.
fn listen(target: &HtmlElement, event: &str, f: impl FnMut() + 'static) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(f) as Box<dyn FnMut()>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn element(doc: &Document, id: &str) -> Result<HtmlElement, JsValue> {
    Ok(doc
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing element #{id}")))?
        .dyn_into()?)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Screen {
    Attract,
    Game,
    Results,
}

struct App {
    engine: RoundEngine,
    doc: Document,
    attract_screen: HtmlElement,
    game_screen: HtmlElement,
    results_screen: HtmlElement,
    reference_modal: HtmlElement,
    puzzle_counter: HtmlElement,
    timer_el: HtmlElement,
    score_el: HtmlElement,
    description_el: HtmlElement,
    reference_text: HtmlElement,
    answer_slots: HtmlElement,
    letter_circle: HtmlElement,
    confetti_el: HtmlElement,
    wrong_mark: HtmlElement,
    final_score: HtmlElement,
    final_time: HtmlElement,
    correct_words_el: HtmlElement,
    slot_els: Vec<HtmlElement>,
    letter_buttons: Vec<HtmlButtonElement>,
    attract_timeout: Option<i32>,
}

pub fn start_app() -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let mut app = App {
        engine: RoundEngine::new(CATALOG),
        attract_screen: element(&doc, "attractMode")?,
        game_screen: element(&doc, "gameScreen")?,
        results_screen: element(&doc, "resultsScreen")?,
        reference_modal: element(&doc, "referenceModal")?,
        puzzle_counter: element(&doc, "currentPuzzle")?,
        timer_el: element(&doc, "timer")?,
        score_el: element(&doc, "score")?,
        description_el: element(&doc, "description")?,
        reference_text: element(&doc, "referenceText")?,
        answer_slots: element(&doc, "answerSlots")?,
        letter_circle: element(&doc, "letterCircle")?,
        confetti_el: element(&doc, "confetti")?,
        wrong_mark: element(&doc, "wrongMark")?,
        final_score: element(&doc, "finalScore")?,
        final_time: element(&doc, "finalTime")?,
        correct_words_el: element(&doc, "correctWords")?,
        slot_els: Vec::new(),
        letter_buttons: Vec::new(),
        attract_timeout: None,
        doc,
    };

    wire_static_listeners(&app)?;
    app.start_attract()?;
    APP.with(|cell| cell.replace(Some(app)));
    start_clock(&win)?;
    Ok(())
}

fn wire_static_listeners(app: &App) -> Result<(), JsValue> {
    for event in ["click", "touchstart"] {
        listen(&app.attract_screen, event, || {
            with_app(|app| {
                let _ = app.begin_round();
            });
        })?;
    }

    listen(&element(&app.doc, "deleteBtn")?, "click", || {
        with_app(App::handle_delete);
    })?;
    listen(&element(&app.doc, "submitBtn")?, "click", || {
        with_app(|app| {
            let _ = app.handle_submit();
        });
    })?;
    listen(&element(&app.doc, "playAgainBtn")?, "click", || {
        with_app(|app| {
            app.engine.reset();
            let _ = app.start_attract();
        });
    })?;

    // Reference modal: open button, close button, close on backdrop click.
    let modal = app.reference_modal.clone();
    listen(&element(&app.doc, "referenceBtn")?, "click", move || {
        let _ = modal.style().set_property("display", "block");
    })?;
    let close_btn: HtmlElement = app
        .doc
        .query_selector(".close")?
        .ok_or_else(|| JsValue::from_str("missing .close"))?
        .dyn_into()?;
    let modal = app.reference_modal.clone();
    listen(&close_btn, "click", move || {
        let _ = modal.style().set_property("display", "none");
    })?;
    let modal = app.reference_modal.clone();
    let backdrop = Closure::wrap(Box::new(move |ev: MouseEvent| {
        let is_backdrop = ev
            .target()
            .as_ref()
            .and_then(|t| t.dyn_ref::<HtmlElement>())
            .map_or(false, |el| el == &modal);
        if is_backdrop {
            let _ = modal.style().set_property("display", "none");
        }
    }) as Box<dyn FnMut(MouseEvent)>);
    app.reference_modal
        .add_event_listener_with_callback("click", backdrop.as_ref().unchecked_ref())?;
    backdrop.forget();
    Ok(())
}

/// 1 Hz HUD clock; queries the engine on demand instead of the engine
/// rescheduling itself.
fn start_clock(win: &web_sys::Window) -> Result<(), JsValue> {
    let cb = Closure::wrap(Box::new(|| {
        with_app(App::update_timer);
    }) as Box<dyn FnMut()>);
    win.set_interval_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), 1000)?;
    cb.forget();
    Ok(())
}

/// Deferred-resolution entry shared by the advance and clear delays.
fn resolve_deferred(epoch: u64) {
    with_app(|app| {
        let outcome = app
            .engine
            .resolve_pending(&mut rand::thread_rng(), epoch, now_ms());
        match outcome {
            ResolveOutcome::Stale => {}
            ResolveOutcome::InputCleared => {
                let _ = app.sync_letter_buttons();
                let _ = app.sync_answer_slots();
            }
            ResolveOutcome::PuzzleLoaded(_) => {
                let _ = app.load_puzzle_view();
            }
            ResolveOutcome::RoundComplete(summary) => {
                let _ = app.show_results(&summary);
            }
        }
    });
}

impl App {
    fn show_screen(&self, screen: Screen) -> Result<(), JsValue> {
        let screens = [
            (&self.attract_screen, Screen::Attract),
            (&self.game_screen, Screen::Game),
            (&self.results_screen, Screen::Results),
        ];
        for (el, which) in screens {
            if which == screen {
                el.class_list().add_1("active")?;
            } else {
                el.class_list().remove_1("active")?;
            }
        }
        Ok(())
    }

    fn start_attract(&mut self) -> Result<(), JsValue> {
        self.show_screen(Screen::Attract)?;
        self.arm_attract_timeout()
    }

    /// Re-arms the inactivity window. Each firing refreshes the attract
    /// presentation and arms the next window; starting a round cancels the
    /// handle and supersedes the captured epoch.
    fn arm_attract_timeout(&mut self) -> Result<(), JsValue> {
        if let Some(handle) = self.attract_timeout.take() {
            cancel_timeout(handle);
        }
        let epoch = self.engine.epoch();
        let handle = schedule(ATTRACT_TIMEOUT_MS, move || {
            with_app(|app| {
                if app.engine.idle_reset(epoch) {
                    let _ = app.start_attract();
                }
            });
        })?;
        self.attract_timeout = Some(handle);
        Ok(())
    }

    fn begin_round(&mut self) -> Result<(), JsValue> {
        if matches!(self.engine.phase(), Phase::Active(_)) {
            return Ok(());
        }
        if let Some(handle) = self.attract_timeout.take() {
            cancel_timeout(handle);
        }
        self.engine.start_round(&mut rand::thread_rng(), now_ms());
        self.show_screen(Screen::Game)?;
        self.score_el.set_text_content(Some("0"));
        self.timer_el.set_text_content(Some("00:00"));
        self.load_puzzle_view()
    }

    fn load_puzzle_view(&mut self) -> Result<(), JsValue> {
        let Some(round) = self.engine.round() else {
            return Ok(());
        };
        let puzzle = round.current_puzzle();
        let index = round.current_index();
        let letters: Vec<char> = round.pool().tokens().iter().map(|t| t.letter).collect();

        self.puzzle_counter
            .set_text_content(Some(&(index + 1).to_string()));
        self.description_el.set_text_content(Some(puzzle.description));
        self.reference_text.set_text_content(Some(puzzle.reference));

        self.build_answer_slots(puzzle.word)?;
        self.build_letter_circle(&letters)?;
        self.sync_answer_slots()?;
        let _ = audio::play_cue(Cue::NewPuzzle);
        Ok(())
    }

    fn build_answer_slots(&mut self, word: &str) -> Result<(), JsValue> {
        self.answer_slots.set_inner_html("");
        self.slot_els.clear();
        for ch in word.chars() {
            let slot: HtmlElement = self.doc.create_element("div")?.dyn_into()?;
            slot.set_class_name("answer-slot");
            if ch == ' ' {
                slot.style().set_property("visibility", "hidden")?;
                slot.style().set_property("width", SPACE_SLOT_WIDTH)?;
            }
            self.answer_slots.append_child(&slot)?;
            self.slot_els.push(slot);
        }
        Ok(())
    }

    fn build_letter_circle(&mut self, letters: &[char]) -> Result<(), JsValue> {
        self.letter_circle.set_inner_html("");
        self.letter_buttons.clear();
        let count = letters.len().max(1);
        for (i, letter) in letters.iter().enumerate() {
            let angle = i as f64 / count as f64 * TAU;
            let x = CIRCLE_CENTER + CIRCLE_RADIUS * angle.cos() - BUTTON_HALF;
            let y = CIRCLE_CENTER + CIRCLE_RADIUS * angle.sin() - BUTTON_HALF;

            let btn: HtmlButtonElement = self.doc.create_element("button")?.dyn_into()?;
            btn.set_class_name("letter-btn");
            btn.set_text_content(Some(&letter.to_string()));
            btn.style().set_property("left", &format!("{x:.0}px"))?;
            btn.style().set_property("top", &format!("{y:.0}px"))?;

            let closure = Closure::wrap(Box::new(move || {
                with_app(|app| app.handle_letter(i));
            }) as Box<dyn FnMut()>);
            btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();

            self.letter_circle.append_child(&btn)?;
            self.letter_buttons.push(btn);
        }
        Ok(())
    }

    fn handle_letter(&mut self, token_idx: usize) {
        if self.engine.select_letter(token_idx) {
            let _ = audio::play_cue(Cue::LetterSelect);
            let _ = self.sync_letter_buttons();
            let _ = self.sync_answer_slots();
        }
    }

    fn handle_delete(&mut self) {
        if self.engine.delete_last_letter() {
            let _ = audio::play_cue(Cue::LetterSelect);
            let _ = self.sync_letter_buttons();
            let _ = self.sync_answer_slots();
        }
    }

    fn handle_submit(&mut self) -> Result<(), JsValue> {
        match self.engine.submit_answer() {
            SubmitOutcome::Ignored => {}
            SubmitOutcome::Correct { score } => {
                self.score_el.set_text_content(Some(&score.to_string()));
                self.sync_letter_buttons()?;
                let _ = audio::play_cue(Cue::Correct);
                self.spawn_confetti()?;

                self.answer_slots.class_list().add_1("correct-animation")?;
                let slots = self.answer_slots.clone();
                schedule(CORRECT_ANIMATION_MS, move || {
                    let _ = slots.class_list().remove_1("correct-animation");
                })?;

                let epoch = self.engine.epoch();
                schedule(ADVANCE_DELAY_MS, move || resolve_deferred(epoch))?;
            }
            SubmitOutcome::Incorrect => {
                let _ = audio::play_cue(Cue::Incorrect);
                self.wrong_mark.class_list().add_1("show")?;
                let mark = self.wrong_mark.clone();
                schedule(INCORRECT_CLEAR_DELAY_MS, move || {
                    let _ = mark.class_list().remove_1("show");
                })?;

                let epoch = self.engine.epoch();
                schedule(INCORRECT_CLEAR_DELAY_MS, move || resolve_deferred(epoch))?;
            }
        }
        Ok(())
    }

    fn sync_letter_buttons(&self) -> Result<(), JsValue> {
        let Some(round) = self.engine.round() else {
            return Ok(());
        };
        for (btn, token) in self.letter_buttons.iter().zip(round.pool().tokens()) {
            btn.set_class_name(match token.state {
                TokenState::Unselected => "letter-btn",
                TokenState::Selected => "letter-btn selected",
                TokenState::Used => "letter-btn used",
            });
        }
        Ok(())
    }

    fn sync_answer_slots(&self) -> Result<(), JsValue> {
        let Some(round) = self.engine.round() else {
            return Ok(());
        };
        let word = round.current_puzzle().word;
        let input = round.pool().input();
        let mut letter_idx = 0usize;
        for (slot, ch) in self.slot_els.iter().zip(word.chars()) {
            if ch == ' ' {
                continue;
            }
            if letter_idx < input.len() {
                slot.set_text_content(Some(&input[letter_idx].to_string()));
                slot.class_list().add_1("filled")?;
            } else {
                slot.set_text_content(Some(""));
                slot.class_list().remove_1("filled")?;
            }
            letter_idx += 1;
        }
        Ok(())
    }

    fn update_timer(&mut self) {
        if self.engine.round().is_some() {
            self.timer_el
                .set_text_content(Some(&format_clock(self.engine.elapsed_ms(now_ms()))));
        }
    }

    fn show_results(&mut self, summary: &RoundSummary) -> Result<(), JsValue> {
        self.show_screen(Screen::Results)?;
        self.final_score
            .set_text_content(Some(&summary.score.to_string()));
        self.final_time
            .set_text_content(Some(&format_clock(summary.elapsed_ms)));
        self.correct_words_el.set_text_content(Some(&format!(
            "{}/{}",
            summary.correct_words, PUZZLES_PER_ROUND
        )));
        let _ = audio::play_cue(Cue::GameComplete);
        // Deserted kiosk: drift back to the attract screen after the window.
        self.arm_attract_timeout()
    }

    fn spawn_confetti(&self) -> Result<(), JsValue> {
        let mut rng = rand::thread_rng();
        self.confetti_el.set_inner_html("");
        for _ in 0..CONFETTI_PIECES {
            let piece: HtmlElement = self.doc.create_element("div")?.dyn_into()?;
            piece.set_class_name("confetti-piece");
            let style = piece.style();
            style.set_property("left", &format!("{:.2}%", rng.gen_range(0.0..100.0)))?;
            style.set_property("animation-delay", &format!("{:.2}s", rng.gen_range(0.0..2.0)))?;
            style.set_property(
                "animation-duration",
                &format!("{:.2}s", rng.gen_range(2.0..4.0)),
            )?;
            self.confetti_el.append_child(&piece)?;
        }
        let confetti = self.confetti_el.clone();
        schedule(CONFETTI_CLEAR_MS, move || confetti.set_inner_html(""))?;
        Ok(())
    }
}
