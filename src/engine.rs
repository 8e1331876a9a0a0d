//! Gameplay state machine.
//!
//! `RoundEngine` owns everything the presentation layer renders: which
//! puzzles were drawn for the round, the per-puzzle letter pool, score and
//! progress, and the deferred transitions that follow a submit (advance
//! after a correct answer, input reset after a wrong one). The module is
//! pure Rust with no browser types so the whole state machine runs under
//! native `cargo test`; `app.rs` feeds it user actions and a clock.
//!
//! Deferred transitions are epoch-guarded: the caller schedules a timeout,
//! remembers `epoch()`, and hands it back when the timeout fires. Any
//! transition in between (a round restart in particular) bumps the epoch,
//! so a stale callback resolves to a no-op instead of mutating the new
//! round.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::PuzzleEntry;

// --- Round constants ---------------------------------------------------------

pub const PUZZLES_PER_ROUND: usize = 3;
pub const SCORE_PER_WORD: u32 = 100;

/// Delay before advancing past a solved puzzle (the celebration window).
pub const ADVANCE_DELAY_MS: i32 = 2000;
/// Delay before a wrong answer's input is wiped.
pub const INCORRECT_CLEAR_DELAY_MS: i32 = 1000;
/// Inactivity window after which the idle screen re-arms.
pub const ATTRACT_TIMEOUT_MS: i32 = 30_000;

// --- Letter pool -------------------------------------------------------------

/// Lifecycle of one selectable letter token. Transitions run forward only:
/// `Unselected -> Selected -> Used`, with deletion of the most recent pick
/// as the single way back from `Selected` to `Unselected`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenState {
    Unselected,
    Selected,
    Used,
}

/// One selectable letter affordance. Distinct from the character it
/// carries: a de-duplicated pool offers one token per unique letter, and
/// that token may be picked repeatedly to cover words with repeated
/// letters ("ALPHAGAN P" needs three A's from its single A token).
#[derive(Clone, Copy, Debug)]
pub struct LetterToken {
    pub letter: char,
    pub state: TokenState,
}

/// Per-puzzle selection state: the shuffled token vector plus the ordered
/// list of picks (token indices) the player has made so far.
#[derive(Clone, Debug, Default)]
pub struct LetterPool {
    tokens: Vec<LetterToken>,
    picks: Vec<usize>,
    target_len: usize,
}

impl LetterPool {
    fn for_puzzle<R: Rng>(puzzle: &PuzzleEntry, rng: &mut R) -> Self {
        let mut letters = puzzle.unique_letters();
        // Presentation order only; correctness never depends on it.
        letters.shuffle(rng);
        Self {
            tokens: letters
                .into_iter()
                .map(|letter| LetterToken {
                    letter,
                    state: TokenState::Unselected,
                })
                .collect(),
            picks: Vec::new(),
            target_len: puzzle.letter_count(),
        }
    }

    pub fn tokens(&self) -> &[LetterToken] {
        &self.tokens
    }

    /// Letters picked so far, in pick order.
    pub fn input(&self) -> Vec<char> {
        self.picks.iter().map(|&i| self.tokens[i].letter).collect()
    }

    pub fn input_len(&self) -> usize {
        self.picks.len()
    }

    fn candidate(&self) -> String {
        self.picks.iter().map(|&i| self.tokens[i].letter).collect()
    }

    fn select(&mut self, token_idx: usize) -> bool {
        let Some(token) = self.tokens.get_mut(token_idx) else {
            return false;
        };
        if token.state == TokenState::Used || self.picks.len() >= self.target_len {
            return false;
        }
        token.state = TokenState::Selected;
        self.picks.push(token_idx);
        true
    }

    fn delete_last(&mut self) -> bool {
        let Some(idx) = self.picks.pop() else {
            return false;
        };
        // The token stays Selected while an earlier pick still uses it.
        if !self.picks.contains(&idx) {
            self.tokens[idx].state = TokenState::Unselected;
        }
        true
    }

    /// Wrong-answer reset: picks wiped, Selected tokens released. Used
    /// tokens never regress.
    fn clear_selection(&mut self) {
        self.picks.clear();
        for token in &mut self.tokens {
            if token.state == TokenState::Selected {
                token.state = TokenState::Unselected;
            }
        }
    }

    /// Correct-answer finalization: every Selected token is spent.
    fn mark_used(&mut self) {
        for token in &mut self.tokens {
            if token.state == TokenState::Selected {
                token.state = TokenState::Used;
            }
        }
    }
}

// --- Round state -------------------------------------------------------------

/// Deferred transition armed by a submit, resolved by the scheduled
/// callback (or silently dropped when superseded).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pending {
    Advance,
    ClearInput,
}

/// State of one active round: three puzzles drawn without replacement,
/// cumulative score, and the letter pool of the current puzzle.
#[derive(Clone, Debug)]
pub struct Round {
    puzzles: Vec<&'static PuzzleEntry>,
    index: usize,
    score: u32,
    correct_words: u32,
    start_ms: f64,
    pool: LetterPool,
    pending: Option<Pending>,
}

impl Round {
    pub fn puzzles(&self) -> &[&'static PuzzleEntry] {
        &self.puzzles
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn current_puzzle(&self) -> &'static PuzzleEntry {
        self.puzzles[self.index]
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn correct_words(&self) -> u32 {
        self.correct_words
    }

    pub fn pool(&self) -> &LetterPool {
        &self.pool
    }

    /// True while a post-submit delay is outstanding; player input is
    /// ignored until the pending transition resolves.
    pub fn awaiting_resolution(&self) -> bool {
        self.pending.is_some()
    }
}

/// Final report handed to the results screen. Immutable once produced.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RoundSummary {
    pub score: u32,
    pub correct_words: u32,
    pub elapsed_ms: f64,
}

/// Where the engine is between rounds.
#[derive(Clone, Debug)]
pub enum Phase {
    /// Attract screen; no round state exists.
    Idle,
    Active(Round),
    /// Results screen; summary kept until reset or idle timeout.
    Complete(RoundSummary),
}

// --- Reported outcomes -------------------------------------------------------

/// Fire-and-forget audio cue keys consumed by the effects collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    LetterSelect,
    Correct,
    Incorrect,
    NewPuzzle,
    GameComplete,
}

/// What a submit did. `Ignored` covers empty input and submits arriving
/// while an earlier resolution is still pending.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SubmitOutcome {
    Ignored,
    Correct { score: u32 },
    Incorrect,
}

/// What a deferred callback did when it finally fired.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ResolveOutcome {
    /// Epoch mismatch or nothing pending; the callback was superseded.
    Stale,
    /// Advanced to the next puzzle (0-based index).
    PuzzleLoaded(usize),
    RoundComplete(RoundSummary),
    InputCleared,
}

// --- Engine ------------------------------------------------------------------

/// The puzzle round engine. One instance per game surface; the caller
/// supplies the RNG and a monotonic clock (milliseconds) so the engine
/// stays deterministic under test.
pub struct RoundEngine {
    catalog: &'static [PuzzleEntry],
    phase: Phase,
    epoch: u64,
}

impl RoundEngine {
    /// Catalog must hold at least [`PUZZLES_PER_ROUND`] entries.
    pub fn new(catalog: &'static [PuzzleEntry]) -> Self {
        debug_assert!(catalog.len() >= PUZZLES_PER_ROUND);
        Self {
            catalog,
            phase: Phase::Idle,
            epoch: 0,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn round(&self) -> Option<&Round> {
        match &self.phase {
            Phase::Active(round) => Some(round),
            _ => None,
        }
    }

    pub fn summary(&self) -> Option<&RoundSummary> {
        match &self.phase {
            Phase::Complete(summary) => Some(summary),
            _ => None,
        }
    }

    /// Cancellation token for deferred callbacks. Capture it when
    /// scheduling; pass it back on fire. Any superseding transition bumps
    /// it, so the stale callback lands in [`ResolveOutcome::Stale`].
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    fn bump(&mut self) {
        self.epoch += 1;
    }

    /// Elapsed round time for display. Active rounds derive it from the
    /// supplied clock; completed rounds report the frozen summary value.
    pub fn elapsed_ms(&self, now_ms: f64) -> f64 {
        match &self.phase {
            Phase::Idle => 0.0,
            Phase::Active(round) => now_ms - round.start_ms,
            Phase::Complete(summary) => summary.elapsed_ms,
        }
    }

    /// Starts a fresh round: three distinct catalog entries drawn
    /// uniformly without replacement (full shuffle, prefix taken), score
    /// and progress reset, puzzle 0 loaded. Supersedes any pending
    /// deferred callback from a previous round.
    pub fn start_round<R: Rng>(&mut self, rng: &mut R, now_ms: f64) -> &Round {
        let mut order: Vec<usize> = (0..self.catalog.len()).collect();
        order.shuffle(rng);
        let puzzles: Vec<&'static PuzzleEntry> = order
            .into_iter()
            .take(PUZZLES_PER_ROUND)
            .map(|i| &self.catalog[i])
            .collect();
        let pool = LetterPool::for_puzzle(puzzles[0], rng);
        self.phase = Phase::Active(Round {
            puzzles,
            index: 0,
            score: 0,
            correct_words: 0,
            start_ms: now_ms,
            pool,
            pending: None,
        });
        self.bump();
        match &self.phase {
            Phase::Active(round) => round,
            _ => unreachable!(),
        }
    }

    /// Appends the token's letter to the current input and marks it
    /// Selected. No-op (returns false) on Used tokens, on full input, or
    /// while a submit resolution is pending.
    pub fn select_letter(&mut self, token_idx: usize) -> bool {
        match &mut self.phase {
            Phase::Active(round) if round.pending.is_none() => round.pool.select(token_idx),
            _ => false,
        }
    }

    /// Undoes the most recent selection. No-op on empty input or while a
    /// resolution is pending.
    pub fn delete_last_letter(&mut self) -> bool {
        match &mut self.phase {
            Phase::Active(round) if round.pending.is_none() => round.pool.delete_last(),
            _ => false,
        }
    }

    /// Compares the picked letters against the target word (spaces
    /// removed, case-sensitive). A match scores and arms the advance
    /// delay; a mismatch arms the input-clear delay. Empty input and
    /// already-pending states are ignored.
    pub fn submit_answer(&mut self) -> SubmitOutcome {
        let Phase::Active(round) = &mut self.phase else {
            return SubmitOutcome::Ignored;
        };
        if round.pending.is_some() || round.pool.input_len() == 0 {
            return SubmitOutcome::Ignored;
        }
        if round.pool.candidate() == round.current_puzzle().answer() {
            round.pool.mark_used();
            round.score += SCORE_PER_WORD;
            round.correct_words += 1;
            round.pending = Some(Pending::Advance);
            let score = round.score;
            self.bump();
            SubmitOutcome::Correct { score }
        } else {
            round.pending = Some(Pending::ClearInput);
            self.bump();
            SubmitOutcome::Incorrect
        }
    }

    /// Entry point for the deferred callbacks armed by [`submit_answer`].
    /// `epoch` is the value captured at scheduling time; a mismatch means
    /// the callback was superseded and nothing happens.
    pub fn resolve_pending<R: Rng>(
        &mut self,
        rng: &mut R,
        epoch: u64,
        now_ms: f64,
    ) -> ResolveOutcome {
        if epoch != self.epoch {
            return ResolveOutcome::Stale;
        }
        let Phase::Active(round) = &mut self.phase else {
            return ResolveOutcome::Stale;
        };
        match round.pending.take() {
            None => ResolveOutcome::Stale,
            Some(Pending::ClearInput) => {
                round.pool.clear_selection();
                self.bump();
                ResolveOutcome::InputCleared
            }
            Some(Pending::Advance) => {
                if round.index + 1 < round.puzzles.len() {
                    round.index += 1;
                    round.pool = LetterPool::for_puzzle(round.current_puzzle(), rng);
                    let index = round.index;
                    self.bump();
                    ResolveOutcome::PuzzleLoaded(index)
                } else {
                    let summary = RoundSummary {
                        score: round.score,
                        correct_words: round.correct_words,
                        elapsed_ms: now_ms - round.start_ms,
                    };
                    self.phase = Phase::Complete(summary);
                    self.bump();
                    ResolveOutcome::RoundComplete(summary)
                }
            }
        }
    }

    /// Idle-timeout action: drops a lingering results screen back to the
    /// attract state. Never interrupts an active round, and a stale epoch
    /// (a round started since scheduling) is a no-op.
    pub fn idle_reset(&mut self, epoch: u64) -> bool {
        if epoch != self.epoch {
            return false;
        }
        match self.phase {
            Phase::Active(_) => false,
            Phase::Idle | Phase::Complete(_) => {
                self.phase = Phase::Idle;
                self.bump();
                true
            }
        }
    }

    /// Explicit return to the attract state (play-again flow).
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.bump();
    }
}
