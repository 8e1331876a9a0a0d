// Integration tests (native) for the gameplay state machine.
// These tests avoid wasm-specific functionality; the engine takes a seeded
// RNG and an explicit clock so every scenario here is deterministic.

use std::collections::HashSet;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use pharma_wordscape::engine::{
    Phase, ResolveOutcome, RoundEngine, SubmitOutcome, TokenState, PUZZLES_PER_ROUND,
    SCORE_PER_WORD,
};
use pharma_wordscape::{PuzzleEntry, CATALOG};

fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

// Small fixed catalog so scenarios can target a specific word.
static TEST_CATALOG: &[PuzzleEntry] = &[
    PuzzleEntry {
        word: "LUMIGAN",
        description: "A prostamide that lowers IOP.",
        reference: "Bimatoprost PI.",
    },
    PuzzleEntry {
        word: "PURITE",
        description: "A disappearing preservative.",
        reference: "Freeman PD, Kahook MY.",
    },
    PuzzleEntry {
        word: "OZURDEX",
        description: "A dexamethasone implant.",
        reference: "Ozurdex Product Insert.",
    },
    PuzzleEntry {
        word: "ALPHAGAN P",
        description: "Brimonidine Tartrate ophthalmic solution.",
        reference: "Alphagan P Product Insert.",
    },
];

/// Starts rounds with increasing seeds until `word` is the current puzzle.
fn start_round_on(engine: &mut RoundEngine, word: &str, now_ms: f64) {
    for seed in 0..1000 {
        engine.start_round(&mut rng(seed), now_ms);
        if engine.round().unwrap().current_puzzle().word == word {
            return;
        }
    }
    panic!("no seed under 1000 put '{}' first", word);
}

fn token_index(engine: &RoundEngine, letter: char) -> usize {
    engine
        .round()
        .unwrap()
        .pool()
        .tokens()
        .iter()
        .position(|t| t.letter == letter)
        .unwrap_or_else(|| panic!("no token for letter '{}'", letter))
}

/// Picks the current puzzle's answer letter by letter.
fn spell_answer(engine: &mut RoundEngine) {
    let answer = engine.round().unwrap().current_puzzle().answer();
    for c in answer.chars() {
        let idx = token_index(engine, c);
        assert!(engine.select_letter(idx), "selecting '{}' was refused", c);
    }
}

#[test]
fn start_round_draws_three_distinct_puzzles() {
    let mut engine = RoundEngine::new(CATALOG);
    for seed in 0..50 {
        engine.start_round(&mut rng(seed), 0.0);
        let round = engine.round().unwrap();
        assert_eq!(round.puzzles().len(), PUZZLES_PER_ROUND);
        let words: HashSet<&str> = round.puzzles().iter().map(|p| p.word).collect();
        assert_eq!(words.len(), PUZZLES_PER_ROUND, "seed {} drew a repeat puzzle", seed);
        for p in round.puzzles() {
            assert!(CATALOG.iter().any(|c| c.word == p.word), "puzzle not from catalog");
        }
        assert_eq!(round.score(), 0);
        assert_eq!(round.correct_words(), 0);
        assert_eq!(round.current_index(), 0);
    }
}

#[test]
fn pool_offers_one_token_per_unique_letter() {
    let mut engine = RoundEngine::new(CATALOG);
    for seed in 0..50 {
        engine.start_round(&mut rng(seed), 0.0);
        let round = engine.round().unwrap();
        let puzzle = round.current_puzzle();
        let offered: Vec<char> = round.pool().tokens().iter().map(|t| t.letter).collect();
        assert_eq!(
            offered.len(),
            puzzle.unique_letters().len(),
            "token count mismatch for '{}'",
            puzzle.word
        );
        let offered_set: HashSet<char> = offered.iter().copied().collect();
        let expected: HashSet<char> = puzzle.unique_letters().into_iter().collect();
        assert_eq!(offered_set, expected, "token letters mismatch for '{}'", puzzle.word);
        assert!(round
            .pool()
            .tokens()
            .iter()
            .all(|t| t.state == TokenState::Unselected));
    }
}

#[test]
fn lumigan_spelled_in_order_scores_one_hundred() {
    let mut engine = RoundEngine::new(TEST_CATALOG);
    start_round_on(&mut engine, "LUMIGAN", 0.0);

    for c in ['L', 'U', 'M', 'I', 'G', 'A', 'N'] {
        let idx = token_index(&engine, c);
        assert!(engine.select_letter(idx));
    }
    assert_eq!(engine.round().unwrap().pool().input(), vec!['L', 'U', 'M', 'I', 'G', 'A', 'N']);

    assert_eq!(
        engine.submit_answer(),
        SubmitOutcome::Correct { score: SCORE_PER_WORD }
    );
    let round = engine.round().unwrap();
    assert_eq!(round.score(), SCORE_PER_WORD);
    assert_eq!(round.correct_words(), 1);
    // Every picked token is spent once the answer lands.
    assert!(round
        .pool()
        .tokens()
        .iter()
        .all(|t| t.state == TokenState::Used));
    assert!(round.awaiting_resolution());
}

#[test]
fn delete_undoes_the_most_recent_selection() {
    let mut engine = RoundEngine::new(TEST_CATALOG);
    start_round_on(&mut engine, "LUMIGAN", 0.0);

    for c in ['L', 'U', 'M', 'I', 'G', 'A', 'N'] {
        let idx = token_index(&engine, c);
        engine.select_letter(idx);
    }
    let n_idx = token_index(&engine, 'N');

    assert!(engine.delete_last_letter());
    let round = engine.round().unwrap();
    assert_eq!(round.pool().input(), vec!['L', 'U', 'M', 'I', 'G', 'A']);
    assert_eq!(round.pool().tokens()[n_idx].state, TokenState::Unselected);

    // Selecting then deleting is an exact inverse.
    let before: Vec<TokenState> = round.pool().tokens().iter().map(|t| t.state).collect();
    assert!(engine.select_letter(n_idx));
    assert!(engine.delete_last_letter());
    let round = engine.round().unwrap();
    let after: Vec<TokenState> = round.pool().tokens().iter().map(|t| t.state).collect();
    assert_eq!(before, after);
    assert_eq!(round.pool().input_len(), 6);
}

#[test]
fn delete_on_empty_input_is_a_noop() {
    let mut engine = RoundEngine::new(TEST_CATALOG);
    engine.start_round(&mut rng(0), 0.0);
    assert!(!engine.delete_last_letter());
    assert_eq!(engine.round().unwrap().pool().input_len(), 0);
}

#[test]
fn submit_on_empty_input_is_ignored() {
    let mut engine = RoundEngine::new(TEST_CATALOG);
    engine.start_round(&mut rng(0), 0.0);
    assert_eq!(engine.submit_answer(), SubmitOutcome::Ignored);
    assert!(!engine.round().unwrap().awaiting_resolution());
}

#[test]
fn wrong_answer_clears_input_after_resolution() {
    let mut engine = RoundEngine::new(TEST_CATALOG);
    start_round_on(&mut engine, "PURITE", 0.0);

    // Any non-matching pick sequence goes down the incorrect path.
    let idx = token_index(&engine, 'E');
    engine.select_letter(idx);
    assert_eq!(engine.submit_answer(), SubmitOutcome::Incorrect);

    let round = engine.round().unwrap();
    assert!(round.awaiting_resolution());
    assert_eq!(round.score(), 0, "score never decreases and a miss never scores");
    assert_eq!(round.correct_words(), 0);

    // Input is locked until the deferred reset fires.
    assert!(!engine.select_letter(idx));
    assert!(!engine.delete_last_letter());
    assert_eq!(engine.submit_answer(), SubmitOutcome::Ignored);

    let epoch = engine.epoch();
    assert_eq!(
        engine.resolve_pending(&mut rng(1), epoch, 500.0),
        ResolveOutcome::InputCleared
    );
    let round = engine.round().unwrap();
    assert_eq!(round.pool().input_len(), 0);
    assert!(round
        .pool()
        .tokens()
        .iter()
        .all(|t| t.state == TokenState::Unselected));
    // Fully recoverable: the puzzle can still be solved.
    spell_answer(&mut engine);
    assert!(matches!(engine.submit_answer(), SubmitOutcome::Correct { .. }));
}

#[test]
fn three_solves_complete_the_round_exactly_once() {
    let mut engine = RoundEngine::new(TEST_CATALOG);
    engine.start_round(&mut rng(7), 1_000.0);

    for puzzle_no in 0..PUZZLES_PER_ROUND {
        assert_eq!(engine.round().unwrap().current_index(), puzzle_no);
        spell_answer(&mut engine);
        assert!(matches!(engine.submit_answer(), SubmitOutcome::Correct { .. }));
        let epoch = engine.epoch();
        let outcome = engine.resolve_pending(&mut rng(99), epoch, 61_000.0);
        if puzzle_no + 1 < PUZZLES_PER_ROUND {
            assert_eq!(outcome, ResolveOutcome::PuzzleLoaded(puzzle_no + 1));
        } else {
            match outcome {
                ResolveOutcome::RoundComplete(summary) => {
                    assert_eq!(summary.score, 3 * SCORE_PER_WORD);
                    assert_eq!(summary.correct_words, 3);
                    assert_eq!(summary.elapsed_ms, 60_000.0);
                }
                other => panic!("expected completion, got {:?}", other),
            }
        }
    }

    assert!(engine.round().is_none());
    assert_eq!(engine.summary().unwrap().score, 3 * SCORE_PER_WORD);
    // A late duplicate callback must not re-complete the round.
    let epoch = engine.epoch();
    assert_eq!(
        engine.resolve_pending(&mut rng(0), epoch, 99_000.0),
        ResolveOutcome::Stale
    );
}

#[test]
fn repeated_letters_reuse_a_single_token() {
    let mut engine = RoundEngine::new(TEST_CATALOG);
    start_round_on(&mut engine, "ALPHAGAN P", 0.0);

    let round = engine.round().unwrap();
    // A-L-P-H-G-N: six tokens for a nine-letter answer.
    assert_eq!(round.pool().tokens().len(), 6);
    assert_eq!(round.current_puzzle().answer(), "ALPHAGANP");

    // The single A token is picked three times; a Selected token stays
    // clickable until the puzzle resolves.
    spell_answer(&mut engine);
    assert_eq!(
        engine.round().unwrap().pool().input(),
        "ALPHAGANP".chars().collect::<Vec<_>>()
    );

    // Input is capped at the answer length.
    let a_idx = token_index(&engine, 'A');
    assert!(!engine.select_letter(a_idx));

    assert!(matches!(engine.submit_answer(), SubmitOutcome::Correct { .. }));
}

#[test]
fn deleting_a_repeated_pick_keeps_earlier_picks_selected() {
    let mut engine = RoundEngine::new(TEST_CATALOG);
    start_round_on(&mut engine, "ALPHAGAN P", 0.0);

    let a_idx = token_index(&engine, 'A');
    assert!(engine.select_letter(a_idx));
    assert!(engine.select_letter(a_idx));
    assert!(engine.delete_last_letter());

    let round = engine.round().unwrap();
    assert_eq!(round.pool().input(), vec!['A']);
    // One pick still references the token, so it must stay Selected.
    assert_eq!(round.pool().tokens()[a_idx].state, TokenState::Selected);

    assert!(engine.delete_last_letter());
    let round = engine.round().unwrap();
    assert_eq!(round.pool().tokens()[a_idx].state, TokenState::Unselected);
}

#[test]
fn restarting_a_round_supersedes_pending_callbacks() {
    let mut engine = RoundEngine::new(TEST_CATALOG);
    start_round_on(&mut engine, "PURITE", 0.0);

    let idx = token_index(&engine, 'P');
    engine.select_letter(idx);
    assert_eq!(engine.submit_answer(), SubmitOutcome::Incorrect);
    let stale_epoch = engine.epoch();

    // Round restarted before the clear delay fires.
    engine.start_round(&mut rng(3), 10_000.0);
    assert_eq!(
        engine.resolve_pending(&mut rng(0), stale_epoch, 11_000.0),
        ResolveOutcome::Stale
    );
    let round = engine.round().unwrap();
    assert_eq!(round.score(), 0);
    assert_eq!(round.pool().input_len(), 0, "stale callback must not touch the new round");
    assert!(!round.awaiting_resolution());
}

#[test]
fn selecting_out_of_range_token_is_a_noop() {
    let mut engine = RoundEngine::new(TEST_CATALOG);
    engine.start_round(&mut rng(0), 0.0);
    let count = engine.round().unwrap().pool().tokens().len();
    assert!(!engine.select_letter(count));
    assert_eq!(engine.round().unwrap().pool().input_len(), 0);
}

#[test]
fn actions_outside_an_active_round_are_noops() {
    let mut engine = RoundEngine::new(TEST_CATALOG);
    assert!(!engine.select_letter(0));
    assert!(!engine.delete_last_letter());
    assert_eq!(engine.submit_answer(), SubmitOutcome::Ignored);
    let epoch = engine.epoch();
    assert_eq!(
        engine.resolve_pending(&mut rng(0), epoch, 0.0),
        ResolveOutcome::Stale
    );
    assert_eq!(engine.elapsed_ms(5_000.0), 0.0);
}

#[test]
fn elapsed_time_is_an_on_demand_query() {
    let mut engine = RoundEngine::new(TEST_CATALOG);
    engine.start_round(&mut rng(0), 1_000.0);
    assert_eq!(engine.elapsed_ms(1_000.0), 0.0);
    assert_eq!(engine.elapsed_ms(75_500.0), 74_500.0);
}

#[test]
fn idle_reset_returns_results_screen_to_idle() {
    let mut engine = RoundEngine::new(TEST_CATALOG);
    engine.start_round(&mut rng(7), 0.0);
    for _ in 0..PUZZLES_PER_ROUND {
        spell_answer(&mut engine);
        engine.submit_answer();
        let epoch = engine.epoch();
        engine.resolve_pending(&mut rng(99), epoch, 30_000.0);
    }
    assert!(matches!(engine.phase(), Phase::Complete(_)));

    let epoch = engine.epoch();
    assert!(engine.idle_reset(epoch));
    assert!(matches!(engine.phase(), Phase::Idle));
}

#[test]
fn idle_reset_never_interrupts_an_active_round() {
    let mut engine = RoundEngine::new(TEST_CATALOG);
    // Timeout armed while idle, firing after a round has started.
    let armed_epoch = engine.epoch();
    engine.start_round(&mut rng(0), 0.0);
    assert!(!engine.idle_reset(armed_epoch));
    assert!(engine.round().is_some());

    // Even a current epoch cannot reset mid-round.
    let epoch = engine.epoch();
    assert!(!engine.idle_reset(epoch));
    assert!(engine.round().is_some());
}

#[test]
fn score_and_correct_words_never_decrease() {
    let mut engine = RoundEngine::new(TEST_CATALOG);
    engine.start_round(&mut rng(11), 0.0);

    // Miss, recover, solve: score only ever moves up.
    engine.select_letter(0);
    engine.submit_answer();
    let epoch = engine.epoch();
    engine.resolve_pending(&mut rng(0), epoch, 1_000.0);
    assert_eq!(engine.round().unwrap().score(), 0);

    spell_answer(&mut engine);
    engine.submit_answer();
    let round = engine.round().unwrap();
    assert_eq!(round.score(), SCORE_PER_WORD);
    assert_eq!(round.correct_words(), 1);
}
