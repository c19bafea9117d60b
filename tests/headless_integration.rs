use std::collections::HashMap;
use std::time::Duration;

use keyrace::corpus::Corpus;
use keyrace::display::Display;
use keyrace::runtime::{ChannelInput, InputEvent};
use keyrace::scores::{FileScoreStore, MemoryScoreStore, ScoreStore, Scores};
use keyrace::selector::TextSelector;
use keyrace::session::{ExitReason, Session, SessionConfig};

// Headless sessions driven by scripted input events, no TTY involved.

const TEXT: &str = "A map maps keys to values.";

fn instant(save_every_round: bool) -> SessionConfig {
    SessionConfig {
        first_tick: Duration::ZERO,
        save_every_round,
    }
}

fn line(s: &str) -> InputEvent {
    InputEvent::Line(format!("{s}\n"))
}

fn single_text() -> Corpus {
    Corpus::from_lines("single", TEXT).unwrap()
}

#[test]
fn two_rounds_then_input_closes() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileScoreStore::with_path(dir.path().join("scores.json"));
    let (tx, input) = ChannelInput::channel();
    let mut out = Vec::new();

    // Round 1: perfect. Round 2: one typo. Then stdin closes at the continue prompt.
    tx.send(line(TEXT)).unwrap();
    tx.send(line("")).unwrap();
    tx.send(line("A map maps keys to value.")).unwrap();
    tx.send(InputEvent::Closed).unwrap();

    let summary = Session::new(
        single_text(),
        &store,
        input,
        Display::new(&mut out, false),
        TextSelector::seeded(5),
        instant(false),
    )
    .run()
    .unwrap();

    assert_eq!(summary.rounds, 2);
    assert_eq!(summary.new_highscores, 0);
    assert_eq!(summary.reason, ExitReason::InputClosed);
    assert!(summary.saved);

    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("Type the following text as quickly as you can!"));
    assert!(out.contains("Perfect Score - 1000"));
    assert!(out.contains("Off by 1 character\nScore: 900"));
    assert!(!out.contains("NEW HIGHSCORE!"));
    assert_eq!(out.matches("Keep playing").count(), 1);
    assert_eq!(out.matches("Press Enter to type another text").count(), 2);
    assert!(out.trim_end().ends_with("See you later!"));

    // The better of the two rounds made it to disk.
    let (saved, _) = store.load();
    assert_eq!(saved.best(TEXT), Some(1000));
}

#[test]
fn beating_a_stored_score_announces_highscore() {
    let mut initial = HashMap::new();
    initial.insert(TEXT.to_string(), 500);
    let store = MemoryScoreStore::new(Scores::from_map(initial));
    let (tx, input) = ChannelInput::channel();
    let mut out = Vec::new();

    tx.send(line(TEXT)).unwrap();
    tx.send(InputEvent::Interrupt).unwrap();

    let summary = Session::new(
        single_text(),
        &store,
        input,
        Display::new(&mut out, false),
        TextSelector::seeded(5),
        instant(false),
    )
    .run()
    .unwrap();

    assert_eq!(summary.new_highscores, 1);
    assert_eq!(summary.reason, ExitReason::Interrupted);
    assert!(String::from_utf8(out).unwrap().contains("NEW HIGHSCORE!"));

    let saves = store.saved();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].best(TEXT), Some(1000));
}

#[test]
fn losing_to_a_stored_score_keeps_it() {
    let mut initial = HashMap::new();
    initial.insert(TEXT.to_string(), 500);
    let store = MemoryScoreStore::new(Scores::from_map(initial));
    let (tx, input) = ChannelInput::channel();
    let mut out = Vec::new();

    // Eight edits away once trimmed: 200 points.
    tx.send(line("A map maps keys to ")).unwrap();
    tx.send(InputEvent::Closed).unwrap();

    Session::new(
        single_text(),
        &store,
        input,
        Display::new(&mut out, false),
        TextSelector::seeded(5),
        instant(false),
    )
    .run()
    .unwrap();

    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("Off by 8 characters\nScore: 200"));
    assert!(!out.contains("NEW HIGHSCORE!"));
    assert_eq!(store.saved()[0].best(TEXT), Some(500));
}

#[test]
fn save_every_round_persists_each_round() {
    let store = MemoryScoreStore::new(Scores::new());
    let (tx, input) = ChannelInput::channel();
    let mut out = Vec::new();

    tx.send(line(TEXT)).unwrap();
    tx.send(line("")).unwrap();
    tx.send(line(TEXT)).unwrap();
    tx.send(InputEvent::Interrupt).unwrap();

    let summary = Session::new(
        single_text(),
        &store,
        input,
        Display::new(&mut out, false),
        TextSelector::seeded(5),
        instant(true),
    )
    .run()
    .unwrap();

    assert_eq!(summary.rounds, 2);
    // One save per round plus the one on exit.
    assert_eq!(store.saved().len(), 3);
}

#[test]
fn interrupt_while_typing_saves_previous_rounds() {
    let store = MemoryScoreStore::new(Scores::new());
    let (tx, input) = ChannelInput::channel();
    let mut out = Vec::new();

    tx.send(line("A map maps keys to valuez.")).unwrap();
    tx.send(line("")).unwrap();
    tx.send(InputEvent::Interrupt).unwrap();

    let summary = Session::new(
        single_text(),
        &store,
        input,
        Display::new(&mut out, false),
        TextSelector::seeded(5),
        instant(false),
    )
    .run()
    .unwrap();

    assert_eq!(summary.rounds, 1);
    let saves = store.saved();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].as_map().get(TEXT), Some(&900));
}

#[test]
fn corrupt_score_file_warns_and_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scores.json");
    std::fs::write(&path, "{ not json").unwrap();
    let store = FileScoreStore::with_path(&path);
    let (tx, input) = ChannelInput::channel();
    let mut out = Vec::new();

    tx.send(line(TEXT)).unwrap();
    tx.send(InputEvent::Closed).unwrap();

    Session::new(
        single_text(),
        &store,
        input,
        Display::new(&mut out, false),
        TextSelector::seeded(5),
        instant(false),
    )
    .run()
    .unwrap();

    let out = String::from_utf8(out).unwrap();
    assert!(out.starts_with("Score file is corrupt, starting fresh"));

    let (saved, _) = store.load();
    assert_eq!(saved.best(TEXT), Some(1000));
    assert_eq!(saved.len(), 1);
}

#[test]
fn rounds_alternate_between_texts() {
    let corpus = Corpus::from_lines("pair", "first text\nsecond text").unwrap();
    let store = MemoryScoreStore::new(Scores::new());
    let (tx, input) = ChannelInput::channel();
    let mut out = Vec::new();

    // Six rounds; stdin closes at the sixth continue prompt.
    for round in 0..6 {
        tx.send(line("whatever")).unwrap();
        if round < 5 {
            tx.send(line("")).unwrap();
        }
    }
    tx.send(InputEvent::Closed).unwrap();

    let summary = Session::new(
        corpus,
        &store,
        input,
        Display::new(&mut out, false),
        TextSelector::seeded(11),
        instant(false),
    )
    .run()
    .unwrap();
    assert_eq!(summary.rounds, 6);

    let out = String::from_utf8(out).unwrap();
    let shown: Vec<&str> = out
        .lines()
        .filter_map(|l| l.strip_prefix("  "))
        .filter(|l| l.ends_with("text"))
        .collect();
    assert_eq!(shown.len(), 6);
    for pair in shown.windows(2) {
        assert_ne!(pair[0], pair[1]);
    }
}
