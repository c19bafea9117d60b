use rand::rngs::StdRng;
use rand::Rng;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::corpus::Corpus;
use crate::display::Display;
use crate::runtime::{InputEvent, InputSource};
use crate::scores::{HighscoreOutcome, LoadOutcome, ScoreStore, Scores};
use crate::scoring::RoundResult;
use crate::selector::TextSelector;
use crate::shutdown::ShutdownSignal;

pub const COUNTDOWN_FROM: u32 = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Countdown tick before the first round. Later rounds tick at 3/4 of this.
    pub first_tick: Duration,
    /// Persist after every completed round, not only on exit.
    pub save_every_round: bool,
}

impl SessionConfig {
    pub fn tick(&self, first_round: bool) -> Duration {
        if first_round {
            self.first_tick
        } else {
            self.first_tick * 3 / 4
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SessionConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            first_tick: Duration::from_millis(cfg.countdown_ms),
            save_every_round: cfg.save_every_round,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Interrupted,
    InputClosed,
}

/// Where the session loop is within a round.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Countdown,
    Prompting,
    AwaitingInput { text_idx: usize },
    Scoring { text_idx: usize, typed: String, elapsed: Duration },
    Reporting { text_idx: usize, result: RoundResult },
    Continue,
    Terminate(ExitReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub rounds: usize,
    pub new_highscores: usize,
    pub reason: ExitReason,
    pub saved: bool,
}

/// Drives rounds until the input closes or the user interrupts.
pub struct Session<I, W, S, R = StdRng>
where
    I: InputSource,
    W: Write,
    S: ScoreStore,
    R: Rng,
{
    corpus: Corpus,
    store: S,
    scores: Scores,
    load_outcome: LoadOutcome,
    input: I,
    display: Display<W>,
    selector: TextSelector<R>,
    shutdown: Arc<ShutdownSignal>,
    config: SessionConfig,
    rounds: usize,
    new_highscores: usize,
}

impl<I, W, S, R> Session<I, W, S, R>
where
    I: InputSource,
    W: Write,
    S: ScoreStore,
    R: Rng,
{
    /// Loads the score map from `store` straight away.
    pub fn new(
        corpus: Corpus,
        store: S,
        input: I,
        display: Display<W>,
        selector: TextSelector<R>,
        config: SessionConfig,
    ) -> Self {
        let (scores, load_outcome) = store.load();
        Self {
            corpus,
            store,
            scores,
            load_outcome,
            input,
            display,
            selector,
            shutdown: Arc::new(ShutdownSignal::new()),
            config,
            rounds: 0,
            new_highscores: 0,
        }
    }

    /// Share the signal the interrupt handler triggers.
    pub fn with_shutdown(mut self, shutdown: Arc<ShutdownSignal>) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn scores(&self) -> &Scores {
        &self.scores
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load_outcome
    }

    /// Play until terminated, then save once and say goodbye.
    ///
    /// An output error still goes through the save before being returned.
    pub fn run(mut self) -> io::Result<SessionSummary> {
        let played = self.play();
        let reason = played.as_ref().map_or(ExitReason::Interrupted, |r| *r);
        let summary = self.finish(reason)?;
        played?;
        Ok(summary)
    }

    fn play(&mut self) -> io::Result<ExitReason> {
        self.report_load()?;

        let mut phase = Phase::Countdown;
        loop {
            phase = self.step(phase)?;
            if let Phase::Terminate(reason) = phase {
                return Ok(reason);
            }
        }
    }

    fn report_load(&mut self) -> io::Result<()> {
        match &self.load_outcome {
            LoadOutcome::Loaded(n) => debug!(entries = n, "starting with saved scores"),
            LoadOutcome::Missing => {}
            LoadOutcome::Unreadable(_) => {
                self.display
                    .warning("Failed to load scores, starting fresh")?;
            }
            LoadOutcome::Corrupt(_) => {
                self.display
                    .warning("Score file is corrupt, starting fresh")?;
            }
        }
        Ok(())
    }

    /// Advance the state machine by one phase.
    pub fn step(&mut self, phase: Phase) -> io::Result<Phase> {
        debug!(?phase, "step");
        let next = match phase {
            Phase::Countdown => self.countdown()?,
            Phase::Prompting => {
                let text_idx = self.selector.pick_next(self.corpus.len());
                let text = self.corpus.get(text_idx).unwrap_or_default();
                self.display.prompt(text)?;
                Phase::AwaitingInput { text_idx }
            }
            Phase::AwaitingInput { text_idx } => {
                let started = Instant::now();
                let event = self.input.next_event();
                let elapsed = started.elapsed();
                match event {
                    InputEvent::Line(typed) => Phase::Scoring {
                        text_idx,
                        typed,
                        elapsed,
                    },
                    other => self.terminate(other),
                }
            }
            Phase::Scoring {
                text_idx,
                typed,
                elapsed,
            } => {
                let result = RoundResult::new(elapsed, &typed, self.text(text_idx));
                Phase::Reporting { text_idx, result }
            }
            Phase::Reporting { text_idx, result } => {
                self.report(text_idx, &result)?;
                Phase::Continue
            }
            Phase::Continue => {
                self.display.continue_prompt()?;
                match self.input.next_event() {
                    InputEvent::Line(_) => Phase::Countdown,
                    other => self.terminate(other),
                }
            }
            Phase::Terminate(reason) => Phase::Terminate(reason),
        };
        Ok(next)
    }

    fn countdown(&mut self) -> io::Result<Phase> {
        if self.shutdown.is_shutdown() {
            return Ok(Phase::Terminate(ExitReason::Interrupted));
        }

        let tick = self.config.tick(self.rounds == 0);
        self.display.intro()?;
        for n in (1..=COUNTDOWN_FROM).rev() {
            self.display.countdown_tick(n)?;
            if self.shutdown.wait(tick) {
                return Ok(Phase::Terminate(ExitReason::Interrupted));
            }
        }
        self.display.go()?;
        Ok(Phase::Prompting)
    }

    fn report(&mut self, text_idx: usize, result: &RoundResult) -> io::Result<()> {
        self.display.result(result)?;

        let text = self.text(text_idx).to_string();
        let outcome = self.scores.record(&text, result.score);
        self.display.highscore(outcome)?;

        info!(
            distance = result.distance,
            score = result.score,
            elapsed_ms = result.elapsed.as_millis() as u64,
            ?outcome,
            "round finished"
        );

        if let HighscoreOutcome::NewHighscore { .. } = outcome {
            self.new_highscores += 1;
        }
        self.rounds += 1;

        if self.config.save_every_round {
            self.persist()?;
        }

        if self.rounds == 1 {
            self.display.first_round_hint()?;
        }
        Ok(())
    }

    fn terminate(&self, event: InputEvent) -> Phase {
        let reason = match event {
            InputEvent::Closed => ExitReason::InputClosed,
            InputEvent::Interrupt | InputEvent::Line(_) => ExitReason::Interrupted,
        };
        debug!(?reason, "terminating");
        Phase::Terminate(reason)
    }

    fn text(&self, idx: usize) -> &str {
        self.corpus.get(idx).unwrap_or_default()
    }

    /// Save the score map. Failure is reported, never fatal.
    fn persist(&mut self) -> io::Result<bool> {
        match self.store.save(&self.scores) {
            Ok(()) => Ok(true),
            Err(e) => {
                error!(error = %e, "failed to save scores");
                self.display.warning("Failed to save scores")?;
                Ok(false)
            }
        }
    }

    /// The single shutdown path: one save, one farewell.
    fn finish(&mut self, reason: ExitReason) -> io::Result<SessionSummary> {
        if reason == ExitReason::InputClosed {
            info!("input closed, shutting down");
        }
        let saved = self.persist()?;
        self.display.farewell()?;

        Ok(SessionSummary {
            rounds: self.rounds,
            new_highscores: self.new_highscores,
            reason,
            saved,
        })
    }
}
