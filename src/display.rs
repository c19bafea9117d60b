//! Everything the game prints.
//!
//! Output goes through a generic writer so the session can be driven
//! headless in tests and against stdout in the binary.

use crossterm::{cursor, queue, style::Print};
use std::io::{self, Write};
use std::time::Duration;

use crate::scores::{HighscoreOutcome, Scores};
use crate::scoring::RoundResult;

pub const PROMPT_PREFIX: &str = "> ";

pub fn pluralize(word: &str, n: usize) -> String {
    if n == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

/// Human readable elapsed time: `850ms`, `4.21s`, `1m3.50s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", elapsed.as_millis())
    } else if secs < 60.0 {
        format!("{secs:.2}s")
    } else {
        let minutes = elapsed.as_secs() / 60;
        let rest = secs - (minutes * 60) as f64;
        format!("{minutes}m{rest:.2}s")
    }
}

pub struct Display<W: Write> {
    out: W,
    overwrite_prompt: bool,
}

impl<W: Write> Display<W> {
    /// `overwrite_prompt` enables the type-over-the-text trick; only
    /// meaningful when `out` is a terminal.
    pub fn new(out: W, overwrite_prompt: bool) -> Self {
        Self {
            out,
            overwrite_prompt,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }

    pub fn intro(&mut self) -> io::Result<()> {
        self.line("Type the following text as quickly as you can!")
    }

    pub fn countdown_tick(&mut self, n: u32) -> io::Result<()> {
        self.line(&format!("{n} ..."))
    }

    pub fn go(&mut self) -> io::Result<()> {
        self.line("Go!")?;
        self.line("")
    }

    /// Show the text, then put the cursor back at the start of the line
    /// behind a fresh prompt so the user types over it.
    pub fn prompt(&mut self, text: &str) -> io::Result<()> {
        if self.overwrite_prompt {
            queue!(
                self.out,
                Print(PROMPT_PREFIX),
                Print(text),
                cursor::MoveToColumn(0),
                Print(PROMPT_PREFIX)
            )?;
        } else {
            writeln!(self.out, "  {text}")?;
            write!(self.out, "{PROMPT_PREFIX}")?;
        }
        self.out.flush()
    }

    pub fn result(&mut self, result: &RoundResult) -> io::Result<()> {
        self.line("")?;
        self.line(&format!("Finished in {}!", format_elapsed(result.elapsed)))?;

        if result.is_perfect() {
            return self.line(&format!("Perfect Score - {}", result.score));
        }

        self.line(&format!(
            "Off by {} {}",
            result.distance,
            pluralize("character", result.distance)
        ))?;
        if result.score == 0 {
            self.line("No score")
        } else {
            self.line(&format!("Score: {}", result.score))
        }
    }

    pub fn highscore(&mut self, outcome: HighscoreOutcome) -> io::Result<()> {
        match outcome {
            HighscoreOutcome::NewHighscore { .. } => self.line("NEW HIGHSCORE!"),
            HighscoreOutcome::FirstPlay | HighscoreOutcome::NotBeaten { .. } => Ok(()),
        }
    }

    pub fn first_round_hint(&mut self) -> io::Result<()> {
        self.line("")?;
        self.line("Keep playing to see text-specific scores and records!")
    }

    pub fn continue_prompt(&mut self) -> io::Result<()> {
        self.line("")?;
        self.line("Press Enter to type another text or Ctrl+C to abort")
    }

    pub fn warning(&mut self, message: &str) -> io::Result<()> {
        self.line(message)
    }

    pub fn farewell(&mut self) -> io::Result<()> {
        self.line("")?;
        self.line("See you later!")
    }

    pub fn scoreboard(&mut self, scores: &Scores) -> io::Result<()> {
        if scores.is_empty() {
            return self.line("No scores recorded yet.");
        }
        for (text, score) in scores.ranked() {
            self.line(&format!("{score:>5}  {text}"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Display<Vec<u8>>) -> io::Result<()>,
    {
        let mut display = Display::new(Vec::new(), false);
        f(&mut display).unwrap();
        String::from_utf8(display.into_inner()).unwrap()
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("character", 1), "character");
        assert_eq!(pluralize("character", 0), "characters");
        assert_eq!(pluralize("character", 4), "characters");
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(850)), "850ms");
        assert_eq!(format_elapsed(Duration::from_millis(4210)), "4.21s");
        assert_eq!(format_elapsed(Duration::from_millis(63_500)), "1m3.50s");
    }

    #[test]
    fn test_perfect_result() {
        let out = render(|d| {
            d.result(&RoundResult {
                elapsed: Duration::from_secs(3),
                distance: 0,
                score: 1000,
            })
        });
        assert!(out.contains("Finished in 3.00s!"));
        assert!(out.contains("Perfect Score - 1000"));
        assert!(!out.contains("Off by"));
    }

    #[test]
    fn test_imperfect_result() {
        let out = render(|d| {
            d.result(&RoundResult {
                elapsed: Duration::from_secs(2),
                distance: 1,
                score: 900,
            })
        });
        assert!(out.contains("Off by 1 character\n"));
        assert!(out.contains("Score: 900"));
    }

    #[test]
    fn test_no_score_result() {
        let out = render(|d| {
            d.result(&RoundResult {
                elapsed: Duration::from_secs(2),
                distance: 12,
                score: 0,
            })
        });
        assert!(out.contains("Off by 12 characters"));
        assert!(out.contains("No score"));
        assert!(!out.contains("Score: "));
    }

    #[test]
    fn test_highscore_only_on_new_best() {
        assert_eq!(render(|d| d.highscore(HighscoreOutcome::FirstPlay)), "");
        assert_eq!(
            render(|d| d.highscore(HighscoreOutcome::NotBeaten { best: 500 })),
            ""
        );
        assert_eq!(
            render(|d| d.highscore(HighscoreOutcome::NewHighscore { previous: 500 })),
            "NEW HIGHSCORE!\n"
        );
    }

    #[test]
    fn test_plain_prompt() {
        let out = render(|d| d.prompt("A map maps keys to values."));
        assert_eq!(out, "  A map maps keys to values.\n> ");
    }

    #[test]
    fn test_overwrite_prompt_returns_to_column_zero() {
        let mut display = Display::new(Vec::new(), true);
        display.prompt("Hello, world.").unwrap();
        let out = String::from_utf8(display.into_inner()).unwrap();

        assert!(out.starts_with("> Hello, world."));
        assert!(out.ends_with("> "));
        assert!(out.contains('\u{1b}'));
    }

    #[test]
    fn test_scoreboard() {
        let mut scores = Scores::new();
        scores.record("Hello, world.", 1000);
        scores.record("A map maps keys to values.", 300);

        let out = render(|d| d.scoreboard(&scores));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, vec![" 1000  Hello, world.", "  300  A map maps keys to values."]);

        assert_eq!(render(|d| d.scoreboard(&Scores::new())), "No scores recorded yet.\n");
    }
}
