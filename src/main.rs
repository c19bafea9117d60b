use anyhow::{Context, Result};
use clap::Parser;
use crossterm::tty::IsTty;
use keyrace::{
    config::{Config, ConfigStore, FileConfigStore},
    corpus::{BuiltinCorpus, Corpus},
    display::Display,
    runtime::{ChannelInput, InputEvent},
    scores::{FileScoreStore, ScoreStore},
    selector::TextSelector,
    session::{Session, SessionConfig},
    shutdown::ShutdownSignal,
};
use std::{io, path::PathBuf, sync::Arc};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// retype a line of text as fast and as accurately as you can
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal typing game. Each round shows a line of text; retype it, and the edit distance to the original decides your score. The best score for every text is kept between runs."
)]
pub struct Cli {
    /// file the high scores are kept in [default: scores.json]
    #[clap(long)]
    scores: Option<PathBuf>,

    /// built-in corpus to draw texts from
    #[clap(short = 'c', long, value_enum)]
    corpus: Option<BuiltinCorpus>,

    /// custom corpus file, one text per line
    #[clap(short = 't', long, conflicts_with = "corpus")]
    texts: Option<PathBuf>,

    /// countdown tick in milliseconds before the first round (later rounds use 3/4 of it)
    #[clap(long)]
    countdown_ms: Option<u64>,

    /// save scores after every round instead of only on exit
    #[clap(long)]
    save_every_round: bool,

    /// seed text selection for a reproducible sequence
    #[clap(long)]
    seed: Option<u64>,

    /// print the stored high scores and exit
    #[clap(short = 'l', long)]
    list: bool,

    /// write the effective settings to the config file and exit
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Flags win over the config file.
    fn apply(&self, mut cfg: Config) -> Config {
        if let Some(path) = &self.scores {
            cfg.scores_path = path.clone();
        }
        if let Some(corpus) = self.corpus {
            cfg.corpus = corpus;
        }
        if let Some(ms) = self.countdown_ms {
            cfg.countdown_ms = ms;
        }
        if self.save_every_round {
            cfg.save_every_round = true;
        }
        cfg
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("keyrace=warn")),
        )
        .init();

    let cli = Cli::parse();
    let config_store = FileConfigStore::new();
    let config = cli.apply(config_store.load());

    if cli.save_config {
        config_store
            .save(&config)
            .with_context(|| format!("failed to write {}", config_store.path().display()))?;
        println!("Saved settings to {}", config_store.path().display());
        return Ok(());
    }

    let store = FileScoreStore::with_path(&config.scores_path);

    if cli.list {
        let (scores, _) = store.load();
        Display::new(io::stdout(), false).scoreboard(&scores)?;
        return Ok(());
    }

    let corpus = match &cli.texts {
        Some(path) => Corpus::from_file(path)?,
        None => config.corpus.load()?,
    };
    info!(corpus = %corpus.name, texts = corpus.len(), scores = %config.scores_path.display(), "starting");

    let shutdown = Arc::new(ShutdownSignal::new());
    let (events, input) = ChannelInput::stdin();

    let signal = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        info!("received interrupt");
        signal.trigger();
        let _ = events.send(InputEvent::Interrupt);
    })
    .context("failed to install Ctrl+C handler")?;

    let selector = match cli.seed {
        Some(seed) => TextSelector::seeded(seed),
        None => TextSelector::new(),
    };

    let stdout = io::stdout();
    let overwrite_prompt = stdout.is_tty();
    let session = Session::new(
        corpus,
        store,
        input,
        Display::new(stdout, overwrite_prompt),
        selector,
        SessionConfig::from(&config),
    )
    .with_shutdown(shutdown);

    let summary = session.run()?;
    info!(
        rounds = summary.rounds,
        new_highscores = summary.new_highscores,
        reason = ?summary.reason,
        saved = summary.saved,
        "session ended"
    );

    Ok(())
}
