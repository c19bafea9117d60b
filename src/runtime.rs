use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use tracing::debug;

/// Unified event type consumed by the session loop
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// A full line, including its trailing newline if one was read.
    Line(String),
    /// The input stream reached end-of-file or failed.
    Closed,
    /// The user asked to quit (Ctrl+C).
    Interrupt,
}

/// Source of input events the session blocks on.
pub trait InputSource {
    /// Block until the next event. Implementations return `Closed` once
    /// no more events can arrive.
    fn next_event(&self) -> InputEvent;
}

/// Input source backed by an mpsc channel.
///
/// Several producers can feed the same channel: the stdin reader thread
/// and the signal handler share it in production, tests push scripted events.
pub struct ChannelInput {
    rx: Receiver<InputEvent>,
}

impl ChannelInput {
    pub fn new(rx: Receiver<InputEvent>) -> Self {
        Self { rx }
    }

    /// Channel pair with no reader attached.
    pub fn channel() -> (Sender<InputEvent>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self::new(rx))
    }

    /// Spawn a thread forwarding stdin lines into a new channel.
    ///
    /// Returns an extra sender so other producers (the interrupt handler)
    /// can feed the same stream.
    pub fn stdin() -> (Sender<InputEvent>, Self) {
        let (tx, input) = Self::channel();
        spawn_line_reader(io::stdin(), tx.clone());
        (tx, input)
    }
}

impl InputSource for ChannelInput {
    fn next_event(&self) -> InputEvent {
        self.rx.recv().unwrap_or(InputEvent::Closed)
    }
}

/// Forward lines from `reader` until EOF or a read error, then send `Closed`.
///
/// Lines are read as raw bytes; invalid UTF-8 is replaced rather than
/// treated as the end of input.
pub fn spawn_line_reader<R>(reader: R, tx: Sender<InputEvent>) -> thread::JoinHandle<()>
where
    R: io::Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = io::BufReader::new(reader);
        loop {
            let mut buf = Vec::new();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => {
                    debug!("input closed");
                    let _ = tx.send(InputEvent::Closed);
                    break;
                }
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf).into_owned();
                    if tx.send(InputEvent::Line(line)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    debug!(error = %e, "input read failed");
                    let _ = tx.send(InputEvent::Closed);
                    break;
                }
            }
        }
    })
}
