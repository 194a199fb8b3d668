use std::io::BufRead;
use std::thread;

use tokio::sync::mpsc;
use tracing::warn;

#[derive(Debug, PartialEq, Eq)]
pub enum InputEvent {
    Line(String),
    Eof,
}

/// Reads lines on a dedicated thread and hands them to the async loop.
///
/// Runs on a plain thread, not a runtime blocking task: a read still pending
/// at exit must not hold up runtime shutdown.
pub struct InputHandler {
    rx: mpsc::UnboundedReceiver<InputEvent>,
}

impl InputHandler {
    pub fn stdin() -> Self {
        Self::spawn(std::io::BufReader::new(std::io::stdin()))
    }

    pub fn spawn<R>(reader: R) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();

        thread::spawn(move || {
            for line in reader.lines() {
                match line {
                    Ok(line) => {
                        if tx.send(InputEvent::Line(line)).is_err() {
                            return;
                        }
                    }
                    Err(err) => {
                        warn!("failed to read input: {err}");
                        break;
                    }
                }
            }
            let _ = tx.send(InputEvent::Eof);
        });

        Self { rx }
    }

    #[cfg(test)]
    pub(crate) fn from_receiver(rx: mpsc::UnboundedReceiver<InputEvent>) -> Self {
        Self { rx }
    }

    /// Next line, or `Eof` once the reader is exhausted.
    pub async fn next(&mut self) -> InputEvent {
        self.rx.recv().await.unwrap_or(InputEvent::Eof)
    }
}
