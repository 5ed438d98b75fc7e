//! Line-oriented terminal I/O for the command loop and prompts.

use std::io::{self, Write};

use futures_util::future::BoxFuture;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::warn;

pub mod prompt;

pub use prompt::{Confirmation, Prompted};

/// One answer from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Line(String),
    /// Ctrl-C while waiting for input.
    Interrupted,
    /// Input closed.
    Eof,
}

/// Where commands print and prompts read.
pub trait Console: Send {
    fn println(&mut self, line: &str);

    /// Show `prompt` and wait for one line.
    fn read_line<'a>(&'a mut self, prompt: &'a str) -> BoxFuture<'a, io::Result<Input>>;

    /// Resolves on the next user interrupt. The command loop races each
    /// command against it.
    fn interrupt(&self) -> BoxFuture<'static, ()> {
        Box::pin(std::future::pending())
    }
}

/// Console on the process stdin/stdout. Ctrl-C is reported as
/// [`Input::Interrupted`] at a prompt and cancels a command otherwise.
pub struct StdConsole {
    lines: Lines<BufReader<Stdin>>,
}

impl StdConsole {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for StdConsole {
    fn println(&mut self, line: &str) {
        println!("{line}");
    }

    fn read_line<'a>(&'a mut self, prompt: &'a str) -> BoxFuture<'a, io::Result<Input>> {
        Box::pin(async move {
            let mut out = io::stdout();
            out.write_all(prompt.as_bytes())?;
            out.flush()?;

            tokio::select! {
                line = self.lines.next_line() => Ok(match line? {
                    Some(line) => Input::Line(line),
                    None => Input::Eof,
                }),
                signal = tokio::signal::ctrl_c() => {
                    signal?;
                    println!();
                    Ok(Input::Interrupted)
                }
            }
        })
    }

    fn interrupt(&self) -> BoxFuture<'static, ()> {
        Box::pin(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(%err, "cannot listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
    }
}
