//! Command registry, dispatch and the interactive loop.

mod context;
mod registry;
mod result;

use std::sync::Arc;

use tracing::debug;

pub use context::{Collaborators, Context};
pub use registry::{Command, Handler, Registry, Resolution};
pub use result::{CommandError, CommandOutcome, CommandResult};

use crate::console::prompt::INTERRUPTED;
use crate::console::Input;
use crate::output::render_result;

const PROMPT: &str = "> ";

/// Run one input line against the registry in `ctx`.
pub async fn dispatch(ctx: &mut Context, line: &str) -> CommandOutcome {
    let words: Vec<String> = line.split_whitespace().map(str::to_string).collect();
    if words.is_empty() {
        return Ok(CommandResult::None);
    }

    let registry = Arc::clone(&ctx.registry);
    match registry.resolve(&words) {
        Resolution::Run { handler, consumed } => {
            debug!(command = %words[..consumed].join(" "), "dispatch");
            handler(&words[consumed..], ctx).await
        }
        Resolution::MissingSubcommand => {
            ctx.println("Invalid usage. Provide a subcommand.");
            Ok(CommandResult::None)
        }
        Resolution::Unknown(name) => Err(CommandError::UnknownCommand(name.to_string())),
    }
}

/// Read, dispatch and render until `exit`, end of input or Ctrl-C at the prompt.
///
/// Ctrl-C while a command runs cancels that command and returns to the prompt.
pub async fn run(ctx: &mut Context) -> Result<(), CommandError> {
    while !ctx.exit_requested() {
        let line = match ctx.console.read_line(PROMPT).await? {
            Input::Line(line) => line,
            Input::Interrupted | Input::Eof => break,
        };

        let interrupt = ctx.console.interrupt();
        let outcome = tokio::select! {
            biased;
            outcome = dispatch(ctx, &line) => Some(outcome),
            () = interrupt => None,
        };
        match outcome {
            Some(Ok(result)) => {
                if let Some(text) = render_result(&result, ctx.config.format) {
                    ctx.println(text);
                }
            }
            Some(Err(err)) => ctx.println(format!("error: {err}")),
            None => {
                ctx.println(INTERRUPTED);
                ctx.discard_unfinished_session().await;
            }
        }

        ctx.discard_closed_session();
    }

    ctx.invalidate_session().await;
    Ok(())
}
