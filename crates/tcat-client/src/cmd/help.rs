use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::engine::{CommandOutcome, CommandResult, Context};

pub fn run<'a>(_args: &'a [String], ctx: &'a mut Context) -> BoxFuture<'a, CommandOutcome> {
    Box::pin(async move {
        let registry = Arc::clone(&ctx.registry);
        for line in registry.help_lines() {
            ctx.println(line);
        }
        Ok(CommandResult::None)
    })
}
