use futures_util::future::BoxFuture;

use crate::engine::{CommandOutcome, CommandResult, Context};

pub fn run<'a>(_args: &'a [String], ctx: &'a mut Context) -> BoxFuture<'a, CommandOutcome> {
    Box::pin(async move {
        ctx.invalidate_session().await;
        ctx.request_exit();
        Ok(CommandResult::None)
    })
}
