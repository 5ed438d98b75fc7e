use futures_util::future::BoxFuture;

use crate::dataset::ActiveDataset;
use crate::engine::{CommandError, CommandOutcome, CommandResult, Context};

pub fn print<'a>(_args: &'a [String], ctx: &'a mut Context) -> BoxFuture<'a, CommandOutcome> {
    Box::pin(async move {
        let hex = ctx.dataset.to_hex();
        ctx.println(hex);
        Ok(CommandResult::None)
    })
}

pub fn set<'a>(args: &'a [String], ctx: &'a mut Context) -> BoxFuture<'a, CommandOutcome> {
    Box::pin(async move {
        let [hex] = args else {
            return Err(CommandError::Usage("dataset set <hex>".to_string()));
        };
        ctx.dataset = ActiveDataset::from_hex(hex)?;
        let len = ctx.dataset.len();
        ctx.println(format!("Dataset updated ({len} bytes)."));
        Ok(CommandResult::None)
    })
}

pub fn reset<'a>(_args: &'a [String], ctx: &'a mut Context) -> BoxFuture<'a, CommandOutcome> {
    Box::pin(async move {
        ctx.dataset = ActiveDataset::default();
        ctx.println("Dataset reset to default.");
        Ok(CommandResult::None)
    })
}
