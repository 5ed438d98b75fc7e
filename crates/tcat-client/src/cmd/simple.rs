//! Single request, single response commands.

use futures_util::future::BoxFuture;
use tcat_tlv::{Tlv, TlvType};
use tracing::debug;

use crate::engine::{CommandError, CommandOutcome, CommandResult, Context};
use crate::wifi::Reply;

/// Send `request` and wait for one answer. `None` means the device did not answer.
pub async fn request(ctx: &mut Context, request: Tlv) -> Result<Option<Tlv>, CommandError> {
    let response = ctx.session_mut()?.send_with_response(&request).await?;
    if response.is_none() {
        debug!(tlv_type = request.tlv_type, "no response");
    }
    Ok(response)
}

/// An `Application` request carrying `text`.
pub fn application(text: impl Into<String>) -> Tlv {
    Tlv::new(TlvType::Application, text.into().into_bytes())
}

pub fn hello<'a>(_args: &'a [String], ctx: &'a mut Context) -> BoxFuture<'a, CommandOutcome> {
    Box::pin(async move {
        ctx.session_mut()?;
        ctx.println("Sending hello world...");
        let response = request(ctx, application("Hello world!")).await?;
        Ok(CommandResult::from_response(response))
    })
}

pub fn commission<'a>(_args: &'a [String], ctx: &'a mut Context) -> BoxFuture<'a, CommandOutcome> {
    Box::pin(async move {
        ctx.session_mut()?;
        ctx.println("Commissioning...");
        let dataset = Tlv::new(TlvType::ActiveDataset, ctx.dataset.to_bytes());
        let response = request(ctx, dataset).await?;
        Ok(CommandResult::from_response(response))
    })
}

pub fn thread_start<'a>(
    _args: &'a [String],
    ctx: &'a mut Context,
) -> BoxFuture<'a, CommandOutcome> {
    Box::pin(async move {
        ctx.session_mut()?;
        ctx.println("Enabling Thread...");
        let response = request(ctx, Tlv::new(TlvType::ThreadStart, Vec::new())).await?;
        Ok(CommandResult::from_response(response))
    })
}

pub fn thread_stop<'a>(
    _args: &'a [String],
    ctx: &'a mut Context,
) -> BoxFuture<'a, CommandOutcome> {
    Box::pin(async move {
        ctx.session_mut()?;
        ctx.println("Disabling Thread...");
        let response = request(ctx, Tlv::new(TlvType::ThreadStop, Vec::new())).await?;
        Ok(CommandResult::from_response(response))
    })
}

pub fn tbr_reboot<'a>(_args: &'a [String], ctx: &'a mut Context) -> BoxFuture<'a, CommandOutcome> {
    Box::pin(async move {
        let Some(response) = request(ctx, application("reboot")).await? else {
            return Ok(CommandResult::None);
        };
        if Reply::of(&response) == Reply::Failed {
            ctx.println("Command execution fail");
        }
        Ok(CommandResult::Tlv(response))
    })
}
