//! Discover a device, connect and establish the secure session.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use tcat_session::SecureSession;
use tracing::info;

use crate::console::prompt::select_device;
use crate::console::Prompted;
use crate::engine::{CommandOutcome, CommandResult, Context};

pub fn run<'a>(_args: &'a [String], ctx: &'a mut Context) -> BoxFuture<'a, CommandOutcome> {
    Box::pin(scan_and_connect(ctx))
}

async fn scan_and_connect(ctx: &mut Context) -> CommandOutcome {
    ctx.invalidate_session().await;

    let discovery = Arc::clone(&ctx.discovery);
    let devices = discovery.scan().await?;
    info!(count = devices.len(), "discovered devices");

    let device = match select_device(ctx.console.as_mut(), &devices).await? {
        Prompted::Value(device) => device,
        Prompted::Cancelled => return Ok(CommandResult::None),
    };

    ctx.println(format!("Connecting to {device}"));
    let connector = Arc::clone(&ctx.connector);
    let mut session =
        SecureSession::open(connector.as_ref(), &device, ctx.config.session.clone()).await?;
    session.load_credentials(ctx.credentials.load()?)?;

    ctx.println("Setting up secure channel...");
    session.handshake(&ctx.config.server_name).await?;
    ctx.println("Done");

    ctx.install_session(session).await;
    Ok(CommandResult::None)
}
