//! Wi-Fi provisioning of a border router.

use futures_util::future::BoxFuture;
use tracing::debug;

use super::simple::{application, request};
use crate::console::prompt::{confirm, password, select_index};
use crate::console::{Confirmation, Prompted};
use crate::engine::{CommandOutcome, CommandResult, Context};
use crate::output::network_table;
use crate::wifi::{collect_networks, collect_status, Reply, CMD_WIFI_SCAN, CMD_WIFI_STATUS};

const NOT_SUPPORTED: &str = "Command not supported";
const STATUS_FAILED: &str = "Wi-Fi status get fail";

pub fn scan<'a>(_args: &'a [String], ctx: &'a mut Context) -> BoxFuture<'a, CommandOutcome> {
    Box::pin(scan_and_connect(ctx))
}

pub fn status<'a>(_args: &'a [String], ctx: &'a mut Context) -> BoxFuture<'a, CommandOutcome> {
    Box::pin(connection_status(ctx))
}

async fn scan_and_connect(ctx: &mut Context) -> CommandOutcome {
    ctx.session_mut()?;
    ctx.println("Wi-Fi scanning...");

    let Some(first) = request(ctx, application(CMD_WIFI_SCAN)).await? else {
        return Ok(CommandResult::None);
    };
    match Reply::of(&first) {
        Reply::NotSupported => {
            ctx.println(NOT_SUPPORTED);
            return Ok(CommandResult::None);
        }
        Reply::Failed => {
            ctx.println(STATUS_FAILED);
            return Ok(CommandResult::None);
        }
        Reply::Ok | Reply::Data => {}
    }

    let (max_bytes, timeout) = (ctx.config.stream_batch_bytes, ctx.config.stream_timeout);
    let Some(frames) = ctx.session_mut()?.recv(max_bytes, timeout).await? else {
        debug!("no scan results before timeout");
        return Ok(CommandResult::None);
    };

    let batch = collect_networks(&frames);
    if batch.failed {
        ctx.println(STATUS_FAILED);
    }
    let networks = batch.networks;
    if networks.is_empty() {
        ctx.println("No Wi-Fi networks found.");
        return Ok(CommandResult::None);
    }

    ctx.println("Found Wi-Fi networks:");
    ctx.println(network_table(&networks));
    ctx.println(
        "Connect to Wi-Fi network?\n\
         After you continue, the network is saved as default \
         and TBR automatically connects to this network.",
    );

    match confirm(ctx.console.as_mut()).await? {
        Confirmation::Confirmed => {}
        Confirmation::Declined | Confirmation::Cancelled => return Ok(CommandResult::None),
    }

    ctx.println("Select Wi-Fi network number to connect to it");
    let network = match select_index(ctx.console.as_mut(), networks.len()).await? {
        Prompted::Value(index) => &networks[index - 1],
        Prompted::Cancelled => return Ok(CommandResult::None),
    };
    let secret = match password(ctx.console.as_mut(), &network.ssid).await? {
        Prompted::Value(secret) => secret,
        Prompted::Cancelled => return Ok(CommandResult::None),
    };

    ctx.println("Store Wi-Fi network...");
    let Some(response) = request(ctx, application(network.add_command(&secret))).await? else {
        return Ok(CommandResult::None);
    };
    if Reply::of(&response) == Reply::Failed {
        ctx.println("Connection fail");
    }
    ctx.println("Wi-Fi network is saved");
    Ok(CommandResult::None)
}

async fn connection_status(ctx: &mut Context) -> CommandOutcome {
    ctx.session_mut()?;
    ctx.println("Wi-Fi status get...");
    ctx.session_mut()?
        .send(&application(CMD_WIFI_STATUS))
        .await?;

    let (max_bytes, timeout) = (ctx.config.stream_batch_bytes, ctx.config.stream_timeout);
    let Some(frames) = ctx.session_mut()?.recv(max_bytes, timeout).await? else {
        debug!("no status before timeout");
        return Ok(CommandResult::None);
    };

    let batch = collect_status(&frames);
    match batch.terminator {
        Some(Reply::NotSupported) => ctx.println(NOT_SUPPORTED),
        Some(Reply::Failed) => ctx.println(STATUS_FAILED),
        _ => {}
    }
    if let Some(status) = batch.status {
        ctx.println(format!("\t{status}"));
    }
    Ok(CommandResult::None)
}
