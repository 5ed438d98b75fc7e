//! Interactive prompts used by the workflows.
//!
//! Every prompt treats Ctrl-C and end of input as a cancellation, never as an error.

use std::io;

use tcat_transport::PeerDescriptor;

use super::{Console, Input};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompted<T> {
    Value(T),
    Cancelled,
}

pub(crate) const INTERRUPTED: &str = "Interrupted by user.";

/// Ask `[Y]es/[n]o` until the answer is one of the two.
pub async fn confirm(console: &mut dyn Console) -> io::Result<Confirmation> {
    loop {
        let answer = match console.read_line("Do you want to continue? [Y]es/[n]o\n> ").await? {
            Input::Line(line) => line.trim().to_lowercase(),
            Input::Interrupted | Input::Eof => {
                console.println(INTERRUPTED);
                return Ok(Confirmation::Cancelled);
            }
        };
        match answer.as_str() {
            "y" | "yes" => return Ok(Confirmation::Confirmed),
            "n" | "no" => return Ok(Confirmation::Declined),
            _ => console.println("Try again."),
        }
    }
}

/// Ask for a number in `1..=max`, re-prompting until one is given.
pub async fn select_index(console: &mut dyn Console, max: usize) -> io::Result<Prompted<usize>> {
    loop {
        let line = match console.read_line("> ").await? {
            Input::Line(line) => line,
            Input::Interrupted | Input::Eof => {
                console.println(INTERRUPTED);
                return Ok(Prompted::Cancelled);
            }
        };
        match line.trim().parse::<usize>() {
            Ok(index) if (1..=max).contains(&index) => return Ok(Prompted::Value(index)),
            _ => console.println(&format!("Enter a number between 1 and {max}.")),
        }
    }
}

/// Ask for a non-empty password for `network`.
pub async fn password(console: &mut dyn Console, network: &str) -> io::Result<Prompted<String>> {
    let prompt = format!("Password for \"{network}\"\n> ");
    loop {
        match console.read_line(&prompt).await? {
            Input::Line(line) if !line.is_empty() => return Ok(Prompted::Value(line)),
            Input::Line(_) => console.println("The password is too short. Try again."),
            Input::Interrupted | Input::Eof => {
                console.println(INTERRUPTED);
                return Ok(Prompted::Cancelled);
            }
        }
    }
}

/// List discovered devices and let the user pick one.
pub async fn select_device(
    console: &mut dyn Console,
    devices: &[PeerDescriptor],
) -> io::Result<Prompted<PeerDescriptor>> {
    if devices.is_empty() {
        console.println("No devices found.");
        return Ok(Prompted::Cancelled);
    }

    console.println("Found devices:");
    for (index, device) in devices.iter().enumerate() {
        console.println(&format!("{}: {device}", index + 1));
    }
    console.println("Select device number");

    Ok(match select_index(console, devices.len()).await? {
        Prompted::Value(index) => Prompted::Value(devices[index - 1].clone()),
        Prompted::Cancelled => Prompted::Cancelled,
    })
}
