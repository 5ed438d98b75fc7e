//! The built-in commands.

use crate::engine::{Command, Registry};

pub mod dataset;
pub mod help;
pub mod quit;
pub mod scan;
pub mod simple;
pub mod wifi;

/// The command table of the interactive client, in help order.
pub fn registry() -> Registry {
    Registry::new()
        .with("help", Command::leaf("Display help and return.", help::run))
        .with(
            "hello",
            Command::leaf("Send round trip \"Hello world!\" message.", simple::hello),
        )
        .with(
            "commission",
            Command::leaf(
                "Update the connected device with current dataset.",
                simple::commission,
            ),
        )
        .with(
            "thread",
            Command::container(
                "Manipulate state of the Thread interface of the connected device.",
                Registry::new()
                    .with(
                        "start",
                        Command::leaf("Enable thread interface.", simple::thread_start),
                    )
                    .with(
                        "stop",
                        Command::leaf("Disable thread interface.", simple::thread_stop),
                    ),
            ),
        )
        .with(
            "scan",
            Command::leaf("Perform scan for TCAT devices.", scan::run),
        )
        .with(
            "wifi",
            Command::container(
                "Manage Wi-Fi network connection for TBR.",
                Registry::new()
                    .with(
                        "scan",
                        Command::leaf(
                            "Find available Wi-Fi access points and connect to one of them.",
                            wifi::scan,
                        ),
                    )
                    .with(
                        "status",
                        Command::leaf("Get Wi-Fi connection status for TBR.", wifi::status),
                    ),
            ),
        )
        .with(
            "tbr",
            Command::container(
                "Manage TBR.",
                Registry::new().with("reboot", Command::leaf("Reboot the TBR.", simple::tbr_reboot)),
            ),
        )
        .with(
            "dataset",
            Command::container(
                "View and manipulate the active dataset.",
                Registry::new()
                    .with(
                        "print",
                        Command::leaf("Print the active dataset as hex.", dataset::print),
                    )
                    .with(
                        "set",
                        Command::leaf("Replace the active dataset with <hex>.", dataset::set),
                    )
                    .with(
                        "reset",
                        Command::leaf("Restore the built-in default dataset.", dataset::reset),
                    ),
            ),
        )
        .with(
            "exit",
            Command::leaf("Close the connection and quit.", quit::run),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_level_order() {
        let names: Vec<_> = registry().iter().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            [
                "help",
                "hello",
                "commission",
                "thread",
                "scan",
                "wifi",
                "tbr",
                "dataset",
                "exit"
            ]
        );
    }

    #[test]
    fn containers_hold_their_subcommands() {
        let registry = registry();
        let sub = |name: &str| -> Vec<&'static str> {
            registry
                .get(name)
                .and_then(Command::subcommands)
                .map(|r| r.iter().map(|(n, _)| n).collect())
                .unwrap_or_default()
        };
        assert_eq!(sub("thread"), ["start", "stop"]);
        assert_eq!(sub("wifi"), ["scan", "status"]);
        assert_eq!(sub("tbr"), ["reboot"]);
        assert_eq!(sub("dataset"), ["print", "set", "reset"]);
        assert!(sub("hello").is_empty());
    }
}
