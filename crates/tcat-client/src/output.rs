use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use tcat_tlv::{type_name, Tlv};

use crate::engine::CommandResult;
use crate::wifi::NetworkRecord;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct TlvOutput<'a> {
    tlv_type: u8,
    type_name: &'a str,
    length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    value: String,
}

/// Render a command result, or `None` when there is nothing to show.
pub fn render_result(result: &CommandResult, format: OutputFormat) -> Option<String> {
    match result {
        CommandResult::None => None,
        CommandResult::Tlv(tlv) => Some(render_tlv(tlv, format)),
    }
}

pub fn render_tlv(tlv: &Tlv, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            let out = TlvOutput {
                tlv_type: tlv.tlv_type,
                type_name: type_name(tlv.tlv_type),
                length: tlv.value.len(),
                status: tlv.status().map(|s| s.name()),
                text: printable_text(&tlv.value),
                value: hex::encode(&tlv.value),
            };
            serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TYPE", "LENGTH", "VALUE"])
                .add_row(vec![
                    type_label(tlv),
                    tlv.value.len().to_string(),
                    value_preview(tlv),
                ]);
            table.to_string()
        }
        OutputFormat::Pretty => format!(
            "{} len={} value={}",
            type_label(tlv),
            tlv.value.len(),
            value_preview(tlv)
        ),
        OutputFormat::Raw => match tlv.to_bytes() {
            Ok(wire) => hex::encode(wire),
            Err(_) => hex::encode(&tlv.value),
        },
    }
}

/// Scan results as shown before the user picks a network.
pub fn network_table(networks: &[NetworkRecord]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Num", "SSID", "Chan", "Band", "RSSI"]);
    for network in networks {
        table.add_row(vec![
            network.id.as_str(),
            network.ssid.as_str(),
            network.channel.as_str(),
            network.band.as_str(),
            network.rssi.as_str(),
        ]);
    }
    table.to_string()
}

fn type_label(tlv: &Tlv) -> String {
    format!("{} (0x{:02x})", type_name(tlv.tlv_type), tlv.tlv_type)
}

fn value_preview(tlv: &Tlv) -> String {
    if let Some(status) = tlv.status() {
        return status.name().to_string();
    }
    match printable_text(&tlv.value) {
        Some(text) => format!("\"{text}\""),
        None => hex::encode(&tlv.value),
    }
}

fn printable_text(value: &[u8]) -> Option<&str> {
    let text = std::str::from_utf8(value).ok()?;
    (!text.is_empty() && !text.chars().any(char::is_control)).then_some(text)
}

#[cfg(test)]
mod tests {
    use tcat_tlv::TlvType;

    use super::*;

    #[test]
    fn pretty_shows_status_name() {
        let tlv = Tlv::new(TlvType::ResponseWithStatus, vec![0u8]);
        let text = render_tlv(&tlv, OutputFormat::Pretty);
        assert!(text.starts_with("RESPONSE_W_STATUS (0x01)"), "{text}");
        assert!(text.ends_with("value=SUCCESS"), "{text}");
    }

    #[test]
    fn pretty_quotes_text_and_hexes_binary() {
        let text = Tlv::new(TlvType::Application, &b"Hello world!"[..]);
        assert!(render_tlv(&text, OutputFormat::Pretty).ends_with("value=\"Hello world!\""));

        let binary = Tlv::new(TlvType::ResponseWithPayload, vec![0x00, 0xff]);
        assert!(render_tlv(&binary, OutputFormat::Pretty).ends_with("value=00ff"));
    }

    #[test]
    fn json_is_parseable() {
        let tlv = Tlv::new(TlvType::Application, &b"RESP_OK"[..]);
        let out = render_tlv(&tlv, OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["tlv_type"], 0x82);
        assert_eq!(value["length"], 7);
        assert_eq!(value["text"], "RESP_OK");
        assert!(value.get("status").is_none());
    }

    #[test]
    fn raw_is_wire_hex() {
        let tlv = Tlv::new(TlvType::ThreadStart, Vec::new());
        assert_eq!(render_tlv(&tlv, OutputFormat::Raw), "2700");
    }

    #[test]
    fn none_result_renders_nothing() {
        assert!(render_result(&CommandResult::None, OutputFormat::Pretty).is_none());
    }

    #[test]
    fn network_table_lists_every_ssid() {
        let networks: Vec<NetworkRecord> = ["1|HomeNet|6|2.4GHz|-40|WPA2", "2|Office|36|5GHz|-61|WPA3"]
            .iter()
            .map(|r| r.parse().unwrap())
            .collect();
        let table = network_table(&networks);
        assert!(table.contains("SSID"));
        let home = table.find("HomeNet").unwrap();
        let office = table.find("Office").unwrap();
        assert!(home < office);
    }
}
