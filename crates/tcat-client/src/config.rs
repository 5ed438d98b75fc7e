use std::path::PathBuf;
use std::time::Duration;

use tcat_session::SessionConfig;

use crate::output::OutputFormat;

/// Identity the device must present during the handshake.
pub const DEFAULT_SERVER_NAME: &str = "DeviceType";

/// Directory holding the commissioner PEM files.
pub const DEFAULT_AUTH_DIR: &str = "auth";

/// Client-wide settings shared by every command.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_name: String,
    pub auth_dir: PathBuf,
    pub session: SessionConfig,
    /// Read size for streamed multi-record answers.
    pub stream_batch_bytes: usize,
    /// How long to wait for a streamed batch.
    pub stream_timeout: Duration,
    pub format: OutputFormat,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_name: DEFAULT_SERVER_NAME.to_string(),
            auth_dir: PathBuf::from(DEFAULT_AUTH_DIR),
            session: SessionConfig::default(),
            stream_batch_bytes: 4096,
            stream_timeout: Duration::from_secs(15),
            format: OutputFormat::Pretty,
        }
    }
}
