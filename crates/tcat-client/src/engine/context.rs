use std::sync::Arc;

use tcat_session::{CredentialStore, SecureSession};
use tcat_transport::{Connector, Discovery};
use tracing::{debug, info};

use super::registry::Registry;
use super::result::CommandError;
use crate::config::ClientConfig;
use crate::console::Console;
use crate::dataset::ActiveDataset;

/// External services a context talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub discovery: Arc<dyn Discovery>,
    pub connector: Arc<dyn Connector>,
    pub credentials: Arc<dyn CredentialStore>,
}

/// State shared by every command for the lifetime of the command loop.
///
/// Only `scan` replaces the session and only the dataset commands change the
/// dataset. At most one session exists at a time.
pub struct Context {
    pub session: Option<SecureSession>,
    pub dataset: ActiveDataset,
    pub registry: Arc<Registry>,
    pub console: Box<dyn Console>,
    pub discovery: Arc<dyn Discovery>,
    pub connector: Arc<dyn Connector>,
    pub credentials: Arc<dyn CredentialStore>,
    pub config: ClientConfig,
    exit_requested: bool,
}

impl Context {
    pub fn new(
        registry: Arc<Registry>,
        console: Box<dyn Console>,
        collaborators: Collaborators,
        config: ClientConfig,
    ) -> Self {
        Self {
            session: None,
            dataset: ActiveDataset::default(),
            registry,
            console,
            discovery: collaborators.discovery,
            connector: collaborators.connector,
            credentials: collaborators.credentials,
            config,
            exit_requested: false,
        }
    }

    pub fn println(&mut self, line: impl AsRef<str>) {
        self.console.println(line.as_ref());
    }

    /// The established session, or [`CommandError::NotConnected`].
    pub fn session_mut(&mut self) -> Result<&mut SecureSession, CommandError> {
        match self.session.as_mut() {
            Some(session) if session.is_established() => Ok(session),
            _ => Err(CommandError::NotConnected),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.session.as_ref().is_some_and(SecureSession::is_established)
    }

    /// Close and drop the current session, if any.
    pub async fn invalidate_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            debug!(state = %session.state(), "tearing down session");
            session.close().await;
        }
    }

    /// Make `session` current, closing any previous one first.
    pub async fn install_session(&mut self, session: SecureSession) {
        self.invalidate_session().await;
        self.session = Some(session);
    }

    /// Drop a session the peer has closed. Returns whether one was dropped.
    pub fn discard_closed_session(&mut self) -> bool {
        if self.session.as_ref().is_some_and(SecureSession::is_closed) {
            self.session = None;
            info!("device closed the session");
            return true;
        }
        false
    }

    /// Close the session if a cancelled command left a request unanswered.
    pub async fn discard_unfinished_session(&mut self) -> bool {
        if !self
            .session
            .as_ref()
            .is_some_and(SecureSession::has_unfinished_exchange)
        {
            return false;
        }
        info!("command cancelled mid-exchange, closing session");
        self.invalidate_session().await;
        true
    }

    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }
}
