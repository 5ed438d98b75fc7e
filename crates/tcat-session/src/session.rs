use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use tcat_tlv::{Tlv, TlvCodec, MAX_VALUE_LEN};
use tcat_transport::{BoxedStream, Connector, PeerDescriptor};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::Instant;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, info, trace, warn};

use crate::error::{Result, SessionError};
use crate::tls::Handshaker;

/// Upper bound on the orderly shutdown in [`SecureSession::close`].
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Lifecycle of a [`SecureSession`]. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Handshaking,
    Established,
    Closed,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Handshaking => "handshaking",
            Self::Established => "established",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timing and buffer limits for a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Bound on the whole handshake.
    pub handshake_timeout: Duration,
    /// How long `send_with_response` waits. `None` waits for the response or
    /// end of stream. When a bound is set and passes, the session is closed so
    /// a late answer cannot be taken for the reply to a later request.
    pub response_timeout: Option<Duration>,
    /// Read size used while waiting for a single response.
    pub read_chunk_size: usize,
    /// Largest record value accepted from the peer.
    pub max_value_len: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            handshake_timeout: Duration::from_secs(30),
            response_timeout: None,
            read_chunk_size: 4096,
            max_value_len: MAX_VALUE_LEN,
        }
    }
}

enum ReadOutcome {
    Data,
    EndOfStream,
    TimedOut,
}

/// A handshake-gated channel to one device.
///
/// Records are delimited with [`TlvCodec`] over whatever stream the
/// handshaker returned. Bytes that arrive ahead of the caller stay buffered
/// for the next read, so one transport read may yield several records and
/// one record may span several reads.
pub struct SecureSession {
    state: SessionState,
    stream: Option<BoxedStream>,
    handshaker: Option<Arc<dyn Handshaker>>,
    codec: TlvCodec,
    rx: BytesMut,
    config: SessionConfig,
    unfinished_exchange: bool,
}

impl SecureSession {
    /// Wrap a raw stream with default configuration.
    pub fn new(stream: BoxedStream) -> Self {
        Self::with_config(stream, SessionConfig::default())
    }

    pub fn with_config(stream: BoxedStream, config: SessionConfig) -> Self {
        Self {
            state: SessionState::Uninitialized,
            stream: Some(stream),
            handshaker: None,
            codec: TlvCodec::with_max_value_len(config.max_value_len),
            rx: BytesMut::with_capacity(config.read_chunk_size),
            config,
            unfinished_exchange: false,
        }
    }

    /// Open a raw link to `peer` through `connector` and wrap it.
    pub async fn open(
        connector: &dyn Connector,
        peer: &PeerDescriptor,
        config: SessionConfig,
    ) -> Result<Self> {
        let stream = connector.open(peer).await?;
        debug!(peer = %peer, "raw link open");
        Ok(Self::with_config(stream, config))
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_established(&self) -> bool {
        self.state == SessionState::Established
    }

    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// True when a `send_with_response` or `recv` future was dropped before it
    /// finished. Whatever the device sends next belongs to that request, so
    /// the session should be closed rather than reused.
    pub fn has_unfinished_exchange(&self) -> bool {
        self.unfinished_exchange
    }

    /// Attach credential material. Moves `Uninitialized -> Handshaking`.
    pub fn load_credentials(&mut self, handshaker: Arc<dyn Handshaker>) -> Result<()> {
        self.expect_state(SessionState::Uninitialized)?;
        self.handshaker = Some(handshaker);
        self.transition(SessionState::Handshaking);
        Ok(())
    }

    /// Negotiate the secure channel against `server_name`.
    ///
    /// Any failure, including the handshake timeout, closes the session.
    pub async fn handshake(&mut self, server_name: &str) -> Result<()> {
        self.expect_state(SessionState::Handshaking)?;
        let (Some(handshaker), Some(stream)) = (self.handshaker.take(), self.stream.take()) else {
            self.mark_closed();
            return Err(SessionError::SessionClosed);
        };

        let limit = self.config.handshake_timeout;
        let outcome = tokio::time::timeout(limit, handshaker.handshake(stream, server_name)).await;
        match outcome {
            Ok(Ok(secure)) => {
                self.stream = Some(secure);
                self.transition(SessionState::Established);
                info!(server_name, "secure channel established");
                Ok(())
            }
            Ok(Err(err)) => {
                warn!(server_name, %err, "handshake failed");
                self.mark_closed();
                Err(SessionError::HandshakeFailed(err.to_string()))
            }
            Err(_) => {
                warn!(server_name, timeout = ?limit, "handshake timed out");
                self.mark_closed();
                Err(SessionError::HandshakeFailed(format!(
                    "no answer within {limit:?}"
                )))
            }
        }
    }

    /// Write one record. No response is awaited.
    pub async fn send(&mut self, frame: &Tlv) -> Result<()> {
        self.expect_state(SessionState::Established)?;

        let mut buf = BytesMut::with_capacity(frame.wire_size());
        self.codec.encode(frame.clone(), &mut buf)?;

        let Some(stream) = self.stream.as_mut() else {
            self.mark_closed();
            return Err(SessionError::SessionClosed);
        };
        let written = async {
            stream.write_all(&buf).await?;
            stream.flush().await
        }
        .await;
        if let Err(err) = written {
            warn!(%err, "write failed, closing session");
            self.mark_closed();
            return Err(err.into());
        }

        debug!(tlv_type = frame.tlv_type, bytes = buf.len(), "sent record");
        Ok(())
    }

    /// Write one record and wait for exactly one response record.
    ///
    /// Returns `None` when the peer ends the stream or the configured
    /// response timeout passes first; either way the session ends up `Closed`.
    /// Records that arrive behind the response stay buffered for
    /// [`recv`](Self::recv).
    pub async fn send_with_response(&mut self, frame: &Tlv) -> Result<Option<Tlv>> {
        self.unfinished_exchange = true;
        let response = self.exchange(frame).await;
        self.unfinished_exchange = false;
        response
    }

    async fn exchange(&mut self, frame: &Tlv) -> Result<Option<Tlv>> {
        self.send(frame).await?;

        let deadline = self.config.response_timeout.map(|t| Instant::now() + t);
        let chunk = self.config.read_chunk_size;
        loop {
            if let Some(response) = self.next_frame()? {
                debug!(tlv_type = response.tlv_type, len = response.value.len(), "response");
                return Ok(Some(response));
            }
            match self.read_some(chunk, deadline).await? {
                ReadOutcome::Data => {}
                ReadOutcome::EndOfStream => return Ok(None),
                ReadOutcome::TimedOut => {
                    warn!(
                        tlv_type = frame.tlv_type,
                        "no response before timeout, closing session"
                    );
                    self.close().await;
                    return Ok(None);
                }
            }
        }
    }

    /// Wait up to `timeout` for one or more records.
    ///
    /// Buffered records are returned first without touching the transport.
    /// Otherwise reads of at most `max_bytes` are issued until at least one
    /// record is complete. `None` means the timeout passed or the stream ended.
    pub async fn recv(&mut self, max_bytes: usize, timeout: Duration) -> Result<Option<Vec<Tlv>>> {
        self.unfinished_exchange = true;
        let frames = self.collect(max_bytes, timeout).await;
        self.unfinished_exchange = false;
        frames
    }

    async fn collect(&mut self, max_bytes: usize, timeout: Duration) -> Result<Option<Vec<Tlv>>> {
        self.expect_state(SessionState::Established)?;

        let deadline = Instant::now() + timeout;
        let mut frames = self.drain_frames()?;
        while frames.is_empty() {
            match self.read_some(max_bytes, Some(deadline)).await? {
                ReadOutcome::Data => frames = self.drain_frames()?,
                ReadOutcome::EndOfStream | ReadOutcome::TimedOut => return Ok(None),
            }
        }

        debug!(count = frames.len(), "received records");
        Ok(Some(frames))
    }

    /// Best-effort orderly shutdown. The session ends up `Closed`.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            match tokio::time::timeout(CLOSE_TIMEOUT, stream.shutdown()).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => debug!(%err, "shutdown failed"),
                Err(_) => debug!("shutdown timed out"),
            }
        }
        self.mark_closed();
    }

    fn expect_state(&self, expected: SessionState) -> Result<()> {
        match self.state {
            state if state == expected => Ok(()),
            SessionState::Closed => Err(SessionError::SessionClosed),
            actual => Err(SessionError::InvalidState { expected, actual }),
        }
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            debug!(from = %self.state, to = %next, "session state");
            self.state = next;
        }
    }

    fn mark_closed(&mut self) {
        self.stream = None;
        self.handshaker = None;
        self.transition(SessionState::Closed);
    }

    fn next_frame(&mut self) -> Result<Option<Tlv>> {
        match self.codec.decode(&mut self.rx) {
            Ok(frame) => Ok(frame),
            Err(err) => {
                warn!(%err, "undecodable bytes from peer, closing session");
                self.mark_closed();
                Err(err.into())
            }
        }
    }

    fn drain_frames(&mut self) -> Result<Vec<Tlv>> {
        let mut frames = Vec::new();
        while let Some(frame) = self.next_frame()? {
            frames.push(frame);
        }
        Ok(frames)
    }

    async fn read_some(
        &mut self,
        max_bytes: usize,
        deadline: Option<Instant>,
    ) -> Result<ReadOutcome> {
        let Some(stream) = self.stream.as_mut() else {
            return Ok(ReadOutcome::EndOfStream);
        };

        let mut chunk = vec![0u8; max_bytes.max(1)];
        let read = match deadline {
            Some(deadline) => {
                match tokio::time::timeout_at(deadline, stream.read(&mut chunk)).await {
                    Ok(read) => read,
                    Err(_) => return Ok(ReadOutcome::TimedOut),
                }
            }
            None => stream.read(&mut chunk).await,
        };

        match read {
            Ok(0) => {
                info!("peer ended the stream");
                self.mark_closed();
                Ok(ReadOutcome::EndOfStream)
            }
            Ok(n) => {
                trace!(bytes = n, buffered = self.rx.len(), "read");
                self.rx.extend_from_slice(&chunk[..n]);
                Ok(ReadOutcome::Data)
            }
            Err(err) => {
                warn!(%err, "read failed, closing session");
                self.mark_closed();
                Err(err.into())
            }
        }
    }
}

impl fmt::Debug for SecureSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureSession")
            .field("state", &self.state)
            .field("buffered", &self.rx.len())
            .field("unfinished_exchange", &self.unfinished_exchange)
            .field("config", &self.config)
            .finish()
    }
}
