#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context as TaskContext, Poll};
use std::time::Duration;

use bytes::BytesMut;
use futures_util::future::BoxFuture;
use tcat_client::config::ClientConfig;
use tcat_client::console::{Console, Input};
use tcat_client::engine::{self, Collaborators, CommandOutcome, Context};
use tcat_client::session::{CredentialStore, Handshaker, SessionError};
use tcat_client::tlv::{decode_tlv, encode_tlv, Tlv, TlvType};
use tcat_client::transport::{
    BoxedStream, Connector, Discovery, PeerDescriptor, TransportError,
};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, DuplexStream, ReadBuf};
use tokio::sync::mpsc;

/// Everything the client printed, shared with the test.
#[derive(Clone, Default)]
pub struct Transcript {
    lines: Arc<Mutex<Vec<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl Transcript {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }

    pub fn count(&self, needle: &str) -> usize {
        self.lines().iter().filter(|line| line.contains(needle)).count()
    }

    /// Index of the first line containing `needle`.
    pub fn position(&self, needle: &str) -> Option<usize> {
        self.lines().iter().position(|line| line.contains(needle))
    }
}

/// Console fed from a fixed script. Runs out into end of input.
pub struct ScriptedConsole {
    inputs: VecDeque<Input>,
    transcript: Transcript,
    interrupt_after: Option<Duration>,
}

impl ScriptedConsole {
    pub fn new(inputs: Vec<Input>, transcript: Transcript) -> Self {
        Self {
            inputs: inputs.into(),
            transcript,
            interrupt_after: None,
        }
    }

    /// Interrupt any command still running `after` it started.
    pub fn interrupting_after(mut self, after: Duration) -> Self {
        self.interrupt_after = Some(after);
        self
    }
}

impl Console for ScriptedConsole {
    fn println(&mut self, line: &str) {
        self.transcript.lines.lock().unwrap().push(line.to_string());
    }

    fn read_line<'a>(&'a mut self, prompt: &'a str) -> BoxFuture<'a, io::Result<Input>> {
        self.transcript
            .prompts
            .lock()
            .unwrap()
            .push(prompt.to_string());
        let next = self.inputs.pop_front().unwrap_or(Input::Eof);
        Box::pin(async move { Ok(next) })
    }

    fn interrupt(&self) -> BoxFuture<'static, ()> {
        match self.interrupt_after {
            Some(after) => Box::pin(tokio::time::sleep(after)),
            None => Box::pin(std::future::pending()),
        }
    }
}

pub fn line(text: &str) -> Input {
    Input::Line(text.to_string())
}

pub fn lines(texts: &[&str]) -> Vec<Input> {
    texts.iter().map(|t| line(t)).collect()
}

/// Hands back the raw stream, so the fake device sees plain records.
pub struct Passthrough;

impl Handshaker for Passthrough {
    fn handshake<'a>(
        &'a self,
        stream: BoxedStream,
        _server_name: &'a str,
    ) -> BoxFuture<'a, io::Result<BoxedStream>> {
        Box::pin(async move { Ok(stream) })
    }
}

pub struct StaticCredentials;

impl CredentialStore for StaticCredentials {
    fn load(&self) -> Result<Arc<dyn Handshaker>, SessionError> {
        Ok(Arc::new(Passthrough))
    }
}

pub struct MissingCredentials;

impl CredentialStore for MissingCredentials {
    fn load(&self) -> Result<Arc<dyn Handshaker>, SessionError> {
        Err(SessionError::Credentials(
            "auth/commissioner_cert.pem: not found".to_string(),
        ))
    }
}

pub struct FakeDiscovery {
    pub peers: Vec<PeerDescriptor>,
}

impl Discovery for FakeDiscovery {
    fn scan(&self) -> BoxFuture<'_, Result<Vec<PeerDescriptor>, TransportError>> {
        let peers = self.peers.clone();
        Box::pin(async move { Ok(peers) })
    }
}

/// Opens in-memory links and hands the device end to the test.
pub struct DuplexConnector {
    opened: AtomicUsize,
    live: Arc<AtomicUsize>,
    live_at_open: Mutex<Vec<usize>>,
    devices: mpsc::UnboundedSender<Device>,
}

impl DuplexConnector {
    fn new(devices: mpsc::UnboundedSender<Device>) -> Self {
        Self {
            opened: AtomicUsize::new(0),
            live: Arc::new(AtomicUsize::new(0)),
            live_at_open: Mutex::new(Vec::new()),
            devices,
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Client links still alive at the moment each `open` started.
    pub fn live_at_open(&self) -> Vec<usize> {
        self.live_at_open.lock().unwrap().clone()
    }
}

impl Connector for DuplexConnector {
    fn open<'a>(
        &'a self,
        _peer: &'a PeerDescriptor,
    ) -> BoxFuture<'a, Result<BoxedStream, TransportError>> {
        Box::pin(async move {
            self.live_at_open
                .lock()
                .unwrap()
                .push(self.live.load(Ordering::SeqCst));
            let (client, device) = tokio::io::duplex(64 * 1024);
            self.opened.fetch_add(1, Ordering::SeqCst);
            self.devices
                .send(Device::new(device))
                .map_err(|_| TransportError::Discovery("test dropped the device queue".into()))?;
            Ok(Box::new(TrackedStream::new(client, self.live.clone())) as BoxedStream)
        })
    }
}

/// Client end of a link that counts itself as live until dropped.
struct TrackedStream {
    inner: DuplexStream,
    live: Arc<AtomicUsize>,
}

impl TrackedStream {
    fn new(inner: DuplexStream, live: Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);
        Self { inner, live }
    }
}

impl Drop for TrackedStream {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

impl AsyncRead for TrackedStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut TaskContext<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl AsyncWrite for TrackedStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut TaskContext<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(
        mut self: Pin<&mut Self>,
        cx: &mut TaskContext<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

/// Device end of a link.
pub struct Device {
    stream: DuplexStream,
    rx: BytesMut,
}

impl Device {
    fn new(stream: DuplexStream) -> Self {
        Self {
            stream,
            rx: BytesMut::new(),
        }
    }

    /// Next record from the client, or `None` once it closed the link.
    pub async fn next_request(&mut self) -> Option<Tlv> {
        loop {
            if let Some(tlv) = decode_tlv(&mut self.rx).unwrap() {
                return Some(tlv);
            }
            let mut chunk = [0u8; 1024];
            let n = self.stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                return None;
            }
            self.rx.extend_from_slice(&chunk[..n]);
        }
    }

    /// Expect an `Application` request with exactly `text`.
    pub async fn expect_app(&mut self, text: &str) {
        let request = self.next_request().await.expect("client closed the link");
        assert_eq!(request.kind(), Some(TlvType::Application));
        assert_eq!(request.text(), text);
    }

    /// Send `texts` as `Application` records in a single write.
    pub async fn reply(&mut self, texts: &[&str]) {
        let mut buf = BytesMut::new();
        for text in texts {
            encode_tlv(TlvType::Application.into(), text.as_bytes(), &mut buf).unwrap();
        }
        self.stream.write_all(&buf).await.unwrap();
    }

    pub async fn reply_tlv(&mut self, tlv: &Tlv) {
        let wire = tlv.to_bytes().unwrap();
        self.stream.write_all(&wire).await.unwrap();
    }

    /// Assert the client sends nothing more and closes the link.
    pub async fn expect_closed(&mut self) {
        if let Some(extra) = self.next_request().await {
            panic!("unexpected request: {:?}", extra.text());
        }
    }
}

pub fn tbr(name: &str, address: &str) -> PeerDescriptor {
    PeerDescriptor {
        name: name.to_string(),
        address: address.to_string(),
        rssi: Some(-48),
    }
}

pub struct Harness {
    pub ctx: Context,
    pub transcript: Transcript,
    pub connector: Arc<DuplexConnector>,
    pub devices: mpsc::UnboundedReceiver<Device>,
}

impl Harness {
    pub fn new(inputs: Vec<Input>) -> Self {
        Self::with(inputs, vec![tbr("TBR", "AA:BB:CC:DD:EE:01")], Arc::new(StaticCredentials))
    }

    pub fn with(
        inputs: Vec<Input>,
        peers: Vec<PeerDescriptor>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self::build(inputs, peers, credentials, None)
    }

    /// Like [`Harness::new`], with Ctrl-C arriving `after` each command starts.
    pub fn interrupting(inputs: Vec<Input>, after: Duration) -> Self {
        Self::build(
            inputs,
            vec![tbr("TBR", "AA:BB:CC:DD:EE:01")],
            Arc::new(StaticCredentials),
            Some(after),
        )
    }

    fn build(
        inputs: Vec<Input>,
        peers: Vec<PeerDescriptor>,
        credentials: Arc<dyn CredentialStore>,
        interrupt_after: Option<Duration>,
    ) -> Self {
        let transcript = Transcript::default();
        let mut console = ScriptedConsole::new(inputs, transcript.clone());
        if let Some(after) = interrupt_after {
            console = console.interrupting_after(after);
        }
        let (tx, devices) = mpsc::unbounded_channel();
        let connector = Arc::new(DuplexConnector::new(tx));
        let collaborators = Collaborators {
            discovery: Arc::new(FakeDiscovery { peers }),
            connector: connector.clone(),
            credentials,
        };
        let ctx = Context::new(
            Arc::new(tcat_client::cmd::registry()),
            Box::new(console),
            collaborators,
            ClientConfig::default(),
        );
        Self {
            ctx,
            transcript,
            connector,
            devices,
        }
    }

    pub async fn run(&mut self, line: &str) -> CommandOutcome {
        engine::dispatch(&mut self.ctx, line).await
    }

    /// Run `scan`, choosing the first device, and return its end of the link.
    pub async fn connect(&mut self) -> Device {
        self.run("scan").await.expect("scan should connect");
        assert!(self.ctx.is_connected());
        self.devices.recv().await.expect("a link was opened")
    }
}
