use async_trait::async_trait;
use rendezvous_server::{FrameSink, FrameSource, InboundFrame, SignalTransport, TransportError};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

type Inbound = Result<InboundFrame, TransportError>;

/// In-memory transport handed to the lifecycle handler.
pub struct MockTransport {
    inbound: mpsc::UnboundedReceiver<Inbound>,
    outbound: mpsc::UnboundedSender<String>,
    closed: Arc<AtomicBool>,
}

/// Remote end of a `MockTransport`, driven by the test.
pub struct MockPeer {
    inbound: Option<mpsc::UnboundedSender<Inbound>>,
    outbound: mpsc::UnboundedReceiver<String>,
    closed: Arc<AtomicBool>,
}

impl MockTransport {
    pub fn pair() -> (Self, MockPeer) {
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let closed = Arc::new(AtomicBool::new(false));

        let transport = Self {
            inbound: in_rx,
            outbound: out_tx,
            closed: closed.clone(),
        };
        let peer = MockPeer {
            inbound: Some(in_tx),
            outbound: out_rx,
            closed,
        };
        (transport, peer)
    }
}

pub struct MockSink {
    outbound: mpsc::UnboundedSender<String>,
    closed: Arc<AtomicBool>,
}

pub struct MockSource {
    inbound: mpsc::UnboundedReceiver<Inbound>,
}

impl SignalTransport for MockTransport {
    type Sink = MockSink;
    type Source = MockSource;

    fn split(self) -> (MockSink, MockSource) {
        (
            MockSink {
                outbound: self.outbound,
                closed: self.closed,
            },
            MockSource {
                inbound: self.inbound,
            },
        )
    }
}

#[async_trait]
impl FrameSink for MockSink {
    async fn send_text(&mut self, payload: &str) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        self.outbound
            .send(payload.to_string())
            .map_err(|_| TransportError::Send("peer went away".into()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl FrameSource for MockSource {
    async fn next_frame(&mut self) -> Option<Result<InboundFrame, TransportError>> {
        self.inbound.recv().await
    }
}

impl MockPeer {
    fn push(&self, frame: Inbound) {
        if let Some(inbound) = &self.inbound {
            let _ = inbound.send(frame);
        }
    }

    pub fn send_text(&self, text: &str) {
        self.send_fragment(text, true);
    }

    pub fn send_fragment(&self, text: &str, fin: bool) {
        self.push(Ok(InboundFrame::Text {
            data: text.to_string(),
            fin,
        }));
    }

    pub fn send_binary(&self) {
        self.push(Ok(InboundFrame::Binary));
    }

    pub fn send_close(&self) {
        self.push(Ok(InboundFrame::Close));
    }

    pub fn fail_receive(&self, reason: &str) {
        self.push(Err(TransportError::Receive(reason.to_string())));
    }

    /// Drops the inbound side, which the handler sees as the stream ending.
    pub fn hang_up(&mut self) {
        self.inbound = None;
    }

    pub async fn recv(&mut self) -> Option<String> {
        tokio::time::timeout(Duration::from_secs(1), self.outbound.recv())
            .await
            .ok()
            .flatten()
    }

    /// Everything already delivered, without waiting.
    pub fn drain(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(text) = self.outbound.try_recv() {
            out.push(text);
        }
        out
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
