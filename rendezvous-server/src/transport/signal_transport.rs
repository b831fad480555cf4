use crate::transport::TransportError;
use async_trait::async_trait;

/// One frame as seen by the connection's receive loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    /// Text data; `fin == false` means more fragments of the same message follow.
    Text { data: String, fin: bool },
    Binary,
    /// Ping/pong traffic, answered by the transport itself.
    Control,
    Close,
}

/// Receiving half of a signaling transport.
#[async_trait]
pub trait FrameSource: Send {
    /// `None` once the remote side is gone.
    async fn next_frame(&mut self) -> Option<Result<InboundFrame, TransportError>>;
}

/// Sending half of a signaling transport.
#[async_trait]
pub trait FrameSink: Send {
    async fn send_text(&mut self, payload: &str) -> Result<(), TransportError>;

    async fn close(&mut self) -> Result<(), TransportError>;
}

/// A bidirectional connection the lifecycle handler can drive. The relay depends only on
/// this seam, never on a concrete transport stack.
pub trait SignalTransport: Send + 'static {
    type Sink: FrameSink + 'static;
    type Source: FrameSource + 'static;

    fn split(self) -> (Self::Sink, Self::Source);
}
