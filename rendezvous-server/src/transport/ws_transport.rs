use crate::transport::{FrameSink, FrameSource, InboundFrame, SignalTransport, TransportError};
use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};

pub struct WsSink(SplitSink<WebSocket, Message>);

pub struct WsSource(SplitStream<WebSocket>);

impl SignalTransport for WebSocket {
    type Sink = WsSink;
    type Source = WsSource;

    fn split(self) -> (WsSink, WsSource) {
        let (sender, receiver) = StreamExt::split(self);
        (WsSink(sender), WsSource(receiver))
    }
}

#[async_trait]
impl FrameSource for WsSource {
    async fn next_frame(&mut self) -> Option<Result<InboundFrame, TransportError>> {
        // tungstenite hands over whole messages, continuation frames are already joined
        let frame = match self.0.next().await? {
            Ok(Message::Text(text)) => InboundFrame::Text {
                data: text.as_str().to_owned(),
                fin: true,
            },
            Ok(Message::Binary(_)) => InboundFrame::Binary,
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => InboundFrame::Control,
            Ok(Message::Close(_)) => InboundFrame::Close,
            Err(e) => return Some(Err(TransportError::Receive(e.to_string()))),
        };
        Some(Ok(frame))
    }
}

#[async_trait]
impl FrameSink for WsSink {
    async fn send_text(&mut self, payload: &str) -> Result<(), TransportError> {
        self.0
            .send(Message::Text(payload.into()))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.0
            .close()
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }
}
