use crate::registry::PeerHandle;
use crate::relay::{DropReason, RelayEngine};
use crate::signaling::SignalingService;
use crate::transport::{FrameSink, FrameSource, InboundFrame, SignalTransport};
use rendezvous_core::{ConnectionId, ConnectionState, FrameAssembler, Payload};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, error, info, warn};

/// Releases the connection and stops its tasks however the handler exits,
/// including when its future is dropped mid-flight.
///
/// Drop cannot wait for an aborted reader, so a reader still inside a poll may relay one
/// more message after release. `RelayEngine` refuses to cache offers from released senders.
struct ConnectionGuard {
    id: ConnectionId,
    service: SignalingService,
    tasks: Vec<AbortHandle>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
        self.service.release(&self.id);
    }
}

/// Drives one accepted connection from registration to cleanup.
pub async fn handle_connection<T: SignalTransport>(transport: T, service: SignalingService) {
    let id = ConnectionId::new();
    let (tx, rx) = mpsc::channel(service.config().outbound_capacity);
    let handle = PeerHandle::new(id, tx);

    if let Err(e) = service.registry().register(handle.clone()) {
        error!(connection = %id, error = %e, "registry invariant violated, dropping connection");
        return;
    }
    let mut guard = ConnectionGuard {
        id,
        service: service.clone(),
        tasks: Vec::new(),
    };
    handle.state().advance(ConnectionState::Open);
    info!(
        connection = %id,
        connections = service.connection_count(),
        "connected"
    );

    let (sink, source) = transport.split();

    let mut send_task = tokio::spawn(write_loop(id, sink, rx));
    guard.tasks.push(send_task.abort_handle());

    service.relay().replay_offers(&handle).await;

    let mut recv_task = tokio::spawn(read_loop(id, source, service.clone()));
    guard.tasks.push(recv_task.abort_handle());

    tokio::select! {
        _ = &mut recv_task => {},
        _ = &mut send_task => {
            recv_task.abort();
            // abort only takes effect at the reader's next yield point
            let _ = (&mut recv_task).await;
        }
    };

    handle.state().advance(ConnectionState::Closing);
    drop(handle);
    service.release(&id);

    // The writer flushes what is already queued, then closes the transport once the last
    // sender is gone. In-flight fan-outs hold a sender for at most one send timeout.
    if !send_task.is_finished()
        && tokio::time::timeout(service.config().shutdown_grace, &mut send_task)
            .await
            .is_err()
    {
        warn!(connection = %id, "writer did not drain in time, aborting");
        send_task.abort();
    }
}

async fn write_loop<S: FrameSink>(
    id: ConnectionId,
    mut sink: S,
    mut rx: mpsc::Receiver<Payload>,
) {
    while let Some(payload) = rx.recv().await {
        if let Err(e) = sink.send_text(&payload).await {
            debug!(connection = %id, error = %e, "write failed, closing connection");
            return;
        }
    }

    if let Err(e) = sink.close().await {
        debug!(connection = %id, error = %e, "transport close failed");
    }
}

async fn read_loop<S: FrameSource>(id: ConnectionId, mut source: S, service: SignalingService) {
    let mut assembler = FrameAssembler::new(service.config().max_message_bytes);
    let relay = service.relay();

    loop {
        let frame = tokio::select! {
            frame = source.next_frame() => frame,
            _ = service.stopped() => {
                info!(connection = %id, "server shutting down, closing connection");
                return;
            }
        };

        match frame {
            Some(Ok(InboundFrame::Text { data, fin })) => match assembler.push(&data, fin) {
                Ok(Some(message)) => {
                    relay.dispatch(id, &message).await;
                }
                Ok(None) => {}
                Err(e) => {
                    RelayEngine::drop_message(id, DropReason::Frame(e));
                }
            },
            Some(Ok(InboundFrame::Binary)) => {
                RelayEngine::drop_message(id, DropReason::Binary);
            }
            Some(Ok(InboundFrame::Control)) => {}
            Some(Ok(InboundFrame::Close)) | None => {
                debug!(connection = %id, "closed by remote");
                return;
            }
            Some(Err(e)) => {
                warn!(connection = %id, error = %e, "receive failed");
                return;
            }
        }
    }
}
