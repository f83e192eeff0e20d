// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use chat_output::event::Event;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

#[derive(Debug)]
pub enum BufferCommand {
    InsertBatch(Vec<Event>),
    Flush(oneshot::Sender<Vec<Event>>),
    Shutdown,
}

#[derive(Clone)]
pub struct BufferHandle {
    tx: mpsc::UnboundedSender<BufferCommand>,
}

impl BufferHandle {
    pub fn insert_batch(
        &self,
        events: Vec<Event>,
    ) -> Result<(), mpsc::error::SendError<BufferCommand>> {
        self.tx.send(BufferCommand::InsertBatch(events))
    }

    /// Takes every buffered event, oldest first.
    pub async fn flush(&self) -> Result<Vec<Event>, String> {
        let (response_tx, response_rx) = oneshot::channel();
        self.tx
            .send(BufferCommand::Flush(response_tx))
            .map_err(|e| format!("Failed to send flush command: {}", e))?;

        response_rx
            .await
            .map_err(|e| format!("Failed to receive flush response: {}", e))
    }

    pub fn shutdown(&self) -> Result<(), mpsc::error::SendError<BufferCommand>> {
        self.tx.send(BufferCommand::Shutdown)
    }
}

/// Owns the pending events. Producers and the flush loop only talk to it through a
/// [`BufferHandle`].
pub struct BufferService {
    events: Vec<Event>,
    rx: mpsc::UnboundedReceiver<BufferCommand>,
}

impl BufferService {
    pub fn new() -> (Self, BufferHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let service = Self {
            events: Vec::new(),
            rx,
        };
        (service, BufferHandle { tx })
    }

    pub async fn run(mut self) {
        debug!("Buffer service started");

        while let Some(command) = self.rx.recv().await {
            match command {
                BufferCommand::InsertBatch(mut events) => {
                    self.events.append(&mut events);
                }

                BufferCommand::Flush(response_tx) => {
                    let events = std::mem::take(&mut self.events);
                    if let Err(events) = response_tx.send(events) {
                        error!(
                            "Failed to send flush response - receiver dropped, {} event(s) lost",
                            events.len()
                        );
                    }
                }

                BufferCommand::Shutdown => {
                    debug!("Buffer service shutting down");
                    break;
                }
            }
        }

        if !self.events.is_empty() {
            error!(
                "Buffer service stopped with {} unflushed event(s)",
                self.events.len()
            );
        }
        debug!("Buffer service stopped");
    }
}
