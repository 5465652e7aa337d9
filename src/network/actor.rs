//! Dispatch actor - runs calls in the Tokio runtime without blocking the app

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::error::ValidationError;
use crate::messages::dispatch::{CallEvent, DispatchCommand, RequestSpec, Submission};
use crate::models::Call;
use crate::network::client::{create_client, execute_call};

/// Submit side of the dispatch actor. Validates calls synchronously
/// and hands accepted ones to the actor, tagging each with a fresh
/// sequence number.
pub struct Dispatcher {
    cmd_tx: mpsc::UnboundedSender<DispatchCommand>,
    next_seq: u64,
}

impl Dispatcher {
    pub fn new(cmd_tx: mpsc::UnboundedSender<DispatchCommand>) -> Self {
        Dispatcher {
            cmd_tx,
            next_seq: 0,
        }
    }

    /// Validate and enqueue a call. A rejected call produces no
    /// lifecycle events at all.
    pub fn submit(&mut self, call: &Call) -> Result<Submission, ValidationError> {
        if call.url.trim().is_empty() {
            return Err(ValidationError::EmptyUrl);
        }

        self.next_seq += 1;
        let submission = Submission {
            seq: self.next_seq,
            call: call.id,
        };
        let spec = RequestSpec::of(call);
        let _ = self.cmd_tx.send(DispatchCommand::Execute { submission, spec });
        Ok(submission)
    }

    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(DispatchCommand::Shutdown);
    }
}

/// Dispatch actor that processes execute commands
pub struct DispatchActor {
    client: reqwest::Client,
    event_tx: mpsc::UnboundedSender<CallEvent>,
    tasks: JoinSet<()>,
}

impl DispatchActor {
    pub fn new(event_tx: mpsc::UnboundedSender<CallEvent>) -> Self {
        DispatchActor {
            client: create_client(),
            event_tx,
            tasks: JoinSet::new(),
        }
    }

    /// Run the dispatch actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<DispatchCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(DispatchCommand::Execute { submission, spec }) => {
                            // Loading goes onto the event channel before the
                            // task exists; the channel is FIFO, so the app
                            // observes it before the terminal event.
                            let _ = self.event_tx.send(CallEvent::Loading { submission });

                            let event_tx = self.event_tx.clone();
                            let client = self.client.clone();

                            self.tasks.spawn(async move {
                                tracing::info!(
                                    seq = submission.seq,
                                    url = %spec.url,
                                    method = spec.method.as_str(),
                                    "Executing call"
                                );
                                let event = execute_call(&client, submission, spec).await;
                                tracing::info!(
                                    seq = submission.seq,
                                    ok = matches!(event, CallEvent::Ready { .. }),
                                    "Call settled"
                                );
                                let _ = event_tx.send(event);
                            });
                        }

                        Some(DispatchCommand::Shutdown) | None => break,
                    }
                }

                // Clean up completed tasks
                Some(_result) = self.tasks.join_next() => {}
            }
        }
    }
}
