//! Network actor - runs dispatches in the Tokio runtime

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::messages::network::Slot;
use crate::messages::{NetworkCommand, NetworkResponse};
use crate::network::dispatcher::RequestDispatcher;

/// Network actor that turns commands into dispatcher calls
pub struct NetworkActor {
    dispatcher: RequestDispatcher,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    active_requests: JoinSet<()>,
}

impl NetworkActor {
    pub fn new(
        dispatcher: RequestDispatcher,
        response_tx: mpsc::UnboundedSender<NetworkResponse>,
    ) -> Self {
        NetworkActor {
            dispatcher,
            response_tx,
            active_requests: JoinSet::new(),
        }
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::Read { id, request, force }) => {
                            let response_tx = self.response_tx.clone();
                            let dispatcher = self.dispatcher.clone();

                            self.active_requests.spawn(async move {
                                tracing::info!(id, url = %request.url, force, "Executing read");
                                let result = if force {
                                    dispatcher.refetch(&request).await
                                } else {
                                    dispatcher.fetch(&request).await
                                };
                                let _ = response_tx.send(into_response(id, Slot::Read, result));
                            });
                        }

                        Some(NetworkCommand::Write { id, request }) => {
                            let response_tx = self.response_tx.clone();
                            let dispatcher = self.dispatcher.clone();

                            self.active_requests.spawn(async move {
                                tracing::info!(id, url = %request.url, method = %request.method, "Executing write");
                                let result = dispatcher.mutate(&request).await;
                                let _ = response_tx.send(into_response(id, Slot::Write, result));
                            });
                        }

                        Some(NetworkCommand::Lookup { id, url }) => {
                            let response_tx = self.response_tx.clone();
                            let dispatcher = self.dispatcher.clone();

                            self.active_requests.spawn(async move {
                                let (response, stale) = dispatcher.lookup(&url).await;
                                tracing::debug!(id, url = %url, hit = response.is_some(), stale, "Cache lookup");
                                let _ = response_tx.send(NetworkResponse::Cached { id, url, response, stale });
                            });
                        }

                        // In-flight calls are not aborted; their results are dropped with the channel
                        Some(NetworkCommand::Shutdown) | None => break,
                    }
                }

                Some(_result) = self.active_requests.join_next() => {
                    // Task completed - the task reported its own result
                }
            }
        }
    }
}

fn into_response(
    id: u64,
    slot: Slot,
    result: anyhow::Result<crate::models::ApiResponse>,
) -> NetworkResponse {
    match result {
        Ok(response) => {
            tracing::info!(id, slot = slot.as_str(), status = response.status, time_ms = response.time_ms, "Request completed");
            NetworkResponse::Success { id, slot, response }
        }
        Err(e) => {
            tracing::warn!(id, slot = slot.as_str(), error = %e, "Request failed");
            NetworkResponse::Error {
                id,
                slot,
                message: e.to_string(),
            }
        }
    }
}
