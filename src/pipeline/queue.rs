use dashmap::DashMap;
use std::sync::{Mutex as StdMutex, PoisonError};
use tokio::sync::{mpsc, oneshot, Mutex};

use super::types::{CorrelationId, Request, RequestKind, Response};
use crate::engine::Status;

/// Single ordered request queue shared by every worker.
pub struct RequestQueue {
    sender: mpsc::UnboundedSender<Request>,
    receiver: Mutex<mpsc::UnboundedReceiver<Request>>,
    /// Next id to hand out. Held across the send so queue order is id order.
    next_id: StdMutex<CorrelationId>,
}

impl Default for RequestQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Mutex::new(receiver),
            next_id: StdMutex::new(0),
        }
    }

    /// Enqueues a request and returns the ticket its response arrives on.
    /// The reply slot is registered in `responses` before the request becomes
    /// visible to any worker.
    pub fn push(&self, kind: RequestKind, responses: &ResponseTable) -> Ticket {
        let mut next_id = self.next_id.lock().unwrap_or_else(PoisonError::into_inner);
        let id = *next_id;
        *next_id += 1;

        let receiver = responses.register(id);
        // The receiver lives as long as the queue, so sending cannot fail
        let _ = self.sender.send(Request { id, kind });
        Ticket { id, receiver }
    }

    /// Takes the next request, waiting until one is available. Only one
    /// worker at a time waits on the channel.
    pub async fn pop(&self) -> Option<Request> {
        self.receiver.lock().await.recv().await
    }
}

/// Reply slots of requests that have not been answered yet, keyed by
/// correlation id. A slot is removed as soon as its response is published.
#[derive(Default)]
pub struct ResponseTable {
    senders: DashMap<CorrelationId, oneshot::Sender<Response>>,
}

impl ResponseTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&self, id: CorrelationId) -> oneshot::Receiver<Response> {
        let (sender, receiver) = oneshot::channel();
        self.senders.insert(id, sender);
        receiver
    }

    /// Hands the response to its caller. Returns false when the caller has
    /// gone away, in which case the response is dropped.
    pub fn publish(&self, response: Response) -> bool {
        match self.senders.remove(&response.id) {
            Some((_, sender)) => sender.send(response).is_ok(),
            None => false,
        }
    }

    /// Requests still waiting for an answer.
    pub fn pending(&self) -> usize {
        self.senders.len()
    }
}

/// Caller side of one submitted request. Dropping it abandons the response.
#[derive(Debug)]
pub struct Ticket {
    id: CorrelationId,
    receiver: oneshot::Receiver<Response>,
}

impl Ticket {
    pub fn id(&self) -> CorrelationId {
        self.id
    }

    /// Non-blocking retrieval. A response is returned at most once.
    pub fn try_take(&mut self) -> Option<Response> {
        self.receiver.try_recv().ok()
    }

    /// Waits for the response. If the pipeline shuts down first the caller
    /// gets an internal error.
    pub async fn wait(self) -> Response {
        let id = self.id;
        self.receiver
            .await
            .unwrap_or_else(|_| Response::empty(id, Status::InternalError))
    }
}
