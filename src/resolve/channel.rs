//! Channel-backed decision source for async front ends.
//!
//! The resolver side ([`ChannelSource`]) blocks on each request and must run
//! on a plain thread or inside `spawn_blocking`. The front end side
//! ([`DecisionChannel`]) awaits requests and answers them. Dropping the
//! channel, or a request without answering it, cancels the run.

use tokio::sync::{mpsc, oneshot};

use super::{DecisionSource, Resolution};
use crate::diff::Difference;
use crate::error::{MergeError, Result};

/// One pending question: which side of `difference` to keep.
#[derive(Debug)]
pub struct DecisionRequest {
    difference: Difference,
    reply: oneshot::Sender<Resolution>,
}

impl DecisionRequest {
    pub fn difference(&self) -> &Difference {
        &self.difference
    }

    /// Answer the request. Returns false if the resolver has gone away.
    pub fn respond(self, resolution: Resolution) -> bool {
        self.reply.send(resolution).is_ok()
    }
}

/// Resolver side of a decision channel.
#[derive(Debug, Clone)]
pub struct ChannelSource {
    requests: mpsc::Sender<DecisionRequest>,
}

/// Front end side of a decision channel.
#[derive(Debug)]
pub struct DecisionChannel {
    requests: mpsc::Receiver<DecisionRequest>,
}

/// Create a connected source/channel pair. At most one request is in
/// flight at a time.
pub fn channel() -> (ChannelSource, DecisionChannel) {
    let (tx, rx) = mpsc::channel(1);
    (ChannelSource { requests: tx }, DecisionChannel { requests: rx })
}

impl DecisionChannel {
    /// Wait for the next request; `None` once the resolver is finished.
    pub async fn next_request(&mut self) -> Option<DecisionRequest> {
        self.requests.recv().await
    }

    /// Blocking variant for front ends without a runtime.
    pub fn blocking_next_request(&mut self) -> Option<DecisionRequest> {
        self.requests.blocking_recv()
    }

    /// Stop accepting requests; the waiting resolver gets
    /// [`MergeError::Cancelled`].
    pub fn close(&mut self) {
        self.requests.close();
    }
}

impl DecisionSource for ChannelSource {
    fn decide(&mut self, difference: &Difference) -> Result<Resolution> {
        let line_number = difference.line_number();
        let (reply, response) = oneshot::channel();

        let request = DecisionRequest {
            difference: difference.clone(),
            reply,
        };
        self.requests
            .blocking_send(request)
            .map_err(|_| MergeError::Cancelled { line_number })?;

        response
            .blocking_recv()
            .map_err(|_| MergeError::Cancelled { line_number })
    }
}
