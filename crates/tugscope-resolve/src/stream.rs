//! Streaming position queries.
//!
//! [`PositionStream`] runs the scope builder with a target on a blocking
//! task and hands each group to the consumer as soon as its scope closes.
//! Groups travel over a bounded channel, so a slow consumer holds the
//! producer back instead of buffering the whole result.
//!
//! The producer never outlives the stream:
//!
//! - dropping the stream cancels the producer's token and closes the
//!   channel, which wakes a producer blocked on a full channel;
//! - [`PositionStream::close`] does the same and then waits for the
//!   producer to finish.
//!
//! The producer checks the token between nodes and stops the walk as soon
//! as it is cancelled.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tugscope_core::config::UnboundPolicy;
use tugscope_cst::visitor::VisitResult;
use tugscope_cst::SourceFile;

use crate::builder::{GroupSink, ScopeBuilder};
use crate::error::{ResolveError, ResolveResult};
use crate::symbol::{Resolved, SiteGroup};

/// Default bound on groups buffered between producer and consumer.
pub const DEFAULT_CAPACITY: usize = 4;

/// An item delivered by a [`PositionStream`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// One complete group, innermost scope first.
    Group(SiteGroup),
    /// The chain reached its declaring scope; no more groups follow.
    Resolved(Resolved),
}

/// Options for [`PositionStream::spawn`].
#[derive(Debug, Clone, Copy)]
pub struct StreamOptions {
    pub capacity: usize,
    pub policy: UnboundPolicy,
}

impl Default for StreamOptions {
    fn default() -> Self {
        StreamOptions {
            capacity: DEFAULT_CAPACITY,
            policy: UnboundPolicy::default(),
        }
    }
}

/// Groups for the identifier at a position, delivered as they are found.
#[derive(Debug)]
pub struct PositionStream {
    rx: mpsc::Receiver<ResolveResult<StreamEvent>>,
    cancel: CancellationToken,
    producer: Option<JoinHandle<()>>,
}

/// Sink that forwards groups into the channel.
struct ChannelSink {
    tx: mpsc::Sender<ResolveResult<StreamEvent>>,
    cancel: CancellationToken,
}

impl GroupSink for ChannelSink {
    fn accept(&mut self, group: SiteGroup) -> VisitResult {
        if self.cancel.is_cancelled() {
            return VisitResult::Stop;
        }
        match self.tx.blocking_send(Ok(StreamEvent::Group(group))) {
            Ok(()) => VisitResult::Continue,
            // The consumer is gone.
            Err(_) => VisitResult::Stop,
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled() || self.tx.is_closed()
    }
}

impl PositionStream {
    /// Start streaming the groups for the identifier at `(row, column)`.
    ///
    /// Must be called from within a tokio runtime. The stream ends without
    /// any event when the position matches no identifier.
    pub fn spawn(file: Arc<SourceFile>, row: u32, column: u32, options: StreamOptions) -> Self {
        let (tx, rx) = mpsc::channel(options.capacity.max(1));
        let cancel = CancellationToken::new();
        let producer_cancel = cancel.clone();

        let producer = tokio::task::spawn_blocking(move || {
            let mut sink = ChannelSink {
                tx: tx.clone(),
                cancel: producer_cancel,
            };
            let result = ScopeBuilder::new(&file)
                .with_target(row, column)
                .with_policy(options.policy)
                .run(&mut sink);
            let last = match result {
                Ok(outcome) if outcome.completed => {
                    outcome.query.map(|q| Ok(StreamEvent::Resolved(q)))
                }
                Ok(_) => {
                    debug!(row, column, "position stream stopped early");
                    None
                }
                Err(err) => Some(Err(err)),
            };
            if let Some(last) = last {
                if !sink.is_cancelled() {
                    // A send error only means the consumer already left.
                    let _ = tx.blocking_send(last);
                }
            }
            debug!(row, column, "position stream producer finished");
        });

        PositionStream {
            rx,
            cancel,
            producer: Some(producer),
        }
    }

    /// Next event, or `None` once the producer is done.
    pub async fn next(&mut self) -> Option<ResolveResult<StreamEvent>> {
        self.rx.recv().await
    }

    /// Next group, skipping the final resolution event.
    pub async fn next_group(&mut self) -> Option<ResolveResult<SiteGroup>> {
        loop {
            match self.next().await? {
                Ok(StreamEvent::Group(group)) => return Some(Ok(group)),
                Ok(StreamEvent::Resolved(_)) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
    }

    /// Token observed by the producer.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop the producer and wait for it to exit.
    ///
    /// Groups still buffered are discarded.
    pub async fn close(mut self) -> ResolveResult<()> {
        self.cancel.cancel();
        self.rx.close();
        while self.rx.try_recv().is_ok() {}
        match self.producer.take() {
            Some(handle) => handle
                .await
                .map_err(|err| ResolveError::Producer(err.to_string())),
            None => Ok(()),
        }
    }

    /// Drain every remaining event.
    pub async fn collect(mut self) -> ResolveResult<Vec<StreamEvent>> {
        let mut events = Vec::new();
        while let Some(event) = self.next().await {
            events.push(event?);
        }
        self.close().await?;
        Ok(events)
    }
}

impl Drop for PositionStream {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.rx.close();
    }
}
