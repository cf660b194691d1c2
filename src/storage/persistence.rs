use crate::{domain::Board, storage::Storage};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

enum WriteRequest {
    Save(Vec<Board>),
    Flush(oneshot::Sender<()>),
}

/// Front of the durable slot used by the board store.
///
/// Loading never fails: an unreadable slot is logged and treated as empty.
/// Saving never blocks: snapshots are queued to a single writer task that
/// writes them in commit order. Snapshots superseded while a write is in
/// flight are coalesced, so the last write always holds the latest state.
///
/// Queued snapshots are only guaranteed to reach storage after
/// [`flush`](Self::flush) or [`close`](Self::close). Dropping the adapter with
/// snapshots still queued logs a warning.
pub struct PersistenceAdapter {
    storage: Arc<dyn Storage>,
    sender: mpsc::UnboundedSender<WriteRequest>,
    pending: Arc<AtomicUsize>,
    failed_writes: Arc<AtomicUsize>,
    writer: Option<JoinHandle<()>>,
}

impl PersistenceAdapter {
    /// Starts the writer task. Must be called inside a tokio runtime.
    pub fn spawn(storage: Arc<dyn Storage>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));
        let failed_writes = Arc::new(AtomicUsize::new(0));

        let writer = tokio::spawn(run_writer(
            Arc::clone(&storage),
            receiver,
            Arc::clone(&pending),
            Arc::clone(&failed_writes),
        ));

        Self {
            storage,
            sender,
            pending,
            failed_writes,
            writer: Some(writer),
        }
    }

    /// Reads every saved board, or nothing if the slot is absent or broken
    pub async fn load(&self) -> Vec<Board> {
        if let Err(e) = self.storage.initialize().await {
            tracing::warn!(error = %e, "storage unavailable, starting empty");
            return Vec::new();
        }
        match self.storage.load_boards().await {
            Ok(boards) => boards,
            Err(e) => {
                tracing::warn!(error = %e, "saved boards unreadable, starting empty");
                Vec::new()
            }
        }
    }

    /// Queues a snapshot for writing. Returns false if the writer has stopped.
    pub fn save(&self, boards: &[Board]) -> bool {
        self.pending.fetch_add(1, Ordering::SeqCst);
        match self.sender.send(WriteRequest::Save(boards.to_vec())) {
            Ok(()) => true,
            Err(_) => {
                self.pending.fetch_sub(1, Ordering::SeqCst);
                tracing::error!("persistence writer stopped, snapshot dropped");
                false
            }
        }
    }

    /// Waits until every snapshot queued before this call has been written
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.sender.send(WriteRequest::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }

    /// Writes everything still queued, then stops the writer task
    pub async fn close(mut self) {
        self.flush().await;
        let writer = self.writer.take();
        // Dropping the adapter drops the only sender, which ends the writer loop.
        drop(self);

        if let Some(writer) = writer {
            if let Err(e) = writer.await {
                tracing::error!(error = %e, "persistence writer did not shut down cleanly");
            }
        }
    }

    /// Snapshots queued but not yet written
    pub fn pending_writes(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Number of writes that failed since start
    pub fn failed_writes(&self) -> usize {
        self.failed_writes.load(Ordering::SeqCst)
    }
}

impl Drop for PersistenceAdapter {
    fn drop(&mut self) {
        let pending = self.pending_writes();
        if pending > 0 {
            tracing::warn!(
                pending,
                "persistence dropped with unsaved snapshots, call flush or close first"
            );
        }
    }
}

async fn run_writer(
    storage: Arc<dyn Storage>,
    mut receiver: mpsc::UnboundedReceiver<WriteRequest>,
    pending: Arc<AtomicUsize>,
    failed_writes: Arc<AtomicUsize>,
) {
    while let Some(request) = receiver.recv().await {
        let mut latest = None;
        let mut batched = 0;
        let mut acks = Vec::new();

        let mut next = Some(request);
        while let Some(request) = next {
            match request {
                WriteRequest::Save(boards) => {
                    latest = Some(boards);
                    batched += 1;
                }
                WriteRequest::Flush(ack) => acks.push(ack),
            }
            next = receiver.try_recv().ok();
        }

        if let Some(boards) = latest {
            match storage.save_boards(&boards).await {
                Ok(()) => tracing::trace!(boards = boards.len(), "boards saved"),
                Err(e) => {
                    failed_writes.fetch_add(1, Ordering::SeqCst);
                    tracing::error!(error = %e, "failed to save boards");
                }
            }
            pending.fetch_sub(batched, Ordering::SeqCst);
        }

        for ack in acks {
            let _ = ack.send(());
        }
    }
}
