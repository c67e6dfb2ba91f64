// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The write queue: one ordered stream of write jobs against the database.
//!
//! All writes go through a single `tokio-rusqlite` connection. Its background
//! thread drains an unbounded channel, so jobs run one at a time in the order
//! their `call` was first polled. Reads use a separate pool of read-only
//! connections and run concurrently with each other and with the current write.
//!
//! **Do NOT create additional Connection instances for writes.**

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use herald_core::HeraldError;
use tracing::{debug, info, warn};

/// Convert a tokio-rusqlite error into a `HeraldError`.
///
/// A connection that is already closed means the queue shut down.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> HeraldError {
    match e {
        tokio_rusqlite::Error::ConnectionClosed => HeraldError::QueueClosed,
        other => HeraldError::Storage {
            source: Box::new(other),
        },
    }
}

/// Serializes every mutation of the store into a FIFO stream of jobs.
pub struct WriteQueue {
    writer: tokio_rusqlite::Connection,
    readers: Vec<tokio_rusqlite::Connection>,
    next_reader: AtomicUsize,
    next_job: AtomicU64,
    closed: AtomicBool,
}

impl WriteQueue {
    /// Takes ownership of the writer and the read pool.
    ///
    /// `readers` must be non-empty; reads fall back to the writer otherwise.
    pub fn new(
        writer: tokio_rusqlite::Connection,
        readers: Vec<tokio_rusqlite::Connection>,
    ) -> Self {
        Self {
            writer,
            readers,
            next_reader: AtomicUsize::new(0),
            next_job: AtomicU64::new(1),
            closed: AtomicBool::new(false),
        }
    }

    /// Enqueues a write job and waits for its result.
    ///
    /// The job runs inside its own transaction: returning `Err` rolls back the
    /// job's statements and reports the error to this caller only. Jobs run
    /// strictly in submission order. If the caller stops waiting, an accepted
    /// job still runs to completion.
    pub async fn submit<T, F>(&self, job: F) -> Result<T, HeraldError>
    where
        F: FnOnce(&rusqlite::Transaction<'_>) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        if self.is_closed() {
            return Err(HeraldError::QueueClosed);
        }
        let job_id = self.next_job.fetch_add(1, Ordering::Relaxed);

        self.writer
            .call(move |conn| -> Result<T, rusqlite::Error> {
                let tx = conn.transaction()?;
                let value = job(&tx)?;
                tx.commit()?;
                Ok(value)
            })
            .await
            .map_err(|e| {
                let err = map_tr_err(e);
                if !matches!(err, HeraldError::QueueClosed) {
                    warn!(job = job_id, error = %err, "write job failed");
                }
                err
            })
    }

    /// Runs a read-only query on one of the read connections.
    ///
    /// Reads are not ordered relative to writes beyond SQLite's snapshot
    /// visibility: a read sees every job that committed before it started.
    pub async fn read<T, F>(&self, query: F) -> Result<T, HeraldError>
    where
        F: FnOnce(&rusqlite::Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        if self.is_closed() {
            return Err(HeraldError::QueueClosed);
        }
        let conn = self.reader();
        conn.call(move |conn| query(conn)).await.map_err(map_tr_err)
    }

    fn reader(&self) -> &tokio_rusqlite::Connection {
        if self.readers.is_empty() {
            return &self.writer;
        }
        let idx = self.next_reader.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        &self.readers[idx]
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Stops accepting jobs, drains the accepted ones, and closes the handles.
    ///
    /// New submissions fail with [`HeraldError::QueueClosed`] from the moment
    /// this is called. Jobs accepted earlier are ahead of the checkpoint in the
    /// writer's channel and finish first. Calling it twice is a no-op.
    pub async fn close(&self) -> Result<(), HeraldError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        debug!("write queue closed to new jobs, draining");

        self.writer
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");

        for reader in &self.readers {
            reader.clone().close().await.map_err(map_tr_err)?;
        }
        self.writer.clone().close().await.map_err(map_tr_err)?;

        info!(
            jobs = self.next_job.load(Ordering::Relaxed) - 1,
            "write queue drained and closed"
        );
        Ok(())
    }
}
