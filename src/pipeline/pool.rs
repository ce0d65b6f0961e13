//! Bounded worker pool with first-error-wins abort.
//!
//! `W` scoped workers pull items from one rendezvous channel and apply the stage's
//! per-item function. A worker whose item fails reports on the error channel
//! (capacity `W`, so reporting never blocks) and exits. The feeder stops handing
//! out items as soon as an error is visible, closes the item channel, and waits for
//! in-flight items to finish. Exactly one error is returned; when several workers
//! fail concurrently, which one surfaces is not specified and the rest are dropped.

use anyhow::{Error, Result, bail};
use crossbeam_channel::{Receiver, Sender, bounded, select};
use log::debug;
use std::thread;

/// What the feeder saw: items handed to workers, items never handed out, error it observed.
struct FeedOutcome {
    dispatched: usize,
    undispatched: usize,
    error: Option<Error>,
}

/// Run `f` over every item with `workers` threads. Returns the first error seen.
///
/// Items already handed to a worker always run to completion; items not yet
/// dispatched when an error is observed are never attempted.
pub fn run_pool<I, T, F>(items: I, workers: usize, f: F) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Send,
    F: Fn(T) -> Result<()> + Sync,
{
    if workers == 0 {
        bail!("worker pool needs at least one worker");
    }

    // Capacity 0: a send completes only when a worker takes the item, so at most
    // `workers` items are ever in flight.
    let (item_tx, item_rx) = bounded::<T>(0);
    let (err_tx, err_rx) = bounded::<Error>(workers);

    let outcome = thread::scope(|s| {
        for _ in 0..workers {
            let item_rx = item_rx.clone();
            let err_tx = err_tx.clone();
            let f = &f;
            s.spawn(move || worker_loop(item_rx, err_tx, f));
        }
        drop(item_rx);
        drop(err_tx);

        // item_tx is moved into feed and dropped there; the scope then joins
        // every worker, so in-flight items drain before we look at errors.
        feed(items, item_tx, &err_rx)
    });

    let error = outcome.error.or_else(|| err_rx.try_recv().ok());
    match error {
        Some(e) => {
            debug!(
                "pool aborted: {} items dispatched, {} never dispatched, {} further errors dropped",
                outcome.dispatched,
                outcome.undispatched,
                err_rx.len()
            );
            Err(e)
        }
        None => {
            debug!("pool finished {} items", outcome.dispatched);
            Ok(())
        }
    }
}

fn worker_loop<T, F>(item_rx: Receiver<T>, err_tx: Sender<Error>, f: &F)
where
    F: Fn(T) -> Result<()>,
{
    while let Ok(item) = item_rx.recv() {
        if let Err(e) = f(item) {
            debug!("worker stopping: {:#}", e);
            let _ = err_tx.send(e);
            return;
        }
    }
}

/// Dispatch items until exhausted or an error shows up.
fn feed<I, T>(items: I, item_tx: Sender<T>, err_rx: &Receiver<Error>) -> FeedOutcome
where
    I: IntoIterator<Item = T>,
{
    let mut iter = items.into_iter();
    let mut dispatched = 0_usize;
    let abort = |dispatched: usize, rest: usize, error: Option<Error>| FeedOutcome {
        dispatched,
        undispatched: rest,
        error,
    };

    while let Some(item) = iter.next() {
        if let Ok(e) = err_rx.try_recv() {
            return abort(dispatched, 1 + iter.by_ref().count(), Some(e));
        }
        select! {
            send(item_tx, item) -> res => {
                if res.is_err() {
                    // Every worker has exited, so each one failed; errors are queued.
                    return abort(dispatched, 1 + iter.by_ref().count(), err_rx.try_recv().ok());
                }
                dispatched += 1;
            }
            recv(err_rx) -> e => return abort(dispatched, 1 + iter.by_ref().count(), e.ok()),
        }
    }
    abort(dispatched, 0, None)
}
