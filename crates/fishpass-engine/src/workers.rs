//! Origin worker pool.
//!
//! Workers pull `(position, origin)` tasks from a shared crossbeam
//! channel, walk them with a borrowed [`PropagationEngine`], and send
//! `(position, outcome)` back. The caller reassembles outcomes by
//! position, so the result order never depends on scheduling.

use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use fishpass_core::OriginFailure;

use crate::engine::{PropagationEngine, Walk};
use crate::origins::Origin;

/// Outcome of one resolved-or-failed origin.
pub(crate) type Outcome = Result<Walk, OriginFailure>;

/// Walk one origin entry, turning a walk error into a failure row.
pub(crate) fn process(
    engine: &PropagationEngine<'_>,
    task: &Result<Origin, OriginFailure>,
) -> Outcome {
    let origin = task.as_ref().map_err(Clone::clone)?;
    engine.propagate(origin).map_err(|e| OriginFailure {
        origin_id: origin.origin_id.clone(),
        error: e.to_string(),
    })
}

/// Process `tasks` on `workers` scoped threads. Outcomes are returned in
/// task order.
pub(crate) fn run_parallel(
    engine: &PropagationEngine<'_>,
    tasks: &[Result<Origin, OriginFailure>],
    workers: usize,
) -> Vec<Outcome> {
    let (task_tx, task_rx) = unbounded::<(usize, &Result<Origin, OriginFailure>)>();
    let (out_tx, out_rx) = unbounded::<(usize, Outcome)>();
    for entry in tasks.iter().enumerate() {
        // The receiver is alive until the scope below ends.
        let _ = task_tx.send(entry);
    }
    drop(task_tx);

    thread::scope(|scope| {
        for worker in 0..workers {
            let task_rx = task_rx.clone();
            let out_tx = out_tx.clone();
            scope.spawn(move || worker_loop(worker, engine, task_rx, out_tx));
        }
    });
    drop(out_tx);

    let mut slots: Vec<Option<Outcome>> = Vec::new();
    slots.resize_with(tasks.len(), || None);
    for (position, outcome) in out_rx.try_iter() {
        slots[position] = Some(outcome);
    }
    slots.into_iter().flatten().collect()
}

fn worker_loop<'t>(
    worker: usize,
    engine: &PropagationEngine<'_>,
    tasks: Receiver<(usize, &'t Result<Origin, OriginFailure>)>,
    out: Sender<(usize, Outcome)>,
) {
    let mut handled = 0usize;
    while let Ok((position, task)) = tasks.recv() {
        // Sender side is held by the caller until every worker exits.
        let _ = out.send((position, process(engine, task)));
        handled += 1;
    }
    tracing::trace!(worker, handled, "origin worker finished");
}
