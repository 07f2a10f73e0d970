//! Wires a configured source to worker tasks and the output writer.
//!
//! Every worker owns one source instance and sends its batches over a bounded
//! [`mpsc`] channel to a single writer task, which serializes each record as
//! one JSON line. Shutdown is cooperative: cancelling the shared
//! [`CancellationToken`] stops the workers, which drops their senders and lets
//! the writer drain whatever is still queued.

use crate::cli::{
    config::RunConfig,
    record::Record,
    worker::{replay_items, worker_loop},
};
use anyhow::Context;
use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    sync::mpsc,
    task::JoinSet,
};
use tokio_util::sync::CancellationToken;
use trickle::{ConfiguredSource, SystemClock};

/// Totals reported once a run ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub emitted: u64,
    pub written: u64,
}

/// Writes every received batch as JSON lines until all senders are dropped.
///
/// Returns the number of records written.
pub async fn write_records<W>(mut out: W, mut rx: mpsc::Receiver<Vec<Record>>) -> anyhow::Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0_u64;
    let mut line = Vec::with_capacity(128);

    while let Some(batch) = rx.recv().await {
        for record in &batch {
            line.clear();
            serde_json::to_writer(&mut line, record)?;
            line.push(b'\n');
            out.write_all(&line).await.context("failed to write record")?;
            written += 1;
        }
        out.flush().await.context("failed to flush output")?;
    }

    Ok(written)
}

/// Runs the configured source until it finishes or `token` is cancelled.
///
/// # Errors
///
/// Fails if the source configuration is invalid or the output cannot be
/// written.
pub async fn run<W>(config: RunConfig, out: W, token: CancellationToken) -> anyhow::Result<RunSummary>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let source = config.source.build().context("invalid source configuration")?;
    let (tx, rx) = mpsc::channel(config.channel_capacity);
    let writer = tokio::spawn(write_records(out, rx));

    let mut workers = JoinSet::new();
    match source {
        ConfiguredSource::Items(items) => {
            tracing::info!("Replaying {} items", items.remaining());
            workers.spawn(replay_items(0, items, tx.clone()));
        }
        ConfiguredSource::ItemStream(supplier) => {
            tracing::info!(
                "Starting {} streams at {} items/s each",
                config.workers,
                supplier.items_per_second()
            );
            for id in 0..config.workers.get() {
                workers.spawn(worker_loop(
                    id,
                    supplier.create(),
                    tx.clone(),
                    token.clone(),
                    config.poll_interval,
                ));
            }
        }
        ConfiguredSource::LongStream(source) => {
            let local = source.local_parallelism(config.workers);
            let members = config.members.get();
            tracing::info!(
                "Starting {members} members x {local} instances at {} items/s in aggregate",
                source.items_per_second()
            );
            for member_index in 0..members {
                // Each member fixes its own start time, as a real cluster member would.
                let supplier = source.member_supplier((), &SystemClock);
                let instances = supplier.get_all(member_index, members, local);
                for (i, instance) in instances.into_iter().enumerate() {
                    workers.spawn(worker_loop(
                        member_index * local.get() + i,
                        instance,
                        tx.clone(),
                        token.clone(),
                        config.poll_interval,
                    ));
                }
            }
        }
    }
    // The writer exits once every worker has dropped its sender.
    drop(tx);

    let emitted = join_workers(workers, &token).await;
    let written = writer.await.context("writer task failed")??;
    Ok(RunSummary {
        emitted: emitted?,
        written,
    })
}

/// Waits for every worker and sums what they emitted.
///
/// A failed worker fails the whole run: the remaining workers are cancelled
/// and the first failure is returned once all of them have stopped.
async fn join_workers(mut workers: JoinSet<u64>, token: &CancellationToken) -> anyhow::Result<u64> {
    let mut emitted = 0;
    let mut failure = None;

    while let Some(result) = workers.join_next().await {
        match result {
            Ok(n) => emitted += n,
            Err(e) => {
                tracing::error!("Worker task failed: {e}");
                token.cancel();
                if failure.is_none() {
                    failure = Some(e);
                }
            }
        }
    }

    match failure {
        Some(e) => Err(anyhow::Error::new(e).context("worker task failed")),
        None => Ok(emitted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::record::{Item, RecordBuffer};
    use core::{num::NonZeroUsize, time::Duration};
    use serde_json::{Value, json};
    use trickle::{SimpleEvent, SourceConfig, TimestampedSourceBuffer};

    fn run_config(source: SourceConfig) -> RunConfig {
        RunConfig {
            source,
            workers: NonZeroUsize::new(2).unwrap(),
            members: NonZeroUsize::new(1).unwrap(),
            duration: None,
            poll_interval: Duration::from_millis(1),
            channel_capacity: 4,
        }
    }

    #[tokio::test]
    async fn writer_emits_one_line_per_record() {
        let (tx, rx) = mpsc::channel(2);
        let mut buf = RecordBuffer::new(1);
        buf.add(SimpleEvent::new(100, 0), 100);
        buf.add(SimpleEvent::new(100, 1), 100);
        tx.send(buf.take()).await.unwrap();
        drop(tx);

        let mut out = Vec::new();
        assert_eq!(write_records(&mut out, rx).await.unwrap(), 2);

        let lines: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(
            lines[1],
            json!({ "worker": 1, "timestamp": 100, "item": { "timestamp": 100, "sequence": 1 } })
        );
    }

    #[tokio::test]
    async fn items_run_finishes_without_cancellation() {
        let config = run_config(SourceConfig::Items {
            items: Some(vec![json!("a"), json!("b"), json!("c")]),
        });
        let (out, mut reader) = tokio::io::duplex(4096);

        let summary = run(config, out, CancellationToken::new()).await.unwrap();
        assert_eq!(summary, RunSummary { emitted: 3, written: 3 });

        let mut text = String::new();
        tokio::io::AsyncReadExt::read_to_string(&mut reader, &mut text)
            .await
            .unwrap();
        let items: Vec<Value> = text
            .lines()
            .map(|l| serde_json::from_str::<Value>(l).unwrap()["item"].clone())
            .collect();
        assert_eq!(items, [json!("a"), json!("b"), json!("c")]);
    }

    #[tokio::test]
    async fn invalid_source_is_reported() {
        let config = run_config(SourceConfig::ItemStream {
            items_per_second: Some(0),
        });
        let err = run(config, tokio::io::sink(), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid source configuration"));
    }

    #[tokio::test]
    async fn cancelled_stream_run_writes_everything_emitted() {
        let config = run_config(SourceConfig::ItemStream {
            items_per_second: Some(1_000),
        });
        let token = CancellationToken::new();
        let stopper = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            stopper.cancel();
        });

        let summary = run(config, tokio::io::sink(), token).await.unwrap();
        assert!(summary.emitted >= 2, "{summary:?}");
        assert_eq!(summary.emitted, summary.written);
    }

    #[tokio::test]
    async fn long_run_partitions_values_across_members() {
        let mut config = run_config(SourceConfig::LongStream {
            items_per_second: Some(1_000),
            initial_delay_ms: 0,
            preferred_local_parallelism: NonZeroUsize::new(2),
        });
        config.members = NonZeroUsize::new(2).unwrap();

        let token = CancellationToken::new();
        let stopper = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            stopper.cancel();
        });

        let (out, mut reader) = tokio::io::duplex(1 << 20);
        let summary = run(config, out, token).await.unwrap();

        let mut text = String::new();
        tokio::io::AsyncReadExt::read_to_string(&mut reader, &mut text)
            .await
            .unwrap();

        let mut values = std::collections::BTreeSet::new();
        let mut workers = std::collections::BTreeSet::new();
        for line in text.lines() {
            let record: Value = serde_json::from_str(line).unwrap();
            let worker = record["worker"].as_u64().unwrap();
            let value = record["item"].as_i64().unwrap();

            // Global index `w` of 4 instances emits `w, w + 4, ...`.
            assert_eq!(value.rem_euclid(4) as u64, worker, "{line}");
            assert!(values.insert(value), "value {value} emitted twice");
            workers.insert(worker);
        }

        assert_eq!(workers, (0..4).collect());
        assert_eq!(summary.written, values.len() as u64);
        assert_eq!(summary.emitted, summary.written);
    }

    #[tokio::test]
    async fn failed_worker_fails_the_run_and_cancels_the_rest() {
        let token = CancellationToken::new();
        let mut workers = JoinSet::new();

        let waiting = token.clone();
        workers.spawn(async move {
            waiting.cancelled().await;
            5_u64
        });
        workers.spawn(async {
            if true {
                panic!("worker exploded");
            }
            0_u64
        });

        let err = join_workers(workers, &token).await.unwrap_err();
        assert!(err.to_string().contains("worker task failed"));
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn join_sums_successful_workers() {
        let mut workers = JoinSet::new();
        workers.spawn(async { 2_u64 });
        workers.spawn(async { 3_u64 });

        assert_eq!(join_workers(workers, &CancellationToken::new()).await.unwrap(), 5);
    }

    #[test]
    fn long_records_carry_the_value() {
        let mut buf = RecordBuffer::new(0);
        buf.add(42_i64, 7);
        assert_eq!(buf.take()[0].item, Item::Long(42));
    }
}
