use crate::cli::record::{Record, RecordBuffer};
use core::time::Duration;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use trickle::{
    GeneratorFunction, ItemStream, ItemsSource, LongStream, Poll, SimpleEvent, TimeSource,
};

/// A paced source a worker can drive.
pub trait Paced: Send + 'static {
    fn poll(&mut self, buf: &mut RecordBuffer) -> Poll;
}

impl<G, C> Paced for ItemStream<SimpleEvent, G, C>
where
    G: GeneratorFunction<SimpleEvent, Err = core::convert::Infallible> + Send + 'static,
    C: TimeSource + Send + 'static,
{
    fn poll(&mut self, buf: &mut RecordBuffer) -> Poll {
        self.fill_buffer(buf)
    }
}

impl<P, C> Paced for LongStream<P, C>
where
    P: Send + 'static,
    C: TimeSource + Send + 'static,
{
    fn poll(&mut self, buf: &mut RecordBuffer) -> Poll {
        self.fill_buffer(buf)
    }
}

/// Drives one paced source until cancelled or the output closes.
///
/// Every worker owns its source; nothing is shared with other workers. The
/// source itself never waits, so pacing comes from this loop: on
/// [`Poll::Pending`] the worker sleeps for the hinted duration, capped at
/// `poll_interval`, and wakes early on cancellation.
///
/// Returns the number of items emitted.
pub async fn worker_loop<S: Paced>(
    worker_id: usize,
    mut source: S,
    tx: mpsc::Sender<Vec<Record>>,
    token: CancellationToken,
    poll_interval: Duration,
) -> u64 {
    tracing::trace!("Worker {worker_id} started");

    let mut buf = RecordBuffer::new(worker_id);
    let mut emitted = 0_u64;

    while !token.is_cancelled() {
        match source.poll(&mut buf) {
            Poll::Ready { emitted: n } => {
                emitted += n as u64;
                if tx.send(buf.take()).await.is_err() {
                    tracing::debug!("Worker {worker_id} output closed");
                    break;
                }
                // Let other workers run between back-to-back batches.
                tokio::task::yield_now().await;
            }
            Poll::Pending { yield_for } => {
                tokio::select! {
                    () = token.cancelled() => break,
                    () = tokio::time::sleep(yield_for.min(poll_interval)) => {}
                }
            }
        }
    }

    tracing::trace!("Worker {worker_id} stopped after {emitted} items");
    emitted
}

/// Replays a finite source once and forwards everything it emitted.
pub async fn replay_items(
    worker_id: usize,
    mut source: ItemsSource<Value>,
    tx: mpsc::Sender<Vec<Record>>,
) -> u64 {
    let emitted = source.remaining() as u64;
    let mut buf = RecordBuffer::new(worker_id);
    source.fill_buffer(&mut buf);
    debug_assert!(buf.is_closed());

    if !buf.is_empty() && tx.send(buf.take()).await.is_err() {
        tracing::debug!("Worker {worker_id} output closed");
    }
    tracing::debug!("Items source closed after {emitted} items");
    emitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::record::Item;
    use trickle::{ManualClock, SimpleEventFn, items};

    #[tokio::test(start_paused = true)]
    async fn worker_paces_and_stops_on_cancel() {
        let clock = ManualClock::new(0, 1_700_000_000_000);
        let stream = ItemStream::with_clock(10, SimpleEventFn, clock.clone()).unwrap();
        let (tx, mut rx) = mpsc::channel(16);
        let token = CancellationToken::new();

        let handle = tokio::spawn(worker_loop(
            7,
            stream,
            tx,
            token.clone(),
            Duration::from_millis(5),
        ));

        let first = rx.recv().await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].worker, 7);

        clock.advance(Duration::from_millis(100));
        let second = rx.recv().await.unwrap();
        assert_eq!(second[0].item, Item::Event(trickle::SimpleEvent::new(1_700_000_000_100, 1)));

        token.cancel();
        assert_eq!(handle.await.unwrap(), 2);
    }

    #[tokio::test]
    async fn worker_stops_when_output_closes() {
        let stream = ItemStream::new(1_000, SimpleEventFn).unwrap();
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let emitted = worker_loop(0, stream, tx, CancellationToken::new(), Duration::from_millis(1)).await;
        assert_eq!(emitted, 1);
    }

    #[tokio::test]
    async fn replay_forwards_all_items() {
        let (tx, mut rx) = mpsc::channel(1);
        let source = items([Value::from(1), Value::from(2)]);

        assert_eq!(replay_items(0, source, tx).await, 2);
        let batch = rx.recv().await.unwrap();
        assert_eq!(batch.len(), 2);
        assert!(rx.recv().await.is_none());
    }
}
