use core::{hint::black_box, time::Duration};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use trickle::{
    ItemStream, LongStreamFactory, MAX_BATCH_SIZE, ManualClock, SimpleEventFn,
    TimestampedVecBuffer, VecBuffer, items, stream_source_long,
};

// Far enough behind schedule that every poll hits the batch cap.
const BACKLOG: Duration = Duration::from_secs(3_600);

/// Benchmarks a saturated stream where every poll emits a full batch.
fn bench_item_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("item_stream");
    group.throughput(Throughput::Elements(MAX_BATCH_SIZE as u64));

    group.bench_function(format!("elems/{MAX_BATCH_SIZE}"), |b| {
        let clock = ManualClock::new(0, 1_700_000_000_000);
        let mut stream = ItemStream::with_clock(1_000_000, SimpleEventFn, clock.clone()).unwrap();
        let mut buf = TimestampedVecBuffer::with_capacity(MAX_BATCH_SIZE);

        b.iter(|| {
            clock.advance(BACKLOG);
            let poll = stream.fill_buffer(&mut buf);
            black_box(buf.drain());
            poll
        });
    });

    group.finish();
}

/// Benchmarks the pending path, which every idle driver iteration takes.
fn bench_item_stream_pending(c: &mut Criterion) {
    let mut group = c.benchmark_group("item_stream_pending");
    group.throughput(Throughput::Elements(1));

    group.bench_function("poll", |b| {
        let clock = ManualClock::new(0, 1_700_000_000_000);
        let mut stream = ItemStream::with_clock(1, SimpleEventFn, clock).unwrap();
        let mut buf = TimestampedVecBuffer::new();
        stream.fill_buffer(&mut buf);

        b.iter(|| black_box(stream.fill_buffer(&mut buf)));
    });

    group.finish();
}

fn bench_long_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("long_stream");
    group.throughput(Throughput::Elements(MAX_BATCH_SIZE as u64));

    group.bench_function(format!("elems/{MAX_BATCH_SIZE}"), |b| {
        let clock = ManualClock::new(0, 1_700_000_000_000);
        let source = stream_source_long(1_000_000, Duration::ZERO)
            .unwrap()
            .with_factory(LongStreamFactory::with_clock(clock.clone()));
        let mut stream = source.member_supplier((), &clock).get(0, 1);
        let mut buf = TimestampedVecBuffer::with_capacity(MAX_BATCH_SIZE);

        b.iter(|| {
            clock.advance(BACKLOG);
            let poll = stream.fill_buffer(&mut buf);
            black_box(buf.drain());
            poll
        });
    });

    group.finish();
}

fn bench_items(c: &mut Criterion) {
    const TOTAL: usize = 4096;
    let data: Vec<u64> = (0..TOTAL as u64).collect();

    let mut group = c.benchmark_group("items");
    group.throughput(Throughput::Elements(TOTAL as u64));

    group.bench_function(format!("elems/{TOTAL}"), |b| {
        b.iter(|| {
            let mut source = items(data.iter().copied());
            let mut buf = VecBuffer::new();
            source.fill_buffer(&mut buf);
            black_box(buf)
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_item_stream,
    bench_item_stream_pending,
    bench_long_stream,
    bench_items
);
criterion_main!(benches);
