//! Latency of a single `publish` call against a fixed number of idle
//! (but draining) subscribers.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use nebula_eventbus::EventBus;
use tokio_stream::StreamExt;

fn emit(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("emit");

    for subscriber_count in [1usize, 8, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(subscriber_count), &subscriber_count, |b, &subscriber_count| {
            b.to_async(&rt).iter(|| async {
                let bus: EventBus<u64> = EventBus::new(1024);
                let mut receivers = Vec::new();
                for _ in 0..subscriber_count {
                    receivers.push(bus.subscribe());
                }
                let drain = tokio::spawn(async move {
                    for rx in &mut receivers {
                        let _ = rx.next().await;
                    }
                });
                bus.publish(42u64).await;
                drain.await.unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(benches, emit);
criterion_main!(benches);
