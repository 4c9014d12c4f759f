//! Benchmarks for the replacement policies.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pagesweep::{AccessKind, PageNumber, PolicyKind, ProcessId, Simulator, SimulatorConfig};

/// A looping reference string over `pages` pages with a hot subset.
fn reference_string(pages: u32, len: usize) -> Vec<(PageNumber, AccessKind)> {
    (0..len as u32)
        .map(|i| {
            let page = if i % 3 == 0 { i % 4 } else { (i * 7) % pages };
            let kind = if i % 5 == 0 { AccessKind::Write } else { AccessKind::Read };
            (PageNumber::new(page), kind)
        })
        .collect()
}

fn bench_policy(c: &mut Criterion, kind: PolicyKind) {
    let mut group = c.benchmark_group(format!("{}_access", kind));
    let trace = reference_string(256, 4096);

    for frames in [16usize, 64, 128].iter() {
        let config = SimulatorConfig {
            frame_count: *frames,
            process_count: 1,
            pages_per_process: 256,
            ..SimulatorConfig::with_policy(kind)
        };
        let sim = Simulator::new(config).unwrap();
        let pid = ProcessId::new(0);

        group.bench_with_input(BenchmarkId::from_parameter(frames), frames, |b, _| {
            b.iter(|| {
                for &(page, access) in &trace {
                    black_box(sim.access(pid, page, access).unwrap());
                }
                sim.reset().unwrap();
            });
        });
    }

    group.finish();
}

fn bench_lru_approx(c: &mut Criterion) {
    bench_policy(c, PolicyKind::LruApprox);
}

fn bench_second_chance(c: &mut Criterion) {
    bench_policy(c, PolicyKind::SecondChance);
}

criterion_group!(benches, bench_lru_approx, bench_second_chance);
criterion_main!(benches);
