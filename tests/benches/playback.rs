use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use morse_core::hal::mock::RecordingActuator;
use morse_core::test_utils::test_scenarios::PANGRAM;
use morse_core::{compile, lookup, MorseContext, TimingConfig};

type Ctx = MorseContext<RecordingActuator, 64, 512>;

fn bench_lookup(c: &mut Criterion) {
    c.bench_function("lookup_pangram", |b| {
        b.iter(|| {
            for ch in PANGRAM.bytes() {
                black_box(lookup(black_box(ch)));
            }
        })
    });
}

fn bench_compile(c: &mut Criterion) {
    let timing = TimingConfig::standard();
    c.bench_function("compile_letter", |b| {
        b.iter(|| black_box(compile(black_box(b'0'), &timing)))
    });
}

fn bench_translate_and_play(c: &mut Criterion) {
    c.bench_function("translate_and_play_pangram", |b| {
        b.iter_batched(
            || {
                let ctx: Ctx = MorseContext::new(RecordingActuator::new(), TimingConfig::standard());
                ctx.submit_text(PANGRAM.as_bytes());
                ctx
            },
            |ctx| {
                ctx.drain_letters(|| {});
                while !ctx.is_idle() {
                    black_box(ctx.on_period());
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_period_handler(c: &mut Criterion) {
    let ctx: Ctx = MorseContext::new(RecordingActuator::new(), TimingConfig::standard());
    c.bench_function("on_period_idle", |b| b.iter(|| black_box(ctx.on_period())));
}

criterion_group!(
    benches,
    bench_lookup,
    bench_compile,
    bench_translate_and_play,
    bench_period_handler
);
criterion_main!(benches);
