//! Benchmarks for the plasma field engine.
//!
//! Performance budgets:
//! - Field::tick (8 emitters): < 100ns
//! - Palette::index_for: < 20ns
//! - Field::render 128x64 (reference panel): < 1ms
//! - Field::render 160x96 (terminal half-blocks, 160x48 cells): < 2ms
//!
//! Run with: cargo bench -p plasma-fx --bench field_bench

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use plasma_fx::{Field, Framebuffer, Palette, Rgb};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn seeded_field(palette: Palette) -> Field {
    Field::with_rng(palette, &mut StdRng::seed_from_u64(0x5eed))
}

// =============================================================================
// Step Benchmarks
// =============================================================================

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("plasma_field/tick");

    group.bench_function("eight_emitters", |b| {
        let mut field = seeded_field(Palette::hues());
        b.iter(|| {
            field.tick();
            black_box(field.shift())
        })
    });

    group.finish();
}

fn bench_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("plasma_field/index");
    let hues = Palette::hues();

    group.bench_function("hues_2048", |b| {
        let mut v = 0.0f64;
        b.iter(|| {
            v += 0.37;
            black_box(hues.index_for(black_box(v)))
        })
    });

    group.finish();
}

// =============================================================================
// Render Benchmarks
// =============================================================================

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("plasma_field/render");

    let gradient = Palette::gradient(&[Rgb::RED, Rgb::GREEN, Rgb::BLUE]).unwrap_or_else(|e| {
        panic!("gradient stops are valid: {e}");
    });
    let palettes = [("hues", Palette::hues()), ("gradient", gradient)];

    for (w, h) in [(128u32, 64u32), (160, 96)] {
        for (name, palette) in &palettes {
            let field = seeded_field(palette.clone());
            let mut fb = Framebuffer::new(w, h);
            group.bench_with_input(
                BenchmarkId::new(*name, format!("{w}x{h}")),
                &(w, h),
                |b, _| {
                    b.iter(|| {
                        field.render(&mut fb);
                        black_box(fb.pixels().len())
                    })
                },
            );
        }
    }

    group.bench_function("tick_and_render_128x64", |b| {
        let mut field = seeded_field(Palette::hues());
        let mut fb = Framebuffer::new(128, 64);
        b.iter(|| {
            field.tick();
            field.render(&mut fb);
            black_box(fb.get_pixel(0, 0))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_tick, bench_index, bench_render);
criterion_main!(benches);
