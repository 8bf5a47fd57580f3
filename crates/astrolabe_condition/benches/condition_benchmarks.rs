//! Benchmarks for condition evaluation.
//!
//! Run with: `cargo bench --package astrolabe_condition`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use astrolabe_condition::{
    Condition, EvaluationConfig, OpType, ScriptingContext, SortKey, SortingMethod, ValueRef,
    seeded_rng,
};
use astrolabe_foundation::{MeterType, ObjectType, PlanetType};
use astrolabe_universe::{ObjectProperty, Universe, UniverseObject};

// =============================================================================
// Helper Functions
// =============================================================================

/// Creates a grid of systems, each with two planets, linked to their
/// neighbours along the x axis.
fn create_galaxy(systems: usize) -> Universe {
    let mut universe = Universe::new();
    let mut previous = None;
    for i in 0..systems {
        let x = (i % 100) as f64 * 50.0;
        let y = (i / 100) as f64 * 50.0;
        let (u, system) = universe.spawn(UniverseObject::system(format!("S{i}"), x, y));
        universe = u;
        for p in 0..2 {
            let planet = UniverseObject::planet(format!("S{i}-{p}"), PlanetType::Terran)
                .with_meter(MeterType::Industry, ((i * 2 + p) % 20) as f64);
            let (u, planet) = universe.spawn(planet);
            universe = u.place_in_system(system, planet).unwrap();
        }
        if let Some(prev) = previous.filter(|_| i % 100 != 0) {
            universe = universe.add_starlane(prev, system).unwrap();
        }
        previous = Some(system);
    }
    universe
}

// =============================================================================
// Partition Benchmarks
// =============================================================================

fn bench_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition");

    // Constant bounds bind once for the whole set.
    let constant = Condition::meter_value(MeterType::Industry, Some(5.0.into()), Some(15.0.into()));
    // Bounds reading the candidate are bound per object.
    let per_candidate = Condition::meter_value(
        MeterType::Industry,
        Some(ValueRef::operation(
            OpType::Minus,
            vec![
                ValueRef::local(ObjectProperty::Meter(MeterType::Industry)),
                1.0.into(),
            ],
        )),
        Some(15.0.into()),
    );

    for size in [100, 1_000, 5_000] {
        let universe = create_galaxy(size);
        let rng = seeded_rng(42);
        let ctx = ScriptingContext::new(&universe, &rng);
        let pool = universe.object_ids();

        group.throughput(Throughput::Elements(pool.len() as u64));
        group.bench_with_input(BenchmarkId::new("bound_once", size), &pool, |b, pool| {
            b.iter(|| black_box(constant.partition(&ctx, pool)))
        });
        group.bench_with_input(BenchmarkId::new("per_candidate", size), &pool, |b, pool| {
            b.iter(|| black_box(per_candidate.partition(&ctx, pool)))
        });
    }

    group.finish();
}

// =============================================================================
// Containment Benchmarks
// =============================================================================

fn bench_containment(c: &mut Criterion) {
    let mut group = c.benchmark_group("containment");

    let universe = create_galaxy(1_000);
    let rng = seeded_rng(42);
    let busy = Condition::contains(Condition::meter_value(
        MeterType::Industry,
        Some(18.0.into()),
        None,
    ));
    let small_input = EvaluationConfig::default();
    let whole_set = EvaluationConfig::without_small_input_path();

    for size in [4, 16, 256] {
        let pool: Vec<_> = universe
            .objects_of_type(ObjectType::System)
            .into_iter()
            .take(size)
            .collect();

        for (name, config) in [("small_input", &small_input), ("whole_set", &whole_set)] {
            let ctx = ScriptingContext::new(&universe, &rng).with_config(config);
            group.bench_with_input(BenchmarkId::new(name, size), &pool, |b, pool| {
                b.iter(|| black_box(busy.partition(&ctx, pool)))
            });
        }
    }

    group.finish();
}

// =============================================================================
// Selection Benchmarks
// =============================================================================

fn bench_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection");

    let universe = create_galaxy(1_000);
    let rng = seeded_rng(42);
    let ctx = ScriptingContext::new(&universe, &rng);
    let planets = Condition::object_type(ObjectType::Planet);

    let random = Condition::number_of(50, planets.clone());
    let richest = Condition::sorted_number_of(
        50,
        Some(SortKey::Number(ValueRef::local(ObjectProperty::Meter(
            MeterType::Industry,
        )))),
        SortingMethod::Max,
        planets,
    );

    group.bench_function("random", |b| b.iter(|| black_box(random.matching(&ctx))));
    group.bench_function("maximum", |b| b.iter(|| black_box(richest.matching(&ctx))));

    group.finish();
}

// =============================================================================
// Lane Geometry Benchmarks
// =============================================================================

fn bench_lanes(c: &mut Criterion) {
    let mut group = c.benchmark_group("lanes");

    for size in [100, 400] {
        let universe = create_galaxy(size);
        let rng = seeded_rng(42);
        let ctx = ScriptingContext::new(&universe, &rng);
        let first = universe.objects_of_type(ObjectType::System)[0];
        let crossing = Condition::starlane_would_cross(Condition::object_id(first.raw()));
        let can_add = Condition::can_add_starlane_to(Condition::object_id(first.raw()));

        group.bench_with_input(BenchmarkId::new("would_cross", size), &crossing, |b, c| {
            b.iter(|| black_box(c.matching(&ctx)))
        });
        group.bench_with_input(BenchmarkId::new("can_add", size), &can_add, |b, c| {
            b.iter(|| black_box(c.matching(&ctx)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_partition,
    bench_containment,
    bench_selection,
    bench_lanes
);
criterion_main!(benches);
