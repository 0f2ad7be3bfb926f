use criterion::{
    black_box, criterion_group, criterion_main, BenchmarkId, Criterion,
};
use frep::{
    context::Context,
    mesh::{self, Settings},
    pool::ThreadPool,
    region::Region,
    types::Interval,
};

pub fn sphere_thread_sweep(c: &mut Criterion) {
    let mut ctx = Context::new();
    let (x, y, z) = (ctx.x(), ctx.y(), ctx.z());
    let x2 = ctx.square(x).unwrap();
    let y2 = ctx.square(y).unwrap();
    let z2 = ctx.square(z).unwrap();
    let r = ctx.add(x2, y2).unwrap();
    let r = ctx.add(r, z2).unwrap();
    let root = ctx.sub(r, 0.5).unwrap();

    let i = Interval::new(-1.0, 1.0);
    let region = &Region::new(i, i, i, 6).unwrap();
    let ctx = &ctx;

    let mut group = c.benchmark_group("speed vs threads (sphere) (res 6)");
    for threads in [0, 2, 4, 8] {
        let pool = (threads > 0).then(|| {
            ThreadPool::Custom(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .unwrap(),
            )
        });
        let settings = &Settings {
            threads: pool.as_ref(),
            ..Default::default()
        };
        group.bench_function(BenchmarkId::new("render", threads), |b| {
            b.iter(|| black_box(mesh::render(ctx, root, region, settings)))
        });
    }
}

criterion_group!(benches, sphere_thread_sweep);
criterion_main!(benches);
