use std::collections::HashMap;

use approx::assert_relative_eq;
use frep::{
    context::{Context, Node},
    mesh::{self, Mesh, Settings},
    pool::ThreadPool,
    region::Region,
    types::Interval,
    Error,
};
use nalgebra::{Matrix4, Translation3, Vector3};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn cube(res: u8) -> Region {
    let i = Interval::new(-1.0, 1.0);
    Region::new(i, i, i, res).unwrap()
}

/// Sphere about the origin, with the given squared radius
fn sphere(ctx: &mut Context, r2: f32) -> Node {
    let (x, y, z) = (ctx.x(), ctx.y(), ctx.z());
    let x2 = ctx.square(x).unwrap();
    let y2 = ctx.square(y).unwrap();
    let z2 = ctx.square(z).unwrap();
    let sum = ctx.add(x2, y2).unwrap();
    let sum = ctx.add(sum, z2).unwrap();
    ctx.sub(sum, r2).unwrap()
}

/// Two overlapping spheres, with a slab cut out of their union
fn blobs(ctx: &mut Context) -> Node {
    let (x, y, z) = (ctx.x(), ctx.y(), ctx.z());
    let mut balls = vec![];
    for dx in [-0.3, 0.3] {
        let px = ctx.sub(x, dx).unwrap();
        let px = ctx.square(px).unwrap();
        let py = ctx.square(y).unwrap();
        let pz = ctx.square(z).unwrap();
        let d = ctx.add(px, py).unwrap();
        let d = ctx.add(d, pz).unwrap();
        let d = ctx.sqrt(d).unwrap();
        balls.push(ctx.sub(d, 0.5).unwrap());
    }
    let union = ctx.min(balls[0], balls[1]).unwrap();
    let slab = ctx.abs(z).unwrap();
    let slab = ctx.sub(0.1, slab).unwrap();
    ctx.max(union, slab).unwrap()
}

fn single_threaded<'a>() -> Settings<'a> {
    Settings {
        threads: None,
        ..Default::default()
    }
}

/// Counts how often each undirected edge is used by a triangle
fn edge_counts(mesh: &Mesh) -> HashMap<(usize, usize), usize> {
    let mut out = HashMap::new();
    for t in &mesh.triangles {
        for (a, b) in [(t.x, t.y), (t.y, t.z), (t.z, t.x)] {
            *out.entry((a.min(b), a.max(b))).or_default() += 1;
        }
    }
    out
}

#[test]
fn test_sphere_triangle_count() {
    init_logger();
    let mut ctx = Context::new();
    let root = sphere(&mut ctx, 0.5);
    for settings in [single_threaded(), Settings::default()] {
        let mesh = mesh::render(&ctx, root, &cube(1), &settings).unwrap();
        assert_eq!(mesh.triangles.len(), 12);
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.normals.len(), 8);
        for i in 0..mesh.triangles.len() {
            let t = mesh.triangles[i];
            let center = (mesh.vertices[t.x]
                + mesh.vertices[t.y]
                + mesh.vertices[t.z])
                / 3.0;
            assert!(mesh.norm(i).dot(&center) > 0.0, "inward face {i}");
        }
    }
}

#[test]
fn test_plane_normals() {
    init_logger();
    for axis in 0..3 {
        for negate in [false, true] {
            let mut ctx = Context::new();
            let v = [ctx.x(), ctx.y(), ctx.z()][axis];
            let mut root = ctx.add(v, 0.75).unwrap();
            if negate {
                root = ctx.neg(root).unwrap();
            }
            let mut expected = Vector3::zeros();
            expected[axis] = if negate { -1.0 } else { 1.0 };

            for (res, count) in [(1, 2), (2, 18)] {
                let mesh =
                    mesh::render(&ctx, root, &cube(res), &Settings::default())
                        .unwrap();
                assert_eq!(mesh.triangles.len(), count);
                for i in 0..mesh.triangles.len() {
                    assert_relative_eq!(
                        mesh.norm(i),
                        expected,
                        epsilon = 1e-6
                    );
                }
                for (v, n) in mesh.vertices.iter().zip(&mesh.normals) {
                    assert_relative_eq!(v[axis], -0.75, epsilon = 1e-6);
                    assert_eq!(*n, expected);
                }
            }
        }
    }
}

#[test]
fn test_pruning_is_transparent() {
    init_logger();
    let mut ctx = Context::new();
    let root = blobs(&mut ctx);
    let region = cube(4);
    let pruned = mesh::render(&ctx, root, &region, &single_threaded()).unwrap();
    let unpruned = mesh::render(
        &ctx,
        root,
        &region,
        &Settings {
            prune: false,
            ..single_threaded()
        },
    )
    .unwrap();
    assert!(!pruned.triangles.is_empty());
    assert_eq!(pruned, unpruned);
}

#[test]
fn test_pruning_keeps_nan() {
    init_logger();
    // `sqrt` is NaN for negative x, which `max` must not discard
    let mut ctx = Context::new();
    let x = ctx.x();
    let s = ctx.sqrt(x).unwrap();
    let s = ctx.sub(s, 0.5).unwrap();
    let root = ctx.max(s, -5.0).unwrap();
    let i = Interval::new(-1.0, 1.0);
    let region = Region::new(Interval::new(-1.1, 0.9), i, i, 3).unwrap();

    let pruned = mesh::render(&ctx, root, &region, &single_threaded()).unwrap();
    let unpruned = mesh::render(
        &ctx,
        root,
        &region,
        &Settings {
            prune: false,
            ..single_threaded()
        },
    )
    .unwrap();
    assert!(!pruned.triangles.is_empty());
    assert_eq!(pruned, unpruned);
    for v in &pruned.vertices {
        assert!(v.iter().all(|c| c.is_finite()), "bad vertex {v:?}");
        assert!(v.x > -0.25, "vertex {v:?} in the NaN half-space");
    }
}

#[test]
fn test_threads_are_transparent() {
    init_logger();
    let mut ctx = Context::new();
    let root = blobs(&mut ctx);
    let region = cube(4);
    let single = mesh::render(&ctx, root, &region, &single_threaded()).unwrap();
    let global =
        mesh::render(&ctx, root, &region, &Settings::default()).unwrap();
    assert_eq!(single, global);

    let pool = ThreadPool::Custom(
        rayon::ThreadPoolBuilder::new()
            .num_threads(3)
            .build()
            .unwrap(),
    );
    let custom = mesh::render(
        &ctx,
        root,
        &region,
        &Settings {
            threads: Some(&pool),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(single, custom);

    // Rendering is deterministic
    let again = mesh::render(&ctx, root, &region, &single_threaded()).unwrap();
    assert_eq!(single, again);
}

#[test]
fn test_closed_mesh() {
    init_logger();
    for res in [3, 4, 5] {
        let mut ctx = Context::new();
        let root = sphere(&mut ctx, 0.5);
        let mesh =
            mesh::render(&ctx, root, &cube(res), &Settings::default()).unwrap();
        assert!(!mesh.triangles.is_empty());
        for (edge, count) in edge_counts(&mesh) {
            assert_eq!(count % 2, 0, "edge {edge:?} used {count} times");
        }
        let cell = 2.0 / (1 << res) as f32;
        for (v, n) in mesh.vertices.iter().zip(&mesh.normals) {
            assert!((v.norm() - 0.5f32.sqrt()).abs() < cell * 2.0);
            assert!(n.dot(&v.normalize()) > 0.99, "bad normal at {v:?}");
        }
    }

    let mut ctx = Context::new();
    let root = blobs(&mut ctx);
    let mesh =
        mesh::render(&ctx, root, &cube(5), &Settings::default()).unwrap();
    for (edge, count) in edge_counts(&mesh) {
        assert_eq!(count % 2, 0, "edge {edge:?} used {count} times");
    }
}

#[test]
fn test_min_cell_size() {
    let mut ctx = Context::new();
    let root = sphere(&mut ctx, 0.5);
    let coarse = mesh::render(
        &ctx,
        root,
        &cube(2),
        &Settings {
            min_cell_size: 2,
            ..Default::default()
        },
    )
    .unwrap();
    let fine = mesh::render(&ctx, root, &cube(1), &Settings::default());
    assert_eq!(coarse.triangles.len(), fine.unwrap().triangles.len());

    let err = mesh::render(
        &ctx,
        root,
        &cube(2),
        &Settings {
            min_cell_size: 6,
            ..Default::default()
        },
    );
    assert_eq!(err, Err(Error::BadCellSize(6)));
}

#[test]
fn test_world_to_model() {
    let mut ctx = Context::new();
    let root = sphere(&mut ctx, 0.0625);
    let center = Vector3::new(1.0, 1.0, 1.0);
    let settings = Settings {
        world_to_model: Translation3::from(-center).to_homogeneous(),
        threads: None,
        ..Default::default()
    };
    let i = Interval::new(0.5, 1.5);
    let region = Region::new(i, i, i, 4).unwrap();
    let mesh = mesh::render(&ctx, root, &region, &settings).unwrap();
    assert!(!mesh.vertices.is_empty());
    for v in mesh.vertices.iter() {
        let n = (v - center).norm();
        assert!(n > 0.2 && n < 0.3, "invalid vertex at {v:?}: {n}");
    }

    // The sphere is outside of the region without the transform
    let mesh = mesh::render(
        &ctx,
        root,
        &region,
        &Settings {
            world_to_model: Matrix4::identity(),
            ..settings
        },
    )
    .unwrap();
    assert!(mesh.triangles.is_empty());
}

#[test]
fn test_circle_contour() {
    init_logger();
    let mut ctx = Context::new();
    let (x, y) = (ctx.x(), ctx.y());
    let x2 = ctx.square(x).unwrap();
    let y2 = ctx.square(y).unwrap();
    let r = ctx.add(x2, y2).unwrap();
    let root = ctx.sub(r, 0.5).unwrap();

    let i = Interval::new(-1.0, 1.0);
    let region = Region::slice(i, i, 0.0, 2).unwrap();
    for settings in [single_threaded(), Settings::default()] {
        let c = mesh::contour(&ctx, root, &region, &settings).unwrap();
        assert_eq!(c.segments.len(), 12);
        assert_eq!(c.points.len(), 12);

        // Every point starts one segment and ends another
        let mut starts = vec![0; c.points.len()];
        let mut ends = vec![0; c.points.len()];
        for [a, b] in &c.segments {
            starts[*a] += 1;
            ends[*b] += 1;
        }
        assert!(starts.iter().all(|n| *n == 1));
        assert!(ends.iter().all(|n| *n == 1));

        // Inside on the left means a counter-clockwise loop
        let area: f32 = c
            .segments
            .iter()
            .map(|[a, b]| {
                let (p, q) = (c.points[*a], c.points[*b]);
                p.x * q.y - q.x * p.y
            })
            .sum();
        assert!(area > 0.0);
        for p in &c.points {
            assert!((p.norm() - 0.5f32.sqrt()).abs() < 0.5);
        }
    }
}

#[test]
fn test_contour_bad_cell_size() {
    let mut ctx = Context::new();
    let x = ctx.x();
    let i = Interval::new(-1.0, 1.0);
    let region = Region::slice(i, i, 0.0, 2).unwrap();
    let settings = Settings {
        min_cell_size: 0,
        ..Default::default()
    };
    assert_eq!(
        mesh::contour(&ctx, x, &region, &settings),
        Err(Error::BadCellSize(0))
    );
}
