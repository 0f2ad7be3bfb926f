use approx::assert_relative_eq;
use frep::{
    context::{BinaryOpcode, Context, Node, UnaryOpcode},
    eval::{Evaluator, BATCH_SIZE},
    types::Interval,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use strum::IntoEnumIterator;

fn unary(ctx: &mut Context, op: UnaryOpcode, a: Node) -> Node {
    match op {
        UnaryOpcode::Neg => ctx.neg(a),
        UnaryOpcode::Abs => ctx.abs(a),
        UnaryOpcode::Recip => ctx.recip(a),
        UnaryOpcode::Sqrt => ctx.sqrt(a),
        UnaryOpcode::Square => ctx.square(a),
        UnaryOpcode::Sin => ctx.sin(a),
        UnaryOpcode::Cos => ctx.cos(a),
        UnaryOpcode::Tan => ctx.tan(a),
        UnaryOpcode::Asin => ctx.asin(a),
        UnaryOpcode::Acos => ctx.acos(a),
        UnaryOpcode::Atan => ctx.atan(a),
        UnaryOpcode::Exp => ctx.exp(a),
        UnaryOpcode::Ln => ctx.ln(a),
    }
    .unwrap()
}

fn binary(ctx: &mut Context, op: BinaryOpcode, a: Node, b: Node) -> Node {
    match op {
        BinaryOpcode::Add => ctx.add(a, b),
        BinaryOpcode::Sub => ctx.sub(a, b),
        BinaryOpcode::Mul => ctx.mul(a, b),
        BinaryOpcode::Div => ctx.div(a, b),
        BinaryOpcode::Min => ctx.min(a, b),
        BinaryOpcode::Max => ctx.max(a, b),
    }
    .unwrap()
}

/// Builds a random expression from the given unary opcodes (and every binary
/// opcode), returning its root
fn random_graph(
    rng: &mut StdRng,
    ctx: &mut Context,
    unary_ops: &[UnaryOpcode],
    size: usize,
) -> Node {
    let binary_ops: Vec<_> = BinaryOpcode::iter().collect();
    let mut nodes = vec![ctx.x(), ctx.y(), ctx.z()];
    for _ in 0..3 {
        nodes.push(ctx.constant(rng.gen_range(-2.0..2.0)));
    }
    for _ in 0..size {
        // Prefer recent nodes, so that the graph is deep
        let pick = |rng: &mut StdRng, nodes: &[Node]| {
            let lo = if rng.gen_bool(0.7) {
                nodes.len().saturating_sub(4)
            } else {
                0
            };
            nodes[rng.gen_range(lo..nodes.len())]
        };
        let a = pick(rng, &nodes);
        let n = if rng.gen_bool(0.3) {
            let op = unary_ops[rng.gen_range(0..unary_ops.len())];
            unary(ctx, op, a)
        } else {
            let b = pick(rng, &nodes);
            let op = binary_ops[rng.gen_range(0..binary_ops.len())];
            binary(ctx, op, a, b)
        };
        nodes.push(n);
    }
    *nodes.last().unwrap()
}

fn random_interval(rng: &mut StdRng) -> Interval {
    let a = rng.gen_range(-2.0f32..2.0);
    let b = rng.gen_range(-2.0f32..2.0);
    Interval::new(a.min(b), a.max(b))
}

/// Picks a random point within an interval
fn point(rng: &mut StdRng, i: Interval) -> f32 {
    i.lerp(rng.gen_range(0.0..1.0)).clamp(i.lower(), i.upper())
}

fn same(a: f32, b: f32) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

#[test]
fn test_interval_soundness() {
    let ops: Vec<_> = UnaryOpcode::iter().collect();
    let mut rng = StdRng::seed_from_u64(0x1234);
    for _ in 0..100 {
        let mut ctx = Context::new();
        let root = random_graph(&mut rng, &mut ctx, &ops, 12);
        let mut eval = Evaluator::new(&ctx, root).unwrap();
        for _ in 0..10 {
            let [x, y, z] = [(); 3].map(|_| random_interval(&mut rng));
            let i = eval.eval_interval(x, y, z);
            if i.has_nan() {
                continue;
            }
            for _ in 0..10 {
                let [px, py, pz] = [x, y, z].map(|i| point(&mut rng, i));
                let v = eval.eval(px, py, pz);
                // A number-valued interval rules out NaN at every point
                assert!(!v.is_nan(), "NaN at ({px}, {py}, {pz}) in {i:?}");
                let tol = 1e-3 * (1.0 + v.abs());
                assert!(
                    i.lower() - tol <= v && v <= i.upper() + tol,
                    "{v} at ({px}, {py}, {pz}) is outside {i:?}"
                );
            }
        }
    }
}

#[test]
fn test_batch_equals_point() {
    let mut rng = StdRng::seed_from_u64(0x5678);
    let ops: Vec<_> = UnaryOpcode::iter().collect();
    for _ in 0..50 {
        let mut ctx = Context::new();
        let root = random_graph(&mut rng, &mut ctx, &ops, 16);
        let mut eval = Evaluator::new(&ctx, root).unwrap();

        let pts: Vec<[f32; 3]> = (0..BATCH_SIZE)
            .map(|_| [(); 3].map(|_| rng.gen_range(-2.0..2.0)))
            .collect();
        for (i, [x, y, z]) in pts.iter().enumerate() {
            eval.set(*x, *y, *z, i).unwrap();
        }
        let scalar = eval.values(BATCH_SIZE, false).unwrap().to_vec();
        let vector = eval.values(BATCH_SIZE, true).unwrap().to_vec();
        let grads = eval.derivs(BATCH_SIZE, true).unwrap().to_vec();
        for (i, [x, y, z]) in pts.iter().enumerate() {
            let p = eval.eval(*x, *y, *z);
            assert!(same(p, scalar[i]), "{p} != {}", scalar[i]);
            assert!(same(p, vector[i]), "{p} != {}", vector[i]);
            assert!(same(p, grads[i].v), "{p} != {}", grads[i].v);
        }
    }
}

#[test]
fn test_pruning_matches_unpruned() {
    let ops: Vec<_> = UnaryOpcode::iter().collect();
    let mut rng = StdRng::seed_from_u64(0x9abc);
    for _ in 0..50 {
        let mut ctx = Context::new();
        let root = random_graph(&mut rng, &mut ctx, &ops, 16);
        let mut pruned = Evaluator::new(&ctx, root).unwrap();
        let mut full = Evaluator::new(&ctx, root).unwrap();

        for _ in 0..4 {
            let [x, y, z] = [(); 3].map(|_| random_interval(&mut rng));
            pruned.set_interval(x, y, z);
            pruned.push();
            assert!(pruned.utilization() <= 1.0);
            for _ in 0..10 {
                let [px, py, pz] = [x, y, z].map(|i| point(&mut rng, i));
                let expected = full.eval(px, py, pz);
                let v = pruned.eval(px, py, pz);
                assert!(
                    same(v, expected),
                    "{v} != {expected} at ({px}, {py}, {pz})"
                );
            }
            pruned.pop().unwrap();
        }
        assert_eq!(pruned.depth(), 0);
        assert_eq!(pruned.utilization(), 1.0);
    }
}

#[test]
fn test_gradients() {
    let mut ctx = Context::new();
    let (x, y, z) = (ctx.x(), ctx.y(), ctx.z());
    // sin(x) * exp(y) + z^2 / (1 + x^2)
    let s = ctx.sin(x).unwrap();
    let e = ctx.exp(y).unwrap();
    let a = ctx.mul(s, e).unwrap();
    let z2 = ctx.square(z).unwrap();
    let x2 = ctx.square(x).unwrap();
    let d = ctx.add(x2, 1.0).unwrap();
    let b = ctx.div(z2, d).unwrap();
    let root = ctx.add(a, b).unwrap();

    let mut eval = Evaluator::new(&ctx, root).unwrap();
    let mut rng = StdRng::seed_from_u64(0xdef0);
    let pts: Vec<[f32; 3]> = (0..64)
        .map(|_| [(); 3].map(|_| rng.gen_range(-1.0..1.0)))
        .collect();
    for (i, [x, y, z]) in pts.iter().enumerate() {
        eval.set(*x, *y, *z, i).unwrap();
    }
    let grads = eval.derivs(pts.len(), true).unwrap();
    for ([x, y, z], g) in pts.iter().zip(grads) {
        let d = 1.0 + x * x;
        let dx = x.cos() * y.exp() - 2.0 * x * z * z / (d * d);
        let dy = x.sin() * y.exp();
        let dz = 2.0 * z / d;
        assert_relative_eq!(g.dx, dx, epsilon = 1e-5);
        assert_relative_eq!(g.dy, dy, epsilon = 1e-5);
        assert_relative_eq!(g.dz, dz, epsilon = 1e-5);
    }
}
