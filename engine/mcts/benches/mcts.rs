//! UCT benchmarks for performance profiling.
//!
//! Run with: `cargo bench -p mcts`
//!
//! These benchmarks measure:
//! - Step generation on the opening and a crowded middlegame
//! - Playout throughput with and without knowledge
//! - Full searches with fixed playout counts
//! - Tree operations (selection, backpropagation, cascading removal)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use games_arimaa::{Game, Piece, Player, Position, RepetitionTracker, Step};
use mcts::{MaterialEvaluator, NeutralEvaluator, Playout, UctConfig, UctSearch, UctTree};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// Opening followed by a few quiet moves that bring pieces into contact.
fn middlegame() -> Position {
    let mut game = Game::from_position(Position::standard());
    for text in [
        "Ee2n Ee3n Ee4n Md2n",
        "ed7s ed6s ed5s me7s",
        "Db2n Db3n Dg2n Dg3n",
        "dg7s dg6s db7s db6s",
    ] {
        game.play_notation(text).unwrap();
    }
    *game.position()
}

// =============================================================================
// Step Generation
// =============================================================================

fn bench_legal_steps(c: &mut Criterion) {
    let mut group = c.benchmark_group("legal_steps");

    let opening = Position::standard();
    group.bench_function("opening", |b| {
        b.iter(|| black_box(opening.legal_steps(Player::Gold)))
    });

    let mid = middlegame();
    group.bench_function("middlegame", |b| {
        b.iter(|| black_box(mid.legal_steps(mid.side_to_move())))
    });

    let reps = RepetitionTracker::new();
    group.bench_function("middlegame_filtered", |b| {
        b.iter(|| {
            let mut steps = mid.legal_steps(mid.side_to_move());
            mid.filter_repetitions(&mut steps, &reps);
            black_box(steps)
        })
    });

    group.finish();
}

// =============================================================================
// Playouts
// =============================================================================

fn bench_playouts(c: &mut Criterion) {
    let mut group = c.benchmark_group("playout");
    group.throughput(Throughput::Elements(1));

    let start = middlegame();
    let neutral = NeutralEvaluator::new();
    let material = MaterialEvaluator::new();

    let random = UctConfig::default().with_knowledge(false, 0);
    group.bench_function("random", |b| {
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        b.iter(|| {
            let mut board = start;
            black_box(Playout::new(&mut board, &neutral, &random).run(&mut rng))
        })
    });

    for size in [0u32, 3] {
        let config = UctConfig::default().with_knowledge(true, size);
        group.bench_with_input(BenchmarkId::new("knowledge", size), &config, |b, config| {
            let mut rng = ChaCha20Rng::seed_from_u64(42);
            b.iter(|| {
                let mut board = start;
                black_box(Playout::new(&mut board, &material, config).run(&mut rng))
            })
        });
    }

    group.finish();
}

// =============================================================================
// Full Search
// =============================================================================

fn bench_search_playouts(c: &mut Criterion) {
    let mut group = c.benchmark_group("uct_search_playouts");
    group.sample_size(10);

    let reps = RepetitionTracker::new();
    let evaluator = MaterialEvaluator::new();
    for (name, position) in [("opening", Position::standard()), ("middlegame", middlegame())] {
        for playouts in [200u64, 1000] {
            group.throughput(Throughput::Elements(playouts));
            group.bench_with_input(BenchmarkId::new(name, playouts), &playouts, |b, &n| {
                b.iter(|| {
                    let mut rng = ChaCha20Rng::seed_from_u64(42);
                    let mut search =
                        UctSearch::new(&position, &reps, &evaluator, UctConfig::default())
                            .unwrap();
                    search.run_playouts(n, &mut rng);
                    black_box(search.best_move().unwrap())
                })
            });
        }
    }

    group.finish();
}

// =============================================================================
// Tree Operations
// =============================================================================

fn wide_tree(width: u8) -> UctTree {
    let mut tree = UctTree::new(Player::Gold);
    let steps: Vec<Step> = (0..width)
        .map(|i| Step::single(Player::Gold, Piece::Dog, i % 56, i % 56 + 8))
        .collect();
    let root = tree.root();
    let children = tree.expand(root, &steps);
    for (i, &child) in children.iter().enumerate() {
        for v in 0..=i {
            let sample = if v % 3 == 0 { -1.0 } else { 1.0 };
            tree.backpropagate(&[root, child], sample);
        }
    }
    tree
}

fn bench_tree_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("uct_tree_ops");

    group.bench_function("select_child_40", |b| {
        let mut tree = wide_tree(40);
        let root = tree.root();
        b.iter(|| {
            // drop the cached pick so every iteration scores all children
            tree.get_mut(root).best_cached = None;
            black_box(tree.select_child(root, 0.2))
        })
    });

    group.bench_function("backpropagate_depth_8", |b| {
        b.iter_batched(
            || {
                let mut tree = UctTree::new(Player::Gold);
                let mut path = vec![tree.root()];
                for i in 0..8u8 {
                    let parent = *path.last().unwrap();
                    let child = tree.expand(parent, &[Step::single(Player::Gold, Piece::Cat, i, i + 8)]);
                    path.push(child[0]);
                }
                (tree, path)
            },
            |(mut tree, path)| {
                tree.backpropagate(&path, 1.0);
                black_box(tree)
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.bench_function("remove_node_cascade", |b| {
        b.iter_batched(
            || {
                let tree = wide_tree(40);
                let victim = tree.get(tree.root()).children[20];
                (tree, victim)
            },
            |(mut tree, victim)| black_box(tree.remove_node_cascade(victim)),
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_legal_steps,
    bench_playouts,
    bench_search_playouts,
    bench_tree_operations,
);
criterion_main!(benches);
