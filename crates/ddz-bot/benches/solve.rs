use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ddz_bot::solver::Solver;
use ddz_core::model::deck::Deck;
use ddz_core::model::hand::Hand;

fn solve_fixed(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve_fixed");
    for (name, landlord, peasant) in [
        ("straight_vs_pairs", "34567TTJJ", "8899QQ2"),
        ("plane_with_wings", "33344456A", "77889KKXD"),
        ("bomb_duel", "55552JJ", "9999AAK"),
    ] {
        let landlord = Hand::parse(landlord).unwrap();
        let peasant = Hand::parse(peasant).unwrap();
        let mut solver = Solver::new();
        group.bench_function(name, |b| {
            b.iter(|| black_box(solver.best_strategy(&landlord, &peasant, None)))
        });
    }
    group.finish();
}

fn solve_dealt(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve_dealt");
    for seed in [3u64, 17, 29] {
        let [landlord, peasant] = Deck::shuffled_with_seed(seed).deal(7, 7).unwrap();
        let mut solver = Solver::new();
        group.bench_function(format!("seed_{seed}"), |b| {
            b.iter(|| black_box(solver.best_strategy(&landlord, &peasant, None)))
        });
    }
    group.finish();
}

criterion_group!(benches, solve_fixed, solve_dealt);
criterion_main!(benches);
