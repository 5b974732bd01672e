use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;

use rand::SeedableRng;
use rand::rngs::StdRng;

use mf_energy::NearestNeighbor;
use mf_fold::FoldOptions;
use mf_fold::fold;
use mf_fold::fold_bases;
use mf_fold::random_sequence;

pub fn mfe_folding(c: &mut Criterion) {
    let mut group = c.benchmark_group("MfeFolding");

    let model = NearestNeighbor::default();
    let options = FoldOptions::default();

    group.bench_function("Fold a fixed stem-loop sequence.", |b| {
        b.iter(|| {
            let _ = fold(&model, "GGGCUUAAGCCCAAGGGAAACCCUUCGGGAAACCCGGG", &options);
        });
    });

    let mut rng = StdRng::seed_from_u64(7);
    let seq = random_sequence(80, &mut rng);
    group.bench_function("Fold a random 80-nt sequence.", |b| {
        b.iter(|| {
            let _ = fold_bases(&model, &seq, &options);
        });
    });
}

criterion_group!(benches, mfe_folding);
criterion_main!(benches);
