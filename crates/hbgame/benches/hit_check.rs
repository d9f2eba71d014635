use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hbgame::hitcheck::probe_cell;
use hbgame::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_hit_check(c: &mut Criterion) {
    let cfg = GameConfig {
        key_bits: 1024,
        ..GameConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(7);
    let keys = generate_keys(&cfg, &mut rng).unwrap();
    let (board, _fleet) = place_fleet_random(&mut rng, cfg.max_placement_attempts).unwrap();
    let enc_board = EncryptedBoard::encrypt(&board, keys.public(), &mut rng).unwrap();
    let at = Coord::checked(4, 4).unwrap();

    c.bench_function("blinded_probe_1024", |bencher| {
        bencher.iter(|| {
            let p = probe_cell(&enc_board, at, &keys, &cfg.blinding, &mut rng).unwrap();
            black_box(p);
        });
    });

    c.bench_function("encrypt_board_1024", |bencher| {
        bencher.iter(|| {
            let e = EncryptedBoard::encrypt(&board, keys.public(), &mut rng).unwrap();
            black_box(e);
        });
    });
}

criterion_group!(benches, bench_hit_check);
criterion_main!(benches);
