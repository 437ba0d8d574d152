use std::hint::black_box;
use std::time::Instant;

use wavefield_field::{BoxField, FieldLayout, FieldParams};

fn make_field(side: u32) -> BoxField {
    BoxField::new(FieldParams {
        layout: FieldLayout {
            side,
            box_size: 0.4,
        },
        ..FieldParams::default()
    })
    .expect("valid bench params")
}

fn bench_step(side: u32, iterations: usize) {
    let mut field = make_field(side);

    let start = Instant::now();
    for _ in 0..iterations {
        black_box(&mut field).step();
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  step ({} boxes, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}",
        field.len()
    );
}

fn bench_write_instances(side: u32, iterations: usize) {
    let field = make_field(side);
    let mut buf = Vec::with_capacity(field.len());

    let start = Instant::now();
    for _ in 0..iterations {
        field.write_instances(black_box(&mut buf));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  write_instances ({} boxes, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}",
        field.len()
    );
}

fn main() {
    println!("field step:");
    bench_step(24, 2_000);
    bench_step(64, 500);
    bench_step(128, 100);

    println!("instance upload prep:");
    bench_write_instances(24, 2_000);
    bench_write_instances(128, 100);
}
