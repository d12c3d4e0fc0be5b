use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chip8_vm::prelude::*;

/// Maze generator by David Winter.
const MAZE: &[u8] = &[
    0xA2, 0x1E, 0xC2, 0x01, 0x32, 0x01, 0xA2, 0x1A, 0xD0, 0x14, 0x70, 0x04, 0x30, 0x40, 0x12,
    0x00, 0x60, 0x00, 0x71, 0x04, 0x31, 0x20, 0x12, 0x00, 0x12, 0x18, 0x80, 0x40, 0x20, 0x10,
    0x20, 0x40, 0x80, 0x10,
];

fn criterion_benchmark(c: &mut Criterion) {
    let mut vm = Chip8Vm::new(Chip8Conf {
        seed: Some(1),
        ..Chip8Conf::default()
    });

    c.bench_function("maze bytecode", |b| {
        b.iter(|| {
            vm.load_bytecode(MAZE).unwrap();
            let step_count = black_box(1000_usize);
            black_box(vm.run_steps(step_count))
        })
    });

    let mut disasm_buf = String::new();
    c.bench_function("maze disassembly", |b| {
        b.iter(|| {
            disasm_buf.clear();
            Disassembler::new(black_box(MAZE))
                .disassemble(&mut disasm_buf)
                .unwrap();
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
