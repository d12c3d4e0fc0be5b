use chip8_vm::{constants::*, prelude::*, KeyCode};

/// Maze generator by David Winter.
const MAZE: &[u8] = &[
    0xA2, 0x1E, 0xC2, 0x01, 0x32, 0x01, 0xA2, 0x1A, 0xD0, 0x14, 0x70, 0x04, 0x30, 0x40, 0x12,
    0x00, 0x60, 0x00, 0x71, 0x04, 0x31, 0x20, 0x12, 0x00, 0x12, 0x18, 0x80, 0x40, 0x20, 0x10,
    0x20, 0x40, 0x80, 0x10,
];

fn seeded() -> Chip8Vm {
    Chip8Vm::new(Chip8Conf {
        seed: Some(7),
        ..Chip8Conf::default()
    })
}

#[test]
fn test_load_add_clear() {
    #[rustfmt::skip]
    let bytecode = [
        0x63, 0x0A, // LD v3, 0x0A
        0x73, 0x05, // ADD v3, 0x05
        0x00, 0xE0, // CLS
    ];
    let mut vm = seeded();
    vm.load_bytecode(&bytecode).unwrap();

    assert_eq!(vm.run_steps(3).unwrap(), Flow::Draw);
    assert_eq!(vm.cpu().v(3), 15);
    assert_eq!(vm.cpu().pc(), MEM_START + 6);
    assert!(vm.display_buffer().iter().all(|px| !*px));
}

#[test]
fn test_program_size_limit() {
    let mut vm = seeded();

    let largest = vec![0x12; MAX_PROGRAM_SIZE];
    vm.load_bytecode(&largest).unwrap();
    assert_eq!(vm.memory().read(MEM_SIZE - 1), 0x12);

    vm.load_bytecode(MAZE).unwrap();
    let too_large = vec![0xFF; MAX_PROGRAM_SIZE + 1];
    let err = vm.load_bytecode(&too_large).unwrap_err();

    assert!(matches!(err, Chip8Error::LargeProgram { size } if size == MAX_PROGRAM_SIZE + 1));
    assert!(!err.is_fatal());
    assert_eq!(vm.memory().slice(MEM_START, MAZE.len()), Some(MAZE));
}

#[test]
fn test_missing_rom_leaves_program() {
    let mut vm = seeded();
    vm.load_bytecode(MAZE).unwrap();
    vm.run_steps(10).unwrap();
    let pc = vm.cpu().pc();

    let err = vm.load_rom("does/not/exist.ch8").unwrap_err();

    assert!(matches!(err, Chip8Error::Io(_)));
    assert_eq!(vm.cpu().pc(), pc);
    assert_eq!(vm.memory().slice(MEM_START, MAZE.len()), Some(MAZE));
}

#[test]
fn test_maze_fills_screen() {
    let mut vm = seeded();
    vm.load_bytecode(MAZE).unwrap();

    // 16 columns by 8 rows of 4x4 tiles, a few instructions each.
    vm.run_steps(2000).unwrap();

    assert_eq!(vm.cpu().pc(), 0x218);
    assert_eq!(vm.cpu().v(1), 0x20);
    assert_eq!(vm.decode_failures(), 0);
    assert!(vm.display_buffer().iter().any(|px| *px));
}

#[test]
fn test_same_seed_same_maze() {
    let mut a = seeded();
    let mut b = seeded();
    a.load_bytecode(MAZE).unwrap();
    b.load_bytecode(MAZE).unwrap();

    a.run_steps(2000).unwrap();
    b.run_steps(2000).unwrap();

    assert_eq!(a.display_buffer()[..], b.display_buffer()[..]);
}

#[test]
fn test_halted_machine_recovers_on_load() {
    let mut vm = seeded();
    vm.load_bytecode(&[0x00, 0xEE]).unwrap();

    assert!(vm.step().unwrap_err().is_fatal());
    assert!(matches!(vm.step(), Err(Chip8Error::Halted(_))));

    vm.load_bytecode(MAZE).unwrap();
    assert_eq!(vm.status(), Status::Running);
    vm.step().unwrap();
}

#[test]
fn test_key_wait_from_host() {
    #[rustfmt::skip]
    let bytecode = [
        0xF5, 0x0A, // LD v5, K
        0xE5, 0x9E, // SKP v5
        0x00, 0xE0, // CLS
        0x12, 0x06, // JP 0x206
    ];
    let mut vm = seeded();
    vm.load_bytecode(&bytecode).unwrap();

    assert_eq!(vm.run_steps(100).unwrap(), Flow::KeyWait);
    assert!(vm.is_waiting());
    vm.run_steps(5).unwrap();
    assert_eq!(vm.cpu().pc(), MEM_START);

    vm.set_key(KeyCode::Key9, true);
    vm.step().unwrap();
    assert_eq!(vm.cpu().v(5), 9);

    // Key is still held, so CLS is skipped.
    vm.step().unwrap();
    assert_eq!(vm.cpu().pc(), MEM_START + 6);
}
