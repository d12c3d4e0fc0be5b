use chip8_vm::prelude::*;

#[test]
fn test_disassemble_listing() {
    #[rustfmt::skip]
    let rom = [
        0x6A, 0x0A,
        0xD1, 0x25,
        0xF3, 0x0A,
        0xFF, 0xFF,
        0x12,
    ];
    let mut buf = String::new();
    Disassembler::new(&rom).disassemble(&mut buf).unwrap();

    let lines: Vec<&str> = buf.lines().collect();
    assert_eq!(
        lines,
        [
            "0x0200 6A0A LD vA, 0x0A",
            "0x0202 D125 DRW v1, v2, 5",
            "0x0204 F30A LD v3, K",
            "0x0206 FFFF 0xFFFF",
            "0x0208 12   0x12",
        ]
    );
}

#[test]
fn test_listing_matches_decode() {
    let rom = [0x00, 0xE0, 0x22, 0x0A, 0x00, 0xEE];
    let instrs: Vec<Instr> = Disassembler::new(&rom).instructions().collect();

    assert_eq!(instrs.len(), 3);
    for instr in &instrs {
        let word = instr.bytecode().unwrap();
        assert_eq!(instr.op, Op::decode(word).ok());
    }
    assert_eq!(instrs[1].op, Some(Op::Call { address: 0x20A }));
}
