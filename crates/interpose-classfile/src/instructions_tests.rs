use crate::instructions::{Operand, decode};
use crate::{ByteWriter, ClassFileError, opcodes};

#[test]
fn branches_resolve_to_absolute_offsets() {
    let mut w = ByteWriter::new();
    w.u8(opcodes::ALOAD_0); // 0
    w.u8(opcodes::IFNULL).i16(7); // 1 -> 8
    w.u8(opcodes::ICONST_1); // 4
    w.u8(opcodes::GOTO).i16(-5); // 5 -> 0
    w.u8(opcodes::RETURN); // 8

    let insns = decode(w.as_slice()).unwrap();
    let offsets: Vec<u32> = insns.iter().map(|i| i.offset).collect();
    assert_eq!(offsets, vec![0, 1, 4, 5, 8]);
    assert_eq!(insns[1].operand, Operand::Branch(8));
    assert_eq!(insns[3].targets(), vec![0]);
    assert_eq!(insns[4].mnemonic(), "return");
}

#[test]
fn lookupswitch_padding() {
    let mut w = ByteWriter::new();
    w.u8(opcodes::ILOAD_1); // 0
    w.u8(opcodes::LOOKUPSWITCH); // 1
    w.u8(0).u8(0); // pad to 4
    w.i32(27).i32(2); // default -> 28
    w.i32(-5).i32(25); // -> 26
    w.i32(100).i32(26); // -> 27
    w.u8(opcodes::NOP); // 28
    let insns = decode(w.as_slice()).unwrap();

    assert_eq!(
        insns[1].operand,
        Operand::LookupSwitch {
            default: 28,
            pairs: vec![(-5, 26), (100, 27)]
        }
    );
    assert_eq!(insns[2].offset, 28);
    assert_eq!(insns[1].targets(), vec![28, 26, 27]);
}

#[test]
fn wide_local_and_invokeinterface() {
    let mut w = ByteWriter::new();
    w.u8(opcodes::WIDE).u8(opcodes::ALOAD).u16(300);
    w.u8(opcodes::INVOKEINTERFACE).u16(12).u8(4).u8(0);
    w.u8(opcodes::SIPUSH).i16(-1000);
    let insns = decode(w.as_slice()).unwrap();

    assert!(insns[0].wide);
    assert_eq!(insns[0].operand, Operand::Local(300));
    assert_eq!(insns[1].offset, 4);
    assert_eq!(insns[1].cp_index(), Some(12));
    assert_eq!(
        insns[1].operand,
        Operand::InvokeInterface {
            index: 12,
            count: 4
        }
    );
    assert_eq!(insns[2].operand, Operand::Int(-1000));
}

#[test]
fn unknown_opcode_is_an_error() {
    assert_eq!(
        decode(&[opcodes::NOP, 0xFE]),
        Err(ClassFileError::UnknownOpcode {
            opcode: 0xFE,
            offset: 1
        })
    );
}

#[test]
fn truncated_operand_is_an_error() {
    assert!(matches!(
        decode(&[opcodes::SIPUSH, 1]),
        Err(ClassFileError::Truncated { .. })
    ));
}

#[test]
fn opcode_table() {
    assert_eq!(opcodes::mnemonic(opcodes::INVOKESPECIAL), Some("invokespecial"));
    assert_eq!(opcodes::mnemonic(opcodes::JSR_W), Some("jsr_w"));
    assert_eq!(opcodes::mnemonic(0xCA), None);
    assert!(opcodes::is_unconditional_transfer(opcodes::ATHROW));
    assert!(opcodes::is_unconditional_transfer(opcodes::ARETURN));
    assert!(!opcodes::is_unconditional_transfer(opcodes::IFNULL));
    assert_eq!(opcodes::Mnemonic(0xFF).to_string(), "<reserved 0xff>");
}
