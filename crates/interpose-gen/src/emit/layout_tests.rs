use interpose_classfile::{Operand, decode};

use super::code::{CodeBuilder, Kind};
use super::constant_pool::ConstantPoolBuilder;
use super::layout::layout;
use crate::error::GenerationError;

#[test]
fn picks_narrowest_integer_encoding() {
    let mut body = CodeBuilder::new();
    body.iconst(-1)
        .iconst(5)
        .iconst(100)
        .iconst(1000)
        .iconst(100_000);
    let mut pool = ConstantPoolBuilder::new();

    let out = layout(&body, &mut pool, "consts").unwrap();

    assert_eq!(
        out.code,
        vec![0x02, 0x08, 0x10, 100, 0x11, 0x03, 0xe8, 0x12, 0x01]
    );
    assert_eq!(out.offsets, vec![0, 1, 2, 4, 7, 9]);
}

#[test]
fn short_and_wide_local_forms() {
    let mut body = CodeBuilder::new();
    body.aload(0)
        .load(Kind::Long, 1)
        .load(Kind::Int, 4)
        .aload(300)
        .store(Kind::Double, 2);
    let mut pool = ConstantPoolBuilder::new();

    let out = layout(&body, &mut pool, "locals").unwrap();

    assert_eq!(
        out.code,
        vec![0x2a, 0x1f, 0x15, 4, 0xc4, 0x19, 0x01, 0x2c, 0x49]
    );
}

#[test]
fn lookupswitch_is_padded_and_sorted() {
    let mut body = CodeBuilder::new();
    let a = body.new_label();
    let b = body.new_label();
    let default = body.new_label();
    body.iconst(0).lookupswitch(default, vec![(5, a), (-3, b)]);
    body.mark(a).ret(None);
    body.mark(b).ret(None);
    body.mark(default).ret(None);
    let mut pool = ConstantPoolBuilder::new();

    let out = layout(&body, &mut pool, "switch").unwrap();

    // iconst_0, then lookupswitch at 1 with two bytes of padding.
    assert_eq!(&out.code[1..4], &[0xab, 0, 0]);
    assert_eq!(out.offsets, vec![0, 1, 28, 29, 30, 31]);
    let insns = decode(&out.code).unwrap();
    assert_eq!(
        insns[1].operand,
        Operand::LookupSwitch {
            default: 30,
            pairs: vec![(-3, 29), (5, 28)],
        }
    );
}

#[test]
fn duplicate_switch_keys_are_rejected() {
    let mut body = CodeBuilder::new();
    let a = body.new_label();
    body.iconst(0).lookupswitch(a, vec![(1, a), (1, a)]);
    body.mark(a).ret(None);
    let mut pool = ConstantPoolBuilder::new();

    let err = layout(&body, &mut pool, "dup").unwrap_err();

    assert!(matches!(err, GenerationError::InvalidCode { .. }));
}

#[test]
fn unbound_label_is_rejected() {
    let mut body = CodeBuilder::new();
    let nowhere = body.new_label();
    body.goto(nowhere);
    let mut pool = ConstantPoolBuilder::new();

    let err = layout(&body, &mut pool, "run").unwrap_err();

    assert_eq!(
        err,
        GenerationError::InvalidCode {
            method: "run".into(),
            reason: "jump at 0 targets an unbound label".into(),
        }
    );
}

#[test]
fn backward_branch_beyond_16_bits() {
    let mut body = CodeBuilder::new();
    let start = body.new_label();
    body.mark(start);
    for _ in 0..11_000 {
        body.iconst(1000).pop();
    }
    body.goto(start);
    let mut pool = ConstantPoolBuilder::new();

    let err = layout(&body, &mut pool, "far").unwrap_err();

    assert_eq!(
        err,
        GenerationError::BranchOutOfRange {
            method: "far".into(),
            offset: 44_000,
        }
    );
}

#[test]
fn code_length_is_capped() {
    let mut body = CodeBuilder::new();
    for _ in 0..22_000 {
        body.iconst(1000);
    }
    let mut pool = ConstantPoolBuilder::new();

    let err = layout(&body, &mut pool, "huge").unwrap_err();

    assert!(matches!(err, GenerationError::CodeTooLarge { .. }));
}
