//! Tests for malformed input handling in the assembler

use backscatter_assembler::{assemble, AssemblerError};

// ============================================================================
// Invalid Instruction Tests
// ============================================================================

#[test]
fn test_unknown_instruction() {
    let result = assemble("wait 1 gpio 0");
    if let Err(AssemblerError::UnknownInstruction { line, mnemonic }) = result {
        assert_eq!(line, 1);
        assert_eq!(mnemonic, "wait");
    } else {
        panic!("Expected UnknownInstruction error");
    }
}

#[test]
fn test_instruction_typo() {
    assert!(assemble("sett pins, 1").is_err());
}

#[test]
fn test_empty_lines_are_fine() {
    let source = r#"

        set pins, 1

    "#;
    assert!(assemble(source).is_ok());
}

#[test]
fn test_empty_program() {
    assert!(matches!(
        assemble("; nothing here\n"),
        Err(AssemblerError::InvalidImage(_))
    ));
}

// ============================================================================
// Invalid Operand Tests
// ============================================================================

#[test]
fn test_invalid_set_destination() {
    assert!(matches!(
        assemble("set isr, 1"),
        Err(AssemblerError::InvalidOperand { .. })
    ));
}

#[test]
fn test_invalid_mov_source() {
    assert!(matches!(
        assemble("mov x, exec"),
        Err(AssemblerError::InvalidOperand { .. })
    ));
}

#[test]
fn test_invalid_jmp_condition() {
    assert!(matches!(
        assemble("top:\njmp !isr top"),
        Err(AssemblerError::InvalidOperand { line: 2, .. })
    ));
}

#[test]
fn test_missing_operand() {
    assert!(matches!(
        assemble("out x"),
        Err(AssemblerError::SyntaxError { line: 1, .. })
    ));
}

#[test]
fn test_trailing_garbage() {
    assert!(matches!(
        assemble("set pins, 1 extra"),
        Err(AssemblerError::SyntaxError { .. })
    ));
}

#[test]
fn test_unclosed_delay() {
    assert!(matches!(
        assemble("set pins, 1 [3"),
        Err(AssemblerError::SyntaxError { .. })
    ));
}

#[test]
fn test_unexpected_character() {
    let result = assemble("set pins, 1\nset pins, $0");
    if let Err(AssemblerError::SyntaxError { line, column, .. }) = result {
        assert_eq!(line, 2);
        assert_eq!(column, 11);
    } else {
        panic!("Expected SyntaxError");
    }
}

// ============================================================================
// Range Tests
// ============================================================================

#[test]
fn test_zero_bit_count() {
    assert!(matches!(
        assemble("out x, 0"),
        Err(AssemblerError::ValueOutOfRange { what: "bit count", .. })
    ));
}

#[test]
fn test_delay_too_large_for_side_set() {
    let source = ".side_set 1 opt\nset pins, 1 side 1 [8]";
    assert!(matches!(
        assemble(source),
        Err(AssemblerError::DelayOutOfRange { delay: 8, max: 7 })
    ));
}

#[test]
fn test_side_without_directive() {
    assert!(matches!(
        assemble("set pins, 1 side 1"),
        Err(AssemblerError::SideSetNotConfigured)
    ));
}

#[test]
fn test_jump_address_out_of_range() {
    assert!(matches!(
        assemble("jmp 32"),
        Err(AssemblerError::ValueOutOfRange { what: "jump address", .. })
    ));
}

#[test]
fn test_program_too_large() {
    let source = "set pins, 1\n".repeat(33);
    assert!(matches!(
        assemble(&source),
        Err(AssemblerError::ProgramTooLarge { length: 33, capacity: 32 })
    ));
}

// ============================================================================
// Label Tests
// ============================================================================

#[test]
fn test_undefined_label() {
    let result = assemble("jmp nowhere");
    if let Err(AssemblerError::UndefinedLabel(label)) = result {
        assert_eq!(label, "nowhere");
    } else {
        panic!("Expected UndefinedLabel error");
    }
}

#[test]
fn test_duplicate_label() {
    let source = "top:\nset pins, 1\ntop:\njmp top";
    assert!(matches!(
        assemble(source),
        Err(AssemblerError::DuplicateLabel(_))
    ));
}

// ============================================================================
// Directive Tests
// ============================================================================

#[test]
fn test_unknown_directive() {
    assert!(matches!(
        assemble(".define PUBLIC x 1\nset pins, 1"),
        Err(AssemblerError::InvalidDirective(_))
    ));
}

#[test]
fn test_two_programs() {
    let source = ".program a\nset pins, 1\n.program b\nset pins, 0";
    assert!(matches!(
        assemble(source),
        Err(AssemblerError::InvalidDirective(_))
    ));
}

#[test]
fn test_wrap_before_instruction() {
    assert!(matches!(
        assemble(".wrap\nset pins, 1"),
        Err(AssemblerError::InvalidDirective(_))
    ));
}
