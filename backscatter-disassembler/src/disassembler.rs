//! Main disassembler logic

use crate::decoder::decode;
use crate::error::Result;
use crate::formatter::{format, format_line, format_source};
use backscatter_spec::{Instruction, ProgramImage};

/// Decode every word of an image
pub fn decode_image(image: &ProgramImage) -> Result<Vec<Instruction>> {
    image.validate()?;
    image
        .words
        .iter()
        .map(|&word| decode(word, image.mode))
        .collect()
}

/// Disassemble an image into an annotated listing
///
/// Words that fail to decode are listed with the error instead of aborting.
pub fn disassemble(image: &ProgramImage) -> Result<String> {
    image.validate()?;

    let mut output = String::new();
    output.push_str("; Backscatter PIO Disassembly\n");
    output.push_str(&format!("; Program: {} ({})\n", image.name, image.mode));
    output.push_str(&format!(
        "; Size: {} instructions, wrap {} -> {}\n",
        image.len(),
        image.wrap,
        image.wrap_target
    ));
    output.push('\n');

    for (address, &word) in image.words.iter().enumerate() {
        let text = match decode(word, image.mode) {
            Ok(instr) => format(&instr),
            Err(e) => format!("; ERROR: {}", e),
        };
        output.push_str(&format_line(address, word, &text));
        output.push('\n');
    }

    Ok(output)
}

/// Disassemble an image back into source the assembler accepts
pub fn to_source(image: &ProgramImage) -> Result<String> {
    let instructions = decode_image(image)?;
    Ok(format_source(image, &instructions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use backscatter_spec::AntennaMode;

    #[test]
    fn test_disassemble_simple() {
        let image = ProgramImage::new("blink", AntennaMode::Single, vec![0xFF01, 0xFE00, 0x0000]);
        let asm = disassemble(&image).unwrap();

        assert!(asm.contains("; Program: blink (one antenna)"));
        assert!(asm.contains(" 0:  FF01  set pins, 1 [31]"));
        assert!(asm.contains(" 1:  FE00  set pins, 0 [30]"));
        assert!(asm.contains(" 2:  0000  jmp 0"));
    }

    #[test]
    fn test_disassemble_reports_bad_words() {
        let image = ProgramImage::new("p", AntennaMode::Single, vec![0xE001, 0x8080]);
        let asm = disassemble(&image).unwrap();
        assert!(asm.contains("; ERROR: Unsupported opcode"));
        assert!(decode_image(&image).is_err());
    }

    #[test]
    fn test_invalid_image() {
        let image = ProgramImage::new("p", AntennaMode::Single, vec![]);
        assert!(disassemble(&image).is_err());
    }
}
