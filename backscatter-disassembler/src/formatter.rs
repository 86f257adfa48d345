//! Instruction formatting to assembly text

use backscatter_spec::{Instruction, ProgramImage};

/// Format instruction as assembly text
pub fn format(instr: &Instruction) -> String {
    instr.to_string()
}

/// One listing line: address, hex word, instruction text
pub fn format_line(address: usize, word: u16, text: &str) -> String {
    format!("{:2}:  {:04X}  {}", address, word, text)
}

/// Re-assemblable source for a decoded image
///
/// Jump targets stay numeric; `.wrap_target` and `.wrap` are only emitted
/// when they differ from the whole-program default.
pub fn format_source(image: &ProgramImage, instructions: &[Instruction]) -> String {
    let mut lines = vec![format!(".program {}", image.name)];
    if image.mode.uses_side_set() {
        lines.push(".side_set 1 opt".to_string());
    }
    let explicit_wrap = image.wrap_target != 0 || image.wrap as usize + 1 != instructions.len();

    for (address, instr) in instructions.iter().enumerate() {
        if explicit_wrap && address == image.wrap_target as usize {
            lines.push(".wrap_target".to_string());
        }
        lines.push(format!("    {}", format(instr)));
        if explicit_wrap && address == image.wrap as usize {
            lines.push(".wrap".to_string());
        }
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}
