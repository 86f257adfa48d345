//! Subcommand implementations

use anyhow::{bail, Context, Result};
use backscatter_assembler::assemble as assemble_source;
use backscatter_codegen::generate_from;
use backscatter_disassembler::{disassemble, to_source};
use backscatter_runtime::{transmit, HaltReason, Pin};
use backscatter_spec::{AntennaMode, ProgramImage, TimingConfig};
use backscatter_stats::{compute_ber, parse_log, unwrap_sequence};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

fn antenna_mode(two_antennas: bool) -> AntennaMode {
    if two_antennas {
        AntennaMode::Dual
    } else {
        AntennaMode::Single
    }
}

pub fn generate(
    divider0: u32,
    divider1: u32,
    baud: u32,
    two_antennas: bool,
    output: &Path,
) -> Result<()> {
    let generation = generate_from(divider0, divider1, baud, antenna_mode(two_antennas))
        .context("invalid timing configuration")?;

    fs::write(output, generation.to_pio())
        .with_context(|| format!("cannot write {}", output.display()))?;

    for line in generation.diagnostics.summary(&generation.config) {
        println!("{}", line);
    }
    for warning in generation.warnings() {
        println!("WARNING: {}", warning);
    }
    println!(
        "wrote {} instructions to {}",
        generation.program.len(),
        output.display()
    );
    Ok(())
}

pub fn assemble(input: &Path, output: Option<PathBuf>) -> Result<()> {
    let source = fs::read_to_string(input)
        .with_context(|| format!("cannot read {}", input.display()))?;
    let image = assemble_source(&source)
        .with_context(|| format!("cannot assemble {}", input.display()))?;

    let output = output.unwrap_or_else(|| input.with_extension("bin"));
    fs::write(&output, image.to_bytes()?)
        .with_context(|| format!("cannot write {}", output.display()))?;

    info!(instructions = image.len(), output = %output.display(), "assembled");
    println!("{}", image);
    Ok(())
}

pub fn disasm(path: &Path, source: bool) -> Result<()> {
    let bytes = fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    let image = ProgramImage::from_bytes(&bytes)
        .with_context(|| format!("{} is not a program image", path.display()))?;

    let text = if source {
        to_source(&image)?
    } else {
        disassemble(&image)?
    };
    print!("{}", text);
    Ok(())
}

/// Parse `0`/`1` digits, ignoring `_` and whitespace
fn parse_bits(text: &str) -> Result<Vec<bool>> {
    text.chars()
        .filter(|c| *c != '_' && !c.is_whitespace())
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            other => bail!("invalid bit {:?}", other),
        })
        .collect()
}

pub fn simulate(
    divider0: u32,
    divider1: u32,
    baud: u32,
    two_antennas: bool,
    bits: &str,
) -> Result<()> {
    let bits = parse_bits(bits)?;
    let config = TimingConfig::new(divider0, divider1, baud, antenna_mode(two_antennas))
        .context("invalid timing configuration")?;
    let result = transmit(&config, &bits).context("simulation failed")?;

    let expected = config.cycles_per_symbol() as u64;
    let durations = result.symbol_durations();
    println!("{}", config);
    println!(
        "{} symbols ({} data bits, rest padding), {} cycles, halted: {:?}",
        durations.len(),
        bits.len(),
        result.cycles,
        result.halt_reason
    );

    for ((start, end), symbol) in result
        .symbol_windows()
        .into_iter()
        .zip(result.transmitted())
        .take(bits.len())
    {
        let toggles = result
            .edges_of(Pin::Set)
            .filter(|edge| edge.cycle >= start && edge.cycle < end)
            .count();
        println!(
            "  symbol {} @ {:>8}: {} cycles, {} edges",
            symbol,
            start,
            end - start,
            toggles
        );
    }

    let off: Vec<u64> = durations.iter().copied().filter(|&d| d != expected).collect();
    if result.halt_reason != HaltReason::FifoEmpty || !off.is_empty() {
        bail!(
            "symbol timing broken: expected {} cycles per symbol, got {:?}",
            expected,
            off
        );
    }
    println!("all symbols last {} cycles", expected);
    Ok(())
}

pub fn ber(path: &Path, packet_len: usize, max_seq: u32, per_packet: bool) -> Result<()> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let mut frames = parse_log(&text);
    unwrap_sequence(&mut frames, max_seq).context("cannot number frames")?;
    let report = compute_ber(&frames, packet_len).context("cannot compute bit error rate")?;

    if per_packet {
        for packet in &report.per_packet {
            let note = if packet.received { "" } else { " (lost)" };
            println!("{:>8} {:>5}{}", packet.seq, packet.bit_errors, note);
        }
    }
    println!(
        "packets: {} expected, {} lost",
        report.per_packet.len(),
        report.packets_lost()
    );
    println!(
        "bit errors: {} of {} bits, BER {:.6}",
        report.error_bits, report.total_bits, report.ber
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bits() {
        assert_eq!(parse_bits("10_1").unwrap(), vec![true, false, true]);
        assert!(parse_bits("102").is_err());
        assert!(parse_bits("").unwrap().is_empty());
    }
}
