//! `.pio` source rendering
//!
//! The output is fully determined by the [`Generation`]: documentation
//! header, program directives, instruction lines with their comments and a
//! `% c-sdk` block carrying the firmware constants and helper routines.

use crate::Generation;
use backscatter_spec::{Line, Program, TimingConfig, WASTED_CYCLES_PER_SYMBOL};

/// Column at which instruction comments start
const COMMENT_COLUMN: usize = 32;

/// Render the complete `.pio` file
pub fn emit(generation: &Generation) -> String {
    let config = &generation.config;
    let mut out = Vec::new();

    out.extend(header(config));
    out.push(format!(".program {}", generation.program.name));
    if config.mode.uses_side_set() {
        out.push(".side_set 1 opt".to_string());
    }
    out.push(String::new());

    out.push("; --- PIO settings ---".to_string());
    out.push("; configure autopull".to_string());
    out.push(format!("; configured for {} MHz clock", config.clock_mhz));
    out.push(String::new());
    out.push("; --- backscatter settings ---".to_string());
    for line in generation.diagnostics.summary(config) {
        out.push(format!("; {}", line));
    }
    out.push(String::new());
    for warning in &generation.diagnostics.warnings {
        out.push(format!("; WARNING: {}", warning));
    }
    if !generation.diagnostics.warnings.is_empty() {
        out.push(String::new());
    }

    out.extend(parameters(config));
    out.push(String::new());
    out.extend(program_lines(&generation.program));
    out.push(String::new());
    out.extend(c_sdk_block(generation));

    let mut text = out.join("\n");
    text.push('\n');
    text
}

fn header(config: &TimingConfig) -> Vec<String> {
    let flag = if config.mode.uses_side_set() {
        " --two-antennas"
    } else {
        ""
    };
    vec![
        ";".to_string(),
        "; Automatically generated by \"backscatter generate\"".to_string(),
        format!(
            "; with the command: \"backscatter generate {} {} {}{}\"",
            config.divider0, config.divider1, config.baud_rate, flag
        ),
        ";".to_string(),
        "; Backscatter PIO".to_string(),
        format!("; Configured for {}", config.mode),
        ";".to_string(),
        String::new(),
    ]
}

fn parameters(config: &TimingConfig) -> Vec<String> {
    let clock = config.clock_mhz as f64;
    let cycles = config.clock_hz() as f64 / config.baud_rate as f64;
    vec![
        format!(
            "; parameter 1:  b = clock-frequency/baud-rate (e.g. {:.1} for {:.2} kBaud @ {} MHz clock)",
            cycles,
            config.baud_rate as f64 / 1000.0,
            config.clock_mhz
        ),
        format!(
            "; parameter 2:  w = {} (wasted cycles per symbol: OUT -> JMP -> MOV -> ... -> JMP)",
            WASTED_CYCLES_PER_SYMBOL
        ),
        format!(
            "; parameter 3: d0 = clock-frequency/shift-frequency-0 (e.g. {} for {:.3} MHz @ {} MHz clock)",
            config.divider0,
            clock / config.divider0 as f64,
            config.clock_mhz
        ),
        format!(
            "; parameter 4: d1 = clock-frequency/shift-frequency-1 (e.g. {} for {:.3} MHz @ {} MHz clock)",
            config.divider1,
            clock / config.divider1 as f64,
            config.clock_mhz
        ),
        String::new(),
        "; interface:".to_string(),
        "; the loop counts come from the FIFO since SET only provides 5 bits".to_string(),
        "; 1. obtain from fifo: floor((b - w) / d0) - 1 (full periods in a symbol 0)".to_string(),
        "; 2. obtain from fifo: floor((b - w) / d1) - 1 (full periods in a symbol 1)".to_string(),
        "; 3. then provide data, MSB first".to_string(),
    ]
}

/// Labels flush left, instructions indented with aligned comments
pub fn program_lines(program: &Program) -> Vec<String> {
    program
        .lines
        .iter()
        .map(|line| match line {
            Line::Label(name) => format!("{}:", name),
            Line::Instruction {
                instruction,
                comment: Some(comment),
            } => format!(
                "    {:<width$}; {}",
                instruction.to_string(),
                comment,
                width = COMMENT_COLUMN
            ),
            Line::Instruction {
                instruction,
                comment: None,
            } => format!("    {}", instruction),
            Line::Comment(text) => format!("    ; {}", text),
            Line::Blank => String::new(),
        })
        .collect()
}

fn c_sdk_block(generation: &Generation) -> Vec<String> {
    let config = &generation.config;
    let constants = &generation.constants;
    let name = &generation.program.name;
    let dual = config.mode.uses_side_set();
    let cycles = config.cycles_per_symbol();

    let mut lines = vec![
        "% c-sdk {".to_string(),
        "#include \"pico/stdlib.h\"".to_string(),
        "#include \"hardware/clocks.h\"".to_string(),
        "#define min(x, y) (((x) < (y)) ? (x) : (y))".to_string(),
    ];
    lines.extend(constants.to_defines());
    lines.push(String::new());

    lines.push(format!(
        "static inline void {}_program_init(PIO pio, uint sm, uint offset, uint pin1{}) {{",
        name,
        if dual { ", uint pin2" } else { "" }
    ));
    lines.push("   pio_gpio_init(pio, pin1);".to_string());
    lines.push("   pio_sm_set_consecutive_pindirs(pio, sm, pin1, 1, true);".to_string());
    if dual {
        lines.push("   pio_gpio_init(pio, pin2);".to_string());
        lines.push("   pio_sm_set_consecutive_pindirs(pio, sm, pin2, 1, true);".to_string());
    }
    lines.push(format!(
        "   pio_sm_config c = {}_program_get_default_config(offset);",
        name
    ));
    lines.push("   sm_config_set_set_pins(&c, pin1, 1);".to_string());
    if dual {
        lines.push("   sm_config_set_sideset_pins(&c, pin2);".to_string());
    }
    lines.push(
        "   sm_config_set_fifo_join(&c, PIO_FIFO_JOIN_TX); // TX only: 8-deep FIFO".to_string(),
    );
    lines.push(
        "   sm_config_set_out_shift(&c, false, true, 32);  // shift left (MSB first), autopull every 32 bit"
            .to_string(),
    );
    lines.push("   pio_sm_init(pio, sm, offset, &c);".to_string());
    lines.push("   pio_sm_set_enabled(pio, sm, true);".to_string());
    for (index, count) in constants.loop_counts().iter().enumerate() {
        let divider = if index == 0 {
            config.divider0
        } else {
            config.divider1
        };
        lines.push(format!(
            "   pio_sm_put_blocking(pio, sm, {}); // floor(({} - {}) / {}) - 1, JMP x-- still branches on 0",
            count, cycles, WASTED_CYCLES_PER_SYMBOL, divider
        ));
    }
    lines.push("}".to_string());
    lines.push(String::new());

    lines.push(format!(
        "static inline void {}_send(PIO pio, uint sm, uint32_t *message, uint32_t len) {{",
        name
    ));
    lines.push("    for (uint32_t i = 0; i < len; i++) {".to_string());
    lines.push("        pio_sm_put_blocking(pio, sm, message[i]);".to_string());
    lines.push("    }".to_string());
    lines.push("    sleep_ms(1); // wait for transmission to finish".to_string());
    lines.push("}".to_string());
    lines.push("%}".to_string());
    lines
}

#[cfg(test)]
mod tests {
    use crate::generate;
    use backscatter_spec::{AntennaMode, TimingConfig};

    #[test]
    fn test_single_antenna_text() {
        let text = generate(&TimingConfig::default()).to_pio();
        assert!(text.contains(".program backscatter\n"));
        assert!(!text.contains(".side_set"));
        assert!(text.contains("; Configured for one antenna"));
        assert!(text.contains("get_symbol:\n"));
        assert!(text.contains("    jmp x--, loop_0"));
        assert!(text.contains("#define PIO_BAUDRATE 100000"));
        assert!(text.contains("pio_sm_put_blocking(pio, sm, 61);"));
        assert!(!text.contains("WARNING"));
        assert!(text.ends_with("%}\n"));
    }

    #[test]
    fn test_dual_antenna_text() {
        let config = TimingConfig::default().with_mode(AntennaMode::Dual);
        let text = generate(&config).to_pio();
        assert!(text.contains(".side_set 1 opt"));
        assert!(text.contains("set pins, 1 side 1"));
        assert!(text.contains("uint pin2"));
        assert!(text.contains("sm_config_set_sideset_pins(&c, pin2);"));
        assert!(text.contains("--two-antennas"));
    }

    #[test]
    fn test_loop_counts_precede_send() {
        let text = generate(&TimingConfig::default()).to_pio();
        let first = text.find("put_blocking(pio, sm, 61)").unwrap();
        let second = text.find("put_blocking(pio, sm, 68)").unwrap();
        let data = text.find("put_blocking(pio, sm, message[i])").unwrap();
        assert!(first < second && second < data);
    }

    #[test]
    fn test_warnings_rendered() {
        let config = TimingConfig::new(18, 20, 100_000, AntennaMode::Single).unwrap();
        let text = generate(&config).to_pio();
        assert!(text.contains("; WARNING: symbol 0 has been assigned to a higher frequency"));
    }

    #[test]
    fn test_deterministic() {
        let config = TimingConfig::default();
        assert_eq!(generate(&config).to_pio(), generate(&config).to_pio());
    }
}
