//! `backscatter`: generate, assemble, inspect and simulate backscatter PIO
//! programs, and evaluate receiver logs.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// More log output (repeat for more)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the `.pio` program for two shift frequencies and a baud rate
    Generate {
        /// Clock cycles per period of the symbol 0 frequency
        divider0: u32,
        /// Clock cycles per period of the symbol 1 frequency
        divider1: u32,
        /// Baud rate in symbols per second
        baud: u32,
        /// Output `.pio` file
        output: PathBuf,
        /// Drive a second antenna through side-set
        #[clap(long)]
        two_antennas: bool,
    },
    /// Assemble a `.pio` file into a binary program image
    Assemble {
        input: PathBuf,
        /// Output image (defaults to the input with a `.bin` extension)
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
    /// List the instructions of a binary program image
    Disasm {
        image: PathBuf,
        /// Print re-assemblable source instead of a listing
        #[clap(long)]
        source: bool,
    },
    /// Run the generated program on the simulator and check symbol timing
    Simulate {
        divider0: u32,
        divider1: u32,
        baud: u32,
        /// Data bits, e.g. `1011_0010`
        bits: String,
        #[clap(long)]
        two_antennas: bool,
    },
    /// Bit error rate of a receiver log
    Ber {
        log: PathBuf,
        /// Payload bytes per packet
        #[clap(long, default_value_t = backscatter_stats::DEFAULT_PACKET_LEN)]
        packet_len: usize,
        /// Wrap of the tag's sequence counter
        #[clap(long, default_value_t = backscatter_stats::DEFAULT_MAX_SEQ)]
        max_seq: u32,
        /// Print the error count of every packet
        #[clap(long)]
        per_packet: bool,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Generate {
            divider0,
            divider1,
            baud,
            output,
            two_antennas,
        } => commands::generate(divider0, divider1, baud, two_antennas, &output),
        Command::Assemble { input, output } => commands::assemble(&input, output),
        Command::Disasm { image, source } => commands::disasm(&image, source),
        Command::Simulate {
            divider0,
            divider1,
            baud,
            bits,
            two_antennas,
        } => commands::simulate(divider0, divider1, baud, two_antennas, &bits),
        Command::Ber {
            log,
            packet_len,
            max_seq,
            per_packet,
        } => commands::ber(&log, packet_len, max_seq, per_packet),
    }
}
