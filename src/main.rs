mod serialiser;

use subread::{ParseOptions, SubtitleDocument};

use std::io::{self, Read};

use anyhow::{anyhow, Context, Result};
use clap::{Parser as ClapParser, Subcommand};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => (),
        Err(err) => {
            eprintln!("An error occurred: {}", err);
            for cause in err.chain().skip(1) {
                eprintln!("    {}", cause);
            }
            std::process::exit(1);
        }
    }
}

#[derive(ClapParser)]
#[command(about = "Read SRT and XML transcript captions")]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "The file to read from. If not supplied, the subtitles will be read from standard input.",
        default_value = "-"
    )]
    input: String,
    #[arg(
        long,
        value_name = "SECONDS",
        help = "Gap left before the next XML transcript entry when inferring end times.",
        default_value_t = ParseOptions::DEFAULT_END_EPSILON
    )]
    epsilon: f64,
    #[arg(
        long,
        value_name = "COUNT",
        help = "SRT text lines with this many letters or fewer are dropped.",
        default_value_t = ParseOptions::DEFAULT_MIN_LETTERS
    )]
    min_letters: usize,
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Log more. Repeat for debug output. RUST_LOG takes precedence."
    )]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the parsed captions back out as clean SRT.
    Dump {
        #[arg(
            short,
            long,
            value_name = "FILE",
            help = "The file to write to. If not supplied, the subtitles will be written to standard output.",
            default_value = "-"
        )]
        output: String,
    },
    /// Print the caption shown at a playback time.
    At {
        #[arg(value_name = "SECONDS")]
        seconds: f64,
    },
    /// Summarise the parsed captions.
    Info,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(cli: Cli) -> Result<()> {
    let opts = ParseOptions {
        end_epsilon: cli.epsilon,
        min_letters: cli.min_letters,
    };

    let doc = if cli.input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        SubtitleDocument::load_with(&buffer, &opts)
    } else {
        SubtitleDocument::load_path(&cli.input, &opts)
            .context(format!("Failed to open input file: '{}'", cli.input))?
    };

    match cli.command {
        Command::Dump { output } => {
            if doc.is_empty() {
                return Err(anyhow!("No captions could be read from '{}'.", cli.input));
            }
            if output == "-" {
                serialiser::serialise(doc.entries(), io::stdout())?;
            } else {
                let dst = std::fs::File::create(&output)
                    .context(format!("Failed to create output file: '{}'", output))?;
                serialiser::serialise(doc.entries(), dst)?;
            }
        }
        Command::At { seconds } => {
            if let Some(entry) = doc.entry_active_at(seconds) {
                println!("{}", entry.text());
            }
        }
        Command::Info => {
            println!("format:  {}", doc.format());
            println!("entries: {}", doc.len());
            if let (Some(first), Some(last)) = (doc.entries().first(), doc.entries().last()) {
                println!("first:   {:.3}s", first.start_seconds);
                println!("last:    {:.3}s", last.end_seconds);
            }
        }
    }

    Ok(())
}
