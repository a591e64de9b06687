use clap::{Parser, Subcommand, ValueEnum};
use dotpath::{array, flatten, json, Error, ReaderOptions, Value, WriterOptions};

use serde_json::json;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "dotpath",
    version,
    about = "Flatten nested JSON records into dot-joined keys"
)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Flatten every record read from INPUT
    Flatten {
        /// JSON, NDJSON or a JSON array of records, `-` for stdin
        #[arg(default_value = "-")]
        input: String,
        /// Destination file, stdout when omitted
        #[arg(short, long)]
        output: Option<String>,
        #[arg(long, value_enum, default_value_t = Format::Normal)]
        format: Format,
        /// Joins the keys of a path
        #[arg(long, default_value = flatten::DEFAULT_SEPARATOR)]
        separator: String,
        /// Put every key under this path
        #[arg(long)]
        prefix: Option<String>,
        #[arg(long, value_enum, default_value_t = Arrays::Leaf)]
        arrays: Arrays,
    },
    /// Read and write with options given as JSON
    Convert {
        input: String,
        /// e.g. {"json": {"flatten": {"separator": "."}}}
        reader_options: String,
        output: String,
        /// e.g. {"csv": {"delimiter": 44}} or {"json": {"mode": "ndjson"}}
        writer_options: String,
    },
    /// Print the second largest number of a JSON array
    SecondLargest {
        #[arg(default_value = "-")]
        input: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Normal,
    Pretty,
    Ndjson,
    Csv,
}

impl From<Format> for WriterOptions {
    fn from(format: Format) -> Self {
        let mode = match format {
            Format::Normal => json::writer::Mode::ArrayCompact,
            Format::Pretty => json::writer::Mode::ArrayPretty,
            Format::Ndjson => json::writer::Mode::NdJson,
            Format::Csv => return WriterOptions::Csv(Default::default()),
        };

        WriterOptions::Json(json::writer::Options { mode })
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Arrays {
    /// Keep arrays as values
    Leaf,
    /// Walk arrays using element indices as keys
    Index,
}

impl From<Arrays> for flatten::ArrayMode {
    fn from(arrays: Arrays) -> Self {
        match arrays {
            Arrays::Leaf => flatten::ArrayMode::Leaf,
            Arrays::Index => flatten::ArrayMode::Index,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .with_line_number(verbose >= 3)
        .init();

    debug!("dotpath started with verbosity level: {}", verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());
}

/// Runs `write` against `path`. Stdout only sees the output once `write`
/// succeeds, so a failure leaves nothing but the error report there.
fn write_output<F>(path: Option<&str>, write: F) -> Result<(), Error>
where
    F: FnOnce(&mut dyn Write) -> Result<(), Error>,
{
    match path {
        None | Some("-") => {
            let mut buf = Vec::new();
            write(&mut buf)?;

            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&buf)?;
            stdout.flush()?;
        }
        Some(path) => {
            let mut file = BufWriter::new(File::create(path)?);
            write(&mut file)?;
            file.flush()?;
        }
    }

    Ok(())
}

fn read_input(path: &str) -> Result<Vec<u8>, Error> {
    let mut data = Vec::new();

    if path == "-" {
        std::io::stdin().lock().read_to_end(&mut data)?;
    } else {
        File::open(path)?.read_to_end(&mut data)?;
    }

    Ok(data)
}

fn run(cli: Cli) -> Result<(), Error> {
    match cli.command {
        Commands::Flatten {
            input,
            output,
            format,
            separator,
            prefix,
            arrays,
        } => {
            let opts = flatten::Options {
                prefix,
                separator,
                arrays: arrays.into(),
            };
            debug!(?opts, input = %input, "flattening");

            let reader = dotpath::reader::new_reader(
                &input,
                ReaderOptions::Json(json::reader::Options::flattening(opts)),
            )?;
            write_output(output.as_deref(), |writer| {
                WriterOptions::from(format).write(writer, reader)
            })?;
        }

        Commands::Convert {
            input,
            reader_options,
            output,
            writer_options,
        } => {
            let input_options: ReaderOptions =
                serde_json::from_str(&reader_options).map_err(Error::input)?;
            let output_options: WriterOptions =
                serde_json::from_str(&writer_options).map_err(Error::input)?;
            debug!(?input_options, ?output_options, "converting");

            let reader = dotpath::reader::new_reader(&input, input_options)?;
            write_output(Some(output.as_str()), |writer| {
                output_options.write(writer, reader)
            })?;
        }

        Commands::SecondLargest { input } => {
            let data = read_input(&input)?;
            let numbers: Vec<Value> = serde_json::from_slice(&data).map_err(Error::input)?;

            let second = array::second_largest_number(&numbers)?;

            println!("{}", serde_json::to_string(&second)?);
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Err(e) => {
            tracing::error!("{}", e);
            println!(
                "{}",
                if e.is_parse_error() {
                    json!(["parse_error", format!("{}", e)])
                } else {
                    json!(format!("error: {}", e))
                }
            );
            std::process::exit(1);
        }
        Ok(_) => {
            std::process::exit(0);
        }
    }
}
