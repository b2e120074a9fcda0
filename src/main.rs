use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;

use rust_cortex::{Alignment, Bubble, CortexFile, FileType, Record};

/// Read a cortex bubble or alignment file and write its records back to stdout
#[derive(Parser, Debug)]
#[command(name = "rust-cortex")]
#[command(version)]
struct Cli {
    /// Input file, optionally gzip-compressed
    input: PathBuf,

    /// Only count the records instead of printing them
    #[arg(short, long)]
    count: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut file = match CortexFile::from_path(&cli.input) {
        Ok(file) => file,
        Err(err) if err.is_sniffing_failure() => bail!(
            "{} is not a cortex bubble or alignment file: {}",
            cli.input.display(),
            err
        ),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to open {}", cli.input.display()))
        }
    };

    info!(
        "{}: {} file, k={}{}",
        file.path(),
        file.file_type(),
        file.kmer_size(),
        if file.is_diploid() { ", diploid" } else { "" }
    );
    eprintln!("Colours [{}]: {}", file.colours(), file.colour_list());

    let records = match file.file_type() {
        FileType::Bubble => dump::<Bubble>(&mut file, cli.count)?,
        FileType::Alignment => dump::<Alignment>(&mut file, cli.count)?,
        FileType::Unknown => bail!("couldn't tell the type of {}", cli.input.display()),
    };
    info!("{} records", records);
    Ok(())
}

fn dump<R: Record>(file: &mut CortexFile, count_only: bool) -> Result<usize> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut record = file.new_record::<R>();
    let mut records = 0;
    while record
        .read_from(file)
        .with_context(|| format!("failed to read record {}", records + 1))?
    {
        if !count_only {
            record.write_to(&mut out, file.metadata())?;
        }
        records += 1;
    }
    if count_only {
        writeln!(out, "{}", records)?;
    }
    out.flush()?;
    Ok(records)
}
