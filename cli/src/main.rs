use anyhow::Context;
use clap::{ArgAction, Parser};
use fatwalk_core::ScanOptions;
use fatwalk_filesystems::Fat16Reader;
use log::{warn, LevelFilter};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

mod render;

#[derive(Parser, Debug)]
#[command(name = "fatwalk", version)]
#[command(about = "List the directory tree of a FAT16 volume image", long_about = None)]
struct Cli {
    /// Path to the FAT16 image
    image: PathBuf,
    /// Show size, timestamp, attributes and location for every entry
    #[arg(short, long)]
    long: bool,
    /// Print the whole report as JSON
    #[arg(long, conflicts_with = "long")]
    json: bool,
    /// List directories as well as files
    #[arg(long)]
    dirs: bool,
    /// Deepest directory level to enter (0 lists the root only)
    #[arg(long, value_name = "N")]
    max_depth: Option<u16>,
    /// Read scan options from a JSON file; flags override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn scan_options(&self) -> anyhow::Result<ScanOptions> {
        let mut options = match &self.config {
            Some(path) => ScanOptions::from_json_file(path)
                .with_context(|| format!("Could not load config {}", path.display()))?,
            None => ScanOptions::default(),
        };
        if self.dirs {
            options.include_directories = true;
        }
        if let Some(depth) = self.max_depth {
            options.max_depth = Some(depth);
        }
        Ok(options)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run<W: Write, E: Write>(cli: &Cli, out: &mut W, err: &mut E) -> anyhow::Result<()> {
    let mut options = cli.scan_options()?;
    let reader = Fat16Reader::open_path(&cli.image)
        .with_context(|| format!("Could not open the file: {}", cli.image.display()))?;
    if reader.fat().is_none() {
        warn!("FAT unavailable, listing the root directory only");
        options.max_depth = Some(0);
    }
    let report = reader.scan(options).with_context(|| {
        format!("Could not read the directory tree of {}", cli.image.display())
    })?;
    let info = reader.info();

    if cli.json {
        render::write_json(out, &info, &report)?;
    } else {
        render::write_info(out, &info)?;
        if cli.long {
            render::write_long(out, &report.nodes, reader.geometry())?;
        } else {
            render::write_paths(out, &report.nodes)?;
        }
    }
    out.flush()?;

    if !cli.json {
        render::write_findings(err, &report.findings)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // Usage errors exit 1; --help and --version are not errors.
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_logging(cli.verbose);

    let result = run(&cli, &mut io::stdout().lock(), &mut io::stderr().lock());
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}
