use clap::{Parser, ValueEnum};
use glob::glob;
use log::LevelFilter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use pngtile::{LumaAlphaMode, Logger, PngTileDecoder, TileConfig, TileFormat, TileWriter};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Png,
    Bmp,
    Tiff,
}

impl From<FormatArg> for TileFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Png => TileFormat::Png,
            FormatArg::Bmp => TileFormat::Bmp,
            FormatArg::Tiff => TileFormat::Tiff,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LumaAlphaArg {
    Luma,
    LumaAlpha,
    Reject,
}

impl From<LumaAlphaArg> for LumaAlphaMode {
    fn from(value: LumaAlphaArg) -> Self {
        match value {
            LumaAlphaArg::Luma => LumaAlphaMode::Luma,
            LumaAlphaArg::LumaAlpha => LumaAlphaMode::LumaAlpha,
            LumaAlphaArg::Reject => LumaAlphaMode::Reject,
        }
    }
}

#[derive(Parser, Debug)]
#[clap(name = "pngtile", about = "Cut large PNG images into tiles without decoding them whole")]
struct Cli {
    #[arg(required = true, help = "Input file or glob pattern")]
    path: String,

    #[arg(short = 'o', long = "output-dir", default_value = "tiles", help = "Directory receiving one tile folder per input file")]
    output_dir: PathBuf,

    #[arg(long, default_value_t = pngtile::DEFAULT_TILE_HEIGHT, value_parser = clap::value_parser!(u32).range(1..))]
    tile_height: u32,

    #[arg(long, default_value_t = pngtile::DEFAULT_TILE_WIDTH, value_parser = clap::value_parser!(u32).range(1..))]
    tile_width: u32,

    #[arg(short, long, value_enum, default_value = "png", help = "Tile file format")]
    format: FormatArg,

    #[arg(long, value_enum, default_value = "luma", help = "Output for 8-bit grey+alpha images")]
    luma_alpha: LumaAlphaArg,

    #[arg(long, help = "Fail on unrecognized pixel layouts instead of reading them as 1 byte per pixel")]
    strict: bool,

    #[arg(long, help = "Print the header and chunk inventory without tiling")]
    info: bool,

    #[arg(short, long, help = "Number of files processed in parallel")]
    jobs: Option<usize>,

    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn tile_config(&self) -> TileConfig {
        TileConfig::new(self.tile_height, self.tile_width)
            .with_luma_alpha(self.luma_alpha.into())
            .with_strict_layout(self.strict)
    }
}

fn get_files(path: &str) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut files = Vec::new();

    for entry in glob(path)? {
        match entry {
            Ok(path) => {
                if !path.is_file() {
                    continue;
                }

                files.push(path);
            }
            Err(e) => log::warn!("{}", e),
        }
    }

    Ok(files)
}

fn get_output_dir(file: &Path, output_dir: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let file_stem = file
        .file_stem()
        .ok_or("Invalid file name")?
        .to_str()
        .ok_or("Invalid file stem")?;

    Ok(output_dir.join(file_stem))
}

fn process_file(file: &Path, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("File: {}", file.display());

    let mut decoder = PngTileDecoder::open(file, cli.tile_config())?;

    if cli.info {
        let info = decoder.inspect()?;
        println!("{}", file.display());
        println!("{}", info);
        return Ok(());
    }

    let output_dir = get_output_dir(file, &cli.output_dir)?;
    let mut writer = TileWriter::new(&output_dir, cli.format.into());

    let summary = decoder.decode(&mut writer)?;
    log::info!(
        "{}: {} tiles written to {}",
        file.display(),
        summary.tiles,
        output_dir.display()
    );

    Ok(())
}

#[cfg(feature = "rayon")]
fn process_files(files: &[PathBuf], cli: &Cli) -> Result<usize, Box<dyn std::error::Error>> {
    use rayon::prelude::*;

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = cli.jobs {
        builder = builder.num_threads(jobs);
    }
    let pool = builder.build()?;

    let failures = pool.install(|| {
        files
            .par_iter()
            .filter(|file| match process_file(file, cli) {
                Ok(()) => false,
                Err(err) => {
                    log::error!("Error processing {}: {}", file.display(), err);
                    true
                }
            })
            .count()
    });

    Ok(failures)
}

#[cfg(not(feature = "rayon"))]
fn process_files(files: &[PathBuf], cli: &Cli) -> Result<usize, Box<dyn std::error::Error>> {
    if cli.jobs.is_some() {
        log::warn!("Built without the rayon feature, --jobs is ignored");
    }

    let mut failures = 0;

    for file in files {
        if let Err(err) = process_file(file, cli) {
            log::error!("Error processing {}: {}", file.display(), err);
            failures += 1;
        }
    }

    Ok(failures)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else if cli.quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };

    if let Err(err) = Logger::init(level) {
        eprintln!("Failed to install logger: {}", err);
    }

    let files = match get_files(&cli.path) {
        Ok(files) => files,
        Err(err) => {
            log::error!("Invalid path pattern {}: {}", cli.path, err);
            return ExitCode::FAILURE;
        }
    };

    if files.is_empty() {
        log::error!("No files found matching pattern: {}", cli.path);
        return ExitCode::FAILURE;
    }

    match process_files(&files, &cli) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failures) => {
            log::error!("{} of {} files failed", failures, files.len());
            ExitCode::FAILURE
        }
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
