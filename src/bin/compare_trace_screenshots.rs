use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use trace_screenshot_compare::comparator::DEFAULT_COMPARE_BIN;
use trace_screenshot_compare::error::EXIT_FAILURE;
use trace_screenshot_compare::fuzz_ab::{self, FuzzAbOptions};
use trace_screenshot_compare::versus_native::{self, VersusNativeOptions};
use trace_screenshot_compare::versus_upgrade::{self, VersusUpgradeOptions};
use trace_screenshot_compare::{BuiltinComparator, Comparator, Error, ImageMagickComparator};
use tracing::Level;

const DEFAULT_OUTDIR: &str = ".";

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ComparatorKind {
  /// ImageMagick's `compare` executable
  Imagemagick,
  /// In-process comparison with ImageMagick-compatible output
  Builtin,
}

#[derive(Parser, Debug)]
#[command(
  name = "compare_trace_screenshots",
  about = "Compare screenshots produced by graphics trace runs",
  arg_required_else_help = true
)]
struct Cli {
  /// Logging level (trace, debug, info, warn, error)
  #[arg(short = 'l', long = "log", global = true, default_value = "info", value_parser = parse_level)]
  log: Level,

  /// Delete diff images whose comparison reported zero difference
  #[arg(short = 'd', long = "discard_zero_diff_png", global = true)]
  discard_zero_diff_png: bool,

  /// Which comparison provider to use
  #[arg(long, global = true, value_enum, default_value_t = ComparatorKind::Imagemagick)]
  comparator: ComparatorKind,

  /// ImageMagick `compare` executable
  #[arg(long, global = true, default_value = DEFAULT_COMPARE_BIN)]
  compare_bin: PathBuf,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
  /// Compare Vulkan screenshots against native driver screenshots of the same traces
  #[command(name = "versus_native")]
  VersusNative(VersusNativeArgs),
  /// Verify that screenshots taken before and after a trace upgrade are identical
  #[command(name = "versus_upgrade")]
  VersusUpgrade(VersusUpgradeArgs),
  /// Fuzzy-compare two arbitrary screenshot directories
  #[command(name = "fuzz_ab")]
  FuzzAb(FuzzAbArgs),
}

#[derive(Args, Debug)]
struct VersusNativeArgs {
  /// Directory holding `angle_native_*` and `angle_vulkan_*` screenshots
  #[arg(long)]
  screenshot_dir: PathBuf,

  /// Directory containing restricted_traces.json and per-trace metadata
  #[arg(long)]
  trace_list_path: Option<PathBuf>,

  /// Where diff images are written (defaults to the screenshot directory)
  #[arg(long, visible_alias = "out")]
  outdir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct VersusUpgradeArgs {
  /// Screenshots taken before the upgrade
  #[arg(long)]
  before: PathBuf,

  /// Screenshots taken after the upgrade
  #[arg(long)]
  after: PathBuf,

  /// Where diff images are written
  #[arg(long, visible_alias = "out", default_value = DEFAULT_OUTDIR)]
  outdir: PathBuf,
}

#[derive(Args, Debug)]
struct FuzzAbArgs {
  /// Compare only the files present in both directories
  #[arg(short = 'r', long = "relaxed_file_list_match")]
  relaxed_file_list_match: bool,

  #[arg(long = "a_dir")]
  a_dir: PathBuf,

  #[arg(long = "b_dir")]
  b_dir: PathBuf,

  /// Where diff images are written
  #[arg(long, visible_alias = "out", default_value = DEFAULT_OUTDIR)]
  outdir: PathBuf,
}

fn parse_level(s: &str) -> Result<Level, String> {
  s.parse::<Level>()
    .map_err(|_| format!("invalid log level {s:?} (expected trace, debug, info, warn or error)"))
}

fn main() {
  if let Err(err) = run() {
    let code = err
      .downcast_ref::<Error>()
      .map(Error::exit_code)
      .unwrap_or(EXIT_FAILURE);
    eprintln!("error: {err:#}");
    std::process::exit(code);
  }
}

fn run() -> Result<()> {
  let cli = Cli::parse();

  tracing_subscriber::fmt()
    .with_max_level(cli.log)
    .with_writer(std::io::stderr)
    .with_target(false)
    .init();

  let comparator: Box<dyn Comparator> = match cli.comparator {
    ComparatorKind::Imagemagick => Box::new(ImageMagickComparator::new(cli.compare_bin.clone())),
    ComparatorKind::Builtin => Box::new(BuiltinComparator),
  };

  match cli.command {
    Commands::VersusNative(args) => {
      let options = VersusNativeOptions {
        screenshot_dir: args.screenshot_dir,
        trace_list_path: args.trace_list_path,
        outdir: args.outdir,
        discard_zero_diff_png: cli.discard_zero_diff_png,
      };
      versus_native::run(comparator.as_ref(), &options).context("versus_native")?;
    }
    Commands::VersusUpgrade(args) => {
      let options = VersusUpgradeOptions {
        before: args.before,
        after: args.after,
        outdir: args.outdir,
        discard_zero_diff_png: cli.discard_zero_diff_png,
      };
      versus_upgrade::run(comparator.as_ref(), &options).context("versus_upgrade")?;
    }
    Commands::FuzzAb(args) => {
      let options = FuzzAbOptions {
        a_dir: args.a_dir,
        b_dir: args.b_dir,
        outdir: args.outdir,
        relaxed_file_list_match: args.relaxed_file_list_match,
        discard_zero_diff_png: cli.discard_zero_diff_png,
      };
      fuzz_ab::run(comparator.as_ref(), &options).context("fuzz_ab")?;
    }
  }

  Ok(())
}
