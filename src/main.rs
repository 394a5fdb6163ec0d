use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use thumbgal::config::{self, ConfigError, GalleryConfig};
use thumbgal::output;
use thumbgal::pipeline::{self, BuildOptions};
use thumbgal::render::Template;

mod logging;

/// Shared flags for commands that produce thumbnails.
#[derive(clap::Args, Clone, Default)]
struct CacheArgs {
    /// Ignore the thumbnail cache and regenerate every thumbnail
    #[arg(long)]
    no_cache: bool,
}

#[derive(Parser)]
#[command(name = "thumbgal")]
#[command(about = "Static photo gallery generator: thumbnails plus one HTML page per folder")]
#[command(long_about = "\
Static photo gallery generator: thumbnails plus one HTML page per folder

Every sub-directory of the gallery root becomes a gallery page listing its
images newest first; index.html links to every gallery that has images.

Layout (defaults):

  thumbgal.toml                # Optional config (see 'thumbgal gen-config')
  template.html                # Page template (see 'thumbgal gen-template')
  galleryRoot/
  ├── vacation/                # → vacation.html
  │   ├── beach.jpg
  │   └── sunset.png
  └── alps/                    # → alps.html
      └── peak.webp
  thumbs/                      # Generated: vacation/beach_thumb.jpg, ...
  index.html                   # Generated

Running with no command is the same as 'thumbgal build'.")]
#[command(version)]
struct Cli {
    /// Config file (a missing default file means stock settings)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Generate thumbnails and write every page (the default)
    Build(CacheArgs),
    /// Validate config, template and gallery root without writing anything
    Check,
    /// Print a stock thumbgal.toml with all options documented
    GenConfig,
    /// Print the stock page template
    GenTemplate,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command.unwrap_or(Command::Build(CacheArgs::default())) {
        Command::Build(cache_args) => {
            let config = resolve_config(cli.config.as_deref())?;
            init_thread_pool(&config.processing);

            println!(
                "==> Building {} \u{2192} {}",
                config.gallery_root.display(),
                config.output_dir.display()
            );
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_process_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = pipeline::build(
                &config,
                BuildOptions {
                    no_cache: cache_args.no_cache,
                },
                Some(tx),
            );
            printer.join().ok();
            let report = result?;

            println!();
            output::print_build_output(&report);
            println!("==> Build complete: {}", config.output_dir.display());
        }
        Command::Check => {
            let config = resolve_config(cli.config.as_deref())?;
            println!("==> Checking {}", config.gallery_root.display());
            let manifest = pipeline::check(&config)?;
            output::print_scan_output(&manifest);
            println!("==> Template {} is readable", config.template.display());
            println!("==> Gallery is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::GenTemplate => {
            print!("{}", Template::stock().source());
        }
    }

    Ok(())
}

/// Load the config named on the command line, or the default file if any.
///
/// An explicitly named file must exist; the default one is optional.
fn resolve_config(cli_path: Option<&Path>) -> Result<GalleryConfig, ConfigError> {
    match cli_path {
        Some(path) if !path.exists() => Err(ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("config file not found: {}", path.display()),
        ))),
        Some(path) => config::load_config(path),
        None => config::load_config(Path::new(config::DEFAULT_CONFIG_FILE)),
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores — user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
