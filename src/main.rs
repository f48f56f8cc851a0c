use clap::{Parser, Subcommand};
use og_card::config::{self, Configuration};
use og_card::generate::Generator;
use og_card::imaging::FontRasterizer;
use og_card::{content, output};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "og-card")]
#[command(about = "Social preview image generator for static sites")]
#[command(long_about = "\
Social preview image generator for static sites

Renders a 1200x600 Open Graph card for every document of the configured
content types and records the card on the document so templates can
emit og:image tags.

Site structure:

  site/
  ├── config.toml                       # [og_image] block (optional)
  ├── about.md                          # Page
  ├── _posts/
  │   └── 2024-03-15-markdown-tips.md   # Post (date + slug from filename)
  ├── _drafts/
  │   └── half-finished.md              # Draft post (skipped by default)
  └── _notes/                           # Collection \"notes\"
      └── rust.md

Front matter is TOML between +++ fences. A document's [og_image] table
overrides the site configuration for that document only.

Cards land in <output_dir>/<type>/<slug>.png under the site directory,
with a manifest.json next to them.

Run 'og-card gen-config' to print a documented [og_image] block.")]
#[command(version)]
struct Cli {
    /// Site directory
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    /// Show every document, including skipped ones, and info-level logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render cards for every configured content type
    Generate {
        /// Re-render cards that already exist
        #[arg(long)]
        force: bool,
        /// Additional directory to load fonts from (repeatable)
        #[arg(long = "font-dir")]
        font_dirs: Vec<PathBuf>,
    },
    /// Validate configuration and list planned cards without rendering
    Check,
    /// Print a stock [og_image] config block with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Command::Generate { force, font_dirs } => {
            let base = load_config(&cli.source, cli.verbose, force)?;
            let resolved = base.resolve()?;
            let verbose = resolved.verbose;

            let mut site = content::scan(&cli.source)?;
            output::print_scan_failures(&site, &cli.source);
            let rasterizer = FontRasterizer::with_font_dirs(&font_dirs);
            log::info!("Loaded {} font faces", rasterizer.face_count());

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_generate_event(&event, verbose) {
                        println!("{}", line);
                    }
                }
            });
            let report = Generator::new(base, &rasterizer)
                .with_events(tx)
                .generate(&mut site);
            // Generator (and its sender) is dropped here, which ends the printer
            printer.join().map_err(|_| "output thread panicked")?;
            let report = report?;

            let manifest_path = cli
                .source
                .join(resolved.output_dir.trim_end_matches('/'))
                .join("manifest.json");
            content::write_manifest(&site, &manifest_path)?;
            log::info!("Wrote {}", manifest_path.display());

            let unreadable = site.failures().len();
            output::print_summary(&report, unreadable);
            if !report.is_success() || unreadable > 0 {
                std::process::exit(1);
            }
        }
        Command::Check => {
            let base = load_config(&cli.source, cli.verbose, false)?;
            let resolved = base.resolve()?;
            println!("==> Checking {}", cli.source.display());
            let site = content::scan(&cli.source)?;
            output::print_check_output(&site, &resolved);
            output::print_scan_failures(&site, &cli.source);
            if !site.failures().is_empty() {
                std::process::exit(1);
            }
            println!("==> Configuration is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Site configuration with CLI flags layered on top.
///
/// Flags only ever switch behavior on; leaving one off keeps the site's value.
fn load_config(
    source: &std::path::Path,
    verbose: bool,
    force: bool,
) -> Result<Configuration, config::ConfigError> {
    let site = config::load_site_config(source)?;
    let mut flags = toml::Table::new();
    if verbose {
        flags.insert("verbose".into(), toml::Value::Boolean(true));
    }
    if force {
        flags.insert("force".into(), toml::Value::Boolean(true));
    }
    Ok(site.merge_table(&flags))
}
