use clap::{Parser, Subcommand};
use layerpress::{config, content, generate, output, overlay, registry};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "layerpress")]
#[command(about = "Static site generator with layered theme overrides")]
#[command(long_about = "\
Static site generator with layered theme overrides

A theme ships base layouts and includes; you override individual files
without touching the theme sources. At build time the layers are merged
into a cache directory the template engine reads exclusively.

Project structure:

  site.toml                      # Site config (optional, sparse)
  src/
  ├── _layouts/                  # Theme layouts (base layer)
  │   ├── base.njk
  │   └── post.njk
  ├── _includes/                 # Theme includes (merged recursively)
  │   └── partials/nav.njk
  ├── _user/
  │   ├── layouts/               # Your layout overrides (same filename wins)
  │   ├── includes/              # Your include overrides
  │   └── assets/                # Your static assets (passthrough copy)
  ├── posts/                     # Blog posts (markdown + front matter)
  ├── pages/                     # Standalone pages; index.md is the home page
  └── assets/                    # Theme static assets (passthrough copy)

Override resolution:
  .cache/layouts/<name>          # base layouts, then user layouts on top
  .cache/layouts/theme/<name>    # pristine base copies - extend these from
                                 # an override via {% extends \"theme/base.njk\" %}
  .cache/includes/...            # base includes, then user includes on top

Run 'layerpress gen-config' to print a documented site.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Project root directory
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "_site", global = true)]
    output: PathBuf,

    /// Directory for the merged layout/include caches
    #[arg(long, default_value = ".cache", global = true)]
    cache_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: merge → scan → generate
    Build,
    /// Materialize the merged layout/include caches only
    Merge,
    /// Validate content and config without writing output
    Check,
    /// Print a stock site.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build => {
            let site_config = config::load_config(&cli.source)?;
            let layers = overlay::LayerPaths::new(&cli.source, &cli.cache_dir, &site_config);

            println!("==> Stage 1: Merging theme layers → {}", cli.cache_dir.display());
            let report = overlay::merge_layers(&layers)?;
            output::print_merge_output(&report);

            println!("==> Stage 2: Scanning content");
            let manifest = content::scan(&cli.source, &site_config)?;
            let manifest_path = cli.cache_dir.join("manifest.json");
            let json = serde_json::to_string_pretty(&manifest)?;
            std::fs::write(&manifest_path, json)?;
            output::print_scan_output(&manifest);

            println!("==> Stage 3: Generating HTML → {}", cli.output.display());
            let prefix = config::effective_path_prefix(&site_config);
            let registry = registry::Registry::with_defaults(&prefix);
            let summary =
                generate::generate(&manifest, &cli.source, &layers, &cli.output, &registry)?;
            output::print_generate_output(&summary);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Merge => {
            let site_config = config::load_config(&cli.source)?;
            let layers = overlay::LayerPaths::new(&cli.source, &cli.cache_dir, &site_config);
            let report = overlay::merge_layers(&layers)?;
            output::print_merge_output(&report);
        }
        Command::Check => {
            let site_config = config::load_config(&cli.source)?;
            let layers = overlay::LayerPaths::new(&cli.source, &cli.cache_dir, &site_config);
            println!("==> Checking {}", cli.source.display());
            let report = overlay::merge_layers(&layers)?;
            output::print_merge_output(&report);
            let manifest = content::scan(&cli.source, &site_config)?;
            output::print_scan_output(&manifest);
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
