use clap::{Parser, Subcommand};
use folio::card::{self, HttpFetcher, ResvgRasterizer};
use folio::markdown::Renderer;
use folio::post::Post;
use folio::{config, og, output, pages};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Open Graph cards and post pages for a markdown blog")]
#[command(long_about = "\
Open Graph cards and post pages for a markdown blog

Posts are markdown files with an optional front-matter block. Running
without a subcommand generates one Open Graph card per post.

Project structure:

  ./
  ├── folio.toml                   # Config (optional, defaults otherwise)
  ├── src/posts/                   # Markdown posts (paths.posts_dir)
  │   ├── hello-world.md           # Post → public/og/hello-world.png
  │   └── notes-draft.md           # Draft marker in the name = skipped
  ├── public/og/                   # Generated cards
  └── dist/blog/                   # Generated pages and index.json

Run 'folio gen-config' to generate a documented folio.toml.")]
#[command(version)]
struct Cli {
    /// Project root; configured paths are relative to it
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Config file (default: folio.toml under the root)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Render an Open Graph card for every post
    Og,
    /// Write an HTML page per post and the post index
    Pages,
    /// Print the rendered HTML body of one post
    Render {
        /// Markdown file to render
        file: PathBuf,
    },
    /// Print a stock folio.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.root.join("folio.toml"));

    match cli.command.unwrap_or(Command::Og) {
        Command::Og => {
            let site_config = config::load_config(&config_path)?;
            run_og(&site_config, &cli.root)?;
        }
        Command::Pages => {
            let site_config = config::load_config(&config_path)?;
            let report = pages::write_post_pages(&site_config, &cli.root, &Renderer::new())?;
            output::print_pages_report(&report, &cli.root.join(&site_config.paths.pages_dir));
        }
        Command::Render { file } => {
            let post = Post::load(&file)?;
            println!("{}", Renderer::new().render(&post.body).into_string());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn run_og(site_config: &config::SiteConfig, root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let fetcher = HttpFetcher::new(Duration::from_secs(site_config.fonts.timeout_secs));
    let fonts = card::fonts::assemble(&site_config.fonts, root, &fetcher);
    output::print_font_load(&fonts);
    let rasterizer = ResvgRasterizer::new(&fonts.fonts, &site_config.card.font_family);

    let (tx, rx) = std::sync::mpsc::channel();
    let printer_root = root.to_path_buf();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_og_event(&event, &printer_root) {
                println!("{}", line);
            }
        }
    });
    let result = og::generate(site_config, root, &rasterizer, Some(tx));
    printer.join().ok();
    output::print_og_summary(&result?);
    Ok(())
}

/// Diagnostics go to stderr so they never interleave with the report on
/// stdout. `RUST_LOG` overrides the default level.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn help_tree_shows_default_posts_dir() {
        let cmd = Cli::command();
        let about = cmd.get_long_about().unwrap().to_string();
        let posts_dir = config::SiteConfig::default().paths.posts_dir;
        assert!(about.contains(&format!("{posts_dir}/")), "{about}");
    }

    #[test]
    fn no_subcommand_means_og() {
        let cli = Cli::try_parse_from(["folio"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.root, PathBuf::from("."));
    }
}
