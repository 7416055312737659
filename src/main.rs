use clap::{Parser, Subcommand, ValueEnum};
use pageplan::{config, discover, output, plan};
use std::path::PathBuf;

/// Page layout convention of the project.
#[derive(Clone, Copy, ValueEnum)]
enum Layout {
    /// `src/pages/<module>/<page>.html` (standard projects)
    Nested,
    /// `src/app/<page>/index.html`
    Flat,
}

impl Layout {
    fn is_nested(self) -> bool {
        matches!(self, Layout::Nested)
    }

    fn default_page_root(self) -> &'static str {
        match self {
            Layout::Nested => "src/pages",
            Layout::Flat => "src/app",
        }
    }
}

/// Shared flags for commands that build a plan.
#[derive(clap::Args, Clone)]
struct TargetArgs {
    /// Environment name, matched case-insensitively against browser_support
    #[arg(long, default_value = "development")]
    env: String,

    /// Dev-server port (required for the development environment)
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Parser)]
#[command(name = "pageplan")]
#[command(about = "Build-plan generator for multi-page front-end projects")]
#[command(long_about = "\
Build-plan generator for multi-page front-end projects

The directory layout decides which pages exist; abc.json decides how they are
bundled. The resulting plan lists entries, chunk groups, external assets and
per-page HTML parameters for the bundler.

Project structure (nested layout):

  my-project/
  ├── abc.json                     # Project document (optional)
  └── src/
      ├── lib/                     # Library sources referenced from \"library\"
      └── pages/
          ├── checkout/            # Module
          │   ├── cart.html        # Page → entry checkout/bundle.cart
          │   ├── cart.js
          │   └── pay.html         # Script found anywhere under checkout/
          └── home/
              ├── index.html
              └── index.js

Run 'pageplan gen-config' to print the stock abc.json.")]
#[command(version)]
struct Cli {
    /// Project root (contains abc.json)
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Page layout convention
    #[arg(long, value_enum, default_value = "nested", global = true)]
    layout: Layout,

    /// Page root, relative to the project root (defaults per layout)
    #[arg(long, global = true)]
    page_root: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the pages found under the page root
    Discover,
    /// Compute the build plan and print it as JSON
    Plan {
        #[command(flatten)]
        target: TargetArgs,

        /// Write the plan to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Validate config and pages without emitting a plan
    Check(TargetArgs),
    /// Print the stock abc.json with all options
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let page_root = cli.root.join(
        cli.page_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(cli.layout.default_page_root())),
    );
    let nested = cli.layout.is_nested();
    let workspace = plan::Workspace::new(cli.root.clone()).with_process_env(
        std::env::var("NODE_ENV").ok(),
        std::env::var("DEBUG").ok(),
    );

    match cli.command {
        Command::Discover => {
            let pages = discover::discover(&page_root, nested)?;
            output::print_discover_output(&pages, &page_root);
        }
        Command::Plan { target, out } => {
            let build_plan =
                plan::plan_project(&workspace, &page_root, nested, &target.env, target.port)?;
            let json = serde_json::to_string_pretty(&build_plan)?;
            match out {
                Some(path) => {
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, json)?;
                    output::print_plan_output(&build_plan);
                    println!("==> Plan written to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        Command::Check(target) => {
            println!("==> Checking {} ({})", cli.root.display(), target.env);
            let build_plan =
                plan::plan_project(&workspace, &page_root, nested, &target.env, target.port)?;
            output::print_plan_output(&build_plan);
            println!("==> Project is valid");
        }
        Command::GenConfig => {
            println!("{}", config::stock_config_json()?);
        }
    }

    Ok(())
}

/// Initialize `env_logger`; `RUST_LOG` takes precedence over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}
