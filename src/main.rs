use clap::{ArgAction, Parser, Subcommand};
use folio::build::{self, BuildContext};
use folio::{config, output};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Static site generator for a JSON-driven portfolio")]
#[command(long_about = "\
Static site generator for a JSON-driven portfolio

Content lives in JSON files, one per section. Page sources are HTML with
{{TOKEN}} placeholders that are replaced by rendered sections and partials.

Project structure:

  folio.toml                       # Optional config (see gen-config)
  data/
  ├── featured.json                # {{FEATURED_PROJECTS}}
  ├── skills.json                  # {{SKILLS}}
  ├── experience.json              # {{EXPERIENCE}}
  ├── certifications.json          # {{CERTIFICATIONS}}
  └── reading.json                 # {{READING_FILTERS}} and {{READING_GRID}}
  partials/
  ├── nav.html                     # {{NAV}}
  └── footer.html                  # {{FOOTER}}
  src/
  ├── index.html                   # Page sources
  ├── reading.html
  └── offline.html

All content is validated before anything is written. The first invalid field
fails the build with its path, e.g. reading[3].year.

Run 'folio gen-config' to generate a documented folio.toml.")]
#[command(version)]
struct Cli {
    /// Project root
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate content, assemble and write every page
    Build,
    /// Validate and assemble without writing anything
    Check,
    /// Print a stock folio.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Build => {
            let ctx = BuildContext::load(&cli.root)?;
            let report = build::build(&ctx)?;
            output::print_build_report(&report, &ctx.config.output_dir);
        }
        Command::Check => {
            let ctx = BuildContext::load(&cli.root)?;
            let report = build::check(&ctx)?;
            output::print_build_report(&report, &ctx.config.output_dir);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }
    Ok(())
}

/// `RUST_LOG` wins; otherwise `warn`, raised by each `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}
