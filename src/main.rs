use clap::{Parser, ValueEnum};
use normform::error::Result;
use normform::render::TextRenderer;
use normform::{Options, extract_sql, normalize};
use std::fs;
use std::path::PathBuf;
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "normform")]
#[command(about = "Normalize a relational schema to 1NF, 2NF, 3NF and BCNF")]
struct Args {
    /// Schema file: `R(A, B, C)` shorthand with FDs, or SQL `CREATE TABLE` statements
    input: PathBuf,

    /// Extra functional dependencies, one or more per line
    #[arg(long)]
    fds: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Print the parsed DDL structure instead of normalizing
    #[arg(long)]
    ddl: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Largest attribute universe accepted
    #[arg(long, env = "NORMFORM_MAX_ATTRIBUTES", default_value_t = Options::default().max_attributes)]
    max_attributes: usize,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let input = fs::read_to_string(&args.input)?;
    let extra = match &args.fds {
        Some(path) => Some(fs::read_to_string(path)?),
        None => None,
    };
    info!(input = %args.input.display(), "read schema");

    let rendered = if args.ddl {
        let schema = extract_sql(&input);
        match args.format {
            Format::Json => serde_json::to_string_pretty(&schema)?,
            Format::Text => TextRenderer::default().render_ddl(&schema),
        }
    } else {
        let options = Options {
            max_attributes: args.max_attributes,
        };
        let report = normalize(&input, extra.as_deref(), &options)?;
        match args.format {
            Format::Json => serde_json::to_string_pretty(&report)?,
            Format::Text => {
                let renderer = TextRenderer::default();
                format!(
                    "{}\n{}",
                    renderer.render_fds(&report.fds),
                    renderer.render(&report.normal_forms)
                )
            }
        }
    };

    match &args.output {
        Some(path) => fs::write(path, rendered)?,
        None => println!("{}", rendered.trim_end()),
    }
    Ok(())
}
