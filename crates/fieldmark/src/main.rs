use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use fieldmark_core::logging::{init_logging, init_logging_with_dir};
use fieldmark_core::{process_document, DocumentLayout, MapperConfig};

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about,
    long_about = "Locate classifier fields on a document layout and write their rects as JSON.",
    arg_required_else_help = true
)]
pub struct Args {
    /// Layout JSON produced by the extractor (`{"pages": [...]}`)
    #[clap(short, long)]
    pub layout: String,

    /// Classifier output (`{"fields": [...]}`, surrounding prose tolerated)
    #[clap(short, long)]
    pub fields: String,

    /// Raw document text. Rebuilt from the layout when omitted.
    #[clap(short, long)]
    pub text: Option<String>,

    /// Optional output file path. If omitted, writes to stdout.
    #[clap(short, long)]
    pub output: Option<String>,

    /// Optional pretty print output.
    #[clap(short, long)]
    pub pretty: bool,

    /// Optional mapper config JSON; flags below override it
    #[clap(long)]
    pub config: Option<String>,

    /// Map fields on a single thread
    #[clap(long)]
    pub serial: bool,

    /// Skip fuzzy matching for candidates longer than this many chars
    #[clap(long)]
    pub fuzzy_cap: Option<usize>,

    /// Enable debug logging of the match cascade
    #[clap(long)]
    pub debug: bool,

    /// Directory for the full debug log
    #[clap(long)]
    pub log_dir: Option<String>,
}

impl Args {
    pub fn parse_args() -> Self {
        Args::parse()
    }

    pub fn mapper_config(&self) -> Result<MapperConfig> {
        let mut config = match &self.config {
            Some(path) => MapperConfig::load(expand(path)?)?,
            None => MapperConfig::default(),
        };
        if self.serial {
            config.parallel = false;
        }
        if self.fuzzy_cap.is_some() {
            config.locator.fuzzy_candidate_cap = self.fuzzy_cap;
        }
        Ok(config)
    }
}

fn expand(path: &str) -> Result<PathBuf> {
    let expanded =
        shellexpand::full(path).with_context(|| format!("Failed to expand path {path}"))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

fn read(path: &str) -> Result<String> {
    let path = expand(path)?;
    fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse_args();

    // Keep the guards alive until output is written
    let _guards = match &args.log_dir {
        Some(dir) => {
            let (file, stderr) = init_logging_with_dir(args.debug, &expand(dir)?)?;
            vec![file, stderr]
        }
        None => vec![init_logging(args.debug)],
    };

    let config = args.mapper_config()?;
    let layout = DocumentLayout::load(expand(&args.layout)?)?;
    let classifier_output = read(&args.fields)?;
    let full_text = match &args.text {
        Some(path) => read(path)?,
        None => {
            tracing::info!("No text file given, rebuilding text from layout");
            layout.reconstruct_text()?
        }
    };

    let json = process_document(&classifier_output, &full_text, &layout, &config, args.pretty)?;

    match &args.output {
        Some(path) => {
            let path = expand(path)?;
            fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Output written to: {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
