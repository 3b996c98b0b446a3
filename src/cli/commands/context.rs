//! Context Command
//!
//! Usage:
//!   repolens context <PATH> [--top N] [--max-chars N] [--format text|json]

use std::path::PathBuf;

use super::load_config;
use crate::cli::OutputFormat;
use crate::cli::ui::Output;
use crate::context::{ContextOptions, gather_context};
use crate::ranker::RankOptions;
use crate::types::Result;

pub struct ContextArgs {
    pub path: PathBuf,
    pub top: Option<usize>,
    pub max_chars: Option<usize>,
    pub format: OutputFormat,
}

pub fn run(args: ContextArgs) -> Result<()> {
    let config = load_config(&args.path)?;

    let rank_options = RankOptions::from(&config);
    let mut options = ContextOptions::from(&config);
    if let Some(top) = args.top {
        options = options.with_top_files(top);
    }
    if let Some(max_chars) = args.max_chars {
        options = options.with_max_chars_per_file(max_chars);
    }

    let gathered = gather_context(&args.path, &rank_options, &options)?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&gathered)?),
        OutputFormat::Text => {
            print!("{}", gathered.render());
            Output::new().success(&format!(
                "{} files, ~{} tokens",
                gathered.top_files.len(),
                gathered.estimated_tokens
            ));
        }
    }
    Ok(())
}
