//! Rank Command
//!
//! Usage:
//!   repolens rank <PATH> [--limit N] [--no-ast] [--ignore GLOB]... [--format text|json]

use std::path::PathBuf;

use super::load_config;
use crate::cli::OutputFormat;
use crate::cli::ui::Output;
use crate::ranker::{RankOptions, rank_repository};
use crate::types::Result;

pub struct RankArgs {
    pub path: PathBuf,
    pub limit: Option<usize>,
    pub no_ast: bool,
    pub ignore: Vec<String>,
    pub format: OutputFormat,
}

pub fn run(args: RankArgs) -> Result<()> {
    let config = load_config(&args.path)?;

    let mut options = RankOptions::from(&config);
    options.extra_ignore.extend(args.ignore);
    if args.no_ast {
        options.use_ast = false;
    }

    let mut ranked = rank_repository(&args.path, &options)?;
    if let Some(limit) = args.limit {
        ranked.truncate(limit);
    }

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ranked)?),
        OutputFormat::Text => {
            let out = Output::new();
            if ranked.is_empty() {
                out.warning("No supported source files found");
                return Ok(());
            }
            out.header(&format!("{} ranked files", ranked.len()));
            for file in &ranked {
                out.ranked_line(
                    file.importance_pct(),
                    file.role.as_str(),
                    &file.path,
                    file.reason.as_deref(),
                );
            }
        }
    }
    Ok(())
}
