use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use texlens_match::{MatchConfig, TagKind, recompute};
use texlens_syntax::completion::completions;
use texlens_syntax::{Category, Snapshot, TextBuffer, TextRange, TextSize, classify_range};

#[derive(Parser)]
#[command(name = "texlens")]
#[command(about = "Lexical tools for LaTeX sources", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a file (or a byte range of it) and emit JSON spans
    Classify {
        #[arg(value_name = "FILE")]
        path: PathBuf,
        /// First byte offset to classify
        #[arg(long)]
        start: Option<u32>,
        /// Byte offset to stop at (exclusive)
        #[arg(long)]
        end: Option<u32>,
    },
    /// Report the delimiter pairs matched at a caret
    Match {
        #[arg(value_name = "FILE")]
        path: PathBuf,
        #[command(flatten)]
        caret: CaretArgs,
        /// Scan at most this many lines in either direction (0 = unbounded)
        #[arg(long)]
        max_lines: Option<u32>,
        /// Only recognize multi-character delimiters from their first or last character
        #[arg(long)]
        outer: bool,
        /// JSON file holding a match configuration
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// List the completion snippets offered at a caret
    Complete {
        #[arg(value_name = "FILE")]
        path: PathBuf,
        #[command(flatten)]
        caret: CaretArgs,
    },
    /// Print the default style of every category
    Palette,
}

/// A caret given either as a byte offset or as a 0-based line and column.
#[derive(Args)]
struct CaretArgs {
    #[arg(long, conflicts_with_all = ["line", "col"])]
    offset: Option<u32>,
    #[arg(long, requires = "col")]
    line: Option<u32>,
    #[arg(long, requires = "line")]
    col: Option<u32>,
}

impl CaretArgs {
    fn resolve(&self, snapshot: &Snapshot) -> anyhow::Result<TextSize> {
        match (self.offset, self.line, self.col) {
            (Some(offset), _, _) => Ok(offset.into()),
            (None, Some(line), Some(col)) => snapshot
                .offset(line, col)
                .with_context(|| format!("no position at line {} column {}", line, col)),
            _ => bail!("give a caret with --offset or --line and --col"),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match &cli.command {
        Commands::Classify { path, start, end } => {
            let snapshot = load(path)?;
            let start = start.map_or(TextSize::from(0), TextSize::from);
            let end = end.map_or(snapshot.len(), TextSize::from);
            if start > end {
                bail!("--start {:?} lies after --end {:?}", start, end);
            }
            let spans: Vec<_> = classify_range(&snapshot, TextRange::new(start, end))
                .into_iter()
                .map(|span| {
                    json!({
                        "start": u32::from(span.range.start()),
                        "end": u32::from(span.range.end()),
                        "category": span.category,
                        "text": snapshot.slice(span.range),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&spans)?);
        }
        Commands::Match {
            path,
            caret,
            max_lines,
            outer,
            config,
        } => {
            let mut config = match config {
                Some(file) => {
                    let raw = fs::read_to_string(file)
                        .with_context(|| format!("failed to read {}", file.display()))?;
                    serde_json::from_str::<MatchConfig>(&raw)
                        .with_context(|| format!("invalid match configuration in {}", file.display()))?
                }
                None => MatchConfig::default(),
            };
            if let Some(lines) = max_lines {
                config.forward_max_lines = Some(*lines);
                config.backward_max_lines = Some(*lines);
            }
            if *outer {
                config.inner = false;
            }

            let snapshot = load(path)?;
            let caret = caret.resolve(&snapshot)?;
            let matches = recompute(&snapshot, caret, &config);
            let pairs: Vec<_> = matches
                .iter()
                .map(|m| {
                    json!({
                        "pair": m.pair,
                        "open": { "start": u32::from(m.open.start()), "end": u32::from(m.open.end()) },
                        "close": { "start": u32::from(m.close.start()), "end": u32::from(m.close.end()) },
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "caret": u32::from(caret),
                    "pairs": pairs,
                }))?
            );
        }
        Commands::Complete { path, caret } => {
            let snapshot = load(path)?;
            let caret = caret.resolve(&snapshot)?;
            let set = completions(&snapshot, caret)
                .with_context(|| format!("caret {:?} lies outside the document", caret))?;
            let items: Vec<_> = set.items.iter().map(|item| item.label).collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "title": set.title,
                    "applicable_to": {
                        "start": u32::from(set.applicable_to.start()),
                        "end": u32::from(set.applicable_to.end()),
                    },
                    "items": items,
                }))?
            );
        }
        Commands::Palette => {
            let styles = Category::ALL
                .iter()
                .map(|category| category.style())
                .chain(std::iter::once(TagKind::MatchedDelimiter.style()))
                .map(|style| {
                    json!({
                        "name": style.name,
                        "display_name": style.display_name,
                        "foreground": style.foreground.map(|rgb| rgb.to_string()),
                    })
                })
                .collect::<Vec<_>>();
            println!("{}", serde_json::to_string_pretty(&styles)?);
        }
    }
    Ok(())
}

fn load(path: &Path) -> anyhow::Result<Arc<Snapshot>> {
    if path.extension().and_then(|ext| ext.to_str()) != Some("tex") {
        log::warn!("{} does not look like a .tex file", path.display());
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let buffer = TextBuffer::new(content)
        .with_context(|| format!("cannot load {}", path.display()))?;
    Ok(buffer.current())
}
