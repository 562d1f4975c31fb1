use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use pdf_pages::{
    BatchJob, BatchOperation, BatchStatus, CancelFlag, PageRef, Rotation, load_source,
    merge_pages, run_batch,
};

#[derive(Parser)]
#[command(name = "pagetool", about = "PDF page extraction and merge CLI", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Concatenate input PDFs, in order, into one output
    Merge {
        /// Input PDF file(s) - can specify multiple
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Extract selected pages from a PDF
    Extract {
        /// Input PDF file
        #[arg(short, long)]
        input: PathBuf,

        /// Pages to extract, 1-based (e.g. "1,3-5")
        #[arg(short, long)]
        pages: String,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,

        /// Rotate every extracted page clockwise
        #[arg(long, value_enum)]
        rotate: Option<RotateArg>,
    },

    /// Split a PDF into single-page files
    Split {
        /// Input PDF file(s) - can specify multiple
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Directory for the single-page files
        #[arg(short, long)]
        out_dir: PathBuf,
    },

    /// Re-save PDFs with streams compressed and unreferenced objects removed
    Optimize {
        /// Input PDF file(s) - can specify multiple
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Directory for the optimized copies
        #[arg(short, long)]
        out_dir: PathBuf,
    },

    /// Show page counts
    Info {
        /// Input PDF file(s)
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RotateArg {
    #[value(name = "90")]
    Clockwise90,
    #[value(name = "180")]
    Clockwise180,
    #[value(name = "270")]
    Clockwise270,
}

impl From<RotateArg> for Rotation {
    fn from(arg: RotateArg) -> Self {
        match arg {
            RotateArg::Clockwise90 => Self::Clockwise90,
            RotateArg::Clockwise180 => Self::Clockwise180,
            RotateArg::Clockwise270 => Self::Clockwise270,
        }
    }
}

/// Parse a 1-based page spec like "1,3-5" into zero-based indices.
fn parse_pages(spec: &str) -> Result<Vec<usize>> {
    let mut pages = Vec::new();
    for part in spec.split(',') {
        let part = part.trim();
        if part.is_empty() {
            bail!("empty entry in page spec '{spec}'");
        }
        if let Some((start, end)) = part.split_once('-') {
            let start: usize = start.trim().parse()?;
            let end: usize = end.trim().parse()?;
            if start == 0 || end < start {
                bail!("invalid range '{part}' in page spec");
            }
            pages.extend((start..=end).map(|p| p - 1));
        } else {
            let page: usize = part.parse()?;
            if page == 0 {
                bail!("pages are 1-based; '0' is not a page");
            }
            pages.push(page - 1);
        }
    }
    Ok(pages)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Merge { input, output } => {
            let job = BatchJob {
                files: input,
                operation: BatchOperation::MergeAll {
                    output: output.clone(),
                },
            };
            let report = run_batch(&job, &CancelFlag::new(), |current, total, file| {
                println!("[{current}/{total}] {}", file.display());
            })
            .await?;

            for (file, message) in &report.failures {
                eprintln!("skipped {}: {message}", file.display());
            }
            println!(
                "Merged {}/{} files → {}",
                report.succeeded,
                report.total,
                output.display()
            );
        }

        Commands::Extract {
            input,
            pages,
            output,
            rotate,
        } => {
            let rotation = rotate.map(Rotation::from).unwrap_or_default();
            let source = load_source(&input).await?;
            let refs: Vec<PageRef> = parse_pages(&pages)?
                .into_iter()
                .map(|i| PageRef::new(source.path.clone(), i).with_rotation(rotation))
                .collect();
            let summary = merge_pages(&refs, &output).await?;
            println!(
                "Extracted {} pages → {}",
                summary.page_count,
                output.display()
            );
        }

        Commands::Split { input, out_dir } => {
            let job = BatchJob {
                files: input,
                operation: BatchOperation::Split {
                    output_dir: out_dir.clone(),
                },
            };
            let report = run_batch(&job, &CancelFlag::new(), |current, total, file| {
                println!("[{current}/{total}] {}", file.display());
            })
            .await?;

            for (file, message) in &report.failures {
                eprintln!("skipped {}: {message}", file.display());
            }
            if report.status == BatchStatus::Completed {
                println!(
                    "Split {}/{} files into {}",
                    report.succeeded,
                    report.total,
                    out_dir.display()
                );
            }
        }

        Commands::Optimize { input, out_dir } => {
            let job = BatchJob {
                files: input,
                operation: BatchOperation::Optimize {
                    output_dir: out_dir.clone(),
                },
            };
            let report = run_batch(&job, &CancelFlag::new(), |current, total, file| {
                println!("[{current}/{total}] {}", file.display());
            })
            .await?;

            for (file, message) in &report.failures {
                eprintln!("skipped {}: {message}", file.display());
            }
            println!(
                "Optimized {}/{} files into {}",
                report.succeeded,
                report.total,
                out_dir.display()
            );
        }

        Commands::Info { input } => {
            for path in input {
                match load_source(&path).await {
                    Ok(info) => println!("{}: {} pages", path.display(), info.page_count),
                    Err(e) => eprintln!("{}: {e}", path.display()),
                }
            }
        }
    }

    Ok(())
}
