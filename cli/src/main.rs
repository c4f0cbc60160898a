//! pdfdoc CLI - PDF document structure inspector

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfdoc::{Document, FontScanner, OutlineIterator, PsExport};

#[derive(Parser)]
#[command(name = "pdfdoc")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Inspect PDF metadata, outlines, page labels and fonts", long_about = None)]
struct Cli {
    /// Document password (tried as user and owner password)
    #[arg(short, long, global = true, env = "PDFDOC_PASSWORD")]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print metadata as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the outline (bookmarks)
    Outline {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Maximum depth to print (unlimited if not specified)
        #[arg(long)]
        depth: Option<usize>,
    },

    /// List fonts used by the document
    Fonts {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Only scan the first N pages
        #[arg(long)]
        pages: Option<usize>,
    },

    /// List page labels
    Labels {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Look up a single label instead of listing all pages
        #[arg(long)]
        find: Option<String>,
    },

    /// Write a copy of the document
    Save {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
    },

    /// Export a page range to PostScript
    Ps {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// First page (1-based)
        #[arg(long, default_value = "1")]
        first: usize,

        /// Last page (1-based, defaults to the last page)
        #[arg(long)]
        last: Option<usize>,
    },

    /// Show version information
    Version,
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let password = cli.password.as_deref();

    let result = match cli.command {
        Commands::Info { input, json } => cmd_info(&input, password, json),
        Commands::Outline { input, depth } => cmd_outline(&input, password, depth),
        Commands::Fonts { input, pages } => cmd_fonts(&input, password, pages),
        Commands::Labels { input, find } => cmd_labels(&input, password, find.as_deref()),
        Commands::Save { input, output } => cmd_save(&input, password, &output),
        Commands::Ps {
            input,
            output,
            first,
            last,
        } => cmd_ps(&input, password, output.as_deref(), first, last),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn open(input: &Path, password: Option<&str>) -> pdfdoc::Result<Document> {
    log::debug!("Opening {}", input.display());
    Document::open(input, password)
}

fn cmd_info(input: &Path, password: Option<&str>, json: bool) -> CliResult {
    let doc = open(input, password)?;
    let metadata = doc.metadata();

    if json {
        println!("{}", serde_json::to_string_pretty(&metadata)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    if let Some(format) = &metadata.format {
        println!("{}: {}", "Format".bold(), format);
    }
    println!("{}: {}", "Pages".bold(), doc.page_count());
    println!(
        "{}: {}",
        "Encrypted".bold(),
        if doc.is_encrypted() { "Yes" } else { "No" }
    );
    println!(
        "{}: {}",
        "Linearized".bold(),
        if metadata.linearized { "Yes" } else { "No" }
    );

    let fields = [
        ("Title", &metadata.title),
        ("Author", &metadata.author),
        ("Subject", &metadata.subject),
        ("Keywords", &metadata.keywords),
        ("Creator", &metadata.creator),
        ("Producer", &metadata.producer),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("{}: {}", label.bold(), value);
        }
    }

    if let Some(created) = metadata.created {
        println!("{}: {}", "Created".bold(), created.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(modified) = metadata.modified {
        println!("{}: {}", "Modified".bold(), modified.format("%Y-%m-%d %H:%M:%S"));
    }

    println!("{}: {:?}", "Page layout".bold(), metadata.page_layout);
    println!("{}: {:?}", "Page mode".bold(), metadata.page_mode);

    let perms = metadata.permissions;
    let flag = |allowed: bool| if allowed { "yes".green() } else { "no".red() };
    println!(
        "{}: print {} / modify {} / copy {} / annotate {}",
        "Permissions".bold(),
        flag(perms.print),
        flag(perms.modify),
        flag(perms.copy),
        flag(perms.add_notes)
    );

    Ok(())
}

fn cmd_outline(input: &Path, password: Option<&str>, depth: Option<usize>) -> CliResult {
    let doc = open(input, password)?;

    match OutlineIterator::new(&doc) {
        Some(item) => print_outline(item, 0, depth.unwrap_or(usize::MAX)),
        None => println!("{}", "No outline".yellow()),
    }
    Ok(())
}

fn print_outline(mut item: OutlineIterator, level: usize, max_depth: usize) {
    loop {
        let action = item.action();
        let target = action
            .kind
            .page_number()
            .map(|page| format!(" (p. {})", page))
            .unwrap_or_default();
        let marker = if item.is_open() { "▾" } else { "▸" };
        println!(
            "{}{} {}{}",
            "  ".repeat(level),
            marker.dimmed(),
            action.title,
            target.dimmed()
        );

        if level + 1 < max_depth {
            if let Some(child) = item.child() {
                print_outline(child, level + 1, max_depth);
            }
        }

        if !item.next() {
            break;
        }
    }
}

fn cmd_fonts(input: &Path, password: Option<&str>, pages: Option<usize>) -> CliResult {
    let doc = open(input, password)?;
    let limit = pages.unwrap_or(usize::MAX).min(doc.page_count());

    let pb = ProgressBar::new(limit as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} pages")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut scanner = FontScanner::new(&doc);
    let mut fonts = Vec::new();
    while scanner.next_page() < limit {
        let Some(found) = scanner.scan(1) else {
            break;
        };
        fonts.extend_from_slice(found.records());
        pb.inc(1);
    }
    pb.finish_and_clear();

    println!(
        "{:<40} {:<14} {:<5} {:<4} {:<4}",
        "name".bold(),
        "type".bold(),
        "emb".bold(),
        "sub".bold(),
        "uni".bold()
    );
    println!("{}", "─".repeat(72).dimmed());
    let yes_no = |b: bool| if b { "yes" } else { "no" };
    for font in &fonts {
        println!(
            "{:<40} {:<14} {:<5} {:<4} {:<4}",
            font.name.as_deref().unwrap_or("[none]"),
            font.font_type.to_string(),
            yes_no(font.embedded),
            yes_no(font.subset),
            yes_no(font.has_to_unicode)
        );
    }
    println!("\n{} {}", fonts.len().to_string().green(), "fonts".green());
    Ok(())
}

fn cmd_labels(input: &Path, password: Option<&str>, find: Option<&str>) -> CliResult {
    let doc = open(input, password)?;

    if let Some(label) = find {
        match doc.page_by_label(label) {
            Some(page) => println!("{} -> page {}", label, page.number()),
            None => println!("{} '{}'", "No page labelled".yellow(), label),
        }
        return Ok(());
    }

    for index in 0..doc.page_count() {
        let page = doc.page(index);
        println!("{:>5}  {}", page.number(), page.label());
    }
    Ok(())
}

fn cmd_save(input: &Path, password: Option<&str>, output: &Path) -> CliResult {
    let doc = open(input, password)?;
    doc.save(output)?;
    println!("{} {}", "Saved to".green(), output.display());
    Ok(())
}

fn cmd_ps(
    input: &Path,
    password: Option<&str>,
    output: Option<&Path>,
    first: usize,
    last: Option<usize>,
) -> CliResult {
    let doc = open(input, password)?;
    let last = last.unwrap_or(doc.page_count());
    if first == 0 || last < first {
        return Err(format!("Invalid page range: {}-{}", first, last).into());
    }

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_extension("ps"));

    let mut job = PsExport::create(&doc, &output, first - 1, last - first + 1)?;
    job.render_all()?;
    job.finish()?;

    println!("{} {}", "Saved to".green(), output.display());
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfdoc".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF document structure inspector");
}
