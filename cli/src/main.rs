//! pdfdeck CLI - PDF to editable slide deck tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfdeck::export::{
    self, export_text, DocumentBranding, DocumentFormat, ExportOptions, JsonFormat, LayoutSlide,
    PresentationSpec,
};
use pdfdeck::extract::{ExtractOptions, Extractor, LopdfBackend, PageSelection, PageSource};
use pdfdeck::model::{preview, KindFilter};
use pdfdeck::services::{CheckOrigin, GrammarClient, ImageSearchClient, ResultOrigin};
use pdfdeck::Editor;

#[derive(Parser)]
#[command(name = "pdfdeck")]
#[command(version)]
#[command(about = "Turn PDF pages into editable PowerPoint decks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a PDF into a PowerPoint deck, one slide per page
    Convert {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (presentation_<timestamp>.pptx if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Place every extracted element on its page's slide
        #[arg(long)]
        populate: bool,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Skip image detection
        #[arg(long)]
        text_only: bool,

        /// Stop at the first unreadable page
        #[arg(long)]
        strict: bool,
    },

    /// List the elements extracted from a PDF
    Elements {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Only show one kind of element
        #[arg(long, value_enum)]
        kind: Option<ElementKindArg>,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Output JSON instead of a listing
        #[arg(long)]
        json: bool,
    },

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Build a deck from a JSON list of title/content/layout slides
    Deck {
        /// Input JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (presentation_<timestamp>.pptx if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Wrap a text file in a branded document
    Text {
        /// Input text file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "pdf")]
        format: FormatArg,

        /// Output file (DURAI-document.<ext> if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Search stock images
    Images {
        /// Search keywords
        #[arg(value_name = "QUERY")]
        query: String,

        /// Unsplash access key
        #[arg(long, env = "UNSPLASH_ACCESS_KEY")]
        access_key: Option<String>,
    },

    /// Check grammar of a piece of text
    Grammar {
        /// Text to check
        #[arg(value_name = "TEXT")]
        text: String,

        /// Print the text with the first suggestion applied
        #[arg(long)]
        apply: bool,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ElementKindArg {
    Text,
    Image,
}

impl From<ElementKindArg> for KindFilter {
    fn from(kind: ElementKindArg) -> Self {
        match kind {
            ElementKindArg::Text => KindFilter::Text,
            ElementKindArg::Image => KindFilter::Image,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Pdf,
    /// Word-compatible HTML document
    Docx,
    Txt,
    Rtf,
    Html,
    #[value(alias = "md")]
    Markdown,
}

impl From<FormatArg> for DocumentFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Pdf => DocumentFormat::Pdf,
            FormatArg::Docx => DocumentFormat::Docx,
            FormatArg::Txt => DocumentFormat::Txt,
            FormatArg::Rtf => DocumentFormat::Rtf,
            FormatArg::Html => DocumentFormat::Html,
            FormatArg::Markdown => DocumentFormat::Markdown,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            input,
            output,
            populate,
            pages,
            text_only,
            strict,
        } => cmd_convert(
            &input,
            output.as_deref(),
            populate,
            pages.as_deref(),
            text_only,
            strict,
        ),
        Commands::Elements {
            input,
            kind,
            pages,
            json,
        } => cmd_elements(&input, kind, pages.as_deref(), json),
        Commands::Info { input } => cmd_info(&input),
        Commands::Deck { input, output } => cmd_deck(&input, output.as_deref()),
        Commands::Text {
            input,
            format,
            output,
        } => cmd_text(&input, format.into(), output.as_deref()),
        Commands::Images { query, access_key } => cmd_images(&query, access_key),
        Commands::Grammar { text, apply } => cmd_grammar(&text, apply),
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

fn page_selection(pages: Option<&str>) -> Result<PageSelection, Box<dyn std::error::Error>> {
    Ok(match pages {
        Some(p) => PageSelection::parse(p)?,
        None => PageSelection::All,
    })
}

fn save_pptx(spec: &PresentationSpec, output: Option<&Path>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    // Render fully before touching the filesystem.
    let bytes = export::to_pptx_bytes(spec)?;
    log::debug!("Packaged {} slides into {} bytes", spec.slides.len(), bytes.len());
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(export::default_file_name()));
    fs::write(&path, bytes)?;
    Ok(path)
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    populate: bool,
    pages: Option<&str>,
    text_only: bool,
    strict: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = ExtractOptions::new().with_pages(page_selection(pages)?);
    if text_only {
        options = options.text_only();
    }
    if strict {
        options = options.strict();
    }

    let backend = LopdfBackend::load_file(input)?;
    let pb = ProgressBar::new(backend.page_count() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let extractor = Extractor::new(backend).with_options(options);
    let conversion = extractor.convert_with_progress(|progress| {
        pb.set_position(progress.page.saturating_sub(1) as u64);
        pb.set_message(format!("Page {}", progress.page));
    })?;
    pb.finish_with_message("Extracted");

    for failure in &conversion.failures {
        println!(
            "{} page {}: {}",
            "Skipped".yellow(),
            failure.page,
            failure.error
        );
    }
    let (texts, images) = (
        conversion.library.text_count(),
        conversion.library.image_count(),
    );

    let mut editor = Editor::default();
    editor.load_conversion(conversion);
    if populate {
        editor.populate_from_pages();
    }

    let spec = PresentationSpec::from_deck(editor.deck(), &ExportOptions::default())?;
    let path = save_pptx(&spec, output)?;

    println!("\n{}", "Summary:".green().bold());
    println!("  {} {} slides", "├─".dimmed(), editor.deck().len());
    println!("  {} {} text blocks", "├─".dimmed(), texts);
    println!("  {} {} images", "├─".dimmed(), images);
    println!("  {} {} cards", "└─".dimmed(), editor.deck().card_count());
    println!("{} {}", "Saved to".green(), path.display());

    Ok(())
}

fn cmd_elements(
    input: &Path,
    kind: Option<ElementKindArg>,
    pages: Option<&str>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = ExtractOptions::new().with_pages(page_selection(pages)?);
    let conversion = pdfdeck::extract_file_with_options(input, options)?;

    let elements: Vec<_> = match kind {
        Some(k) => conversion.library.filter(k.into()).collect(),
        None => conversion.library.iter().collect(),
    };

    if json {
        println!("{}", pdfdeck::export::to_json(&elements, JsonFormat::Pretty)?);
        return Ok(());
    }

    for element in &elements {
        let tag = if element.is_text() {
            "text ".cyan()
        } else {
            "image".magenta()
        };
        println!(
            "{} {} {} {}",
            format!("{:>8}", element.id.to_string()).dimmed(),
            tag,
            format!("p{}", element.page).bold(),
            preview(element)
        );
    }
    println!("\n{} {} elements", "Total:".green().bold(), elements.len());

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let header = pdfdeck::sniff_path(input)?;
    let backend = LopdfBackend::load_file(input)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), header);
    println!("{}: {}", "Pages".bold(), backend.page_count());
    if let Some(title) = backend.title() {
        println!("{}: {}", "Title".bold(), title);
    }
    if backend.page_count() > 0 {
        let viewport = backend.viewport(1, 1.0)?;
        println!(
            "{}: {:.0} x {:.0} pt",
            "Page size".bold(),
            viewport.width,
            viewport.height
        );
    }

    let conversion = Extractor::new(backend).convert()?;

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Text blocks".bold(), conversion.library.text_count());
    println!("{}: {}", "Images".bold(), conversion.library.image_count());
    if !conversion.failures.is_empty() {
        println!(
            "{}: {}",
            "Unreadable pages".bold(),
            conversion.failures.len().to_string().yellow()
        );
    }

    Ok(())
}

fn cmd_deck(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let json = fs::read_to_string(input)?;
    let slides: Vec<LayoutSlide> = serde_json::from_str(&json)?;
    let spec = PresentationSpec::from_layouts(&slides, &ExportOptions::default())?;
    let path = save_pptx(&spec, output)?;
    println!("{} {}", "Saved to".green(), path.display());
    Ok(())
}

fn cmd_text(
    input: &Path,
    format: DocumentFormat,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(input)?;
    let today = chrono::Local::now().date_naive();
    let file = export_text(&text, format, &DocumentBranding::default(), today)?;

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&file.filename));
    fs::write(&path, &file.bytes)?;
    println!("{} {} ({})", "Saved to".green(), path.display(), file.mime);
    Ok(())
}

fn cmd_images(query: &str, access_key: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = ImageSearchClient::new();
    if let Some(key) = access_key {
        client = client.with_access_key(key);
    }

    let rt = tokio::runtime::Runtime::new()?;
    let results = rt.block_on(client.search(query))?;

    if results.origin == ResultOrigin::Demo {
        println!(
            "{}",
            "Using demo images. Add your Unsplash API key for real searches.".yellow()
        );
    }
    for image in &results.images {
        println!("{} {}", image.alt.bold(), image.url.dimmed());
    }
    Ok(())
}

fn cmd_grammar(text: &str, apply: bool) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(GrammarClient::new().check(text))?;

    if report.origin == CheckOrigin::Basic {
        println!("{}", "Grammar service unavailable, using basic checks".yellow());
    }
    if report.is_clean() {
        println!("{}", "No grammar issues found!".green());
        return Ok(());
    }

    for (i, issue) in report.issues.iter().take(5).enumerate() {
        println!("{}. {}", i + 1, issue.message);
        if let Some(suggestion) = issue.first_replacement() {
            println!("   {}: {:?}", "Suggestion".dimmed(), suggestion);
        }
    }
    if apply {
        if let Some(corrected) = report.corrected(text) {
            println!("\n{}", corrected);
        }
    }
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfdeck".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF to editable slide deck tool");
    println!();
    println!("License: MIT");
}
