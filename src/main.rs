use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use dxi::index::fulltext::{
    FullTextIndex, FullTextIndexer, FullTextOptions, FulltextMeta, Pattern,
    FULLTEXT_FORMAT_VERSION,
};
use dxi::index::symbols::{SourceFilter, SymbolIndex};
use dxi::output::{self, SearchHit, Style};
use dxi::query::QueryResolver;

const TEXT_FILE: &str = "text.dxi";
const SUFFIX_FILE: &str = "suffixes.dxi";
const META_FILE: &str = "meta.json";

#[derive(Parser)]
#[command(name = "dxi")]
#[command(about = "Terminal-first documentation index and search engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the full-text index from a set of documents
    Index {
        /// Directory to write the index artifacts into
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Files to index
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Search the full-text index
    Search {
        /// Directory holding the index artifacts
        #[arg(short, long, default_value = ".")]
        index: PathBuf,

        /// Search term
        term: String,

        /// Context bytes shown on each side of a match
        #[arg(short, long, default_value_t = 60)]
        context: usize,

        /// Show every match in the prefix run, not just the first
        #[arg(short, long)]
        all: bool,

        /// Only report matches whose surrounding text also contains this
        pattern: Option<String>,

        /// Treat the extra pattern as a regex
        #[arg(short, long)]
        regex: bool,

        /// Disable colored output
        #[arg(long)]
        plain: bool,
    },
    /// Complete a partial symbol query
    Complete {
        /// Path to the symbol index file
        #[arg(short, long)]
        symbols: PathBuf,

        /// Partial query
        query: String,
    },
    /// Resolve a symbol query to matching entries
    Resolve {
        /// Path to the symbol index file
        #[arg(short, long)]
        symbols: PathBuf,

        /// Query string
        query: String,

        /// Emit ANSI-styled output
        #[arg(long)]
        ansi: bool,

        /// Skip the partial-match fallback
        #[arg(long)]
        exact: bool,
    },
    /// List symbol names, optionally scoped to one source
    Names {
        /// Path to the symbol index file
        #[arg(short, long)]
        symbols: PathBuf,

        /// Only names contributed by this source
        #[arg(long)]
        source: Option<String>,

        /// List namespaces only
        #[arg(long)]
        classes: bool,

        /// List methods only
        #[arg(long)]
        methods: bool,
    },
    /// Parse a symbol index file and write it back to stdout
    Dump {
        /// Path to the symbol index file
        #[arg(short, long)]
        symbols: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Index { out, files } => build_index(&out, &files),
        Commands::Search {
            index,
            term,
            context,
            all,
            pattern,
            regex,
            plain,
        } => search(&index, &term, context, all, pattern.as_deref(), regex, !plain),
        Commands::Complete { symbols, query } => {
            let index = SymbolIndex::open(&symbols)
                .with_context(|| format!("failed to load {}", symbols.display()))?;
            let resolver = QueryResolver::new(&index);
            match resolver.completion_list(&query) {
                Some(completions) => {
                    for name in completions {
                        println!("{name}");
                    }
                    Ok(())
                }
                None => bail!("nothing matches '{query}'"),
            }
        }
        Commands::Resolve {
            symbols,
            query,
            ansi,
            exact,
        } => resolve(&symbols, &query, ansi, exact),
        Commands::Names {
            symbols,
            source,
            classes,
            methods,
        } => {
            let index = SymbolIndex::open(&symbols)
                .with_context(|| format!("failed to load {}", symbols.display()))?;
            let filter = match &source {
                Some(name) => SourceFilter::Name(name),
                None => SourceFilter::Any,
            };
            let names = if classes && !methods {
                index.full_class_names(filter)
            } else if methods && !classes {
                index.full_method_names(filter)
            } else {
                index.all_names(filter)
            };
            for name in names {
                println!("{name}");
            }
            Ok(())
        }
        Commands::Dump { symbols } => {
            let index = SymbolIndex::open(&symbols)
                .with_context(|| format!("failed to load {}", symbols.display()))?;
            let stdout = io::stdout();
            index.dump(&mut stdout.lock())?;
            Ok(())
        }
    }
}

fn build_index(out: &Path, files: &[PathBuf]) -> Result<()> {
    let mut indexer = FullTextIndexer::with_defaults();
    for file in files {
        let data =
            fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
        indexer.add_document(&file.display().to_string(), data);
    }

    fs::create_dir_all(out)
        .with_context(|| format!("failed to create {}", out.display()))?;
    let mut text_out = BufWriter::new(File::create(out.join(TEXT_FILE))?);
    let mut suffix_out = BufWriter::new(File::create(out.join(SUFFIX_FILE))?);
    let (text_size, suffix_count) = indexer.build_index(&mut text_out, &mut suffix_out)?;
    text_out.flush()?;
    suffix_out.flush()?;

    let meta = FulltextMeta {
        format_version: FULLTEXT_FORMAT_VERSION.to_string(),
        doc_count: indexer.doc_count(),
        text_size,
        suffix_count,
    };
    fs::write(out.join(META_FILE), serde_json::to_string_pretty(&meta)?)?;

    println!(
        "indexed {} documents, {} bytes of text, {} suffixes",
        meta.doc_count, text_size, suffix_count
    );
    Ok(())
}

fn search(
    index_dir: &Path,
    term: &str,
    context: usize,
    all: bool,
    pattern: Option<&str>,
    regex: bool,
    color: bool,
) -> Result<()> {
    let meta_raw = fs::read_to_string(index_dir.join(META_FILE))
        .with_context(|| format!("no index metadata in {}", index_dir.display()))?;
    let meta: FulltextMeta = serde_json::from_str(&meta_raw).context("corrupt index metadata")?;
    if meta.format_version != FULLTEXT_FORMAT_VERSION {
        bail!(
            "index format '{}' does not match '{}', rebuild the index",
            meta.format_version,
            FULLTEXT_FORMAT_VERSION
        );
    }

    let index = FullTextIndex::open(
        &index_dir.join(TEXT_FILE),
        &index_dir.join(SUFFIX_FILE),
        FullTextOptions::default(),
    )?;

    let pattern = match pattern {
        Some(p) if regex => Some(Pattern::Regex(
            regex::bytes::Regex::new(p).context("invalid pattern regex")?,
        )),
        Some(p) => Some(Pattern::Term(p.as_bytes().to_vec())),
        None => None,
    };

    let Some(first) = index.lookup(term.as_bytes()) else {
        bail!("no match for '{term}'");
    };

    let mut hits = Vec::new();
    let keep_first = pattern
        .as_ref()
        .is_none_or(|p| p.matches(&first.text(p.extract_size(term.len()))));
    if keep_first {
        hits.push(SearchHit {
            path: first.path.clone(),
            context: first.context(context),
        });
    }
    if all {
        for m in index.next_matches(&first, pattern.as_ref()) {
            hits.push(SearchHit {
                path: m.path.clone(),
                context: m.context(context),
            });
        }
    } else if hits.is_empty() {
        if let Some(m) = index.next_match(&first, pattern.as_ref()) {
            hits.push(SearchHit {
                path: m.path.clone(),
                context: m.context(context),
            });
        }
    }
    if hits.is_empty() {
        bail!("no match for '{term}'");
    }

    output::print_search_hits(&hits, term.as_bytes(), color)?;
    Ok(())
}

fn resolve(symbols: &Path, query: &str, ansi: bool, exact: bool) -> Result<()> {
    let index = SymbolIndex::open(symbols)
        .with_context(|| format!("failed to load {}", symbols.display()))?;
    let resolver = QueryResolver::new(&index);
    let entries = if exact {
        resolver.resolve_exact(query)?
    } else {
        resolver.resolve(query)?
    };
    if entries.is_empty() {
        bail!("nothing matches '{query}'");
    }

    let style = if ansi { Style::Ansi } else { Style::Plain };
    if entries.len() > 1 {
        println!("{} matches:", entries.len());
    }
    for entry in &entries {
        print!("{}", output::render(entry, index.sources(), style)?);
    }
    Ok(())
}
