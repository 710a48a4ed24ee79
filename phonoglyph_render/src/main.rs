// phonoglyph: CLI entry point.
//
// Renders a plain-text corpus as phonetic glyphs. The pipeline: ensure the
// lexicon cache exists (building it from the syllabified lexicon and the
// phone score table on first run) -> structure the corpus against the cache
// -> lay out glyphs -> write SVG to stdout. Diagnostics go to stderr through
// `env_logger`, so stdout carries only the document.
//
// Usage:
//   cargo run -p phonoglyph_render -- [--corpus PATH] [--cache PATH]
//     [--lexicon PATH] [--scores PATH] [--config PATH] [--style arcs|polycloud]
//     [--score-grid] [--rebuild] [--sketch] [-v]
//
// `--sketch` skips the lexicon entirely and draws the bulge-curve study grid.

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use phonoglyph_lexicon::{LexiconCache, LexiconSources, ScoreGrid, StructuredCorpus, structure_corpus};
use phonoglyph_render::{
    GlyphStyle, LayoutConfig, RenderError, SvgSurface, render_corpus, render_sketch,
};

#[derive(Parser, Debug)]
#[command(name = "phonoglyph", about = "Draws a corpus as phonetic glyphs in SVG")]
struct Args {
    /// Plain-text corpus, one verse per line.
    #[arg(long, default_value = "corpus.txt")]
    corpus: PathBuf,

    /// Lexicon cache file; built on first run if missing.
    #[arg(long, default_value = "lexicon_cache.json")]
    cache: PathBuf,

    /// Syllabified pronunciation lexicon used to build the cache.
    #[arg(long, default_value = "cmudict.rep")]
    lexicon: PathBuf,

    /// `SYMBOL,SCORE` phone table. Defaults to the built-in roundness table.
    #[arg(long)]
    scores: Option<PathBuf>,

    /// JSON layout overrides.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Glyph style: arcs or polycloud.
    #[arg(long, default_value = "arcs")]
    style: GlyphStyle,

    /// Write the justified phone score grid as CSV instead of SVG.
    #[arg(long)]
    score_grid: bool,

    /// Delete an existing cache before building.
    #[arg(long)]
    rebuild: bool,

    /// Draw the bulge-curve sketch instead of a corpus.
    #[arg(long)]
    sketch: bool,

    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
}

/// Every file the corpus pipeline touches.
#[derive(Debug, Clone)]
struct PipelinePaths {
    corpus: PathBuf,
    cache: PathBuf,
    sources: LexiconSources,
}

impl From<&Args> for PipelinePaths {
    fn from(args: &Args) -> Self {
        PipelinePaths {
            corpus: args.corpus.clone(),
            cache: args.cache.clone(),
            sources: LexiconSources {
                lexicon: args.lexicon.clone(),
                scores: args.scores.clone(),
            },
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), RenderError> {
    let config = match &args.config {
        Some(path) => LayoutConfig::load(path)?,
        None => LayoutConfig::default(),
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if args.sketch {
        let mut surface = SvgSurface::new(&mut out, config.page_width, config.page_height);
        render_sketch(&mut surface, &config)?;
        surface.finish()?;
        out.flush()?;
        return Ok(());
    }

    let paths = PipelinePaths::from(args);
    let corpus = load_corpus(&paths, args.rebuild)?;

    if args.score_grid {
        let grid = ScoreGrid::from_corpus(&corpus)?;
        log::info!("score grid: {} rows x {} columns", grid.row_count(), grid.col_count());
        out.write_all(grid.to_csv().as_bytes())?;
    } else {
        let mut surface = SvgSurface::new(&mut out, config.page_width, config.page_height);
        render_corpus(&corpus, &mut surface, &config, args.style)?;
        surface.finish()?;
    }
    out.flush()?;
    Ok(())
}

/// Open (or build) the cache and structure the corpus against it.
fn load_corpus(paths: &PipelinePaths, rebuild: bool) -> Result<StructuredCorpus, RenderError> {
    if rebuild {
        remove_cache(&paths.cache)?;
    }
    let cache = LexiconCache::ensure_built(&paths.sources, &paths.cache)?;
    let text = std::fs::read_to_string(&paths.corpus)?;
    let corpus = structure_corpus(&text, &cache);
    if !corpus.unresolved().is_empty() {
        log::warn!(
            "{} corpus words were not in the lexicon",
            corpus.unresolved().len()
        );
    }
    Ok(corpus)
}

fn remove_cache(path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            log::info!("removed existing cache {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
