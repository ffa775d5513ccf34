use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use bento_gallery::color::{aliases_of, ColorCategory};
use bento_gallery::config::{GalleryConfig, PristineView};
use bento_gallery::detect::{run_detection_batch, SourceFetcher};
use bento_gallery::state::data::load_document;
use bento_gallery::state::filters::{FilterState, SortMode, ViewsRange};
use bento_gallery::state::gallery::Gallery;
use bento_gallery::state::library::ColorCache;
use bento_gallery::ui::render;

/// Search and filter an image gallery document and print the page as HTML
#[derive(Parser, Debug)]
#[command(name = "bento-gallery", version, about)]
struct Args {
    /// Gallery document: a JSON file path or an http(s) URL
    #[arg(env = "BENTO_SOURCE", required_unless_present = "list_colors")]
    source: Option<String>,

    /// Free-text query; "double quotes" mark exact phrases
    #[arg(short, long)]
    query: Option<String>,

    /// Minimum number of views
    #[arg(long)]
    min_views: Option<u64>,

    /// Views preset band such as 1000-10000 or 10000- (overrides --min-views)
    #[arg(long)]
    preset: Option<ViewsRange>,

    /// Only items tagged with this colour (aliases like navy or grey work)
    #[arg(short, long)]
    color: Option<ColorCategory>,

    /// relevance, newest, oldest, views-desc, views-asc, title-asc or title-desc
    #[arg(short, long)]
    sort: Option<SortMode>,

    /// Filter state as JSON; individual flags override its fields
    #[arg(long)]
    filters: Option<String>,

    /// 1-based page to print
    #[arg(short, long, default_value_t = 1)]
    page: usize,

    /// Items per page
    #[arg(long)]
    page_size: Option<usize>,

    /// What an unfiltered gallery shows: prompt or full-list
    #[arg(long)]
    pristine_view: Option<PristineView>,

    /// Skip dominant-colour detection
    #[arg(long)]
    no_detect: bool,

    /// Colour cache database location
    #[arg(long, conflicts_with = "memory_cache")]
    cache: Option<PathBuf>,

    /// Keep the colour cache in memory only
    #[arg(long)]
    memory_cache: bool,

    /// Also print the promoted row
    #[arg(long)]
    promoted: bool,

    /// Print the detail view of one item instead of the grid
    #[arg(long)]
    selected: Option<i64>,

    /// List the colour categories and the aliases each one accepts, then exit
    #[arg(long)]
    list_colors: bool,
}

impl Args {
    /// Flags win over the environment profile
    fn apply(&self, mut config: GalleryConfig) -> GalleryConfig {
        if let Some(page_size) = self.page_size {
            config.page_size = page_size.max(1);
        }
        if let Some(pristine_view) = self.pristine_view {
            config.pristine_view = pristine_view;
        }
        if self.no_detect {
            config.detection.enabled = false;
        }
        if self.memory_cache {
            config.cache_path = None;
        } else if let Some(cache) = &self.cache {
            config.cache_path = Some(cache.clone());
        }
        config
    }

    fn filter_state(&self) -> anyhow::Result<FilterState> {
        let mut filters = match &self.filters {
            Some(json) => FilterState::from_json(json).context("invalid --filters JSON")?,
            None => FilterState::default(),
        };

        if let Some(query) = &self.query {
            filters.query = query.clone();
        }
        if self.min_views.is_some() {
            filters.min_views = self.min_views;
        }
        if self.preset.is_some() {
            filters.preset = self.preset;
        }
        if self.color.is_some() {
            filters.color = self.color;
        }
        if let Some(sort) = self.sort {
            filters.sort = sort;
        }
        Ok(filters)
    }
}

fn print_colors() {
    for category in ColorCategory::ALL {
        let aliases: Vec<&str> = aliases_of(category).collect();
        if aliases.is_empty() {
            println!("{category}");
        } else {
            println!("{category}: {}", aliases.join(", "));
        }
    }
}

fn open_cache(config: &GalleryConfig) -> ColorCache {
    let Some(path) = &config.cache_path else {
        return ColorCache::in_memory();
    };

    ColorCache::open(path).unwrap_or_else(|err| {
        warn!(%err, path = %path.display(), "colour cache unavailable, using memory only");
        ColorCache::in_memory()
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if args.list_colors {
        print_colors();
        return Ok(());
    }
    let source = args.source.as_deref().context("a gallery source is required")?;

    let config = args.apply(GalleryConfig::from_env()?);
    let filters = args.filter_state()?;

    let document = match load_document(source).await {
        Ok(document) => document,
        Err(err) => {
            error!(%err, source = %source, "failed to load gallery");
            println!("{}", render::render_load_error()?);
            return Err(err).context("gallery document could not be loaded");
        }
    };

    let mut gallery = Gallery::new(document.items, &config);
    info!(items = gallery.items().len(), "gallery ready");

    if config.detection.enabled {
        let mut cache = open_cache(&config);
        let fetcher = SourceFetcher::new(document.base);
        let report = run_detection_batch(gallery.items(), &mut cache, &fetcher, &config.detection).await;
        gallery.merge_detected_colors(&report.colors);
    }

    gallery.set_filters(filters);
    gallery.go_to_page(args.page);

    if let Some(id) = args.selected {
        println!("{}", render::render_selected(gallery.selected(id))?);
        return Ok(());
    }

    if args.promoted {
        println!("{}", render::render_promoted(&gallery.promoted())?);
    }
    println!("{}", render::render_gallery(&gallery)?);

    Ok(())
}
