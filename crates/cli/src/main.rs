//! frontend-breadcrumb CLI
//!
//! Renders breadcrumb trails for a site description and one or more view
//! contexts, expands breadcrumb shortcodes in templates and prints the
//! dashboard help panel.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use frontend_breadcrumb_core::integration::{DASHBOARD_PANEL_KEY, DASHBOARD_PANEL_TITLE};
use frontend_breadcrumb_core::output::describe_request;
use frontend_breadcrumb_core::{
    dashboard_panel, expand_shortcodes, format_batch, format_trail, BreadcrumbBuilder,
    BreadcrumbConfig, OutputFormat, PageRequest, SiteIndex, Trail, ViewContext,
};
use rayon::prelude::*;
use serde_json::Value;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Frontend breadcrumb renderer
#[derive(Parser)]
#[command(name = "frontend-breadcrumb")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Render breadcrumb trails for posts, pages, archives, search and 404 views")]
#[command(long_about = r#"
frontend-breadcrumb: Breadcrumb trails for content sites

Reads a site description (posts, terms, taxonomies, post types, authors) and
a resolved view context, and prints the breadcrumb HTML that the
[bcff_display_breadcrumb] shortcode inserts into a page.

View files hold one view context or a list of them. A view may be a bare
context ({"kind": "not_found"}) or a request with pagination
({"view": {"kind": "home"}, "paged": 2}).

Output formats:
  - HTML (default) - The page fragment
  - JSON / YAML - The structured trail
  - ANSI - Colorful terminal output
  - Summary - Plain text path

Examples:
  frontend-breadcrumb render --site site.yaml --view view.json
  frontend-breadcrumb render --site site.yaml --view views.yaml --format summary
  frontend-breadcrumb expand --site site.yaml --view view.json page.html
  frontend-breadcrumb panel
"#)]
pub struct Args {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormatArg::Html, global = true)]
    pub format: OutputFormatArg,

    /// Breadcrumb configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Render the breadcrumb for one or more views
    Render {
        /// Site description (YAML, or JSON by extension)
        #[arg(short, long)]
        site: PathBuf,

        /// View context file, `-` for stdin
        #[arg(long)]
        view: PathBuf,

        /// Page number applied to every view without its own
        #[arg(long)]
        paged: Option<u32>,
    },

    /// Replace breadcrumb shortcodes in a template
    Expand {
        /// Site description (YAML, or JSON by extension)
        #[arg(short, long)]
        site: PathBuf,

        /// View context file, `-` for stdin
        #[arg(long)]
        view: PathBuf,

        /// Page number
        #[arg(long)]
        paged: Option<u32>,

        /// Base URL of the plugin assets; omit to skip asset tags
        #[arg(long)]
        assets_base: Option<url::Url>,

        /// Template file
        template: PathBuf,
    },

    /// Print the dashboard help panel
    Panel,
}

/// Output format argument
#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormatArg {
    Html,
    Json,
    Yaml,
    Ansi,
    Summary,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Html => OutputFormat::Html,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Yaml => OutputFormat::Yaml,
            OutputFormatArg::Ansi => OutputFormat::Ansi,
            OutputFormatArg::Summary => OutputFormat::Summary,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match &args.command {
        Commands::Render { site, view, paged } => run_render(site, view, *paged, &args),
        Commands::Expand {
            site,
            view,
            paged,
            assets_base,
            template,
        } => run_expand(site, view, *paged, assets_base.as_ref(), template, &args),
        Commands::Panel => run_panel(&args),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .init();
}

/// Build the builder from the optional config file
fn build_builder(args: &Args) -> Result<BreadcrumbBuilder> {
    let config = match &args.config {
        Some(path) => BreadcrumbConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => BreadcrumbConfig::default(),
    };
    Ok(BreadcrumbBuilder::new(config))
}

fn load_site(path: &Path) -> Result<SiteIndex> {
    let site = SiteIndex::load(path)
        .with_context(|| format!("Failed to load site {}", path.display()))?;
    info!(
        posts = site.posts().len(),
        terms = site.terms().len(),
        "loaded site description"
    );
    Ok(site)
}

/// Read one request or a list of requests
fn load_requests(path: &Path, paged: Option<u32>) -> Result<Vec<PageRequest>> {
    let source = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read view from stdin")?;
        buf
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read view {}", path.display()))?
    };

    // YAML is a superset of JSON, so one parser covers both
    let value: Value = serde_yaml::from_str(&source).context("Failed to parse view file")?;
    let items = match value {
        Value::Array(items) => items,
        other => vec![other],
    };

    items
        .into_iter()
        .map(|item| {
            let mut request = parse_request(item)?;
            if request.paged.is_none() {
                request.paged = paged;
            }
            Ok(request)
        })
        .collect()
}

/// Accept either a full request or a bare view context
fn parse_request(item: Value) -> Result<PageRequest> {
    if item.get("view").is_some() {
        return serde_json::from_value(item).context("Invalid page request");
    }
    let view: ViewContext = serde_json::from_value(item).context("Invalid view context")?;
    Ok(PageRequest::new(view))
}

/// The one request a template is expanded for
fn single_request(requests: Vec<PageRequest>) -> Result<PageRequest> {
    let count = requests.len();
    let request = requests
        .into_iter()
        .next()
        .context("View file holds no view context")?;
    if count > 1 {
        warn!(
            ignored = count - 1,
            "expand renders one view; using the first and ignoring the rest"
        );
    }
    Ok(request)
}

fn run_render(site: &Path, view: &Path, paged: Option<u32>, args: &Args) -> Result<()> {
    let builder = build_builder(args)?;
    let site = load_site(site)?;
    let requests = load_requests(view, paged)?;

    let trails: Vec<Trail> = requests
        .par_iter()
        .map(|request| {
            debug!(request = %describe_request(request), "rendering");
            builder.build(request, &site)
        })
        .collect();

    let format: OutputFormat = args.format.clone().into();
    let output = if trails.len() == 1 {
        format_trail(&trails[0], &builder, &site, format)?
    } else {
        format_batch(&trails, &builder, &site, format)?
    };

    write_output(&output, args.output.as_ref())
}

fn run_expand(
    site: &Path,
    view: &Path,
    paged: Option<u32>,
    assets_base: Option<&url::Url>,
    template: &Path,
    args: &Args,
) -> Result<()> {
    let builder = build_builder(args)?;
    let site = load_site(site)?;
    let request = single_request(load_requests(view, paged)?)?;

    let source = fs::read_to_string(template)
        .with_context(|| format!("Failed to read template {}", template.display()))?;

    let output = expand_shortcodes(&source, &builder, &request, &site, assets_base);
    write_output(&output, args.output.as_ref())
}

fn run_panel(args: &Args) -> Result<()> {
    let output = format!(
        "<!-- {} -->\n<h2>{}</h2>\n{}",
        DASHBOARD_PANEL_KEY,
        DASHBOARD_PANEL_TITLE,
        dashboard_panel()
    );
    write_output(&output, args.output.as_ref())
}

fn write_output(output: &str, path: Option<&PathBuf>) -> Result<()> {
    if let Some(path) = path {
        fs::write(path, output).context("Failed to write output file")?;
    } else {
        println!("{}", output);
    }
    Ok(())
}
