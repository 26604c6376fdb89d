use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use binder::config::DEFAULT_CONFIG_FILE;
use binder::{
    Binder, BinderConfig, DataSource, DirSource, FileThemeStore, HttpSource, Page, SiteBuilder,
    StaticThemeStore, ThemeStore, load_config, validate_config,
};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "binder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Log at debug level regardless of BINDER_LOG
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Bind every HTML page under the site root and write it to the output directory
    Build {
        #[command(flatten)]
        site: SiteArgs,
        /// Output directory
        #[arg(long)]
        out: Option<PathBuf>,
        /// News year tab to activate on every page
        #[arg(long)]
        news_year: Option<String>,
    },
    /// Bind one page and print it
    Render {
        /// Page path relative to the site root
        page: String,
        #[command(flatten)]
        site: SiteArgs,
    },
    /// List the sections a page supports and the data each would fetch
    Sections {
        /// Page path relative to the site root
        page: String,
        #[command(flatten)]
        site: SiteArgs,
    },
    /// Bind one page with a news year tab activated
    Activate {
        /// Page path relative to the site root
        page: String,
        /// Year to activate
        year: String,
        /// Write here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        #[command(flatten)]
        site: SiteArgs,
    },
}

/// Options shared by every command; they override the config file.
#[derive(Args, Debug, Clone, Default)]
struct SiteArgs {
    /// Configuration file (default: ./binder.yaml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Site root directory
    #[arg(long)]
    root: Option<PathBuf>,
    /// Fetch data files over HTTP from this base URL
    #[arg(long)]
    base_url: Option<String>,
    /// Prefix in front of data/ for every page
    #[arg(long)]
    prefix: Option<String>,
    /// Theme preference: dark or light
    #[arg(long)]
    theme: Option<String>,
    /// JSON key/value store holding the theme preference
    #[arg(long, conflicts_with = "theme")]
    theme_file: Option<PathBuf>,
}

impl SiteArgs {
    fn load(&self) -> Result<BinderConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => load_config(DEFAULT_CONFIG_FILE)?,
            None => BinderConfig::default(),
        };

        if let Some(root) = &self.root {
            config.site.root = root.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.data.base_url = Some(base_url.clone());
        }
        if let Some(prefix) = &self.prefix {
            config.data.prefix = Some(prefix.clone());
        }
        if let Some(theme) = &self.theme {
            config.theme = Some(theme.clone());
        }

        validate_config(&config)?;
        Ok(config)
    }

    fn theme_store(&self, config: &BinderConfig) -> Arc<dyn ThemeStore> {
        match &self.theme_file {
            Some(path) => Arc::new(FileThemeStore::new(path)),
            None => Arc::new(StaticThemeStore::new(config.theme.clone())),
        }
    }

    fn builder(&self, config: &BinderConfig, active_year: Option<String>) -> Result<SiteBuilder> {
        let source: Arc<dyn DataSource> = match &config.data.base_url {
            Some(base) => Arc::new(HttpSource::new(base).context("Failed to create HTTP data source")?),
            None => Arc::new(DirSource::new(&config.site.root)),
        };
        let binder = Binder::new(source)
            .with_resolver(config.path_resolver())
            .with_theme(self.theme_store(config))
            .with_active_year(active_year);
        Ok(SiteBuilder::new(binder, &config.site.root))
    }
}

async fn build_command(site: &SiteArgs, out: Option<&Path>, news_year: Option<&str>) -> Result<()> {
    let mut config = site.load()?;
    if let Some(year) = news_year {
        config.news.active_year = Some(year.to_string());
    }
    let output = out.map(Path::to_path_buf).unwrap_or_else(|| config.site.output.clone());

    let builder = site.builder(&config, config.news.active_year.clone())?;
    let reports = builder.build(&output).await?;

    for report in &reports {
        println!("{report}");
    }
    println!("{} pages written to {}", reports.len(), output.display());
    Ok(())
}

async fn render_command(page: &str, site: &SiteArgs) -> Result<()> {
    let config = site.load()?;
    let builder = site.builder(&config, config.news.active_year.clone())?;
    let (html, report) = builder.bind_page(page).await?;
    print!("{}", html.as_str());
    eprintln!("{report}");
    Ok(())
}

async fn sections_command(page: &str, site: &SiteArgs) -> Result<()> {
    let config = site.load()?;
    let file = config.site.root.join(page);
    let source = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read page: {}", file.display()))?;
    let html = binder::HtmlPage::parse(source).with_context(|| format!("Failed to parse page: {}", file.display()))?;

    let resolver = config.path_resolver();
    let supported = binder::sections::supported_sections(&html)?;
    if supported.is_empty() {
        println!("{page}: no sections");
    }
    for section in supported {
        match resolver.resolve(page, section.data_file()) {
            Ok(path) => println!("{section}\t{path}"),
            Err(e) => println!("{section}\t({e})"),
        }
    }
    if html.exists(&binder::Selector::parse(binder::render::news::TABS)?) {
        let years = binder::TabController::years(&html)?;
        println!("news tabs: {}", years.join(" "));
    }
    Ok(())
}

async fn activate_command(page: &str, year: &str, out: Option<&Path>, site: &SiteArgs) -> Result<()> {
    let config = site.load()?;
    let builder = site.builder(&config, Some(year.to_string()))?;
    let (html, report) = builder.bind_page(page).await?;

    if report.activated_year != Some(true) {
        eprintln!("Warning: no news list for year {year} on {page}");
    }
    match out {
        Some(out) => std::fs::write(out, html.as_str())
            .with_context(|| format!("Failed to write page: {}", out.display()))?,
        None => print!("{}", html.as_str()),
    }
    eprintln!("{report}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        diagnostics::init_with_level(emit::Level::Debug);
    } else {
        diagnostics::init_diagnostics();
    }

    match &cli.command {
        Commands::Build { site, out, news_year } => {
            build_command(site, out.as_deref(), news_year.as_deref()).await
        }
        Commands::Render { page, site } => render_command(page, site).await,
        Commands::Sections { page, site } => sections_command(page, site).await,
        Commands::Activate { page, year, out, site } => {
            activate_command(page, year, out.as_deref(), site).await
        }
    }
}
