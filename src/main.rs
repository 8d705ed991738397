use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use stagebill::db::{SearchFilters, ShowUpdate, SortBy, Store};
use stagebill::types::{NewShow, SeenStatus};
use stagebill::{catalog, config, export, generate, llm, output, scan};
use std::path::{Path, PathBuf};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "stagebill")]
#[command(about = "Track Broadway shows with LLM-assisted metadata")]
#[command(long_about = "\
Track Broadway shows with LLM-assisted metadata

Shows enter the catalog by hand or from photographed playbills, get
enriched with cast/creative/awards metadata from an LLM provider, and are
published as a browsable static site.

Workflow:

  stagebill add --name \"Hadestown\" --theater \"Walter Kerr Theatre\" --seen
  stagebill scan                 # ingest new playbill photos
  stagebill enrich 3             # fill in metadata for show #3
  stagebill generate             # publish the static site

Data layout:

  stagebill.toml                 # Config (run 'stagebill gen-config')
  shows.db                       # SQLite catalog
  shows_seen/                    # Playbill photos of shows attended
  shows_wishlist/                # Playbill photos of shows to see
  site/                          # Generated static site
  site/.stagebill-state.json     # Digest of the last published snapshot

'generate' skips all work when the catalog hasn't changed since the last
run; pass --force to re-render regardless.")]
#[command(version = version_string())]
struct Cli {
    /// Config file
    #[arg(long, default_value = "stagebill.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a show by hand
    Add(AddArgs),
    /// List shows
    List(ListArgs),
    /// Search shows with filters
    Search(SearchArgs),
    /// Show full details for one show
    Show { id: i64 },
    /// Update fields on a show
    Update(UpdateArgs),
    /// Fetch metadata for a show from the LLM provider
    Enrich {
        id: i64,
        /// Re-fetch all fields, overwriting existing data
        #[arg(long)]
        force: bool,
    },
    /// Scan playbill photo directories for new shows
    Scan {
        /// Which directory to scan
        #[arg(long, value_enum, default_value_t = ScanTarget::All)]
        directory: ScanTarget,
    },
    /// Export the catalog to a file
    Export {
        #[arg(long, value_enum)]
        format: ExportFormat,
        /// Output file path
        #[arg(long)]
        output: PathBuf,
    },
    /// Manage predefined user categories
    #[command(subcommand)]
    Categories(CategoriesCommand),
    /// Regenerate the static site (no-op if the catalog is unchanged)
    Generate {
        /// Re-render even if nothing changed
        #[arg(long)]
        force: bool,
    },
    /// Print a stock stagebill.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct AddArgs {
    /// Show name
    #[arg(long)]
    name: String,
    /// Theater name
    #[arg(long)]
    theater: String,
    /// Mark as seen
    #[arg(long, conflicts_with = "wishlist")]
    seen: bool,
    /// Mark as wishlist (the default)
    #[arg(long)]
    wishlist: bool,
    /// Date attended (YYYY-MM-DD)
    #[arg(long)]
    date_attended: Option<String>,
    /// Rating (1-10)
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..=10))]
    rating: Option<i64>,
    /// Personal notes
    #[arg(long)]
    notes: Option<String>,
}

#[derive(clap::Args)]
struct ListArgs {
    /// Show only seen shows
    #[arg(long, conflicts_with = "wishlist")]
    seen: bool,
    /// Show only wishlist shows
    #[arg(long)]
    wishlist: bool,
    /// Sort order
    #[arg(long, value_enum, default_value_t = SortField::Date)]
    sort_by: SortField,
}

#[derive(clap::Args)]
struct SearchArgs {
    /// Filter by show name (partial match)
    #[arg(long)]
    name: Option<String>,
    /// Filter by theater (partial match)
    #[arg(long)]
    theater: Option<String>,
    /// Show only seen shows
    #[arg(long, conflicts_with = "wishlist")]
    seen: bool,
    /// Show only wishlist shows
    #[arg(long)]
    wishlist: bool,
    /// Filter by genre
    #[arg(long)]
    genre: Option<String>,
    /// Filter by LLM category
    #[arg(long)]
    category: Option<String>,
    /// Filter by user category
    #[arg(long)]
    user_category: Option<String>,
    /// Minimum rating
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..=10))]
    rating_min: Option<i64>,
    /// Maximum rating
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..=10))]
    rating_max: Option<i64>,
}

#[derive(clap::Args)]
struct UpdateArgs {
    id: i64,
    /// Update rating (1-10)
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..=10))]
    rating: Option<i64>,
    /// Update personal notes
    #[arg(long)]
    notes: Option<String>,
    /// Update date attended (YYYY-MM-DD)
    #[arg(long)]
    date_attended: Option<String>,
    /// Mark as seen
    #[arg(long, conflicts_with = "wishlist")]
    seen: bool,
    /// Mark as wishlist
    #[arg(long)]
    wishlist: bool,
}

#[derive(Subcommand)]
enum CategoriesCommand {
    /// List predefined user categories
    List,
    /// Add a predefined user category
    Add { category: String },
    /// Remove a predefined user category
    Remove { category: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum ScanTarget {
    Seen,
    Wishlist,
    All,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortField {
    Name,
    Theater,
    Rating,
    Date,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = config::Config::load(&cli.config)?;
    let db_path = Path::new(&config.database.path);

    match cli.command {
        Command::Add(args) => {
            let store = Store::open(db_path)?;
            // A missing API key only downgrades add: the show is stored,
            // enrichment just doesn't happen.
            let provider = llm::provider_from_config(&config.llm).ok();
            let catalog = catalog::Catalog::new(
                &store,
                provider.as_deref(),
                &config.settings,
            );

            let status = status_filter(args.seen, args.wishlist).unwrap_or(SeenStatus::Wishlist);
            let new = NewShow {
                show_name: args.name,
                theater_name: args.theater,
                seen_status: Some(status),
                date_attended: parse_date(args.date_attended.as_deref())?,
                rating: args.rating,
                personal_notes: args.notes,
                source_image_path: None,
            };
            match catalog.add_show(&new)? {
                catalog::AddOutcome::Added(id) => {
                    println!("Added show #{}", id);
                }
                catalog::AddOutcome::Duplicate(id) => {
                    println!("Already in the catalog as show #{}", id);
                }
            }
        }

        Command::List(args) => {
            let store = Store::open(db_path)?;
            let filters = SearchFilters {
                seen_status: status_filter(args.seen, args.wishlist),
                sort: match args.sort_by {
                    SortField::Name => SortBy::Name,
                    SortField::Theater => SortBy::Theater,
                    SortField::Rating => SortBy::Rating,
                    SortField::Date => SortBy::DateAdded,
                },
                ..Default::default()
            };
            let shows = store.search_shows(&filters)?;
            if shows.is_empty() {
                println!("No shows in the catalog.");
            } else {
                println!("{} show(s):\n", shows.len());
                for show in &shows {
                    output::print_lines(&output::format_show(show));
                    println!();
                }
            }
        }

        Command::Search(args) => {
            let store = Store::open(db_path)?;
            let filters = SearchFilters {
                show_name: args.name,
                theater_name: args.theater,
                seen_status: status_filter(args.seen, args.wishlist),
                genre: args.genre,
                category: args.category,
                user_category: args.user_category,
                rating_min: args.rating_min,
                rating_max: args.rating_max,
                ..Default::default()
            };
            let shows = store.search_shows(&filters)?;
            if shows.is_empty() {
                println!("No shows found matching the criteria.");
            } else {
                println!("Found {} show(s):\n", shows.len());
                for show in &shows {
                    output::print_lines(&output::format_show(show));
                    println!();
                }
            }
        }

        Command::Show { id } => {
            let store = Store::open(db_path)?;
            match store.get_show(id)? {
                Some(show) => output::print_lines(&output::format_show_detailed(&show)),
                None => return Err(format!("show not found: {}", id).into()),
            }
        }

        Command::Update(args) => {
            let store = Store::open(db_path)?;
            let catalog = catalog::Catalog::new(&store, None, &config.settings);
            let update = ShowUpdate {
                rating: args.rating,
                personal_notes: args.notes,
                date_attended: parse_date(args.date_attended.as_deref())?,
                seen_status: status_filter(args.seen, args.wishlist),
                ..Default::default()
            };
            if update.is_empty() {
                println!("No updates specified.");
            } else {
                catalog.update_show(args.id, &update)?;
                println!("Updated show #{}", args.id);
            }
        }

        Command::Enrich { id, force } => {
            let store = Store::open(db_path)?;
            let provider = llm::provider_from_config(&config.llm)?;
            let catalog =
                catalog::Catalog::new(&store, Some(provider.as_ref()), &config.settings);

            if force {
                println!("Re-fetching all metadata fields...");
            } else {
                println!("Fetching missing metadata fields...");
            }
            let show = catalog.enrich_show(id, force)?;
            output::print_lines(&output::format_show_detailed(&show));
        }

        Command::Scan { directory } => {
            let store = Store::open(db_path)?;
            let provider = llm::provider_from_config(&config.llm)?;
            let catalog =
                catalog::Catalog::new(&store, Some(provider.as_ref()), &config.settings);

            let mut targets: Vec<(&str, SeenStatus)> = Vec::new();
            if matches!(directory, ScanTarget::Seen | ScanTarget::All) {
                targets.push((&config.directories.shows_seen, SeenStatus::Seen));
            }
            if matches!(directory, ScanTarget::Wishlist | ScanTarget::All) {
                targets.push((&config.directories.shows_wishlist, SeenStatus::Wishlist));
            }

            let mut report = scan::ScanReport::default();
            for (dir, status) in targets {
                println!("Scanning {}", dir);
                let partial = scan::scan_directory(
                    Path::new(dir),
                    status,
                    &config.settings.image_extensions,
                    &store,
                    &catalog,
                    provider.as_ref(),
                )?;
                report.merge(&partial);
            }
            output::print_lines(&output::format_scan_report(&report));
        }

        Command::Export { format, output: path } => {
            let store = Store::open_existing(db_path)?;
            let shows = store.fetch_all_shows()?;
            match format {
                ExportFormat::Json => export::write_json(&shows, &path)?,
                ExportFormat::Csv => export::write_csv(&shows, &path)?,
            }
            println!("Exported {} show(s) to {}", shows.len(), path.display());
        }

        Command::Categories(command) => {
            run_categories(command, config, &cli.config)?;
        }

        Command::Generate { force } => {
            let store = Store::open_existing(db_path)?;
            let shows = store.fetch_all_shows()?;
            let mut opts = generate::RenderOptions::new(&config.site.output_dir);
            opts.force = force;
            let outcome = generate::generate(&shows, &opts)?;
            output::print_lines(&output::format_generate_outcome(&outcome));
        }

        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn run_categories(
    command: CategoriesCommand,
    mut config: config::Config,
    config_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        CategoriesCommand::List => {
            if config.settings.user_categories.is_empty() {
                println!("No user categories defined.");
            } else {
                println!("Predefined user categories:");
                for (i, category) in config.settings.user_categories.iter().enumerate() {
                    println!("  {}. {}", i + 1, category);
                }
            }
        }
        CategoriesCommand::Add { category } => {
            let category = category.trim().to_lowercase();
            if category.is_empty() {
                return Err("category name cannot be empty".into());
            }
            if config.settings.user_categories.contains(&category) {
                println!("Category {:?} already exists.", category);
            } else {
                config.settings.user_categories.push(category.clone());
                config.save(config_path)?;
                println!("Added category: {}", category);
            }
        }
        CategoriesCommand::Remove { category } => {
            let category = category.trim().to_lowercase();
            let before = config.settings.user_categories.len();
            config.settings.user_categories.retain(|c| c != &category);
            if config.settings.user_categories.len() == before {
                println!("Category {:?} not found.", category);
            } else {
                config.save(config_path)?;
                println!("Removed category: {}", category);
            }
        }
    }
    Ok(())
}

fn status_filter(seen: bool, wishlist: bool) -> Option<SeenStatus> {
    if seen {
        Some(SeenStatus::Seen)
    } else if wishlist {
        Some(SeenStatus::Wishlist)
    } else {
        None
    }
}

fn parse_date(input: Option<&str>) -> Result<Option<NaiveDate>, Box<dyn std::error::Error>> {
    match input {
        None => Ok(None),
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| format!("invalid date {:?}, expected YYYY-MM-DD", text).into()),
    }
}
