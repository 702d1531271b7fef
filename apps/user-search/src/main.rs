use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use runtime::{AppConfig, CliArgs};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;

use user_search::{
    contract::{
        client::UserSearchApi,
        model::{SearchOptions, SearchOutcome, User},
    },
    domain::view::available_roles,
    infra::dto::UserDto,
    mask_ssn, ResultView, SearchState, SortOrder, UserSearch, UserSearchConfig,
};

const MODULE_NAME: &str = "user_search";

/// User Search - find people by name or SSN digits
#[derive(Parser)]
#[command(name = "user-search")]
#[command(about = "User Search - find people by name or SSN digits")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Backend base URL (overrides config)
    #[arg(long)]
    api_url: Option<String>,

    /// Ignore any configured backend and search the mock dataset
    #[arg(long, conflicts_with = "api_url")]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one search and print the results
    Search(SearchArgs),
    /// Ask the backend to load its users into memory
    Load,
    /// Read queries from stdin, one per line (default)
    Repl,
    /// Check configuration
    Check,
}

#[derive(Args)]
struct SearchArgs {
    /// Name fragment or SSN digits
    query: String,

    /// Maximum number of results
    #[arg(short, long)]
    limit: Option<usize>,

    /// Sort by age: age-asc or age-desc
    #[arg(short, long, default_value_t = SortOrder::AgeAsc)]
    sort: SortOrder,

    /// Only show users with this role (repeatable)
    #[arg(short, long = "role")]
    roles: Vec<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);
    if cli.mock {
        config.set_module_value(MODULE_NAME, "api_url", "");
    } else if let Some(url) = cli.api_url.as_deref() {
        config.set_module_value(MODULE_NAME, "api_url", url);
    }

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.home_dir));
    tracing::info!("User Search starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let module_config = UserSearchConfig::from_module_value(config.module_config(MODULE_NAME))?;
    let search = UserSearch::from_config(module_config)?;

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Search(args) => run_search(&search, args).await,
        Commands::Load => run_load(&search).await,
        Commands::Repl => run_repl(&search).await,
        Commands::Check => check_config(&config, &search),
    }
}

async fn run_search(search: &UserSearch, args: SearchArgs) -> Result<()> {
    let trigger = search.trigger();
    let Some(query) = trigger.accept(&args.query) else {
        println!("Type at least {} characters to search", trigger.min_len());
        return Ok(());
    };

    let opts = args.limit.map(SearchOptions::with_limit).unwrap_or_default();
    let coordinator = search.coordinator();
    match coordinator.perform_search(&query, opts).await {
        SearchOutcome::Committed(_) => {}
        SearchOutcome::Failed(message) => bail!("Search failed: {message}"),
        SearchOutcome::Cleared | SearchOutcome::Stale => return Ok(()),
    }

    let mut view = ResultView::new(args.sort);
    view.select_roles(args.roles);
    let state = coordinator.snapshot();
    if args.json {
        println!("{}", render_json(&state, &view)?);
    } else {
        print_state(&state, &view);
    }
    Ok(())
}

async fn run_load(search: &UserSearch) -> Result<()> {
    if !search.has_backend() {
        println!("No backend configured, nothing to load");
        return Ok(());
    }
    search.api().load().await?;
    println!("Users loaded into memory");
    Ok(())
}

/// Each stdin line is one edit of the search box: it passes the entry gate,
/// then the debouncer, then the coordinator. A printer task renders every
/// settled state it observes.
async fn run_repl(search: &UserSearch) -> Result<()> {
    let coordinator = search.coordinator();
    let trigger = search.trigger();
    let debouncer = search.debouncer();

    let mut states = coordinator.subscribe();
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
    let printer = tokio::spawn(async move {
        let view = ResultView::default();
        loop {
            tokio::select! {
                biased;
                changed = states.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let state = states.borrow_and_update().clone();
                    if state.loading {
                        println!("Searching for \"{}\"...", state.query);
                    } else if !state.query.is_empty() {
                        print_state(&state, &view);
                    }
                }
                _ = &mut stop_rx => break,
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let query = match trigger.accept(&line) {
            Some(query) => query,
            // an emptied box resets the results
            None if line.trim().is_empty() => String::new(),
            None => {
                println!("Type at least {} characters to search", trigger.min_len());
                continue;
            }
        };
        let coordinator = Arc::clone(&coordinator);
        debouncer.call(async move {
            coordinator
                .perform_search(&query, SearchOptions::default())
                .await;
        });
    }

    debouncer.settle().await;
    let _ = stop_tx.send(());
    printer.await?;
    Ok(())
}

fn check_config(config: &AppConfig, search: &UserSearch) -> Result<()> {
    tracing::info!("Checking configuration...");

    println!("Configuration check passed");
    match search.config().backend_url() {
        Some(url) => println!("Backend: {url}"),
        None => println!("Backend: none (mock mode)"),
    }
    println!("{}", config.to_yaml()?);
    Ok(())
}

fn print_state(state: &SearchState, view: &ResultView) {
    let shown = view.apply(&state.users);
    println!(
        "{} result(s) for \"{}\" (total {})",
        shown.len(),
        state.query,
        state.total
    );

    let roles = available_roles(&state.users);
    if !roles.is_empty() {
        println!("Roles: {}", roles.join(", "));
    }
    if shown.is_empty() {
        println!("No users found");
    }
    for user in shown {
        println!("{}", format_user(user));
    }
    if let Some(error) = &state.error {
        println!("Error: {error}");
    }
}

fn format_user(user: &User) -> String {
    let age = user.age.map_or_else(|| "-".to_string(), |a| a.to_string());
    let role = user.role.as_deref().unwrap_or("-");
    let company = user
        .company
        .as_ref()
        .and_then(|c| c.name.as_deref())
        .unwrap_or("-");
    format!(
        "{:>6}  {:<28} {:>3}  {:<10} {:<11}  {}",
        user.id.to_string(),
        user.full_name(),
        age,
        role,
        mask_ssn(user.ssn.as_deref()),
        company
    )
}

fn render_json(state: &SearchState, view: &ResultView) -> Result<String> {
    let users: Vec<UserDto> = view
        .apply(&state.users)
        .into_iter()
        .map(|user| {
            let mut dto = UserDto::from(user);
            dto.ssn = user.ssn.as_deref().map(|ssn| mask_ssn(Some(ssn)));
            dto
        })
        .collect();

    let out = serde_json::json!({
        "query": state.query,
        "total": state.total,
        "sort": view.sort().as_str(),
        "roles": available_roles(&state.users),
        "users": users,
    });
    Ok(serde_json::to_string_pretty(&out)?)
}
