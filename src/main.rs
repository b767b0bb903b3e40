use clap::{Parser, Subcommand};
use habitare::config::{self, SiteConfig};
use habitare::server::{self, open_store};
use habitare::store::seed;
use habitare::{output, pwa};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "habitare")]
#[command(about = "Editorial magazine with shoppable product pins")]
#[command(long_about = "\
Editorial magazine with shoppable product pins

Serves the public magazine, the editorial back-office under /admin and a
key-protected read API under /api, all from one SQLite file.

Configuration is layered, later layers winning:

  stock defaults
  habitare.toml                 # or --config <path>
  environment / .env            # PORT, DATABASE_PATH, API_KEY, ...

Run 'habitare gen-config' to print a documented habitare.toml.")]
#[command(version = pwa::BUILD_VERSION)]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the web server (default)
    Serve,
    /// Create the database and its tables
    InitDb,
    /// Load demo articles, sections and pins into an empty database
    Seed,
    /// List articles with their pin counts
    List,
    /// Print a stock habitare.toml with all options documented
    GenConfig,
}

fn load(cli: &Cli) -> Result<SiteConfig, config::ConfigError> {
    config::load_config(&cli.config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command.as_ref().unwrap_or(&Command::Serve) {
        Command::Serve => {
            server::init_logging();
            server::serve(load(&cli)?).await?;
        }
        Command::InitDb => {
            server::init_logging();
            let config = load(&cli)?;
            let store = open_store(&config.paths.database).await?;
            store.close().await;
            println!("Database ready: {}", config.paths.database.display());
        }
        Command::Seed => {
            server::init_logging();
            let config = load(&cli)?;
            let store = open_store(&config.paths.database).await?;
            let report = seed::seed(&store).await?;
            store.close().await;
            output::print_seed_report(report.as_ref());
        }
        Command::List => {
            let config = load(&cli)?;
            let store = open_store(&config.paths.database).await?;
            let articles = store.list_articles().await?;
            let pins = store.pins_by_article().await?;
            store.close().await;
            let rows: Vec<_> = articles
                .into_iter()
                .map(|article| {
                    let count = pins.get(&article.id).map_or(0, Vec::len);
                    (article, count)
                })
                .collect();
            output::print_inventory(&rows);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
