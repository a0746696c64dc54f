mod run;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "advisr")]
#[command(about = "Places directory map orchestrator")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve a position and aggregate nearby places for every category
    Nearby {
        /// Device latitude; without a position the default centre is used
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,
    },
    /// Keyword search across the directory and the places service
    Search {
        #[arg(long, default_value = "")]
        location: String,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long, default_value = "")]
        keywords: String,
        /// Map centre used to bias the external search
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,
    },
    /// List active directory categories
    Categories,
    /// Submit a new directory location
    AddLocation {
        #[arg(long)]
        name: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: String,
        #[arg(long, allow_hyphen_values = true)]
        lng: String,
        #[arg(long)]
        category_id: Option<String>,
        #[arg(long, default_value = "")]
        keywords: String,
    },
    /// Submit a new directory category
    AddCategory {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        icon: String,
    },
    /// Print the search results page path for a query
    SearchUrl {
        #[arg(long, default_value = "")]
        location: String,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long, default_value = "")]
        keywords: String,
    },
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("advisr: pass a subcommand, see --help");
        return Ok(());
    };

    // Needs neither configuration nor network.
    if let Commands::SearchUrl {
        location,
        category,
        keywords,
    } = &command
    {
        println!("{}", run::search_url(location, category, keywords));
        return Ok(());
    }

    let config = advisr_core::load_app_config()?;
    init_tracing(&config.log_level)?;
    tracing::debug!(env = %config.env, api = %config.api_base_url, "configuration loaded");

    let position = match &command {
        Commands::Nearby { lat, lng } | Commands::Search { lat, lng, .. } => run::point(*lat, *lng),
        _ => None,
    };
    let app = run::App::build(&config, position)?;
    match command {
        Commands::Nearby { .. } => app.nearby().await?,
        Commands::Search {
            location,
            category,
            keywords,
            ..
        } => {
            let query = advisr_core::SearchQuery::new(&location, &category, &keywords);
            app.search(&query).await?;
        }
        Commands::Categories => app.categories().await?,
        Commands::AddLocation {
            name,
            lat,
            lng,
            category_id,
            keywords,
        } => {
            let form = advisr_core::LocationForm {
                name,
                category_id: category_id.unwrap_or_default(),
                latitude: lat,
                longitude: lng,
                keywords,
            };
            app.add_location(&form).await?;
        }
        Commands::AddCategory { name, icon } => {
            app.add_category(&advisr_core::CategoryForm { name, icon })
                .await?;
        }
        Commands::SearchUrl { .. } => {}
    }

    Ok(())
}
