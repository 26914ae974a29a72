use clap::{ArgAction, Parser, Subcommand};
use commands::{assign, config, delete, list, lookup, merge, options, push};
use std::path::PathBuf;
use wanted_models::{ExternalSource, MediaKind, Service};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "wanted")]
#[command(about = "Wanted - review, push and reconcile the wanted media list")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one page of the wanted list
    #[command(long_about = "Load the full wanted list and show one page of it. Filters combine: free text on the title, media type and category.")]
    List {
        /// Free-text title filter
        #[arg(long)]
        search: Option<String>,

        /// Only movies or only series
        #[arg(long = "type", value_name = "TYPE")]
        media_type: Option<MediaKind>,

        /// Only one category (e.g. anime)
        #[arg(long)]
        category: Option<String>,

        /// Page index, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Rows per page (defaults to ui.page_length)
        #[arg(long)]
        length: Option<usize>,
    },
    /// Send records to Radarr or Sonarr
    #[command(long_about = "Add records to a service, or refresh records the service already has with --update. Several ids are sent as one bulk request; they must all be addable or all be updatable. Root folder and profile default to the configured values.")]
    Push {
        service: Service,

        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,

        /// Update records already present instead of adding them
        #[arg(long, action = ArgAction::SetTrue)]
        update: bool,

        /// Root folder path
        #[arg(long)]
        root: Option<String>,

        /// Quality profile id
        #[arg(long)]
        profile: Option<u32>,

        /// Do not trigger a search after adding
        #[arg(long, action = ArgAction::SetTrue)]
        no_search: bool,

        /// Monitor specials (series only)
        #[arg(long)]
        specials: Option<bool>,

        /// Keep polling until download status of added records is known
        #[arg(long, action = ArgAction::SetTrue)]
        wait: bool,
    },
    /// Delete records from the wanted list
    Delete {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },
    /// Merge duplicate records sharing an external id
    #[command(long_about = "Preview how the given records group by shared external id, then fold every group into its survivor. Records without a match or without the required id are left alone.")]
    Merge {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,

        /// Commit without asking
        #[arg(long, short = 'y', action = ArgAction::SetTrue)]
        yes: bool,
    },
    /// Search a catalog for candidate external ids
    Lookup {
        id: String,

        source: ExternalSource,

        /// Free-text query (defaults to the record title)
        #[arg(long)]
        query: Option<String>,
    },
    /// Assign an external id to a record
    Assign {
        id: String,

        source: ExternalSource,

        external_id: String,

        /// Link to the catalog page (defaults to the catalog's standard URL)
        #[arg(long)]
        link: Option<String>,
    },
    /// Show root folders and quality profiles offered by the services
    Options {
        /// Only one service
        service: Option<Service>,
    },
    /// Show or create the configuration file
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Server URL of the wanted list
        #[arg(long)]
        base_url: Option<String>,

        /// Overwrite an existing file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let output = output::Output::new(cli.output, cli.quiet);

    // Config commands must work before a valid config file exists
    if let Commands::Config { cmd } = &cli.command {
        logging::init_logging(cli.verbose, cli.quiet, None)
            .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
        return config::run_config(cmd, cli.config.as_ref(), &output).await;
    }

    let config = config::load_config(cli.config.as_ref())?;
    logging::init_logging(cli.verbose, cli.quiet, config.logging.as_ref())
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    match cli.command {
        Commands::List {
            search,
            media_type,
            category,
            page,
            length,
        } => {
            let filters = list::ListFilters {
                search,
                media_type,
                category,
                page,
                length,
            };
            list::run_list(&config, filters, &output).await
        }
        Commands::Push {
            service,
            ids,
            update,
            root,
            profile,
            no_search,
            specials,
            wait,
        } => {
            let request = push::PushRequest {
                service,
                ids,
                update,
                root,
                profile,
                search: !no_search,
                specials,
                wait,
            };
            push::run_push(&config, request, &output).await
        }
        Commands::Delete { ids } => delete::run_delete(&config, ids, &output).await,
        Commands::Merge { ids, yes } => merge::run_merge(&config, ids, yes, &output).await,
        Commands::Lookup { id, source, query } => {
            lookup::run_lookup(&config, id, source, query, &output).await
        }
        Commands::Assign {
            id,
            source,
            external_id,
            link,
        } => assign::run_assign(&config, id, source, external_id, link, &output).await,
        Commands::Options { service } => options::run_options(&config, service, &output).await,
        Commands::Config { .. } => Ok(()),
    }
}
