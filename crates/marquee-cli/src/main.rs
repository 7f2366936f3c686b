//! Marquee CLI: manage banners through the admin API.
//!
//! Set MARQUEE_API_KEY and MARQUEE_API_URL (or API_URL).

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use marquee_cli::api_client::{ApiClient, BannerFields};
use marquee_cli::init_tracing;
use marquee_cli::output::{
    print_active_table, print_banner_detail, print_json, print_listing_table,
};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "marquee", about = "Marquee banner admin CLI")]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload an image as a new banner
    Upload {
        /// Path to the image
        file: PathBuf,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        alt: Option<String>,
        /// First day shown (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<String>,
        /// Last day shown (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<String>,
        /// Override the MIME type guessed from the extension
        #[arg(long)]
        content_type: Option<String>,
    },
    /// List every banner with its status
    List,
    /// Show the banners the storefront currently displays
    Active,
    /// Show a single banner
    Get { id: Uuid },
    /// Change display fields. Omitted flags keep their value; "" clears one.
    Update {
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        alt: Option<String>,
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        end_date: Option<String>,
    },
    /// Delete a banner record (the hosted file is left in place)
    Delete { id: Uuid },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = ApiClient::from_env().context(
        "Failed to create API client. Set MARQUEE_API_KEY and MARQUEE_API_URL (or API_URL)",
    )?;
    tracing::debug!(base_url = client.base_url(), "Using Marquee API");

    let json = matches!(cli.format, OutputFormat::Json);

    match cli.command {
        Commands::Upload {
            file,
            title,
            alt,
            start_date,
            end_date,
            content_type,
        } => {
            let fields = BannerFields {
                title,
                alt,
                start_date,
                end_date,
            };
            let response = client
                .upload_banner(&file, &fields, content_type.as_deref())
                .await?;
            if json {
                print_json(&response)?;
            } else {
                println!("Uploaded banner {}\n{}", response.id, response.url);
            }
        }
        Commands::List => {
            let listing = client.list_banners().await?;
            if json {
                print_json(&listing)?;
            } else {
                print_listing_table(&listing);
            }
        }
        Commands::Active => {
            let feed = client.active_banners().await?;
            if json {
                print_json(&feed)?;
            } else {
                print_active_table(&feed.banners);
            }
        }
        Commands::Get { id } => {
            let banner = client.get_banner(id).await?;
            if json {
                print_json(&banner)?;
            } else {
                print_banner_detail(&banner);
            }
        }
        Commands::Update {
            id,
            title,
            alt,
            start_date,
            end_date,
        } => {
            let current = client.get_banner(id).await?.banner;
            let fields = BannerFields {
                title: title.or(current.title),
                alt: alt.or(current.alt_text),
                start_date: start_date.or(current.start_date.map(|d| d.to_string())),
                end_date: end_date.or(current.end_date.map(|d| d.to_string())),
            };
            let response = client.update_banner(id, &fields).await?;
            if json {
                print_json(&response)?;
            } else {
                println!("Updated banner {}", id);
            }
        }
        Commands::Delete { id } => {
            let response = client.delete_banner(id).await?;
            if json {
                print_json(&response)?;
            } else {
                println!("Deleted banner {}", id);
            }
        }
    }

    Ok(())
}
