//! CLI entry point for postpress

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "postpress")]
#[command(version)]
#[command(about = "Statically render blog posts from a headless content store", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a page for every published post
    #[command(alias = "g")]
    Generate {
        /// Rewrite pages even when the post did not change
        #[arg(short, long)]
        force: bool,
    },

    /// Start a server that also generates unknown posts on demand
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Skip the initial full generation
        #[arg(long)]
        no_generate: bool,
    },

    /// List the posts that would be generated
    List,

    /// Clean the public folder and build cache
    Clean,

    /// Submit a comment to the moderation endpoint
    Comment {
        /// Id of the post being commented on
        #[arg(long)]
        post_id: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        comment: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "postpress=debug,info"
    } else {
        "postpress=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Generate { force } => {
            let site = postpress::Site::new(&base_dir)?;
            tracing::info!("Generating static files...");
            site.generate(force).await?;
            println!("Generated successfully!");
        }

        Commands::Server {
            port,
            ip,
            no_generate,
        } => {
            let site = postpress::Site::new(&base_dir)?;

            if !no_generate {
                tracing::info!("Generating static files...");
                site.generate(false).await?;
            }

            let builder = Arc::new(site.builder()?);
            let sink = Arc::new(site.comment_sink()?);
            tracing::info!("Starting server at http://{}:{}", ip, port);
            postpress::server::start(builder, sink, &ip, port).await?;
        }

        Commands::List => {
            let site = postpress::Site::new(&base_dir)?;
            postpress::commands::list::run(&site).await?;
        }

        Commands::Clean => {
            let site = postpress::Site::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::Comment {
            post_id,
            name,
            email,
            comment,
        } => {
            let site = postpress::Site::new(&base_dir)?;
            postpress::commands::comment::run(&site, &post_id, &name, &email, &comment).await?;
        }

        Commands::Version => {
            println!("postpress version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
