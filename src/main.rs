use anyhow::Result;
use clap::Parser;
use piton::commands::{self, Config};
use std::path::PathBuf;

/// piton - Python package manager
///
/// Track dependencies in package.json and install them into a
/// project-local python_modules/ directory with pip.
///
/// Examples:
///   piton init                # Create package.json
///   piton install requests -s # Install the latest requests and save it
///   piton install             # Install everything package.json declares
#[derive(Parser, Debug)]
#[command(author, version = env!("PITON_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project directory (defaults to the current directory; also via PITON_ROOT)
    #[arg(long = "root", env = "PITON_ROOT", value_name = "PATH", global = true)]
    pub root: Option<PathBuf>,

    /// Package index URL (defaults to https://pypi.org)
    #[arg(
        long = "index-url",
        env = "PITON_INDEX_URL",
        value_name = "URL",
        global = true
    )]
    pub index_url: Option<String>,

    /// Python interpreter used to run pip (defaults to python3)
    #[arg(
        long = "python",
        env = "PITON_PYTHON",
        value_name = "PROGRAM",
        global = true
    )]
    pub python: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Create package.json with empty dependency sections
    Init,

    /// Install a package, or every missing dependency when no name is given
    Install(InstallArgs),

    /// Remove an installed package
    Remove(RemoveArgs),

    /// Show the dependency tree and unwanted packages
    List,

    /// Show dependencies that are missing or behind
    Outdated,

    /// Remove packages no dependency needs
    Prune,
}

#[derive(clap::Args, Debug)]
pub struct InstallArgs {
    /// Package name
    #[arg(value_name = "NAME")]
    pub name: Option<String>,

    /// Record the installed version in package.json
    #[arg(short, long)]
    pub save: bool,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Package name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Remove the package from package.json too
    #[arg(short, long)]
    pub save: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = piton::runtime::RealRuntime;
    let config = Config::load(&runtime, cli.root, cli.index_url, cli.python)?;

    match cli.command {
        Commands::Init => commands::init(runtime, config)?,
        Commands::Install(args) => {
            commands::install(runtime, args.name.as_deref(), args.save, config).await?
        }
        Commands::Remove(args) => commands::remove(runtime, &args.name, args.save, config)?,
        Commands::List => commands::list(runtime, config)?,
        Commands::Outdated => commands::outdated(runtime, config).await?,
        Commands::Prune => commands::prune(runtime, config)?,
    }
    Ok(())
}
