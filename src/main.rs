mod catalog;
mod commands;
mod config;
mod diagnostics;
mod edit_url;
mod error;
mod nav;
mod normalize;
mod repo_root;
mod report;
mod target;
mod types;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

/// Command-line arguments.
#[derive(Parser)]
#[command(
    name = "editlink",
    version,
    about = "Resolve \"edit this page\" links for documentation assembled from many repositories"
)]
struct Cli {
    /// The subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[allow(clippy::arbitrary_source_item_ordering, reason = "positional arguments keep command-line order")]
#[derive(Subcommand)]
enum Commands {
    /// Attach edit URLs to every page of a content catalog
    Apply {
        /// JSON array of pages exported from the site build
        catalog: PathBuf,
        /// Write the updated catalog here instead of in place
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Generate the navigation file for the synthesized component tree
    Nav {
        /// Directory holding one subdirectory per component
        #[arg(long)]
        components_dir: Option<PathBuf>,
        /// Directory the navigation file is written to
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Print the edit URL for a remote, ref and path
    Url {
        /// Remote URL, e.g. https://github.com/trento-project/web.git
        remote: String,
        /// Branch or tag to edit against
        #[arg(value_name = "REF")]
        git_ref: String,
        /// Path of the file inside the repository
        path: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Apply { catalog, output } => {
            commands::apply(&catalog, output.as_deref()).map(|()| return ExitCode::SUCCESS)
        },
        Commands::Nav { components_dir, output_dir } => {
            commands::nav(components_dir, output_dir).map(|()| return ExitCode::SUCCESS)
        },
        Commands::Url { remote, git_ref, path } => commands::url(&remote, &git_ref, path.as_deref()),
    };

    return match result {
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
        Ok(code) => code,
    };
}
