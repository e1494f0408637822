//! twig CLI - minimal content-addressed version control

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use twig::ops::{commit_tree, ls_tree, write_tree};
use twig::refs::resolve_ref;
use twig::transport::clone;
use twig::{read_object, write_object, IoResultExt, Object, ObjectId, Repo};

#[derive(Parser)]
#[command(name = "twig")]
#[command(about = "minimal content-addressed version control")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// initialize a repository in the current directory
    Init,

    /// print the payload of an object
    CatFile {
        /// object id (or branch name) to print
        #[arg(short = 'p', value_name = "OBJECT")]
        object: String,
    },

    /// hash a file as a blob, optionally storing it
    HashObject {
        /// write the blob into the object store
        #[arg(short = 'w')]
        write: bool,

        /// file to hash
        file: PathBuf,
    },

    /// list the entry names of a tree object
    LsTree {
        /// tree id to list
        object: String,
    },

    /// snapshot the current directory into a tree object
    WriteTree,

    /// write a commit object and advance the current branch
    CommitTree {
        /// id of the tree to commit
        tree: String,

        /// id of the parent commit
        #[arg(short = 'p', value_name = "PARENT")]
        parent: String,

        /// commit message
        #[arg(short = 'm', value_name = "MESSAGE")]
        message: String,
    },

    /// clone a remote repository over smart HTTP
    Clone {
        /// remote repository url
        url: String,

        /// directory to clone into
        directory: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(cli: Cli) -> twig::Result<()> {
    match cli.command {
        Commands::Init => {
            Repo::init(Path::new("."))?;
            println!("Initialized git directory");
        }

        Commands::CatFile { object } => {
            let repo = Repo::open(Path::new("."))?;
            let id = resolve_ref(&repo, &object)?;
            let obj = read_object(&repo, &id)?;

            io::stdout().write_all(&obj.payload).with_path("<stdout>")?;
        }

        Commands::HashObject { write, file } => {
            let content = fs::read(&file).with_path(&file)?;
            let obj = Object::blob(content);

            let id = if write {
                let repo = Repo::open(Path::new("."))?;
                write_object(&repo, &obj)?
            } else {
                obj.id()
            };
            println!("{}", id);
        }

        Commands::LsTree { object } => {
            let repo = Repo::open(Path::new("."))?;
            let id = resolve_ref(&repo, &object)?;

            for entry in ls_tree(&repo, &id)? {
                println!("{}", entry.name);
            }
        }

        Commands::WriteTree => {
            let repo = Repo::open(Path::new("."))?;
            let id = write_tree(&repo, repo.work_dir())?;
            println!("{}", id);
        }

        Commands::CommitTree {
            tree,
            parent,
            message,
        } => {
            let repo = Repo::open(Path::new("."))?;
            let tree = ObjectId::from_hex(&tree)?;
            let parent = ObjectId::from_hex(&parent)?;

            let id = commit_tree(&repo, &tree, &parent, &message, None)?;
            println!("{}", id);
        }

        Commands::Clone { url, directory } => {
            clone(&url, &directory)?;
        }
    }

    Ok(())
}
