use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::info;
use ogham::config::Config;
use ogham::markdown::headings;
use ogham::repository::PostRepository;
use std::path::PathBuf;

/// Reads a folder of markdown posts the way the blog does.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Content directory (overrides `posts_directory` in ogham.yaml)
    #[arg(short, long)]
    posts: Option<PathBuf>,

    /// Number of threads used to parse posts
    #[arg(short, long)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List published posts, most recent first
    List,

    /// Print a post's composed markdown
    Show { id: String },

    /// Print the ids of the pages to pre-render, as JSON
    Paths,

    /// Print a post's outline
    Outline { id: String },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = Config::from_directory(&std::env::current_dir()?)?;
    if let Some(posts) = cli.posts {
        config.posts_directory = posts;
    }
    if let Some(threads) = cli.threads {
        config.threads = threads;
    }
    info!("reading posts from `{}`", config.posts_directory.display());

    let repository =
        PostRepository::new(&config.posts_directory).with_threads(config.threads);

    match cli.command {
        Command::List => {
            for post in repository.list_posts()? {
                println!(
                    "{:<20} {:<24} {:>3} min  {}",
                    post.display_date().unwrap_or_default(),
                    post.id,
                    post.reading_time_in_minutes,
                    post.meta.title.as_deref().unwrap_or(""),
                );
            }
        }
        Command::Show { id } => {
            let post = repository.get_post(&id)?;
            if let Some(title) = &post.meta.title {
                println!("# {}\n", title);
            }
            println!("{}", post.content);
        }
        Command::Paths => {
            let paths = repository.static_paths()?;
            println!("{}", serde_json::to_string_pretty(&paths)?);
        }
        Command::Outline { id } => {
            let post = repository.get_post(&id)?;
            let outline = headings(&post.content);
            if outline.is_empty() {
                return Err(anyhow!("post `{}` has no headings", id));
            }
            for heading in outline {
                println!(
                    "{:indent$}{} {}",
                    "",
                    heading.level,
                    heading.title,
                    indent = heading.level.indent() as usize / 4
                );
            }
        }
    }
    Ok(())
}
