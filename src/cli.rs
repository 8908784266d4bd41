use std::error::Error;
use std::io::{self, BufRead, Write};

use clap::{Parser, Subcommand};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::json;
use tracing_subscriber::EnvFilter;
use url::Url;

use coursenav::client::PageClient;
use coursenav::fragment;
use coursenav::navigator::{
    ContentView, LoadOutcome, Navigator, Replay, Sidebar, TransitionTiming,
};
use coursenav::{Topic, history_url, resolve_url};

#[derive(Parser, Debug)]
#[command(name = "coursenav", about = "Navigate static curriculum sites", version)]
pub struct Cli {
    /// Emit JSON instead of human-readable output.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a topic id to its lesson URL.
    Resolve {
        /// Topic identifier, e.g. `python-intro`.
        topic: String,
        /// Path of the page the navigation starts from.
        #[arg(long, default_value = "/")]
        from: String,
    },
    /// Fetch a lesson once and print the extracted fragment.
    Fetch {
        /// Topic identifier to load.
        topic: String,
        /// Absolute URL of the page hosting the navigator.
        #[arg(long)]
        page: Url,
    },
    /// Browse a curriculum site interactively from the terminal.
    Browse {
        /// Absolute URL of the page hosting the navigator.
        #[arg(long)]
        page: Url,
    },
    /// Serve a curriculum directory for local preview.
    #[cfg(feature = "serve")]
    Serve {
        /// Directory containing the site root.
        dir: std::path::PathBuf,
        /// Address to bind.
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: std::net::SocketAddr,
    },
}

#[tokio::main]
pub async fn run() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Resolve { topic, from } => handle_resolve(&topic, &from, cli.json),
        Command::Fetch { topic, page } => handle_fetch(&topic, page, cli.json).await,
        Command::Browse { page } => handle_browse(page).await,
        #[cfg(feature = "serve")]
        Command::Serve { dir, addr } => {
            coursenav::web::serve(coursenav::web::ServeConfig { addr, dir }).await?;
            Ok(())
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

fn handle_resolve(topic: &str, from: &str, as_json: bool) -> Result<(), Box<dyn Error>> {
    let topic = Topic::parse(topic)?;
    let url = resolve_url(&topic, from);
    let pushed = history_url(&url);

    if as_json {
        let payload = json!({
            "topic": topic.id(),
            "language": topic.language(),
            "file": topic.file_name(),
            "from": from,
            "url": url,
            "history_url": pushed,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("{:<10} {}", "TOPIC", topic.id());
        println!("{:<10} {}", "LANGUAGE", topic.language());
        println!("{:<10} {}", "FILE", topic.file_name());
        println!("{:<10} {}", "URL", url);
        println!("{:<10} {}", "HISTORY", pushed);
    }
    Ok(())
}

async fn handle_fetch(topic: &str, page: Url, as_json: bool) -> Result<(), Box<dyn Error>> {
    let topic = Topic::parse(topic)?;
    let relative = resolve_url(&topic, page.path());
    let client = PageClient::new()?;
    let body = client.fetch_page(&page, &relative).await?;
    let lesson = fragment::extract_lesson(&body)?;

    if as_json {
        let payload = json!({
            "topic": topic.id(),
            "url": relative,
            "lesson": lesson,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        if let Some(title) = &lesson.title {
            println!("{title}");
            println!("{}", "-".repeat(title.chars().count()));
        }
        println!("{}", fragment::fragment_text(&lesson.content_html));
    }
    Ok(())
}

/// Content view that narrates navigation onto the terminal.
struct TerminalView;

impl ContentView for TerminalView {
    fn set_content(&mut self, html: &str) {
        println!();
        println!("{}", fragment::fragment_text(html));
    }

    fn add_class(&mut self, class: &str) {
        tracing::debug!(class, "class added");
    }

    fn remove_class(&mut self, class: &str) {
        tracing::debug!(class, "class removed");
    }

    fn set_title(&mut self, title: &str) {
        println!("== {title} ==");
    }

    fn inject_stylesheet(&mut self, _css: &str) {
        tracing::debug!("transition stylesheet injected");
    }

    fn scroll_to(&mut self, id: &str) {
        println!("(scrolled to #{id})");
    }

    fn alert(&mut self, message: &str) {
        println!("[!] {message}");
    }
}

async fn handle_browse(page: Url) -> Result<(), Box<dyn Error>> {
    let client = PageClient::new()?;
    let initial_html = client.fetch_page(&page, "").await?;
    let sidebar = Sidebar::from_document(&initial_html);

    let mut nav = Navigator::new(TerminalView, page, sidebar)?
        .with_timing(TransitionTiming::immediate());
    nav.activate(&initial_html).await;

    print_topics(nav.sidebar());
    println!("Commands: <topic-id>, back, forward, topics, quiz <n>, goto <#anchor>, quit");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = stdin.lock().lines().next() else {
            break;
        };
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        match input.split_once(' ') {
            _ if input == "quit" || input == "q" => break,
            _ if input == "topics" => print_topics(nav.sidebar()),
            _ if input == "back" => report_replay(nav.back().await),
            _ if input == "forward" => report_replay(nav.forward().await),
            Some(("quiz", index)) => {
                let index: usize = index.trim().parse().unwrap_or(0);
                if !nav.submit_quiz(index) {
                    println!("No quiz form {index} in the current content.");
                }
            }
            Some(("goto", anchor)) => {
                if !nav.follow_anchor(anchor.trim()) {
                    println!("No such anchor target in the current content.");
                }
            }
            _ => {
                let outcome = nav.load(input).await;
                if outcome.is_loaded() {
                    println!("link: {}", topic_link(nav.page_url(), input));
                }
            }
        }
    }
    Ok(())
}

fn print_topics(sidebar: &Sidebar) {
    if sidebar.entries().is_empty() {
        println!("No sidebar entries found on this page.");
        return;
    }
    for entry in sidebar.entries() {
        let marker = if entry.is_active() { "*" } else { " " };
        match &entry.topic {
            Some(topic) => println!(" {marker} {:<24} {}", topic, entry.label),
            None => println!(" {marker} {:<24} {}", "", entry.label),
        }
    }
}

fn report_replay(outcome: Option<Replay>) {
    match outcome {
        Some(Replay::Loaded(LoadOutcome::Busy)) => println!("A load is already in progress."),
        Some(Replay::Loaded(_)) => {}
        Some(Replay::Restored) => println!("Back at the starting page."),
        None => println!("Nothing to replay in that direction."),
    }
}

fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

/// Shareable address that reopens the lesson through the `?topic=` hook.
fn topic_link(page: &Url, topic: &str) -> String {
    let mut link = page.clone();
    link.set_query(Some(&format!("topic={}", encode_component(topic))));
    link.to_string()
}
