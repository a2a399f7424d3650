//! Interactive terminal client for the quote browser.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use verba_latina::client::generate::GenerateClient;
use verba_latina::client::share::{ShareOutcome, TerminalClipboard};
use verba_latina::client::state::{DetailTab, QuoteBrowser, ShuffleOutcome, Startup, Theme};
use verba_latina::client::storage::{FileStore, KeyValueStore};
use verba_latina::quote::{seed_quotes, Language};

#[derive(Parser, Debug)]
#[command(name = "verba", about = "Browse Latin quotations with translations and usage notes")]
struct Args {
    /// Generation endpoint URL
    #[arg(long, env = "VERBA_ENDPOINT", default_value = "http://127.0.0.1:3000/api/generate")]
    endpoint: String,

    /// File holding favorites and theme
    #[arg(long, env = "VERBA_STORAGE", default_value = "verba_latina_storage.json")]
    storage: PathBuf,

    /// Initial display language (it, en, es, fr, de)
    #[arg(long, default_value = "it")]
    language: Language,

    /// Start in dark theme when no theme has been stored yet
    #[arg(long)]
    prefers_dark: bool,

    /// URL included when sharing
    #[arg(long, default_value = "http://127.0.0.1:3000/")]
    share_url: String,
}

const HELP: &str = "\
commands:
  s, shuffle          fetch a new quote
  f, favorite         toggle favorite for the current quote
  favs                list favorites
  view <id>           show a quote by id
  remove <id>         remove a favorite
  t, theme            toggle light/dark theme
  lang <code>         it, en, es, fr, de
  tab <name>          translation, context, application
  share               copy the quote to the clipboard
  play                print the pronunciation URL
  done                mark pronunciation playback as finished
  dismiss             hide the notification
  h, help             this text
  q, quit             exit";

fn render<S: KeyValueStore>(browser: &QuoteBrowser<S>) {
    let Some(quote) = browser.current_quote() else {
        println!("{}", browser.ui().loading);
        return;
    };
    let lang = browser.language();
    let ui = browser.ui();

    println!();
    let heart = if browser.is_favorite() { "♥" } else { "♡" };
    println!("{} \"{}\"  [#{}] [{}]", heart, quote.data.latin, quote.id, browser.theme());
    println!("  - {}, {}", quote.data.author(lang), quote.data.source(lang));

    match browser.tab() {
        DetailTab::Translation => {
            println!("  {} ({}): \"{}\"", ui.translate, lang.display_name(), quote.data.translation(lang));
        }
        DetailTab::Context => {
            let context = quote.data.details(lang).map(|d| d.context.as_str()).unwrap_or_default();
            println!("  {}: {}", ui.context, context);
        }
        DetailTab::Application => {
            if let Some(details) = quote.data.details(lang) {
                println!("  {}: {}", ui.practical_use, details.application);
                println!("  {}: {}", ui.example_label, details.example);
            }
        }
    }

    let toast = browser.toast();
    if toast.visible {
        println!("  ! {}", toast.message);
    }
}

fn render_favorites<S: KeyValueStore>(browser: &QuoteBrowser<S>) {
    let ui = browser.ui();
    println!("{}", ui.favorites_title);
    let favorites = browser.favorite_quotes();
    if favorites.is_empty() {
        println!("  {}", ui.no_favorites);
    }
    for quote in favorites {
        println!("  #{} \"{}\" - {}", quote.id, quote.data.latin, quote.data.author(browser.language()));
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "verba_latina=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();
    let source = GenerateClient::new(args.endpoint);
    let mut browser = QuoteBrowser::new(
        FileStore::new(&args.storage),
        seed_quotes().to_vec(),
        Startup::today(args.prefers_dark),
    );
    browser.set_language(args.language);
    let mut rng = rand::thread_rng();

    println!("Verba Latina ({}). Type 'help' for commands.", source.endpoint());
    render(&browser);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        browser.tick(Instant::now());

        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let arg = parts.next();

        match command {
            "" => continue,
            "s" | "shuffle" => {
                println!("{}...", browser.ui().shuffle);
                if browser.shuffle(&source, &mut rng, Instant::now()).await == ShuffleOutcome::Busy {
                    continue;
                }
            }
            "f" | "favorite" => {
                browser.toggle_favorite();
                browser.end_pulse();
            }
            "favs" => {
                browser.open_favorites();
                render_favorites(&browser);
                browser.close_favorites();
                continue;
            }
            "view" => {
                let viewed = arg
                    .and_then(|id| id.parse::<u64>().ok())
                    .is_some_and(|id| browser.view_quote(id));
                if !viewed {
                    println!("usage: view <id> (see 'favs')");
                    continue;
                }
            }
            "remove" => match arg.and_then(|id| id.parse::<u64>().ok()) {
                Some(id) => browser.remove_favorite(id),
                None => {
                    println!("usage: remove <id>");
                    continue;
                }
            },
            "t" | "theme" => {
                let label = match browser.theme() {
                    Theme::Light => &browser.ui().switch_to_dark,
                    Theme::Dark => &browser.ui().switch_to_light,
                };
                println!("{}", label);
                browser.toggle_theme();
            }
            "lang" => match arg.map(str::parse::<Language>) {
                Some(Ok(lang)) => browser.set_language(lang),
                Some(Err(e)) => {
                    println!("{}", e);
                    continue;
                }
                None => {
                    println!("usage: lang <it|en|es|fr|de>");
                    continue;
                }
            },
            "tab" => match arg.map(str::parse::<DetailTab>) {
                Some(Ok(tab)) => browser.set_tab(tab),
                Some(Err(e)) => {
                    println!("{}", e);
                    continue;
                }
                None => {
                    println!("usage: tab <translation|context|application>");
                    continue;
                }
            },
            "share" => {
                let mut clipboard = TerminalClipboard::new(io::stdout());
                if browser.share(&mut clipboard, &args.share_url, Instant::now()) == Some(ShareOutcome::Copied) {
                    println!();
                    println!("{}", browser.ui().copied);
                }
                continue;
            }
            "play" => {
                match browser.play_pronunciation() {
                    Some(url) => println!("{}: {}", browser.ui().play_pronunciation, url),
                    None => println!("already playing, use 'done' when it finishes"),
                }
                continue;
            }
            "done" => {
                browser.playback_finished();
                continue;
            }
            "dismiss" => browser.dismiss_toast(),
            "h" | "help" => {
                println!("{}", HELP);
                continue;
            }
            "q" | "quit" | "exit" => break,
            other => {
                println!("unknown command '{}', type 'help'", other);
                continue;
            }
        }

        render(&browser);
    }

    browser.teardown();
    Ok(())
}
