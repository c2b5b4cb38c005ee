use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tracing::{info, warn};

use nl_core::prefs::{PrefChange, PrefKey, PrefUpdate, PreferenceStore};
use nl_core::{Error, Interest, Result, SummaryLevel};
use nl_extract::{fetch_article, fetch_feed, highlight_keywords, reading_time, DEFAULT_KEYWORDS, SITE_URL};
use nl_feed::{show_all, BackendClient, PersonalizedFeed};
use nl_inference::prompts::summary_request;
use nl_inference::{CompletionModel, OpenAiModel};
use nl_panel::{PanelCommand, PanelSession, SummaryController, SummaryState};
use nl_prefs::JsonFilePrefs;
use nl_web::scoring::{score_article, ArticleScores};
use nl_web::{AppState, Backend, StoredArticle, VALID_JOBS};

mod config;
mod views;

use config::Config;
use views::{TerminalFeedView, TerminalSummaryView};

#[derive(Parser, Debug)]
#[command(author, version, about = "Reading companion for The Hacker News", long_about = None)]
struct Cli {
    /// Preferences file location (defaults to NEWSLENS_PREFS or ./newslens-prefs.json)
    #[arg(long)]
    prefs: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a backend profile and store the resulting user id
    Setup {
        /// Job role, e.g. "Security Engineer"
        #[arg(long)]
        profession: String,
        /// Interest ids, e.g. 3,8,12
        #[arg(long, value_delimiter = ',')]
        interests: Vec<u32>,
    },
    /// Show or change stored preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommands,
    },
    /// Summarize an article page at the configured level
    Summarize {
        url: String,
        /// Override the stored summary level (0 full, 1 medium, 2 brief)
        #[arg(long)]
        level: Option<u8>,
    },
    /// Show the homepage feed, filtered to your recommended articles
    Feed {
        #[arg(long, default_value_t = PersonalizedFeed::DEFAULT_PAGE_SIZE)]
        limit: usize,
        /// Lift the filter and show every story
        #[arg(long)]
        show_all: bool,
    },
    /// Chat about an article
    Chat { url: String },
    /// Explain a selected text fragment from an article in simple terms
    Explain { url: String, text: String },
    /// Run the local personalization backend
    Serve {
        #[arg(long, default_value = "127.0.0.1:5000")]
        bind: String,
        /// JSON file of scored articles to seed the backend with
        #[arg(long)]
        articles: Option<PathBuf>,
        /// JSON file with the interest taxonomy ({id, name} rows)
        #[arg(long)]
        interests: Option<PathBuf>,
    },
    /// Scrape the homepage, score each article, and push it to the backend
    Ingest {
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long)]
        interests: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum PrefsCommands {
    Show,
    Set {
        /// 0 full article, 1 medium, 2 brief
        #[arg(long)]
        summary_level: Option<u8>,
        #[arg(long)]
        profession: Option<String>,
        #[arg(long, value_delimiter = ',')]
        interests: Option<Vec<u32>>,
    },
    /// Clear every stored preference and restart from scratch
    Reset,
}

fn build_model(config: &Config) -> OpenAiModel {
    OpenAiModel::new(config.api_key.clone()).with_model(config.model.clone())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(path) = cli.prefs {
        config.prefs_path = path;
    }

    match cli.command {
        Commands::Setup {
            profession,
            interests,
        } => {
            let prefs = open_prefs(&config).await?;
            setup(&config, prefs, profession, interests).await
        }
        Commands::Prefs { command } => match command {
            PrefsCommands::Show => {
                let prefs = open_prefs(&config).await?;
                prefs_show(&config, prefs).await
            }
            PrefsCommands::Set {
                summary_level,
                profession,
                interests,
            } => {
                let prefs = open_prefs(&config).await?;
                prefs_set(&config, prefs, summary_level, profession, interests).await
            }
            PrefsCommands::Reset => prefs_reset(&config).await,
        },
        Commands::Summarize { url, level } => {
            let prefs = open_prefs(&config).await?;
            summarize(&config, prefs, &url, level).await
        }
        Commands::Feed { limit, show_all } => {
            let prefs = open_prefs(&config).await?;
            feed(&config, prefs, limit, show_all).await
        }
        Commands::Chat { url } => {
            let (tx, rx) = nl_panel::commands::channel();
            if tx.send(PanelCommand::OpenChat).await.is_err() {
                warn!("panel command channel closed");
            }
            drop(tx);
            run_panel(&config, &url, rx).await
        }
        Commands::Explain { url, text } => {
            let (tx, rx) = nl_panel::commands::channel();
            if tx.send(PanelCommand::ExplainText(text)).await.is_err() {
                warn!("panel command channel closed");
            }
            drop(tx);
            run_panel(&config, &url, rx).await
        }
        Commands::Serve {
            bind,
            articles,
            interests,
        } => serve(&bind, articles, interests).await,
        Commands::Ingest { limit, interests } => ingest(&config, limit, interests).await,
    }
}

async fn open_prefs(config: &Config) -> Result<Arc<JsonFilePrefs>> {
    Ok(Arc::new(JsonFilePrefs::open(&config.prefs_path).await?))
}

async fn setup(
    config: &Config,
    prefs: Arc<JsonFilePrefs>,
    profession: String,
    interests: Vec<u32>,
) -> Result<()> {
    let backend = BackendClient::new(config.backend_url.clone());
    let handle = backend.create_user(&profession, &interests).await?;
    prefs
        .set(PrefUpdate {
            profession: Some(profession),
            interest_ids: Some(interests),
            user_id: Some(handle.user_id.to_string()),
            setup_complete: Some(true),
            ..Default::default()
        })
        .await?;
    info!("✅ profile created (user {})", handle.user_id);
    Ok(())
}

async fn prefs_show(config: &Config, prefs: Arc<JsonFilePrefs>) -> Result<()> {
    let stored = prefs.get(&PrefKey::ALL).await?;
    println!(
        "profession:    {}",
        stored.profession.as_deref().unwrap_or("-")
    );
    println!(
        "interests:     {}",
        stored
            .interest_ids
            .map(|ids| ids.iter().map(u32::to_string).collect::<Vec<_>>().join(", "))
            .unwrap_or_else(|| "-".to_string())
    );
    println!(
        "summary level: {}",
        stored
            .summary_level
            .map(|level| format!("{} ({})", level.as_u8(), level.label()))
            .unwrap_or_else(|| "-".to_string())
    );
    println!("user id:       {}", stored.user_id.as_deref().unwrap_or("-"));
    println!(
        "setup done:    {}",
        stored
            .setup_complete
            .map(|done| done.to_string())
            .unwrap_or_else(|| "-".to_string())
    );

    if let Some(user_id) = stored.user_id {
        let backend = BackendClient::new(config.backend_url.clone());
        match backend.get_user(&user_id).await {
            Ok(profile) => {
                let names: Vec<&str> =
                    profile.interests.iter().map(|i| i.name.as_str()).collect();
                println!("backend:       {} ({})", profile.job, names.join(", "));
            }
            Err(e) => warn!("backend profile lookup failed: {}", e),
        }
    }
    Ok(())
}

async fn prefs_set(
    config: &Config,
    prefs: Arc<JsonFilePrefs>,
    summary_level: Option<u8>,
    profession: Option<String>,
    interests: Option<Vec<u32>>,
) -> Result<()> {
    let summary_level = summary_level
        .map(SummaryLevel::try_from)
        .transpose()
        .map_err(Error::Configuration)?;
    let update = PrefUpdate {
        profession: profession.clone(),
        interest_ids: interests.clone(),
        summary_level,
        ..Default::default()
    };
    if update.is_empty() {
        info!("nothing to change");
        return Ok(());
    }
    prefs.set(update).await?;
    info!("💾 preferences saved");

    // Profile fields also live on the backend; keep it in sync when the
    // user already has an account there.
    if profession.is_some() || interests.is_some() {
        let stored = prefs.get(&[PrefKey::UserId]).await?;
        if let Some(user_id) = stored.user_id {
            let backend = BackendClient::new(config.backend_url.clone());
            match backend
                .update_user(&user_id, profession.as_deref(), interests.as_deref())
                .await
            {
                Ok(_) => info!("🔄 backend profile updated"),
                Err(e) => warn!("backend profile update failed: {}", e),
            }
        }
    }
    Ok(())
}

async fn prefs_reset(config: &Config) -> Result<()> {
    match tokio::fs::remove_file(&config.prefs_path).await {
        Ok(()) => info!("🧹 preferences cleared"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => info!("no preferences to clear"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

async fn summarize(
    config: &Config,
    prefs: Arc<JsonFilePrefs>,
    url: &str,
    level: Option<u8>,
) -> Result<()> {
    if let Some(raw) = level {
        let level = SummaryLevel::try_from(raw).map_err(Error::Configuration)?;
        prefs
            .set(PrefUpdate {
                summary_level: Some(level),
                ..Default::default()
            })
            .await?;
    }

    let client = reqwest::Client::new();
    let article = fetch_article(&client, url).await?;
    println!(
        "📖 {} ({} min read)",
        article.title,
        reading_time(&article.body_text)
    );

    let model: Arc<dyn CompletionModel> = Arc::new(build_model(config));
    let mut controller = SummaryController::new(model, article);
    let mut view = TerminalSummaryView;
    let mut events = prefs.subscribe();

    controller.start(prefs.as_ref(), &mut view).await;
    if matches!(controller.state(), SummaryState::Idle) {
        info!("nothing to summarize here (level 0, non-article page, or empty body)");
        return Ok(());
    }

    summary_loop(&mut controller, &mut view, prefs, &mut events).await
}

async fn summary_loop(
    controller: &mut SummaryController,
    view: &mut TerminalSummaryView,
    prefs: Arc<JsonFilePrefs>,
    events: &mut broadcast::Receiver<PrefChange>,
) -> Result<()> {
    println!("(0/1/2 change level, r retry, d read full article, q quit)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(PrefChange::SummaryLevel(level)) => controller.set_level(level, view).await,
                Ok(_) => {}
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "q" => break,
                    "r" => controller.retry(view).await,
                    "d" => {
                        controller.dismiss(view);
                        if matches!(controller.state(), SummaryState::Dismissed) {
                            let body = highlight_keywords(
                                &controller.article().body_text,
                                &DEFAULT_KEYWORDS,
                            );
                            println!("\n{}\n", body);
                            break;
                        }
                    }
                    "0" => set_level_pref(prefs.as_ref(), SummaryLevel::Full).await?,
                    "1" => set_level_pref(prefs.as_ref(), SummaryLevel::Medium).await?,
                    "2" => set_level_pref(prefs.as_ref(), SummaryLevel::Brief).await?,
                    "" => {}
                    other => println!("unknown command: {}", other),
                }
            }
        }
    }
    Ok(())
}

async fn set_level_pref(prefs: &dyn PreferenceStore, level: SummaryLevel) -> Result<()> {
    prefs
        .set(PrefUpdate {
            summary_level: Some(level),
            ..Default::default()
        })
        .await
}

async fn feed(
    config: &Config,
    prefs: Arc<JsonFilePrefs>,
    limit: usize,
    show_all_flag: bool,
) -> Result<()> {
    let client = reqwest::Client::new();
    let entries = fetch_feed(&client, SITE_URL).await?;
    if entries.is_empty() {
        info!("no stories found on the homepage");
        return Ok(());
    }

    let mut view = TerminalFeedView::new(&entries);
    let filter =
        PersonalizedFeed::new(BackendClient::new(config.backend_url.clone())).with_page_size(limit);
    let outcome = filter.run(prefs.as_ref(), &entries, &mut view).await;

    if show_all_flag {
        if let Some(outcome) = &outcome {
            show_all(outcome, &mut view);
        }
    }
    view.render();
    Ok(())
}

async fn run_panel(
    config: &Config,
    url: &str,
    mut commands: mpsc::Receiver<PanelCommand>,
) -> Result<()> {
    let client = reqwest::Client::new();
    let article = fetch_article(&client, url).await?;
    if !article.has_body() {
        info!("could not extract any article content; nothing to discuss");
        return Ok(());
    }
    println!("🤖 {}", article.title);

    let model: Arc<dyn CompletionModel> = Arc::new(build_model(config));
    let mut session = PanelSession::chat(model, article);

    while let Some(command) = commands.recv().await {
        match command {
            PanelCommand::OpenChat => {
                println!("I've read the article and I'm ready to answer your questions!");
            }
            PanelCommand::ExplainText(text) => {
                println!("🧠 Selected text: \"{}\"", text);
                match session.explain(&text).await {
                    Ok(reply) => println!("{}\n", reply),
                    Err(e @ Error::Configuration(_)) => return Err(e),
                    Err(e) => println!("⚠️  {}", e),
                }
            }
        }
    }

    chat_loop(&mut session).await
}

async fn chat_loop(session: &mut PanelSession) -> Result<()> {
    println!("(ask a question, or /quit to close the panel)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let message = line.trim();
        if message.is_empty() || message == "/quit" {
            break;
        }
        match session.send(message).await {
            Ok(reply) => println!("{}\n", reply),
            Err(e @ Error::Configuration(_)) => return Err(e),
            Err(e) => println!("⚠️  {} (try again)", e),
        }
    }
    Ok(())
}

async fn serve(
    bind: &str,
    articles: Option<PathBuf>,
    interests: Option<PathBuf>,
) -> Result<()> {
    let mut backend = Backend::new();
    if let Some(path) = articles {
        for article in load_articles(&path).await? {
            backend.insert_article(article);
        }
        info!("seeded {} articles", backend.article_count());
    }
    if let Some(path) = interests {
        let taxonomy = load_interests(&path).await?;
        info!("loaded {} interests", taxonomy.len());
        backend.set_taxonomy(taxonomy);
    }

    let app = nl_web::create_app(AppState::new(backend)).await;
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("🌐 personalization backend listening on {}", bind);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn ingest(config: &Config, limit: usize, interests: Option<PathBuf>) -> Result<()> {
    let interests = match interests {
        Some(path) => load_interests(&path).await?,
        None => Vec::new(),
    };
    let jobs: Vec<&str> = VALID_JOBS.to_vec();

    let client = reqwest::Client::new();
    let entries = fetch_feed(&client, SITE_URL).await?;
    info!("found {} homepage stories", entries.len());

    let model = build_model(config);
    let mut ingested = 0usize;
    for entry in entries.iter().take(limit) {
        let article = match fetch_article(&client, &entry.url).await {
            Ok(article) => article,
            Err(e) => {
                warn!("failed to fetch {}: {}", entry.url, e);
                continue;
            }
        };
        if !article.has_body() {
            continue;
        }

        let summary = match summary_request(&article, SummaryLevel::Brief) {
            Some(request) => match model.complete(&request).await {
                Ok(html) => html,
                Err(e @ Error::Configuration(_)) => return Err(e),
                Err(e) => {
                    warn!("summary failed for {}: {}", entry.url, e);
                    String::new()
                }
            },
            None => String::new(),
        };

        let scores = match score_article(&model, &article, &jobs, &interests).await {
            Ok(scores) => scores,
            Err(e @ Error::Configuration(_)) => return Err(e),
            Err(e) => {
                warn!("scoring failed for {}: {}", entry.url, e);
                ArticleScores::default()
            }
        };

        let stored = StoredArticle {
            title: article.title.clone(),
            link: entry.url.clone(),
            summary,
            category: None,
            subcategory: None,
            date: None,
            image_url: None,
            job_scores: scores.job_scores,
            interest_scores: scores.interest_scores,
        };
        let response = client
            .post(format!("{}/articles", config.backend_url))
            .json(&stored)
            .send()
            .await?;
        if !response.status().is_success() {
            warn!("backend rejected {} with status {}", entry.url, response.status());
            continue;
        }
        ingested += 1;
        info!("🆕 {}", article.title);
    }
    info!("📚 ingested {} articles", ingested);
    Ok(())
}

async fn load_interests(path: &Path) -> Result<Vec<Interest>> {
    let contents = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&contents)?)
}

async fn load_articles(path: &Path) -> Result<Vec<StoredArticle>> {
    let contents = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&contents)?)
}
