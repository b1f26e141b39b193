mod config;
mod render;

use anyhow::{bail, Context as AnyhowContext, Result};
use clap::{Parser, Subcommand};
use config::{Config, Context};
use paperwise_client::api::{Paper, SearchQuery, Source};
use paperwise_client::views::{
    assistant, fetch_bookmark_keys, search, AssistantView, BookmarkOutcome, FieldView, HomeView, PaperCard,
    PaperDetailView, ProfileView, SearchView, SignInForm, SignUpForm,
};
use paperwise_client::{
    ApiClient, ClientConfig, FileStore, KeyValueStore, SearchHistory, SessionContext,
};
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "paperwise")]
#[command(version, about = "Search research papers and understand them in plain language", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend URL (overrides PAPERWISE_API_URL and the current context)
    #[arg(long, global = true)]
    server_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Context management
    Context {
        #[command(subcommand)]
        command: ContextCommand,
    },
    #[command(flatten)]
    Client(ClientCommand),
}

/// Commands that talk to the backend or the local session.
#[derive(Subcommand)]
enum ClientCommand {
    /// Sign in and keep the session on this machine
    /// Examples:
    ///     paperwise signin --email ada@example.com
    ///     paperwise signin --email ada@example.com --password "$PW"
    #[command(verbatim_doc_comment)]
    Signin {
        #[arg(long)]
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account (signs you in)
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Signout,
    /// Show the signed-in user from the stored session
    Whoami,
    /// Backend status, research fields and featured papers
    Home,
    /// Search papers
    /// Examples:
    ///     paperwise search "quantum computing" --source arxiv
    ///     paperwise search "cancer research" --source pubmed --limit 50 --json
    ///     paperwise search "robotics" --bookmark 2
    #[command(verbatim_doc_comment)]
    Search {
        query: String,

        /// Repository: all, arxiv, or pubmed
        #[arg(short, long, default_value = "all")]
        source: Source,

        /// Results per search: 10, 20, 50, or 100
        #[arg(short, long, default_value_t = SearchQuery::DEFAULT_LIMIT, value_parser = parse_limit)]
        limit: u32,

        /// Bookmark the Nth result (1-based) after searching
        #[arg(long)]
        bookmark: Option<usize>,

        /// Mark results using your actual bookmark list instead of the
        /// local guess (one extra request, needs a session)
        #[arg(long)]
        sync_bookmarks: bool,

        /// Emit only the JSON papers
        #[arg(short, long)]
        json: bool,
    },
    /// Recent searches
    History {
        #[command(subcommand)]
        command: Option<HistoryCommand>,
    },
    /// List research fields
    Fields {
        /// Emit only the JSON response
        #[arg(short, long)]
        json: bool,
    },
    /// Latest papers in a research field
    /// Example:
    ///     paperwise field computer-science
    #[command(verbatim_doc_comment)]
    Field {
        field_id: String,

        /// Emit only the JSON papers
        #[arg(short, long)]
        json: bool,
    },
    /// Plain-language explanation of a paper or topic
    /// Examples:
    ///     paperwise explain "Attention is all you need"
    ///     paperwise search "transformers" --json | jq '.[0]' > paper.json
    ///     paperwise explain --paper-file paper.json --question "Why does attention scale?"
    #[command(verbatim_doc_comment)]
    Explain {
        /// Title or topic, when no paper file is given
        title: Option<String>,

        /// JSON file with a paper record ("-" for stdin)
        #[arg(long)]
        paper_file: Option<PathBuf>,

        /// Follow-up question after the explanation
        #[arg(short, long)]
        question: Option<String>,
    },
    /// Ask the AI research assistant (interactive when no question is given)
    Ask { question: Option<String> },
    /// Show your profile and bookmarks
    Profile,
    /// Manage bookmarks
    Bookmark {
        #[command(subcommand)]
        command: BookmarkCommand,
    },
}

#[derive(Subcommand)]
enum HistoryCommand {
    /// Show recent and popular searches
    List,
    /// Forget recent searches
    Clear,
}

#[derive(Subcommand)]
enum BookmarkCommand {
    /// List bookmarked papers
    List {
        /// Emit only the JSON papers
        #[arg(short, long)]
        json: bool,
    },
    /// Bookmark a paper from a JSON file ("-" for stdin)
    Add { paper_file: PathBuf },
    /// Remove a bookmark by its number in 'bookmark list' or by its key (link)
    Remove { target: String },
}

#[derive(Subcommand)]
enum ContextCommand {
    /// Add a new context for a backend
    /// Examples:
    ///     paperwise context add local --server-url=http://localhost:5000
    ///     paperwise context add hosted --server-url=https://wise-paper-backend.onrender.com --set-current
    #[command(verbatim_doc_comment)]
    Add {
        /// Context name
        name: String,
        /// Server URL (e.g., http://localhost:5000)
        #[arg(long)]
        server_url: String,
        /// Set as current context
        #[arg(long)]
        set_current: bool,
    },
    /// List all configured contexts
    List,
    /// Switch to a different context
    Use {
        /// Context name to switch to
        name: String,
    },
    /// Delete a context
    Delete {
        /// Context name to delete
        name: String,
    },
    /// Show current active context
    Current,
}

fn parse_limit(raw: &str) -> Result<u32, String> {
    let limit: u32 = raw
        .parse()
        .map_err(|_| format!("'{}' is not a number", raw))?;
    if SearchQuery::LIMITS.contains(&limit) {
        Ok(limit)
    } else {
        Err(format!("limit must be one of {:?}", SearchQuery::LIMITS))
    }
}

/// Flag, then environment, then current context, then the built-in default.
fn resolve_base_url(flag: Option<String>, env: Option<String>, config: &Config) -> String {
    flag.or(env)
        .or_else(|| {
            config
                .get_current_context()
                .map(|(_, ctx)| ctx.server_url.clone())
        })
        .unwrap_or_else(|| paperwise_client::config::DEFAULT_API_URL.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;

    let command = match cli.command {
        Commands::Context { command } => return handle_context_command(&mut config, command),
        Commands::Client(command) => command,
    };

    let base_url = resolve_base_url(
        cli.server_url,
        std::env::var("PAPERWISE_API_URL").ok(),
        &config,
    );
    let client_config = ClientConfig::from_env()?.with_base_url(base_url);
    let api = ApiClient::new(&client_config)?;
    tracing::debug!(base_url = %api.base_url(), "Using backend");

    let store = FileStore::default_location()?;
    let mut session = SessionContext::restore(store.clone())?;

    match command {
        ClientCommand::Signin { email, password } => {
            let password = match password {
                Some(p) => p,
                None => rpassword::prompt_password("Password: ")?,
            };
            let mut form = SignInForm::new(email, password);
            if form.submit(&mut session, &api).await? {
                let name = session.user().map(|u| u.name.as_str()).unwrap_or_default();
                println!("Signin successful. Welcome, {}.", name);
            } else {
                bail!(form.error().unwrap_or("Signin failed").to_string());
            }
        }
        ClientCommand::Signup {
            name,
            email,
            password,
        } => {
            let password = match password {
                Some(p) => p,
                None => rpassword::prompt_password("Choose a password: ")?,
            };
            let mut form = SignUpForm::new(name, email, password);
            if form.submit(&mut session, &api).await? {
                println!("Account created. You are signed in.");
            } else {
                bail!(form.error().unwrap_or("Signup failed").to_string());
            }
        }
        ClientCommand::Signout => {
            session.sign_out()?;
            println!("Logged out successfully.");
        }
        ClientCommand::Whoami => match session.user() {
            Some(user) => print!("{}", render::user(user)),
            None => println!("Not signed in."),
        },
        ClientCommand::Home => {
            let home = HomeView::load(&api).await;
            if !home.backend_up() {
                eprintln!("{}", render::error("Backend did not answer the health check."));
            }
            println!("Research fields:");
            print!("{}", render::fields(home.fields()));
            println!("\nFeatured papers ({} fetched):\n", home.featured_fetched());
            println!("{}", render::cards(home.featured()));
        }
        ClientCommand::Search {
            query,
            source,
            limit,
            bookmark,
            sync_bookmarks,
            json,
        } => {
            run_search(
                &api,
                &session,
                SearchHistory::load(store.clone())?,
                &query,
                source,
                limit,
                bookmark,
                sync_bookmarks,
                json,
            )
            .await?;
        }
        ClientCommand::History { command } => {
            let mut history = SearchHistory::load(store.clone())?;
            match command.unwrap_or(HistoryCommand::List) {
                HistoryCommand::List => {
                    print!("{}", render::history(history.entries(), &search::POPULAR_QUERIES))
                }
                HistoryCommand::Clear => {
                    history.clear()?;
                    println!("Search history cleared.");
                }
            }
        }
        ClientCommand::Fields { json } => {
            let fields = api.fields().await.context("Failed to fetch fields")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&fields)?);
            } else {
                print!("{}", render::fields(&fields));
            }
        }
        ClientCommand::Field { field_id, json } => {
            require_session(&session)?;
            let view = FieldView::load(&api, &field_id).await;
            if json {
                let papers: Vec<&Paper> = view.cards().iter().map(|c| c.paper()).collect();
                println!("{}", serde_json::to_string_pretty(&papers)?);
            } else {
                println!("{}\n{}\n", view.name(), view.description());
                if let Some(error) = view.error() {
                    bail!(error.to_string());
                }
                if view.cards().is_empty() {
                    println!("No papers found in this field.");
                } else {
                    println!("Latest Papers ({})\n", view.cards().len());
                    println!("{}", render::cards(view.cards()));
                }
            }
        }
        ClientCommand::Explain {
            title,
            paper_file,
            question,
        } => {
            require_session(&session)?;
            let mut view = match (paper_file, title) {
                (Some(path), _) => PaperDetailView::for_paper(read_paper(&path)?),
                (None, Some(title)) => PaperDetailView::new(None, title),
                (None, None) => bail!("Give a title or --paper-file to explain."),
            };
            view.explain(&api).await;
            print!("{}", render::explanation(&view));
            if let Some(question) = question {
                if view.ask(&api, &question).await {
                    println!("\nQ: {}\n", question);
                    print!("{}", render::explanation(&view));
                }
            }
        }
        ClientCommand::Ask { question } => {
            let mut view = AssistantView::new();
            match question {
                Some(question) => {
                    view.send(&api, &question).await;
                    if let Some(reply) = view.last_reply() {
                        println!("{}", reply.content);
                    }
                }
                None => run_chat(&api, &mut view).await?,
            }
        }
        ClientCommand::Profile => {
            require_session(&session)?;
            let view = ProfileView::load(&session, &api).await?;
            if let Some(error) = view.error() {
                bail!(error.to_string());
            }
            if let Some(user) = view.profile() {
                print!("{}", render::user(user));
            }
            println!("\nBookmarked Papers\n");
            if view.cards().is_empty() {
                println!("No bookmarks yet.");
            } else {
                println!("{}", render::cards(view.cards()));
            }
        }
        ClientCommand::Bookmark { command } => {
            require_session(&session)?;
            handle_bookmark_command(&api, &session, command).await?;
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_search<S: KeyValueStore>(
    api: &ApiClient,
    session: &SessionContext<S>,
    history: SearchHistory<S>,
    query: &str,
    source: Source,
    limit: u32,
    bookmark: Option<usize>,
    sync_bookmarks: bool,
    json: bool,
) -> Result<()> {
    let mut view = SearchView::new(history);
    view.set_source(source);
    view.set_limit(limit);

    if !view.submit(api, query).await {
        bail!("Enter something to search for.");
    }
    if let Some(error) = view.error() {
        bail!(error.to_string());
    }

    if sync_bookmarks {
        require_session(session)?;
        let keys = fetch_bookmark_keys(session, api)
            .await
            .context("Could not fetch your bookmarks; results not marked")?;
        for card in view.cards_mut() {
            card.reconcile(&keys);
        }
    }

    if let Some(number) = bookmark {
        let card = number
            .checked_sub(1)
            .and_then(|i| view.cards_mut().get_mut(i))
            .with_context(|| format!("There is no result number {}", number))?;
        match card.bookmark(session, api).await {
            Ok(BookmarkOutcome::SignedOut) => eprintln!("Sign in to bookmark papers."),
            Ok(_) => eprintln!("Bookmarked \"{}\".", card.title()),
            Err(e) => eprintln!("{}", render::error(&format!("Bookmark failed: {}", e))),
        }
    }

    if json {
        let papers: Vec<&Paper> = view.cards().iter().map(|c| c.paper()).collect();
        println!("{}", serde_json::to_string_pretty(&papers)?);
    } else if view.is_empty_result() {
        println!("No papers found. Try adjusting your search terms or filters, e.g.:");
        println!("  {}", search::POPULAR_QUERIES[..5].join(", "));
    } else {
        println!(
            "Search Results ({}) for \"{}\" in {}\n",
            view.cards().len(),
            view.query(),
            view.source().label()
        );
        println!("{}", render::cards(view.cards()));
    }
    Ok(())
}

async fn handle_bookmark_command<S: KeyValueStore>(
    api: &ApiClient,
    session: &SessionContext<S>,
    command: BookmarkCommand,
) -> Result<()> {
    match command {
        BookmarkCommand::List { json } => {
            let view = ProfileView::load(session, api).await?;
            if json {
                let papers: Vec<&Paper> = view.cards().iter().map(|c| c.paper()).collect();
                println!("{}", serde_json::to_string_pretty(&papers)?);
            } else if view.cards().is_empty() {
                println!("No bookmarks yet.");
            } else {
                println!("{}", render::cards(view.cards()));
            }
        }
        BookmarkCommand::Add { paper_file } => {
            let mut card = PaperCard::listing(read_paper(&paper_file)?);
            card.bookmark(session, api)
                .await
                .context("Failed to bookmark paper")?;
            println!("Bookmarked \"{}\".", card.title());
        }
        BookmarkCommand::Remove { target } => {
            let mut view = ProfileView::load(session, api).await?;
            let index = match target.parse::<usize>() {
                Ok(number) if number >= 1 && number <= view.cards().len() => number - 1,
                _ => view
                    .cards()
                    .iter()
                    .position(|c| c.paper().identifying_key() == Some(target.as_str()))
                    .with_context(|| format!("No bookmark matches '{}'", target))?,
            };
            let title = view.cards()[index].title().to_string();
            view.remove(index, session, api)
                .await
                .context("Failed to remove bookmark")?;
            println!("Removed \"{}\" from bookmarks.", title);
        }
    }
    Ok(())
}

async fn run_chat(api: &ApiClient, view: &mut AssistantView) -> Result<()> {
    for message in view.messages() {
        print!("{}", render::message(message));
    }
    println!("\nTry: {}", assistant::QUICK_QUESTIONS.join(" | "));
    println!("(empty line to skip, Ctrl-D or 'exit' to quit)\n");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line == "exit" || line == "quit" {
            break;
        }
        if view.send(api, line).await {
            if let Some(reply) = view.last_reply() {
                print!("{}", render::message(reply));
            }
        }
    }
    Ok(())
}

fn require_session<S: KeyValueStore>(session: &SessionContext<S>) -> Result<()> {
    if !session.is_signed_in() {
        bail!("Not signed in. Run 'paperwise signin --email <email>' first.");
    }
    Ok(())
}

fn read_paper(path: &Path) -> Result<Paper> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read paper file: {:?}", path))?
    };
    serde_json::from_str(&content).context("Paper file is not a valid paper JSON object")
}

fn handle_context_command(config: &mut Config, command: ContextCommand) -> Result<()> {
    match command {
        ContextCommand::Add {
            name,
            server_url,
            set_current,
        } => {
            config
                .contexts
                .insert(name.clone(), Context { server_url });
            if set_current || config.current_context.is_none() {
                config.current_context = Some(name.clone());
            }
            config.save()?;
            println!("Context '{}' added.", name);
            if config.current_context.as_ref() == Some(&name) {
                println!("Context '{}' is now the current context.", name);
            }
        }
        ContextCommand::List => {
            println!("  {:<15} {:<40}", "NAME", "SERVER URL");
            for (name, ctx) in &config.contexts {
                let current_mark = if config.current_context.as_ref() == Some(name) {
                    "*"
                } else {
                    " "
                };
                println!("{} {:<15} {:<40}", current_mark, name, ctx.server_url);
            }
        }
        ContextCommand::Use { name } => {
            let Some(ctx) = config.contexts.get(&name) else {
                bail!("Context '{}' not found.", name);
            };
            let server_url = ctx.server_url.clone();
            config.current_context = Some(name.clone());
            config.save()?;
            println!("Switched to context '{}' ({}).", name, server_url);
        }
        ContextCommand::Delete { name } => {
            if config.contexts.remove(&name).is_none() {
                bail!("Context '{}' not found.", name);
            }
            if config.current_context.as_ref() == Some(&name) {
                config.current_context = None;
            }
            config.save()?;
            println!("Context '{}' deleted.", name);
        }
        ContextCommand::Current => {
            if let Some((name, ctx)) = config.get_current_context() {
                println!("Current context: {}", name);
                println!("  Server URL: {}", ctx.server_url);
            } else {
                println!("No current context set.");
            }
        }
    }
    Ok(())
}
