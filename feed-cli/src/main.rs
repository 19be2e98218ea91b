use std::process;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use feed_client::HttpGateway;
use feed_core::{
    FeedConfig, FeedController, FeedError, Item, ItemDraft, ItemPatch, ReactionKind,
    RemoteGateway,
};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_SERVER: &str = "http://127.0.0.1:5000";
const SERVER_ENV: &str = "FEED_SERVER_URL";
/// Сколько страниц просматривать в поисках цели мутации.
const MAX_SCAN_PAGES: u32 = 50;

#[derive(Debug, Parser)]
#[command(name = "feed-cli", version, about = "CLI клиент для feed-server")]
struct Cli {
    /// Адрес feed-server (по умолчанию из FEED_SERVER_URL).
    #[arg(long, global = true)]
    server: Option<String>,

    /// Размер страницы ленты.
    #[arg(long, global = true, default_value_t = 10)]
    page_size: u32,

    /// Печатать результат в JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Like,
    Dislike,
}

impl From<KindArg> for ReactionKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Like => ReactionKind::Like,
            KindArg::Dislike => ReactionKind::Dislike,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Лента постов.
    List {
        /// Сколько страниц загрузить.
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Поиск постов.
    Search {
        #[arg(long)]
        query: String,
    },
    /// Посты одного автора.
    ByUser {
        #[arg(long)]
        id: i64,
    },
    /// Получение поста по id.
    Get {
        #[arg(long)]
        id: i64,
    },
    /// Создание поста.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        user_id: i64,
    },
    /// Частичное обновление поста.
    ///
    /// Незаданные поля остаются прежними.
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Удаление поста.
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Реакция на пост.
    React {
        #[arg(long)]
        id: i64,
        #[arg(long, value_enum)]
        kind: KindArg,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = start().await {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }
}

async fn start() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging()?;
    run(Cli::parse()).await
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let server = resolve_server(cli.server, std::env::var(SERVER_ENV).ok());
    debug!(%server, page_size = cli.page_size, "feed-cli started");

    let gateway = HttpGateway::new(server).map_err(map_feed_error)?;
    let config = FeedConfig {
        page_size: cli.page_size,
        ..FeedConfig::default()
    };
    let controller = FeedController::new(gateway.clone(), config);
    let out = Output { json: cli.json };

    match cli.command {
        Command::List { pages } => {
            controller.load_first_page().await.map_err(map_feed_error)?;
            for _ in 1..pages {
                if !controller.has_next_page() {
                    break;
                }
                controller.load_next_page().await.map_err(map_feed_error)?;
            }
            let items = controller.items();
            out.list(
                &format!(
                    "Постов загружено: {} (ещё есть: {})",
                    items.len(),
                    yes_no(controller.has_next_page())
                ),
                &items,
            )?;
        }
        Command::Search { query } => {
            let items = controller.search(&query).await.map_err(map_feed_error)?;
            out.list(&format!("Найдено: {}", items.len()), &items)?;
        }
        Command::ByUser { id } => {
            let items = controller
                .items_by_user(id)
                .await
                .map_err(map_feed_error)?;
            out.list(&format!("Постов автора {id}: {}", items.len()), &items)?;
        }
        Command::Get { id } => {
            let item = gateway.fetch_one(id).await.map_err(map_feed_error)?;
            out.item("Пост", &item)?;
        }
        Command::Create {
            title,
            body,
            tags,
            user_id,
        } => {
            controller.load_first_page().await.map_err(map_feed_error)?;
            let item = controller
                .create_item(ItemDraft {
                    title,
                    body,
                    tags,
                    user_id,
                })
                .await
                .map_err(map_feed_error)?;
            out.item("Пост создан", &item)?;
        }
        Command::Update {
            id,
            title,
            body,
            tags,
        } => {
            locate(&controller, id).await?;
            let patch = ItemPatch {
                title,
                body,
                tags: (!tags.is_empty()).then_some(tags),
                ..ItemPatch::new(id)
            };
            let item = controller
                .update_item(patch)
                .await
                .map_err(map_feed_error)?;
            out.item("Пост обновлён", &item)?;
        }
        Command::Delete { id } => {
            locate(&controller, id).await?;
            controller.delete_item(id).await.map_err(map_feed_error)?;
            println!("Пост удалён: id={id}");
        }
        Command::React { id, kind } => {
            locate(&controller, id).await?;
            let item = controller
                .react_to_item(id, kind.into())
                .await
                .map_err(map_feed_error)?;
            out.item("Реакция учтена", &item)?;
        }
    }

    Ok(())
}

/// Догружает ленту, пока пост `id` не окажется среди загруженных страниц.
async fn locate<G: RemoteGateway>(controller: &FeedController<G>, id: i64) -> Result<()> {
    controller.load_first_page().await.map_err(map_feed_error)?;

    let mut loaded = 1;
    while !controller.pages().contains(id) {
        if !controller.has_next_page() || loaded >= MAX_SCAN_PAGES {
            return Err(map_feed_error(FeedError::NotFound(id)));
        }
        controller.load_next_page().await.map_err(map_feed_error)?;
        loaded += 1;
    }

    debug!(id, pages = loaded, "target located");
    Ok(())
}

fn resolve_server(flag: Option<String>, env: Option<String>) -> String {
    let raw = flag
        .or(env)
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SERVER.to_string());
    normalize_server(raw.trim().to_string())
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn map_feed_error(err: FeedError) -> anyhow::Error {
    let message = match err {
        FeedError::NotFound(id) => format!("пост id={id} не найден в ленте"),
        FeedError::Network { status: 404, message } => format!("ресурс не найден: {message}"),
        FeedError::Network { status, message } => {
            format!("сервер ответил {status}: {message}")
        }
        FeedError::Transport(err) => {
            format!("нет связи с сервером: {err} (проверьте --server или {SERVER_ENV})")
        }
        FeedError::Decode(err) => format!("не удалось разобрать ответ: {err}"),
        FeedError::InvalidRequest(message) => format!("некорректный запрос: {message}"),
    };
    anyhow!(message)
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "да" } else { "нет" }
}

struct Output {
    json: bool,
}

impl Output {
    fn item(&self, title: &str, item: &Item) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(item)?);
            return Ok(());
        }

        println!("{title}");
        println!("id: {}", item.id);
        println!("title: {}", item.title);
        println!("body: {}", item.body);
        println!("tags: {}", item.tags.join(", "));
        println!("user_id: {}", item.user_id);
        println!(
            "reactions: +{} / -{}",
            item.reactions.likes, item.reactions.dislikes
        );
        println!("views: {}", item.views);
        if let Some(url) = &item.image_url {
            println!("image: {url}");
        }
        Ok(())
    }

    fn list(&self, title: &str, items: &[Item]) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(items)?);
            return Ok(());
        }

        println!("{title}");
        for item in items {
            println!(
                "- [{}] {} (user_id={}, +{} / -{})",
                item.id,
                item.title,
                item.user_id,
                item.reactions.likes,
                item.reactions.dislikes
            );
        }
        Ok(())
    }
}
