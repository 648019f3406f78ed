use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

use newsdesk::config::Config;
use newsdesk::news::{
    AdminRole, Article, ArticlePatch, CandidateArticle, Capabilities, Category, CategoryFilter,
    DraftPatch, FontSize, NewArticle, NewsStore, PreferencesPatch, SearchSort, ThemeMode,
};
use newsdesk::storage::{KeyValueStore, SqliteStore, StorageError};
use newsdesk::util::{display_width, strip_control_chars, truncate_to_width};

/// Output width used when `COLUMNS` is unset or unparsable.
const DEFAULT_WIDTH: usize = 100;

/// Get the config directory path (~/.config/newsdesk/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("newsdesk"))
}

fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|c| c.parse::<usize>().ok())
        .filter(|&w| w > 0)
        .unwrap_or(DEFAULT_WIDTH)
}

/// Sanitize untrusted article text and fit it into `width` columns.
fn fit(s: &str, width: usize) -> String {
    truncate_to_width(&strip_control_chars(s), width).into_owned()
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "newsdesk", about = "Read, bookmark and publish news from the terminal")]
struct Args {
    /// Admin role used for publishing operations (super_admin, editor, viewer)
    #[arg(long, global = true, default_value = "viewer")]
    role: AdminRole,

    /// Reset database (delete and recreate)
    #[arg(long)]
    reset_db: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List articles, optionally restricted to one category
    List {
        #[arg(long, default_value = "all")]
        category: CategoryFilter,
    },
    /// Most engaging articles (views + 10 x likes)
    Trending {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Articles flagged as breaking
    Breaking {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Articles flagged as featured
    Featured {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Case-insensitive search over title, description, content, author and tags
    Search {
        query: String,
        #[arg(long, value_enum, default_value_t = SortArg::Relevance)]
        sort: SortArg,
    },
    /// Read an article (counts a view) and list related ones
    Show { id: String },
    /// Toggle the like on an article
    Like { id: String },
    /// Toggle the bookmark on an article
    Bookmark { id: String },
    /// List bookmarked articles
    Bookmarks,
    /// List liked articles
    Liked,
    /// Manage drafts
    Draft {
        #[command(subcommand)]
        action: DraftCommand,
    },
    /// Publish a new article, optionally from a saved draft
    Publish {
        /// Start from this draft and retire it once published
        #[arg(long, value_name = "DRAFT_ID")]
        from_draft: Option<String>,
        #[command(flatten)]
        fields: ArticleFields,
        #[arg(long)]
        breaking: bool,
        #[arg(long)]
        featured: bool,
    },
    /// Edit fields of a published article
    Edit {
        id: String,
        #[command(flatten)]
        fields: ArticleFields,
        #[arg(long)]
        breaking: Option<bool>,
        #[arg(long)]
        featured: Option<bool>,
    },
    /// Delete an article
    Delete { id: String },
    /// Publish candidates from a JSON file, skipping known titles
    Ingest { file: PathBuf },
    /// Show or update reader preferences
    Prefs {
        /// Comma-separated category list
        #[arg(long)]
        categories: Option<String>,
        #[arg(long)]
        notifications: Option<bool>,
        #[arg(long)]
        font_size: Option<FontSize>,
        #[arg(long)]
        autoplay: Option<bool>,
    },
    /// Show or set the theme mode (light, dark, auto)
    Theme { mode: Option<ThemeMode> },
    /// Engagement statistics
    Stats,
}

#[derive(Subcommand, Debug)]
enum DraftCommand {
    /// Create or update a draft
    Save {
        id: String,
        #[command(flatten)]
        fields: ArticleFields,
    },
    /// List drafts, or show one in full
    Show { id: Option<String> },
    /// Delete a draft
    Discard { id: String },
}

#[derive(clap::Args, Debug)]
struct ArticleFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    content: Option<String>,
    #[arg(long)]
    image_url: Option<String>,
    #[arg(long)]
    category: Option<Category>,
    #[arg(long)]
    author: Option<String>,
    #[arg(long)]
    source: Option<String>,
    /// Comma-separated tag list
    #[arg(long)]
    tags: Option<String>,
}

impl ArticleFields {
    fn into_patch(self) -> ArticlePatch {
        ArticlePatch {
            title: self.title,
            description: self.description,
            content: self.content,
            image_url: self.image_url,
            category: self.category,
            author: self.author,
            source: self.source,
            tags: self.tags.as_deref().map(split_list),
            published_at: None,
            is_breaking: None,
            is_featured: None,
        }
    }

    fn into_draft_patch(self) -> DraftPatch {
        DraftPatch {
            title: self.title,
            description: self.description,
            content: self.content,
            image_url: self.image_url,
            category: self.category,
            author: self.author,
            tags: self.tags.as_deref().map(split_list),
            source: self.source,
            scheduled_for: None,
        }
    }

    /// Overlay the given flags on `base`.
    fn apply_to(self, mut base: NewArticle) -> NewArticle {
        if let Some(v) = self.title {
            base.title = v;
        }
        if let Some(v) = self.description {
            base.description = v;
        }
        if let Some(v) = self.content {
            base.content = v;
        }
        if let Some(v) = self.image_url {
            base.image_url = v;
        }
        if let Some(v) = self.category {
            base.category = v;
        }
        if let Some(v) = self.author {
            base.author = v;
        }
        if let Some(v) = self.source {
            base.source = v;
        }
        if let Some(v) = self.tags.as_deref() {
            base.tags = split_list(v);
        }
        base
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortArg {
    Relevance,
    Date,
    Views,
}

impl From<SortArg> for SearchSort {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Relevance => SearchSort::Relevance,
            SortArg::Date => SearchSort::Date,
            SortArg::Views => SearchSort::Views,
        }
    }
}

// ============================================================================
// Output
// ============================================================================

fn print_articles(store: &NewsStore, articles: &[&Article], width: usize) {
    if articles.is_empty() {
        println!("No articles.");
        return;
    }
    for article in articles {
        let mut marks = String::new();
        if article.is_breaking {
            marks.push('!');
        }
        if store.is_bookmarked(&article.id) {
            marks.push('*');
        }
        if store.is_liked(&article.id) {
            marks.push('+');
        }
        let prefix = format!(
            "{:<16} {:<13} {:>3} ",
            fit(&article.id, 16),
            article.category.as_str(),
            marks
        );
        let remaining = width.saturating_sub(display_width(&prefix));
        println!("{}{}", prefix, fit(&article.title, remaining));
    }
}

fn print_article(article: &Article, width: usize) {
    println!("{}", fit(&article.title, width));
    println!(
        "{} | {} | {} | {} min read",
        article.category,
        fit(&article.author, 40),
        fit(&article.source, 40),
        article.reading_time
    );
    println!(
        "Published {} | {} views | {} likes",
        article.published_at.format("%Y-%m-%d %H:%M"),
        article.views,
        article.likes
    );
    if !article.tags.is_empty() {
        let tags = article
            .tags
            .iter()
            .map(|t| strip_control_chars(t).into_owned())
            .collect::<Vec<_>>()
            .join(", ");
        println!("Tags: {}", fit(&tags, width.saturating_sub(6)));
    }
    println!();
    println!("{}", strip_control_chars(&article.description));
    println!();
    println!("{}", strip_control_chars(&article.content));
}

// ============================================================================
// Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
    }

    // User-only access to the config directory
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o700);
        if let Err(e) = std::fs::set_permissions(&config_dir, perms) {
            tracing::warn!(
                path = %config_dir.display(),
                error = %e,
                "Failed to set config directory permissions to 0700"
            );
        }
    }

    let config = Config::load(&config_dir.join("config.toml")).context("Failed to load config")?;
    let db_path = config.database_path(&config_dir);

    if args.reset_db && db_path.exists() {
        std::fs::remove_file(&db_path).context("Failed to delete database")?;
        println!("Database reset.");
    }

    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let adapter = match SqliteStore::open(db_path_str).await {
        Ok(db) => db,
        Err(StorageError::InstanceLocked) => {
            eprintln!(
                "Error: Another instance of newsdesk appears to be running. Please close it and try again."
            );
            std::process::exit(1);
        }
        Err(e) => return Err(anyhow::anyhow!("Failed to open database: {}", e)),
    };
    let adapter: Arc<dyn KeyValueStore> = Arc::new(adapter);

    let mut store = NewsStore::open(adapter, config.store_options())
        .await
        .context("Failed to load news store")?;

    let caps = Capabilities::for_role(args.role);
    let result = run(&mut store, &config, caps, args.command);

    store.flush().await;
    let status = store.persistence_status();
    if !status.is_healthy() {
        eprintln!(
            "Warning: {} change(s) could not be saved: {}",
            status.failures,
            status.last_error.as_deref().unwrap_or("unknown error")
        );
    }

    result
}

fn run(store: &mut NewsStore, config: &Config, caps: Capabilities, command: Command) -> Result<()> {
    let width = terminal_width();

    match command {
        Command::List { category } => {
            let articles = store.filter_by_category(category);
            print_articles(store, &articles, width);
        }
        Command::Trending { limit } => {
            let articles = store.trending(limit.unwrap_or(config.trending_limit));
            print_articles(store, &articles, width);
        }
        Command::Breaking { limit } => {
            let articles = store.breaking_news(limit.unwrap_or(config.breaking_limit));
            print_articles(store, &articles, width);
        }
        Command::Featured { limit } => {
            let articles = store.featured_articles(limit.unwrap_or(config.featured_limit));
            print_articles(store, &articles, width);
        }
        Command::Search { query, sort } => {
            let articles = store.search_sorted(&query, sort.into());
            println!("{} result(s) for \"{}\"", articles.len(), fit(&query, 40));
            print_articles(store, &articles, width);
        }
        Command::Show { id } => {
            if store.increment_views(&id).is_none() {
                anyhow::bail!("No article with id {}", id);
            }
            if let Some(article) = store.article(&id) {
                print_article(article, width);
            }
            let related = store.recommended(Some(id.as_str()), config.recommended_limit);
            if !related.is_empty() {
                println!();
                println!("Related:");
                print_articles(store, &related, width);
            }
        }
        Command::Like { id } => match store.toggle_like(&id) {
            Some(true) => println!("Liked {}", id),
            Some(false) => println!("Unliked {}", id),
            None => anyhow::bail!("No article with id {}", id),
        },
        Command::Bookmark { id } => match store.toggle_bookmark(&id) {
            Some(true) => println!("Bookmarked {}", id),
            Some(false) => println!("Removed bookmark {}", id),
            None => anyhow::bail!("No article with id {}", id),
        },
        Command::Bookmarks => {
            let articles = store.bookmarked_articles();
            print_articles(store, &articles, width);
        }
        Command::Liked => {
            let articles = store.liked_articles();
            print_articles(store, &articles, width);
        }
        Command::Draft { action } => run_draft(store, action, width)?,
        Command::Publish {
            from_draft,
            fields,
            breaking,
            featured,
        } => {
            let base = match from_draft.as_deref() {
                Some(draft_id) => store
                    .draft(draft_id)
                    .map(NewArticle::from)
                    .with_context(|| format!("No draft with id {}", draft_id))?,
                None => NewArticle::default(),
            };
            let mut fields = fields.apply_to(base);
            fields.is_breaking = breaking;
            fields.is_featured = featured;

            let article = store.create_article(caps, fields, from_draft.as_deref())?;
            println!("Published {}", article.id);
        }
        Command::Edit {
            id,
            fields,
            breaking,
            featured,
        } => {
            let mut patch = fields.into_patch();
            patch.is_breaking = breaking;
            patch.is_featured = featured;
            if patch.is_empty() {
                anyhow::bail!("Nothing to change");
            }
            if !store.update_article(caps, &id, patch)? {
                anyhow::bail!("No article with id {}", id);
            }
            println!("Updated {}", id);
        }
        Command::Delete { id } => {
            if !store.delete_article(caps, &id)? {
                anyhow::bail!("No article with id {}", id);
            }
            println!("Deleted {}", id);
        }
        Command::Ingest { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let candidates: Vec<CandidateArticle> = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a JSON array of articles", file.display()))?;
            let report = store.ingest(caps, candidates)?;
            println!(
                "Added {}, skipped {} duplicate(s), rejected {}",
                report.added, report.skipped, report.rejected
            );
        }
        Command::Prefs {
            categories,
            notifications,
            font_size,
            autoplay,
        } => {
            let preferred_categories = categories
                .as_deref()
                .map(|list| {
                    split_list(list)
                        .iter()
                        .map(|c| c.parse::<Category>())
                        .collect::<Result<Vec<_>, _>>()
                })
                .transpose()?;
            let prefs = store.update_preferences(PreferencesPatch {
                preferred_categories,
                notifications,
                font_size,
                auto_play_videos: autoplay,
            });
            let categories = prefs
                .preferred_categories
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            println!("Preferred categories: {}", categories);
            println!("Notifications:        {}", prefs.notifications);
            println!("Font size:            {:?}", prefs.font_size);
            println!("Autoplay videos:      {}", prefs.auto_play_videos);
        }
        Command::Theme { mode } => {
            if let Some(mode) = mode {
                store.set_theme_mode(mode);
            }
            println!("Theme: {}", store.theme_mode().as_str());
        }
        Command::Stats => {
            let stats = store.stats();
            println!("Articles: {}", stats.total_articles);
            println!("Drafts:   {}", stats.total_drafts);
            println!("Views:    {}", stats.total_views);
            println!("Likes:    {}", stats.total_likes);
            println!();
            for entry in &stats.views_by_category {
                println!(
                    "{:<13} {:>4} article(s) {:>8} views",
                    entry.category.as_str(),
                    entry.articles,
                    entry.views
                );
            }
            if !stats.most_viewed.is_empty() {
                println!();
                println!("Most viewed:");
                for top in &stats.most_viewed {
                    let prefix = format!("{:>8} ", top.views);
                    println!(
                        "{}{}",
                        prefix,
                        fit(&top.title, width.saturating_sub(display_width(&prefix)))
                    );
                }
            }
        }
    }

    Ok(())
}

fn run_draft(store: &mut NewsStore, action: DraftCommand, width: usize) -> Result<()> {
    match action {
        DraftCommand::Save { id, fields } => {
            let draft = store.save_draft(&id, fields.into_draft_patch())?;
            println!(
                "Saved draft {} at {}",
                draft.id,
                draft.last_saved_at.format("%Y-%m-%d %H:%M:%S")
            );
        }
        DraftCommand::Show { id: None } => {
            if store.drafts().is_empty() {
                println!("No drafts.");
            }
            for draft in store.drafts() {
                let prefix = format!("{:<16} ", fit(&draft.id, 16));
                let title = if draft.title.is_empty() {
                    "(untitled)"
                } else {
                    draft.title.as_str()
                };
                println!("{}{}", prefix, fit(title, width.saturating_sub(display_width(&prefix))));
            }
        }
        DraftCommand::Show { id: Some(id) } => {
            let draft = store
                .draft(&id)
                .with_context(|| format!("No draft with id {}", id))?;
            println!("{}", fit(&draft.title, width));
            println!("{} | {}", draft.category, fit(&draft.author, 40));
            println!(
                "Last saved {}",
                draft.last_saved_at.format("%Y-%m-%d %H:%M:%S")
            );
            println!();
            println!("{}", strip_control_chars(&draft.description));
            println!();
            println!("{}", strip_control_chars(&draft.content));
        }
        DraftCommand::Discard { id } => {
            if !store.delete_draft(&id) {
                anyhow::bail!("No draft with id {}", id);
            }
            println!("Discarded draft {}", id);
        }
    }
    Ok(())
}
