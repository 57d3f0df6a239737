//! Blog Publisher CLI
//!
//! Multi-platform article publishing assistant

use anyhow::Result;
use blog_publisher::core::config::{AppConfig, DevtoConfig, HashnodeConfig, MediumConfig};
use blog_publisher::core::config_loader::{ConfigLoadOptions, ConfigLoader, CONFIG_FILENAME};
use blog_publisher::core::traits::{Platform, PublishStatus};
use blog_publisher::{Article, ArticleScanner, PostOrchestrator, PublishHistory, TokenStore};
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Multi-platform article publishing assistant
#[derive(Parser)]
#[command(name = "blog-publisher")]
#[command(version = "0.1.0")]
#[command(about = "Multi-platform article publishing assistant", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish an article to every platform with a configured token
    Publish {
        /// Article title
        #[arg(short, long)]
        title: Option<String>,

        /// Path to the markdown file containing the article content
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Hashnode blog domain (e.g., yourblog.hashnode.dev)
        #[arg(long)]
        host: Option<String>,

        /// Canonical URL attached to the published posts
        #[arg(long)]
        canonical_url: Option<String>,

        /// Comma-separated tags for Dev.to and Hashnode
        #[arg(long)]
        tags: Option<String>,

        /// Create drafts instead of public posts where supported
        #[arg(long)]
        draft: bool,

        /// Non-interactive mode (CI/CD): never prompt, skip platforms
        /// without a token
        #[arg(long)]
        non_interactive: bool,

        /// Skip the pre-publish article secret scan
        #[arg(long)]
        skip_scan: bool,
    },

    /// Verify that each configured token authenticates against its platform
    Check,

    /// Manage saved tokens and settings
    Tokens {
        #[command(subcommand)]
        command: TokenCommands,
    },

    /// Display publishing statistics
    Stats,

    /// Initialize blog-publisher configuration
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum TokenCommands {
    /// List saved keys with masked values
    List,

    /// Save a value (prompts when --value is omitted)
    Set {
        /// Key to save (medium_token, devto_token, hashnode_token,
        /// file_path, host)
        key: String,

        #[arg(long)]
        value: Option<String>,
    },

    /// Delete a saved value
    Delete {
        /// Key to delete
        key: String,
    },
}

#[tokio::main]
async fn main() {
    let result = run().await;

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("\n❌ Error");
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Publish {
            title,
            file,
            host,
            canonical_url,
            tags,
            draft,
            non_interactive,
            skip_scan,
        } => {
            publish_command(
                title,
                file,
                host,
                canonical_url,
                tags,
                draft,
                non_interactive,
                skip_scan,
            )
            .await
        }
        Commands::Check => check_command().await,
        Commands::Tokens { command } => tokens_command(command).await,
        Commands::Stats => stats_command().await,
        Commands::Init { force } => init_command(force).await,
    }
}

async fn publish_command(
    title: Option<String>,
    file: Option<PathBuf>,
    host: Option<String>,
    canonical_url: Option<String>,
    tags: Option<String>,
    draft: bool,
    non_interactive: bool,
    skip_scan: bool,
) -> Result<i32> {
    println!("\n📝 blog-publisher\n");

    let config = ConfigLoader::load(ConfigLoadOptions::for_project(".")).await?;
    let store = TokenStore::new();

    // Resolve the article triple: title, file path, body
    let title = match title {
        Some(title) => title,
        None if non_interactive => {
            anyhow::bail!("タイトルが指定されていません（--title）");
        }
        None => prompt("記事のタイトルを入力してください: ").await?,
    };
    if title.trim().is_empty() {
        anyhow::bail!("タイトルは必須です");
    }

    let file = resolve_setting(
        &store,
        "file_path",
        file.map(|p| p.display().to_string()),
        config.article.as_ref().and_then(|a| a.file_path.clone()),
        "マークダウンファイルのパスを入力してください: ",
        non_interactive,
    )
    .await?
    .ok_or_else(|| anyhow::anyhow!("ファイルパスが指定されていません（--file）"))?;

    let canonical_url = canonical_url.or_else(|| {
        config
            .article
            .as_ref()
            .and_then(|a| a.canonical_url.clone())
    });

    let article = Article::from_file(&file, title, canonical_url).await?;

    // Pre-publish secret scan
    if !skip_scan && config.scan_article() {
        let report = ArticleScanner::new().scan(&article.body_markdown);
        if report.has_secrets {
            println!("⚠️  記事に機密情報らしき文字列が検出されました:");
            for finding in &report.findings {
                println!(
                    "  - L{} [{}] {}: {}",
                    finding.line, finding.severity, finding.secret_type, finding.matched
                );
            }

            if non_interactive {
                println!("  ⚠️  non-interactiveモードのため続行します\n");
            } else if !confirm("⚠️  このまま公開を続行しますか？").await? {
                println!("公開を中止しました");
                return Ok(1);
            }
        } else {
            println!("🔒 機密情報は検出されませんでした\n");
        }
    }

    // Gather per-platform credentials; platforms without one are skipped
    let credentials = gather_credentials(&store, non_interactive).await?;

    if credentials.is_empty() {
        println!("\n⚠️  投稿を試行できるプラットフォームがありません（トークン未設定）");
        return Ok(1);
    }

    // The Hashnode host is only needed when Hashnode will be attempted
    let host = if credentials.contains_key(&Platform::Hashnode) {
        resolve_setting(
            &store,
            "host",
            host,
            config
                .platforms
                .hashnode
                .as_ref()
                .and_then(|h| h.host.clone()),
            "Hashnodeのブログドメインを入力してください: ",
            non_interactive,
        )
        .await?
    } else {
        host
    };

    let mut targets = config.to_targets(host.as_deref());
    if let Some(ref tags) = tags {
        let tags: Vec<String> = tags
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        targets.devto.tags = tags.clone();
        targets.hashnode.tags = tags;
    }
    if draft {
        targets.medium.publish_status = PublishStatus::Draft;
        targets.devto.published = false;
    }

    println!(
        "\n📤 {}件のプラットフォームへ投稿します: {}\n",
        credentials.len(),
        Platform::ALL
            .iter()
            .filter(|p| credentials.contains_key(*p))
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let orchestrator = PostOrchestrator::new(Duration::from_secs(config.timeout_secs()))?;
    let report = orchestrator
        .publish_to_all(&article, &credentials, &targets)
        .await;

    report.print_summary();

    // Record history; a failure here never changes the publish outcome
    let mut history = PublishHistory::new();
    if let Err(e) = history.initialize().await {
        eprintln!("⚠️  履歴の初期化に失敗しました: {}", e);
    }
    if let Err(e) = history.record_report(&article.title, &report).await {
        eprintln!("⚠️  履歴の記録に失敗しました: {}", e);
    }

    Ok(if report.all_succeeded { 0 } else { 1 })
}

async fn check_command() -> Result<i32> {
    println!("\n🔍 トークンの確認\n");

    let config = ConfigLoader::load(ConfigLoadOptions::for_project(".")).await?;
    let store = TokenStore::new();

    let mut credentials = HashMap::new();
    for platform in Platform::ALL {
        match store.token_for(platform) {
            Some(token) => {
                credentials.insert(platform, token);
            }
            None => println!("⏭️  {}: トークンが未設定のためスキップします", platform),
        }
    }

    if credentials.is_empty() {
        println!("\n⚠️  確認できるトークンがありません");
        return Ok(1);
    }

    let orchestrator = PostOrchestrator::new(Duration::from_secs(config.timeout_secs()))?;
    let report = orchestrator.check_all(&credentials).await;

    report.print_summary();

    Ok(if report.all_succeeded { 0 } else { 1 })
}

async fn tokens_command(command: TokenCommands) -> Result<i32> {
    let store = TokenStore::new();

    match command {
        TokenCommands::List => {
            let saved = store.list_saved()?;

            if saved.is_empty() {
                println!("保存済みの値はありません");
            } else {
                println!("保存済みの値:");
                for (key, masked) in saved {
                    println!("  - {}: {}", key, masked);
                }
            }
            Ok(0)
        }
        TokenCommands::Set { key, value } => {
            let value = match value {
                Some(value) => value,
                None => prompt(&format!("{}の値を入力してください: ", key)).await?,
            };

            store.put(&key, &value)?;
            println!("✅ {}を保存しました", key);
            Ok(0)
        }
        TokenCommands::Delete { key } => {
            if store.delete(&key)? {
                println!("✅ {}を削除しました", key);
                Ok(0)
            } else {
                println!("⚠️  {}は保存されていません", key);
                Ok(1)
            }
        }
    }
}

async fn stats_command() -> Result<i32> {
    println!("\n📊 投稿統計\n");

    let mut history = PublishHistory::new();
    history.initialize().await?;

    println!("{}", history.markdown_summary());

    Ok(0)
}

async fn init_command(force: bool) -> Result<i32> {
    println!("\n🎯 blog-publisherの初期化\n");

    let path = PathBuf::from(CONFIG_FILENAME);
    if tokio::fs::metadata(&path).await.is_ok() && !force {
        println!("⚠️  {}は既に存在します（--forceで上書き）", CONFIG_FILENAME);
        return Ok(1);
    }

    let mut config = AppConfig::default();
    config.platforms.medium = Some(MediumConfig {
        publish_status: Some(PublishStatus::Public),
    });
    config.platforms.devto = Some(DevtoConfig {
        tags: Some(Vec::new()),
        published: Some(true),
    });
    config.platforms.hashnode = Some(HashnodeConfig {
        host: Some("yourblog.hashnode.dev".to_string()),
        tags: Some(Vec::new()),
    });

    tokio::fs::write(&path, serde_yaml::to_string(&config)?).await?;

    println!("✅ {}を作成しました", CONFIG_FILENAME);
    Ok(0)
}

/// Resolve one setting: flag > saved value > config default > prompt
///
/// Values entered at the prompt can be saved for future runs.
async fn resolve_setting(
    store: &TokenStore,
    key: &str,
    flag: Option<String>,
    config_default: Option<String>,
    prompt_message: &str,
    non_interactive: bool,
) -> Result<Option<String>> {
    if let Some(value) = flag.filter(|v| !v.trim().is_empty()) {
        return Ok(Some(value));
    }

    if let Some(saved) = store.get(key) {
        use secrecy::ExposeSecret;
        println!("保存済みの{}を使用します", key);
        return Ok(Some(saved.expose_secret().to_string()));
    }

    if let Some(value) = config_default.filter(|v| !v.trim().is_empty()) {
        return Ok(Some(value));
    }

    if non_interactive {
        return Ok(None);
    }

    let input = prompt(prompt_message).await?;
    if input.is_empty() {
        return Ok(None);
    }

    if confirm("この値を保存しますか？").await? {
        if let Err(e) = store.put(key, &input) {
            eprintln!("⚠️  保存に失敗しました: {}", e);
        } else {
            println!("✅ 保存しました");
        }
    }

    Ok(Some(input))
}

/// Collect tokens for every platform; missing ones are prompted for in
/// interactive mode, otherwise the platform is skipped
async fn gather_credentials(
    store: &TokenStore,
    non_interactive: bool,
) -> Result<HashMap<Platform, SecretString>> {
    let mut credentials = HashMap::new();

    for platform in Platform::ALL {
        match store.token_for(platform) {
            Some(token) => {
                credentials.insert(platform, token);
            }
            None if non_interactive => {
                println!("⏭️  {}: トークンが未設定のためスキップします", platform);
            }
            None => {
                let input = prompt(&format!(
                    "{}のトークンを入力してください（空でスキップ）: ",
                    platform
                ))
                .await?;

                if input.is_empty() {
                    println!("⏭️  {}: スキップします", platform);
                    continue;
                }

                if confirm("このトークンを保存しますか？").await? {
                    if let Err(e) = store.put(platform.token_key(), &input) {
                        eprintln!("⚠️  保存に失敗しました: {}", e);
                    }
                }

                credentials.insert(platform, SecretString::from(input));
            }
        }
    }

    Ok(credentials)
}

/// Prompt for one line of input
async fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush().await?;

    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin);
    let mut answer = String::new();

    reader.read_line(&mut answer).await?;

    Ok(answer.trim().to_string())
}

/// Prompt user for confirmation
async fn confirm(message: &str) -> Result<bool> {
    let answer = prompt(&format!("{} (yes/no): ", message)).await?;
    let answer = answer.to_lowercase();
    Ok(answer == "yes" || answer == "y")
}
