use anyhow::Context;
use clap::Parser;
use evidence_ai_rust::analyzer::{CacheFile, GeminiClient};
use evidence_ai_rust::cli::{Cli, Commands, PathArgs};
use evidence_ai_rust::config::Config;
use evidence_ai_rust::pipeline::{self, ValidateSettings};
use evidence_ai_rust::records::read_records;
use evidence_ai_rust::report::ConsoleReporter;
use evidence_ai_rust::server;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// コマンドラインで指定されたパスで設定を上書き
fn apply_paths(config: &mut Config, paths: PathArgs) {
    if let Some(p) = paths.workbook {
        config.workbook_path = p;
    }
    if let Some(s) = paths.sheet {
        config.sheet_name = s;
    }
    if let Some(p) = paths.evidence_dir {
        config.evidence_dir = p;
    }
    if let Some(p) = paths.records {
        config.records_path = p;
    }
    if let Some(p) = paths.results {
        config.results_path = p;
    }
}

fn run_prepare(config: &Config) -> anyhow::Result<()> {
    println!("[1/1] ワークブックを読み込み、証憑を割り当て中...");
    let summary = pipeline::prepare(config, &ConsoleReporter::new())
        .with_context(|| format!("ワークブックを処理できません: {}", config.workbook_path.display()))?;
    println!(
        "✔ {}件中 {}件に証憑を割り当て（証憑ファイル {}件）",
        summary.records, summary.matched, summary.catalog_files
    );
    println!("✔ 中間テーブル: {}", config.records_path.display());
    Ok(())
}

async fn run_validate(config: &Config, settings: ValidateSettings) -> anyhow::Result<()> {
    let api_key = config.get_api_key()?;
    let client = GeminiClient::new(api_key, config)?;

    let rows = read_records(&config.records_path)
        .with_context(|| format!("中間テーブルを読み込めません: {}", config.records_path.display()))?;
    let total = settings.limit.map_or(rows.len(), |n| n.min(rows.len()));

    println!(
        "[1/1] 証憑を検証中...{}",
        if settings.use_cache { " (キャッシュ有効)" } else { "" }
    );
    let reporter = ConsoleReporter::with_progress(total as u64);
    let outcome = pipeline::validate(config, &client, &settings, &reporter).await?;

    if let Some(archived) = &outcome.archived {
        println!("✔ 旧結果を退避: {}", archived.display());
    }
    println!("✔ 結果テーブル: {}", config.results_path.display());
    if let Some(xlsx) = &settings.xlsx {
        println!("✔ Excel出力: {}", xlsx.display());
    }
    for line in outcome.summary.lines() {
        println!("  {}", line);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load().context("設定ファイルを読み込めません")?;

    match cli.command {
        Commands::Prepare { paths } => {
            apply_paths(&mut config, paths);
            run_prepare(&config)?;
        }

        Commands::Validate { paths, limit, use_cache, xlsx } => {
            apply_paths(&mut config, paths);
            run_validate(&config, ValidateSettings { limit, use_cache, xlsx }).await?;
        }

        Commands::Run { paths, limit, use_cache, xlsx } => {
            apply_paths(&mut config, paths);
            run_prepare(&config)?;
            run_validate(&config, ValidateSettings { limit, use_cache, xlsx }).await?;
            println!("\n✅ 完了");
        }

        Commands::Serve { paths, host, port } => {
            apply_paths(&mut config, paths);
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            server::serve(&config).await?;
        }

        Commands::Config { set_api_key, show } => {
            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定:");
                println!("  設定ファイル: {}", Config::config_path()?.display());
                println!("  モデル: {}", config.model);
                println!("  温度: {}", config.temperature);
                println!("  最大出力トークン: {}", config.max_output_tokens);
                println!("  最大画像サイズ: {}px", config.max_image_size);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  ワークブック: {} [{}]", config.workbook_path.display(), config.sheet_name);
                println!("  証憑フォルダ: {}", config.evidence_dir.display());
                println!("  中間テーブル: {}", config.records_path.display());
                println!("  結果テーブル: {}", config.results_path.display());
                println!("  サーバー: {}:{}", config.server.host, config.server.port);
                println!(
                    "  APIキー: {}",
                    if config.get_api_key().is_ok() { "設定済み" } else { "未設定" }
                );
            }
        }

        Commands::Cache { results, info, clear } => {
            let results_path = results.unwrap_or_else(|| config.results_path.clone());
            let cache_path = CacheFile::cache_path(&results_path);

            if info || !clear {
                if cache_path.exists() {
                    let cache = CacheFile::load(&cache_path, &ConsoleReporter::new());
                    println!("キャッシュ情報:");
                    println!("  パス: {}", cache_path.display());
                    println!("  件数: {}", cache.len());
                    if let Ok(meta) = std::fs::metadata(&cache_path) {
                        println!("  サイズ: {} bytes", meta.len());
                    }
                } else {
                    println!("キャッシュファイルが存在しません: {}", cache_path.display());
                }
            }

            if clear {
                if CacheFile::remove(&cache_path)? {
                    println!("✔ キャッシュを削除しました: {}", cache_path.display());
                } else {
                    println!("キャッシュファイルが存在しません");
                }
            }
        }
    }

    Ok(())
}
