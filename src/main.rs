use clap::{CommandFactory, Parser};
use vault_csv_sync::config::LogFormat;
use vault_csv_sync::utils::{logger, validation::Validate};
use vault_csv_sync::{CliConfig, SyncConfig, SyncEngine, SyncError, VaultClient};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 解析並驗證配置，失敗時不連線 Vault
    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            eprintln!();
            let _ = CliConfig::command().print_help();
            std::process::exit(e.exit_code());
        }
    };

    // 初始化日誌
    match config.log_format {
        LogFormat::Text => logger::init_cli_logger(config.verbose),
        LogFormat::Json => logger::init_json_logger(config.verbose),
    }
    tracing::debug!("Resolved config: {:?}", config);

    let client = match VaultClient::new(&config.vault) {
        Ok(client) => client,
        Err(e) => fail(e),
    };

    let log_format = config.log_format;
    let engine = SyncEngine::new(client, config);
    match engine.run().await {
        Ok(report) if log_format == LogFormat::Json => match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => fail(e),
        },
        Ok(report) => {
            println!("{}", report.summary_line());
            if report.has_errors() {
                println!(
                    "{} of {} secrets could not be {}",
                    report.total_errors,
                    report.total_records,
                    report.operation.verb()
                );
            }
        }
        Err(e) => fail(e),
    }
}

fn resolve_config(cli: &CliConfig) -> vault_csv_sync::Result<SyncConfig> {
    let config = cli.resolve()?;
    config.validate()?;
    Ok(config)
}

fn fail(e: SyncError) -> ! {
    tracing::error!(
        "❌ Run aborted: {} (Category: {:?})",
        e,
        e.category()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    std::process::exit(e.exit_code());
}
