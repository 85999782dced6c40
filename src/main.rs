use clap::Parser;
use nj_tax_lookup::core::Presenter;
use nj_tax_lookup::utils::{logger, validation::Validate};
use nj_tax_lookup::{
    CliConfig, JsonPresenter, LookupConfig, LookupEngine, LookupError, OutputFormat, SiteFetcher,
    TextPresenter, TomlConfig,
};
use std::io::{BufRead, Write};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    let file = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            TomlConfig::from_file(path).unwrap_or_else(|e| exit_with(&e))
        }
        None => TomlConfig::default(),
    };
    if let Err(e) = file.validate() {
        exit_with(&e);
    }

    if cli.list_sites {
        print_sites(&file);
        return;
    }

    let config =
        LookupConfig::resolve(&file, &cli.overrides()).unwrap_or_else(|e| exit_with(&e));

    let address = match &cli.address {
        Some(address) => address.clone(),
        None => prompt_address(config.site.display_title())
            .unwrap_or_else(|e| exit_with(&LookupError::IoError(e))),
    };

    let site_name = config.site.name.clone();
    let show_diagnostics = config.show_diagnostics;
    let fetcher = SiteFetcher::for_config(config).unwrap_or_else(|e| exit_with(&e));
    let engine = LookupEngine::new(fetcher, site_name);

    let report = engine.run(&address).await;

    let presenter: Box<dyn Presenter> = match cli.format {
        OutputFormat::Text => Box::new(TextPresenter::new(show_diagnostics)),
        OutputFormat::Json => Box::new(JsonPresenter),
    };
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = presenter.present(&report, &mut out) {
        exit_with(&e);
    }
    if let Err(e) = out.flush() {
        exit_with(&LookupError::IoError(e));
    }

    let exit_code = report.outcome.exit_code();
    if exit_code > 0 {
        std::process::exit(exit_code);
    }
}

fn prompt_address(title: &str) -> std::io::Result<String> {
    let mut err = std::io::stderr();
    writeln!(err, "{}", title)?;
    writeln!(err, "Format: number + street name + abbreviated type")?;
    writeln!(err, "Example: \"192 olean ave\" or \"413 summit ave\"")?;
    write!(err, "Property Address: ")?;
    err.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

fn print_sites(file: &TomlConfig) {
    let default_site = file
        .lookup
        .default_site
        .as_deref()
        .unwrap_or(nj_tax_lookup::config::site::DEFAULT_SITE);

    println!("📋 Site profiles:");
    for site in file.all_sites() {
        let marker = if site.name == default_site { "*" } else { " " };
        println!(
            " {} {:<22} {:<8} {}",
            marker,
            site.name,
            format!("{:?}", site.access).to_lowercase(),
            site.description.as_deref().unwrap_or(&site.search_url)
        );
    }
}

fn exit_with(e: &LookupError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}
