//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::fs;
use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use crate::adapters::api::ApiClient;
use crate::adapters::csv_adapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::session_file_adapter::SessionFileAdapter;
use crate::adapters::web::chart_svg::render_chart;
use crate::domain::chart::price_chart;
use crate::domain::error::QuantdeskError;
use crate::domain::experiment::{parse_experiment_yaml, validate_experiment};
use crate::domain::indicator::{calculate_ema, calculate_sma};
use crate::domain::session::SessionManager;
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::platform_port::PlatformPort;

#[derive(Parser, Debug)]
#[command(name = "quantdesk", about = "Desk client for a quant experiment platform")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the dashboard web server
    Serve {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Log in to the platform and cache the session
    Login {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        username: String,
    },
    /// Clear the cached session
    Logout {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols available on the platform
    Symbols {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Export an OHLCV window to CSV
    Export {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Render a price chart with indicator overlays to an SVG file
    Chart {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        /// SMA overlay period
        #[arg(long)]
        sma: Option<usize>,
        /// EMA overlay period
        #[arg(long)]
        ema: Option<usize>,
        /// Read bars from a CSV file instead of the platform
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Validate an experiment spec file
    Validate {
        #[arg(short, long)]
        file: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Serve { config } => run_serve(&config),
        Command::Login { config, username } => run_login(&config, &username),
        Command::Logout { config } => run_logout(&config),
        Command::Symbols { config } => run_symbols(&config),
        Command::Export {
            config,
            symbol,
            start,
            end,
            output,
        } => run_export(&config, &symbol, &start, &end, &output),
        Command::Chart {
            config,
            symbol,
            start,
            end,
            sma,
            ema,
            input,
            output,
        } => run_chart(&config, &symbol, &start, &end, sma, ema, input.as_ref(), &output),
        Command::Validate { file } => run_validate(&file),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = QuantdeskError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn build_sessions(config: &dyn ConfigPort) -> Arc<SessionManager> {
    let path = config
        .get_string("session", "file")
        .unwrap_or_else(|| "quantdesk-session.json".to_string());
    Arc::new(SessionManager::new(Arc::new(SessionFileAdapter::new(
        PathBuf::from(path),
    ))))
}

fn build_client(
    config: &dyn ConfigPort,
    sessions: Arc<SessionManager>,
) -> Result<Arc<ApiClient>, ExitCode> {
    ApiClient::from_config(config, sessions).map(Arc::new).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

fn runtime() -> Result<tokio::runtime::Runtime, ExitCode> {
    tokio::runtime::Runtime::new().map_err(|e| {
        eprintln!("error: failed to start runtime: {e}");
        ExitCode::from(1)
    })
}

fn parse_date(value: &str, name: &str) -> Result<NaiveDate, ExitCode> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        eprintln!("error: invalid {name} (expected YYYY-MM-DD): {value}");
        ExitCode::from(2)
    })
}

fn run_serve(config_path: &PathBuf) -> ExitCode {
    use crate::adapters::web::{build_router, AppState};
    use std::net::SocketAddr;

    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let sessions = build_sessions(&config);
    let client = match build_client(&config, sessions.clone()) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let addr: SocketAddr = config
        .get_string("web", "listen")
        .unwrap_or_else(|| "127.0.0.1:3000".to_string())
        .parse()
        .unwrap_or_else(|_| "127.0.0.1:3000".parse().unwrap());

    eprintln!("Starting web server on {}", addr);

    let state = AppState {
        market: client.clone(),
        platform: client,
        sessions,
        config: Arc::new(config),
    };
    let router = build_router(state);

    let rt = match runtime() {
        Ok(rt) => rt,
        Err(code) => return code,
    };
    let served = rt.block_on(async {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await
    });

    match served {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: server failed: {e}");
            ExitCode::from(1)
        }
    }
}

fn run_login(config_path: &PathBuf, username: &str) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let sessions = build_sessions(&config);
    let client = match build_client(&config, sessions.clone()) {
        Ok(c) => c,
        Err(code) => return code,
    };

    eprintln!("Password for {}:", username);
    let stdin = std::io::stdin();
    let password = match stdin.lock().lines().next() {
        Some(Ok(line)) => line,
        _ => {
            eprintln!("error: failed to read password");
            return ExitCode::from(1);
        }
    };

    let rt = match runtime() {
        Ok(rt) => rt,
        Err(code) => return code,
    };
    match rt.block_on(client.login(username, &password)) {
        Ok(session) => {
            let label = session.user.label().to_string();
            if let Err(e) = sessions.install(session) {
                eprintln!("error: {e}");
                return ExitCode::from(&e);
            }
            println!("Logged in as {}", label);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

fn run_logout(config_path: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let sessions = build_sessions(&config);
    match sessions.teardown() {
        Ok(()) => {
            println!("Session cleared");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

fn run_symbols(config_path: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let sessions = build_sessions(&config);
    let client = match build_client(&config, sessions) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let rt = match runtime() {
        Ok(rt) => rt,
        Err(code) => return code,
    };
    match rt.block_on(client.list_symbols()) {
        Ok(symbols) => {
            for symbol in symbols {
                println!("{}", symbol);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

fn run_export(
    config_path: &PathBuf,
    symbol: &str,
    start: &str,
    end: &str,
    output: &PathBuf,
) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let start_date = match parse_date(start, "start") {
        Ok(d) => d,
        Err(code) => return code,
    };
    let end_date = match parse_date(end, "end") {
        Ok(d) => d,
        Err(code) => return code,
    };

    let sessions = build_sessions(&config);
    let client = match build_client(&config, sessions) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let rt = match runtime() {
        Ok(rt) => rt,
        Err(code) => return code,
    };
    let bars = match rt.block_on(client.fetch_ohlcv(symbol, start_date, end_date)) {
        Ok(bars) => bars,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    match csv_adapter::write_ohlcv(output, &bars) {
        Ok(()) => {
            eprintln!("Wrote {} bars to {}", bars.len(), output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_chart(
    config_path: &PathBuf,
    symbol: &str,
    start: &str,
    end: &str,
    sma: Option<usize>,
    ema: Option<usize>,
    input: Option<&PathBuf>,
    output: &PathBuf,
) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let start_date = match parse_date(start, "start") {
        Ok(d) => d,
        Err(code) => return code,
    };
    let end_date = match parse_date(end, "end") {
        Ok(d) => d,
        Err(code) => return code,
    };

    let bars = if let Some(path) = input {
        match csv_adapter::read_ohlcv(path, symbol) {
            Ok(bars) => bars
                .into_iter()
                .filter(|b| b.date >= start_date && b.date <= end_date)
                .collect(),
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::from(&e);
            }
        }
    } else {
        let sessions = build_sessions(&config);
        let client = match build_client(&config, sessions) {
            Ok(c) => c,
            Err(code) => return code,
        };
        let rt = match runtime() {
            Ok(rt) => rt,
            Err(code) => return code,
        };
        match rt.block_on(client.fetch_ohlcv(symbol, start_date, end_date)) {
            Ok(bars) => bars,
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::from(&e);
            }
        }
    };

    let mut overlays = Vec::new();
    if let Some(period) = sma {
        overlays.push(calculate_sma(&bars, period));
    }
    if let Some(period) = ema {
        overlays.push(calculate_ema(&bars, period));
    }

    let svg = render_chart(&price_chart(symbol, &bars, &overlays));
    match fs::write(output, svg) {
        Ok(()) => {
            eprintln!("Chart written to {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to write chart: {e}");
            ExitCode::from(1)
        }
    }
}

fn run_validate(file: &PathBuf) -> ExitCode {
    let content = match fs::read_to_string(file) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: failed to read {}: {}", file.display(), e);
            return ExitCode::from(1);
        }
    };

    let spec = match parse_experiment_yaml(&content) {
        Ok(spec) => spec,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    let errors = validate_experiment(&spec);
    if errors.is_empty() {
        println!("{} is valid", file.display());
        ExitCode::SUCCESS
    } else {
        for error in &errors {
            eprintln!("{}: {}", error.field, error.message);
        }
        ExitCode::from(5)
    }
}
