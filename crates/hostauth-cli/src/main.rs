use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use hostauth_api::HostAuthError;
use hostauth_core::{
    CONFIG_FILE_NAME, SdkConfig, UrlHelper, default_config_dir, load_config_from_dir,
    write_default_config_file,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "hostauth", about = "Build URLs for a hosted identity provider")]
struct Cli {
    #[arg(long, global = true)]
    json: bool,

    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write a default sdk.toml into the config directory
    Init {
        /// Replace an existing sdk.toml
        #[arg(long)]
        force: bool,
    },
    /// Show the effective SDK configuration
    Config,
    /// Print every provider URL
    Urls {
        /// Opaque value echoed back after login/register redirects
        #[arg(long)]
        state: Option<String>,
    },
    /// Print a single provider URL
    Url {
        kind: UrlKind,
        #[arg(long)]
        state: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum UrlKind {
    Profile,
    Login,
    Register,
    Logout,
    Refresh,
}

impl UrlKind {
    const ALL: [UrlKind; 5] = [
        UrlKind::Profile,
        UrlKind::Login,
        UrlKind::Register,
        UrlKind::Logout,
        UrlKind::Refresh,
    ];

    fn as_str(self) -> &'static str {
        match self {
            UrlKind::Profile => "profile",
            UrlKind::Login => "login",
            UrlKind::Register => "register",
            UrlKind::Logout => "logout",
            UrlKind::Refresh => "refresh",
        }
    }

    fn build(self, urls: &UrlHelper, state: Option<&str>) -> String {
        let url = match self {
            UrlKind::Profile => urls.profile_url(),
            UrlKind::Login => urls.login_url(state),
            UrlKind::Register => urls.register_url(state),
            UrlKind::Logout => urls.logout_url(),
            UrlKind::Refresh => urls.refresh_url(),
        };
        url.into()
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let cfg_dir = cli.config_dir.clone().unwrap_or_else(default_config_dir);

    match cli.command {
        Commands::Init { force } => {
            let existing = cfg_dir.join(CONFIG_FILE_NAME);
            if force && existing.exists() {
                fs::remove_file(&existing)?;
            }
            let path = write_default_config_file(&cfg_dir)?;
            pout(
                cli.json,
                serde_json::json!({"message":"init complete","config_file":path}),
                &format!("Init complete: {}", path.display()),
            )?;
        }
        Commands::Config => {
            let config = resolve_config(&cfg_dir)?;
            pout(cli.json, serde_json::to_value(&config)?, &render_config(&config))?;
        }
        Commands::Urls { state } => {
            let urls = UrlHelper::from_sdk_config(&resolve_config(&cfg_dir)?)?;
            let built: Vec<(UrlKind, String)> = UrlKind::ALL
                .iter()
                .map(|kind| (*kind, kind.build(&urls, state.as_deref())))
                .collect();

            let value = built
                .iter()
                .map(|(kind, url)| (kind.as_str().to_string(), serde_json::json!(url)))
                .collect::<serde_json::Map<_, _>>();
            let text = built
                .iter()
                .map(|(kind, url)| format!("{:<9} {url}", kind.as_str()))
                .collect::<Vec<_>>()
                .join("\n");
            pout(cli.json, serde_json::Value::Object(value), &text)?;
        }
        Commands::Url { kind, state } => {
            let urls = UrlHelper::from_sdk_config(&resolve_config(&cfg_dir)?)?;
            let url = kind.build(&urls, state.as_deref());
            pout(
                cli.json,
                serde_json::json!({"kind":kind.as_str(),"url":url}),
                &url,
            )?;
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// `sdk.toml` in `cfg_dir`, falling back to `HOSTAUTH_*` environment variables.
fn resolve_config(cfg_dir: &Path) -> anyhow::Result<SdkConfig> {
    match load_config_from_dir(cfg_dir) {
        Ok(config) => Ok(config),
        Err(HostAuthError::NotFound(reason)) => {
            tracing::debug!(%reason, "no config file, reading environment");
            SdkConfig::from_env().with_context(|| {
                format!(
                    "no usable {CONFIG_FILE_NAME} in {}; run `hostauth init` or set HOSTAUTH_* variables",
                    cfg_dir.display()
                )
            })
        }
        Err(e) => Err(e.into()),
    }
}

fn render_config(config: &SdkConfig) -> String {
    let urls = match UrlHelper::from_sdk_config(config) {
        Ok(urls) => urls,
        Err(e) => return format!("invalid configuration: {e}"),
    };
    [
        format!("server_url         {}", urls.server_url()),
        format!("client_id          {}", urls.client_id()),
        format!("redirect_uri       {}", urls.redirect_uri()),
        format!("profile_path       {}", urls.profile_path()),
        format!("login_path         {}", urls.login_path()),
        format!("register_path      {}", urls.register_path()),
        format!("logout_path        {}", urls.logout_path()),
        format!("refresh_path       {}", urls.refresh_path()),
        format!("auto_fetch_user    {}", config.should_auto_fetch_user_info),
        format!("auto_refresh       {}", config.should_auto_refresh),
        format!(
            "refresh_before_exp {}s",
            config.auto_refresh_seconds_before_expiry
        ),
    ]
    .join("\n")
}

fn pout(json_mode: bool, value: serde_json::Value, text: &str) -> anyhow::Result<()> {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{text}");
    }
    Ok(())
}
