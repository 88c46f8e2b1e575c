use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use bff::{AppState, BffConfig};
use lesson_core::rbac::AuthUser;
use services::api::{UpstreamRequest, paths};
use services::config::{API_URL_ENV, DEFAULT_API_URL};
use services::{ApiConfig, Clock, HttpLessonApi, LessonStore, UpstreamClient};
use ui::{App, UiApp, build_app_context};

const DEFAULT_LOG_FILTER: &str = "app=info,bff=debug,services=info,ui=info,tower_http=info";

#[derive(Parser, Debug)]
#[command(version, about = "Fast Learners lesson client and backend-for-frontend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP backend-for-frontend.
    Serve(ServeArgs),
    /// Open the desktop lesson client.
    Ui(UiArgs),
}

#[derive(Args, Debug)]
struct ApiArgs {
    /// Base URL of the upstream REST API.
    #[arg(long, env = API_URL_ENV, default_value = DEFAULT_API_URL)]
    api_url: String,
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[arg(short, long, env = "FL_BFF_ADDRESS", default_value = bff::names::DEFAULT_ADDRESS)]
    address: SocketAddr,

    /// Mark session cookies `Secure`.
    #[arg(long, env = "FL_SECURE_COOKIES")]
    secure_cookies: bool,

    #[command(flatten)]
    api: ApiArgs,
}

#[derive(Args, Debug)]
struct UiArgs {
    /// Bearer token of a signed-in learner.
    #[arg(long, env = "FL_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(flatten)]
    api: ApiArgs,
}

struct DesktopApp {
    store: LessonStore,
    user: Option<AuthUser>,
}

impl UiApp for DesktopApp {
    fn lesson_store(&self) -> LessonStore {
        self.store.clone()
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.user.clone()
    }
}

/// The URL comes from the command line; the timeout still comes from the environment.
fn api_config(args: &ApiArgs) -> Result<ApiConfig> {
    ApiConfig::from_lookup(|key| {
        if key == API_URL_ENV {
            Some(args.api_url.clone())
        } else {
            env::var(key).ok()
        }
    })
    .wrap_err("invalid upstream API configuration")
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .wrap_err("failed to start the async runtime")
}

fn serve(args: ServeArgs) -> Result<()> {
    let api = api_config(&args.api)?;
    let config = BffConfig {
        address: args.address,
        secure_cookies: args.secure_cookies,
    };
    tracing::info!(upstream = %api.base_url, "starting bff");

    runtime()?.block_on(async move {
        bff::serve(&config, AppState::new(api, config.secure_cookies))
            .await
            .wrap_err_with(|| format!("bff stopped on {}", config.address))
    })
}

/// Look up who the token belongs to. A failed lookup leaves the client signed out.
async fn load_profile(api: ApiConfig, token: &str) -> Option<AuthUser> {
    let client = UpstreamClient::new(api);
    let request = UpstreamRequest::get(paths::PROFILE).bearer(Some(token));
    let content = match client.send_content(&request).await {
        Ok(content) => content,
        Err(err) => {
            tracing::warn!(error = %err, "profile lookup failed");
            return None;
        }
    };
    let user = content.get("user").cloned().unwrap_or(content);
    match serde_json::from_value::<AuthUser>(user) {
        Ok(user) => Some(user),
        Err(err) => {
            tracing::warn!(error = %err, "profile payload not understood");
            None
        }
    }
}

fn launch_ui(args: UiArgs) -> Result<()> {
    let api = api_config(&args.api)?;
    let token = args.token.filter(|token| !token.trim().is_empty());

    // The desktop launcher owns its own runtime, so this one is dropped first.
    let user = match token.as_deref() {
        Some(token) => runtime()?.block_on(load_profile(api.clone(), token)),
        None => None,
    };
    tracing::info!(
        upstream = %api.base_url,
        signed_in = user.is_some(),
        "opening lesson client"
    );

    let store = LessonStore::new(Arc::new(HttpLessonApi::new(api, token)), Clock::system());
    let app: Arc<dyn UiApp> = Arc::new(DesktopApp { store, user });
    let context = build_app_context(&app);

    // On macOS, Dioxus/tao can default to an always-on-top window in some dev setups.
    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Fast Learners")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve(args) => serve(args),
        Command::Ui(args) => launch_ui(args),
    }
}
