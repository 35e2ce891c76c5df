#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::process;

use anyhow::bail;
use anyhow::Error;
use anyhow::Result;
use uuid::Uuid;
use yansi::Paint;

use crate::application::cli;
use crate::application::repl;
use crate::configuration::security;
use crate::configuration::Config;
use crate::configuration::ConfigKey;

fn handle_error(err: Error) {
    eprintln!(
        "{}",
        Paint::red(format!(
            "Oh no! Cairn has failed with the following app version and error.\n\nVersion: {}\nCommit: {}\nError: {}",
            env!("CARGO_PKG_VERSION"),
            env!("VERGEN_GIT_DESCRIBE"),
            err
        ))
    );

    let backtrace = err.backtrace();
    if backtrace.to_string() == "disabled backtrace" {
        let args = env::args().collect::<Vec<String>>().join(" ");
        eprintln!("\nRunning the following can help explain further what the issue is:");
        eprintln!("\nRUST_BACKTRACE=1 {args}");
    } else {
        eprintln!("\n{}", backtrace);
    }

    process::exit(1);
}

fn resolve_user_id() -> Result<String> {
    if security::is_development_mode() {
        return Ok(Config::get(ConfigKey::DevUserID));
    }

    let user_id = Config::get(ConfigKey::UserID);
    if user_id.is_empty() {
        bail!("A user id is required outside the dev environment. Pass --user-id or set CAIRN_USER_ID.");
    }

    return Ok(user_id);
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let debug_log_dir = env::var("CAIRN_LOG_DIR").unwrap_or_else(|_| {
        return dirs::cache_dir()
            .unwrap()
            .join("cairn")
            .to_string_lossy()
            .to_string();
    });

    let file_appender = tracing_appender::rolling::never(debug_log_dir, "debug.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    if env::var("RUST_LOG")
        .unwrap_or_else(|_| return "".to_string())
        .contains("cairn")
    {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(writer)
            .init();
    }

    let ready_res = cli::parse().await;
    if let Err(ready_err) = ready_res {
        handle_error(ready_err);
        return;
    }
    if !ready_res.unwrap() {
        process::exit(0);
    }

    // Hosts embedding the client announce themselves; unknown origins are
    // turned away before any connection is made.
    if let Ok(origin) = env::var("CAIRN_EMBED_ORIGIN") {
        if !security::is_allowed_domain(&origin) {
            handle_error(anyhow::anyhow!(format!(
                "Embedding origin {origin} is not allowed"
            )));
            return;
        }
    }

    // One fresh conversation per process, like one per page load.
    let session_id = Uuid::new_v4().to_string();
    Config::set(ConfigKey::SessionID, &session_id);

    let user_id = match resolve_user_id() {
        Ok(user_id) => user_id,
        Err(err) => {
            handle_error(err);
            return;
        }
    };

    let res = repl::start(session_id, user_id).await;
    if res.is_err() {
        handle_error(res.unwrap_err());
    }

    process::exit(0);
}
