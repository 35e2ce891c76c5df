use std::io;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use crate::application::repl::help_text;
use crate::configuration::Config;
use crate::configuration::ConfigKey;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = std::path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if !config_file_path.parent().unwrap().exists() {
        fs::create_dir_all(config_file_path.parent().unwrap()).await?;
    }

    let mut file = fs::File::create(config_file_path.clone()).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    let config_path_display = config_file_path.as_os_str().to_str().unwrap();
    println!("Created default config file at {config_path_display}");
    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(clap::ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn arg_server_url() -> Arg {
    return Arg::new(ConfigKey::ServerURL.to_string())
        .long(ConfigKey::ServerURL.to_string())
        .env("CAIRN_SERVER_URL")
        .num_args(1)
        .help(format!(
            "WebSocket endpoint of the assistant server. [default: {}]",
            Config::default(ConfigKey::ServerURL)
        ))
        .global(true);
}

fn arg_api_base_url() -> Arg {
    return Arg::new(ConfigKey::ApiBaseURL.to_string())
        .short('a')
        .long(ConfigKey::ApiBaseURL.to_string())
        .env("CAIRN_API_BASE_URL")
        .num_args(1)
        .help(format!(
            "Base URL for the auxiliary HTTP API. [default: {}]",
            Config::default(ConfigKey::ApiBaseURL)
        ))
        .global(true);
}

fn arg_user_id() -> Arg {
    return Arg::new(ConfigKey::UserID.to_string())
        .short('u')
        .long(ConfigKey::UserID.to_string())
        .env("CAIRN_USER_ID")
        .num_args(1)
        .help("User identity attached to every outbound frame. Required outside the dev environment.")
        .global(true);
}

fn arg_environment() -> Arg {
    return Arg::new(ConfigKey::Environment.to_string())
        .long(ConfigKey::Environment.to_string())
        .env("CAIRN_ENV")
        .num_args(1)
        .help(format!(
            "Deployment environment, which decides how the user id is bootstrapped. [default: {}]",
            Config::default(ConfigKey::Environment)
        ))
        .value_parser(PossibleValuesParser::new(["dev", "production"]))
        .global(true);
}

fn arg_dev_user_id() -> Arg {
    return Arg::new(ConfigKey::DevUserID.to_string())
        .long(ConfigKey::DevUserID.to_string())
        .env("CAIRN_DEV_USER_ID")
        .num_args(1)
        .help(format!(
            "User id assumed when running in the dev environment. [default: {}]",
            Config::default(ConfigKey::DevUserID)
        ))
        .global(true);
}

fn arg_allowed_embed_domain() -> Arg {
    return Arg::new(ConfigKey::AllowedEmbedDomain.to_string())
        .long(ConfigKey::AllowedEmbedDomain.to_string())
        .env("CAIRN_ALLOWED_EMBED_DOMAIN")
        .num_args(1)
        .help(format!(
            "Domain allowed to embed the client, subdomains included. [default: {}]",
            Config::default(ConfigKey::AllowedEmbedDomain)
        ))
        .global(true);
}

fn arg_heartbeat_interval() -> Arg {
    return Arg::new(ConfigKey::HeartbeatInterval.to_string())
        .long(ConfigKey::HeartbeatInterval.to_string())
        .env("CAIRN_HEARTBEAT_INTERVAL")
        .num_args(1)
        .help(format!(
            "Seconds between keep-alive pings while connected. [default: {}]",
            Config::default(ConfigKey::HeartbeatInterval)
        ))
        .global(true);
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("COMMANDS:") {
                return Paint::new(format!("CHAT {line}"))
                    .underline()
                    .bold()
                    .to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );

    return Command::new("cairn")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .arg(arg_server_url())
        .arg(arg_api_base_url())
        .arg(arg_user_id())
        .arg(arg_environment())
        .arg(arg_dev_user_id())
        .arg(arg_allowed_embed_domain())
        .arg(arg_heartbeat_interval())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("CAIRN_CONFIG_FILE")
                .num_args(1)
                .help(format!(
                    "Path to configuration file [default: {}]",
                    Config::default(ConfigKey::ConfigFile)
                ))
                .global(true),
        );
}

pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(false);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(false);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(false);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(false);
            }
        },
        _ => {
            Config::load(build(), vec![&matches]).await?;
        }
    }

    return Ok(true);
}
