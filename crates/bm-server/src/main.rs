use anyhow::Context;
use bm_model::{parse_point, to_cc_string};
use bm_server::{demo_site_data, http, logging, App, ServerConfig, VERSION};
use bm_service::SiteData;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::net::SocketAddr;
use std::path::PathBuf;

fn cli() -> Command {
    Command::new("bm-server")
        .version(VERSION)
        .about("Breezemoon server")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("serve")
                .about("Serve the breezemoon routes over HTTP")
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML configuration file"),
                )
                .arg(
                    Arg::new("bind")
                        .long("bind")
                        .value_parser(value_parser!(SocketAddr))
                        .help("Listen address, overrides the configuration"),
                )
                .arg(
                    Arg::new("demo")
                        .long("demo")
                        .action(ArgAction::SetTrue)
                        .help("Seed demo users, follows and breezemoons"),
                ),
        )
        .subcommand(
            Command::new("color-code")
                .about("Print the color code for a point value")
                .arg(
                    Arg::new("point")
                        .required(true)
                        .allow_negative_numbers(true)
                        .help("Point value (32-bit signed integer)"),
                ),
        )
}

async fn serve(args: &ArgMatches) -> anyhow::Result<()> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ServerConfig::new(),
    }
    .apply_env()?;
    if let Some(bind) = args.get_one::<SocketAddr>("bind") {
        config = config.with_bind(*bind);
    }

    logging::init(&config.log_filter);

    let demo = args.get_flag("demo");
    let site = if demo { demo_site_data() } else { SiteData::default() };
    let app = App::new(config.clone(), site);
    if demo {
        let session = app.seed_demo().await?;
        println!("Demo session token: {}", session.token);
        println!("Demo CSRF token:    {}", session.csrf_token);
    }

    http::serve(&config, app.router).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("serve", args)) => serve(args).await,
        Some(("color-code", args)) => {
            let raw = args
                .get_one::<String>("point")
                .map(String::as_str)
                .unwrap_or_default();
            let point = parse_point(raw)?;
            println!("{}", to_cc_string(point));
            Ok(())
        }
        Some((other, _)) => anyhow::bail!("unknown subcommand {other}"),
        None => anyhow::bail!("no subcommand given"),
    }
}
