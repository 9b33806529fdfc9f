use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::{error, info};

use album_catalog::build_rocket;
use album_catalog::config::AppConfig;
use album_catalog::database::Catalog;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Optional TOML config file; HOST, PORT, MONGODB_URI and MONGODB_DB override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[rocket::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let app = match AppConfig::load(args.config.as_deref()) {
        Ok(app) => app,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    // serve immediately; store routes answer 503 until the connection is up
    let catalog = Catalog::connecting();
    let connector = catalog.clone();
    let database = app.database.clone();
    rocket::tokio::spawn(async move {
        connector.connect(&database.url, &database.name).await;
    });

    info!("album catalog listening on {}:{}", app.web.address, app.web.port);
    if let Err(e) = build_rocket(&app, catalog).launch().await {
        error!("server error: {}", e);
        process::exit(1);
    }
}
