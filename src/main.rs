use std::error::Error as StdError;
use std::sync::Mutex;

use clap::{App, Arg, ArgMatches};
use tracing::info;
use tracing_subscriber::EnvFilter;

use featurescope::client::ArcGisClient;
use featurescope::config_params::Config;
use featurescope::inspect::{write_preview, Inspector};
use featurescope::session::InspectionSession;
use featurescope::{Error, Result};

fn parse_arg<T: std::str::FromStr>(matches: &ArgMatches, name: &str) -> Result<Option<T>> {
    match matches.value_of(name) {
        Some(raw) => {
            raw.parse::<T>()
                .map(Some)
                .map_err(|_| Error::Config(format!("invalid value `{}` for --{}", raw, name)))
        }
        None => Ok(None),
    }
}

async fn run(matches: &ArgMatches<'_>) -> Result<()> {
    let mut config = match matches.value_of("config") {
        Some(path) => Config::from_path(path)?,
        None => Config::default(),
    };
    if let Some(n) = parse_arg::<u32>(matches, "samples")? {
        config.query.sample_size = n.max(1);
    }
    if let Some(output) = matches.value_of("output") {
        config.map.output = output.to_string();
    }
    let layer_id = parse_arg::<i64>(matches, "layer")?;
    let url = matches.value_of("url").unwrap_or_default();

    let client = ArcGisClient::new(config.query.timeout())?;
    let session = Mutex::new(InspectionSession::new(matches.value_of("token").map(str::to_string)));
    let inspector = Inspector::new(&client, config.query.sample_size);

    let inspection = match inspector.inspect(&session, url, layer_id).await? {
        Some(inspection) => inspection,
        None => {
            info!("inspection superseded, nothing to show");
            return Ok(());
        }
    };
    println!("{}", inspection.report());

    if !matches.is_present("no-preview") {
        let viewport = write_preview(&config, &inspection, &config.map.output)?;
        println!("Preview:     {} (zoom {})", config.map.output, viewport.zoom());
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env()
                             .unwrap_or_else(|_| EnvFilter::new("featurescope=info")))
        .with_writer(std::io::stderr)
        .init();

    let matches = App::new("featurescope")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect an ArcGIS Feature Service or Feature Layer")
        .arg(Arg::with_name("url")
                 .short("u")
                 .long("url")
                 .required(true)
                 .takes_value(true)
                 .value_name("URL")
                 .help("Feature Service or Feature Layer URL."))
        .arg(Arg::with_name("token")
                 .short("t")
                 .long("token")
                 .takes_value(true)
                 .value_name("TOKEN")
                 .help("Access token, passed through to every request."))
        .arg(Arg::with_name("config")
                 .short("c")
                 .long("config")
                 .takes_value(true)
                 .value_name("FILE")
                 .help("Configuration file to use (.toml)."))
        .arg(Arg::with_name("layer")
                 .short("l")
                 .long("layer")
                 .takes_value(true)
                 .value_name("ID")
                 .help("Layer or table id to inspect when given a service URL."))
        .arg(Arg::with_name("samples")
                 .short("n")
                 .long("samples")
                 .takes_value(true)
                 .value_name("COUNT")
                 .help("Number of sample records to fetch."))
        .arg(Arg::with_name("output")
                 .short("o")
                 .long("output")
                 .takes_value(true)
                 .value_name("FILE")
                 .help("Where to write the SVG preview."))
        .arg(Arg::with_name("no-preview")
                 .long("no-preview")
                 .help("Only print the report."))
        .get_matches();

    if let Err(err) = run(&matches).await {
        eprintln!("Error: {}", err);
        let mut source = err.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = cause.source();
        }
        std::process::exit(1);
    }
}
