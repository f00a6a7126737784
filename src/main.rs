use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{debug, error, info, warn};

use rtpsniff::config::Config;
use rtpsniff::{utils, Sniffer};

mod log;

#[derive(Parser)]
#[command(version)]
struct Args {
    /// Set config file path
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture RTP packets on a network device
    Capture {
        /// Device to capture on, e.g. eth0
        #[arg(short, long)]
        device: Option<String>,
    },
    /// Replay a pcap or pcapng file through the pipeline
    Replay {
        #[arg(short, long)]
        file: String,
    },
    /// List capture devices
    Devices,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let (cfg, load_error) = match utils::load::<Config>("rtpsniff", args.config) {
        Ok(cfg) => (cfg, None),
        Err(err) => (Config::default(), Some(err)),
    };

    log::set(&cfg.log.level);
    if let Some(err) = load_error {
        error!("{:#}, using defaults", err);
    }
    cfg.validate()?;

    warn!("set log level : {}", cfg.log.level);
    debug!("config : {:?}", cfg);

    let source = match args.command.unwrap_or(Commands::Capture { device: None }) {
        Commands::Devices => return list_devices(),
        Commands::Capture { device } => {
            Source::Live(device.or(cfg.capture.device.clone()).ok_or_else(|| {
                anyhow::anyhow!("no capture device, use --device or [capture] device")
            })?)
        }
        Commands::Replay { file } => Source::File(file),
    };

    let storage = storage::new(cfg.storage.clone()).await?;
    let sniffer = Sniffer::new(Arc::from(storage), cfg.filter.clone());

    let session = async {
        match &source {
            Source::Live(device) => sniffer.start(device).await,
            Source::File(path) => sniffer.replay(path).await,
        }
    };

    let result = tokio::select! {
        result = session => result,
        _ = utils::shutdown_signal() => {
            info!("capture stopped by signal");
            return Ok(());
        }
    };

    match result {
        Ok(stats) => {
            info!("Sniffer shutdown: {}", stats);
            Ok(())
        }
        Err(err) => {
            error!("Sniffer failed: {}", err);
            Err(err.into())
        }
    }
}

enum Source {
    Live(String),
    File(String),
}

fn list_devices() -> anyhow::Result<()> {
    for device in rtpsniff::capture::devices()? {
        match device.desc {
            Some(desc) => println!("{}\t{}", device.name, desc),
            None => println!("{}", device.name),
        }
    }
    Ok(())
}
