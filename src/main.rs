//! # Docket CLI
//!
//! Command-line interface for the photobooth print pipeline.
//!
//! ## Usage
//!
//! ```bash
//! # List built-in templates
//! docket templates
//!
//! # Compose three frames into a PNG preview
//! docket compose --template "Strip 58 – Classic" --out strip.png a.jpg b.jpg c.jpg
//!
//! # Compose and print through a LAN printer
//! docket print --host 192.168.1.50 a.jpg b.jpg c.jpg
//!
//! # Check that a printer is reachable
//! docket test-print --device /dev/rfcomm0
//!
//! # Forward HTTP print jobs to a LAN printer
//! docket relay --listen 0.0.0.0:8080 --token s3cret --host 192.168.1.50
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use docket::{
    DocketError, Result, Template,
    booth::Session,
    config::KioskConfig,
    layout::registry,
    printer::{PaperSize, PrinterModel, PrinterProfile, TransportKind, profile},
    protocol::encoder,
    render::{
        pack,
        raster::{self, Frame},
    },
    server::{self, RelayConfig},
    transport::{self, PrinterClient},
};

/// Docket - thermal photobooth printing
#[derive(Parser, Debug)]
#[command(name = "docket")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Kiosk config file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List built-in templates
    Templates {
        /// Only templates for this paper (58mm or 80mm)
        #[arg(long)]
        paper: Option<String>,
    },

    /// Compose frames into a PNG without printing
    Compose {
        #[command(flatten)]
        session: SessionArgs,

        /// Output PNG path
        #[arg(long, short, value_name = "FILE")]
        out: PathBuf,
    },

    /// Compose frames and print them
    Print {
        #[command(flatten)]
        session: SessionArgs,

        #[command(flatten)]
        printer: PrinterArgs,

        /// Also save the composite as PNG
        #[arg(long, value_name = "FILE")]
        png: Option<PathBuf>,
    },

    /// Send a reset and short feed to check connectivity
    TestPrint {
        #[command(flatten)]
        printer: PrinterArgs,
    },

    /// Run the HTTP print relay
    Relay {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:8080")]
        listen: String,

        /// Shared secret expected in X-Kiosk-Token
        #[arg(long)]
        token: Option<String>,

        #[command(flatten)]
        printer: PrinterArgs,
    },
}

#[derive(Args, Debug)]
struct SessionArgs {
    /// Frame images, in capture order
    #[arg(required = true)]
    frames: Vec<PathBuf>,

    /// Template name (see `docket templates`)
    #[arg(long, short)]
    template: Option<String>,

    /// Custom template JSON
    #[arg(long, value_name = "FILE", conflicts_with = "template")]
    layout: Option<PathBuf>,

    /// Session code shown in the footer
    #[arg(long, default_value = "DEMO")]
    code: String,

    /// Booth name override
    #[arg(long)]
    booth: Option<String>,
}

/// Printer overrides. Anything not given comes from the config file.
#[derive(Args, Debug)]
struct PrinterArgs {
    /// LAN printer host (raw TCP)
    #[arg(long, conflicts_with_all = ["relay_url", "device"])]
    host: Option<String>,

    /// LAN printer port
    #[arg(long, default_value_t = profile::DEFAULT_PORT)]
    port: u16,

    /// Print relay base URL
    #[arg(long, conflicts_with = "device")]
    relay_url: Option<String>,

    /// Token sent to the print relay
    #[arg(long)]
    relay_token: Option<String>,

    /// Serial/Bluetooth device node or MAC address
    #[arg(long)]
    device: Option<String>,

    /// Printer model preset (sets paper and width)
    #[arg(long)]
    model: Option<String>,

    /// Paper size (58mm or 80mm)
    #[arg(long)]
    paper: Option<String>,

    /// Print density 1-15
    #[arg(long)]
    density: Option<u8>,
}

impl PrinterArgs {
    /// Apply the overrides on top of a configured profile.
    fn resolve(&self, base: &PrinterProfile) -> Result<PrinterProfile> {
        let transport = if let Some(host) = &self.host {
            TransportKind::StreamSocket {
                host: host.clone(),
                port: self.port,
            }
        } else if let Some(url) = &self.relay_url {
            TransportKind::HttpRelay {
                url: url.clone(),
                token: self.relay_token.clone(),
            }
        } else if let Some(device) = &self.device {
            TransportKind::DeviceLink {
                device: device.clone(),
                mtu: profile::DEFAULT_MTU,
                write_delay_ms: profile::DEFAULT_WRITE_DELAY_MS,
            }
        } else {
            base.transport.clone()
        };

        let mut resolved = match &self.model {
            Some(name) => PrinterModel::by_name(name)
                .ok_or_else(|| DocketError::Config(format!("Unknown printer model '{}'", name)))?
                .profile(transport),
            None => PrinterProfile {
                transport,
                ..base.clone()
            },
        };

        if let Some(paper) = &self.paper {
            resolved.paper = parse_paper(paper)?;
            resolved.width_dots = None;
        }
        if let Some(density) = self.density {
            resolved.density = density;
        }

        resolved.validate()?;
        Ok(resolved)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = KioskConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Templates { paper } => {
            let templates = match paper {
                Some(p) => registry::by_paper(parse_paper(&p)?),
                None => registry::list().iter().collect(),
            };
            println!("Available templates:");
            for t in templates {
                println!(
                    "  {:<26} {:>5}  {} photo(s)  {}",
                    t.name,
                    t.paper.name(),
                    t.photo_count(),
                    t.dither.name()
                );
            }
        }

        Commands::Compose { session, out } => {
            let (composite, template) = compose_session(&config, &session)?;
            save_png(&out, &composite)?;
            println!(
                "Composed {} ({}x{}) to {}",
                template.name,
                composite.width(),
                composite.height(),
                out.display()
            );
        }

        Commands::Print {
            session,
            printer,
            png,
        } => {
            let profile = printer.resolve(&config.printer)?;
            let (composite, template) = compose_session(&config, &session)?;
            if let Some(path) = png {
                save_png(&path, &composite)?;
            }

            let payload =
                docket::booth::encode_composite(&composite, &profile, template.dither)?;
            info!(
                template = %template.name,
                printer = %profile.name,
                transport = profile.transport.label(),
                address = %profile.transport.address(),
                bytes = payload.len(),
                "Printing"
            );

            let report = block_on(async {
                let client = build_client(&config, &profile)?;
                client.print(payload).await
            })?;
            println!(
                "Printed job {} in {} attempt(s)",
                report.job_id, report.attempts
            );
        }

        Commands::TestPrint { printer } => {
            let profile = printer.resolve(&config.printer)?;
            println!("Testing {} at {}...", profile.name, profile.transport.address());
            block_on(async {
                let client = build_client(&config, &profile)?;
                client.print(encoder::connection_test()).await
            })?;
            println!("Printer reachable");
        }

        Commands::Relay {
            listen,
            token,
            printer,
        } => {
            let profile = printer.resolve(&config.printer)?;
            block_on(async {
                let client = build_client(&config, &profile)?;
                server::serve(
                    RelayConfig {
                        listen_addr: listen,
                        token,
                    },
                    client,
                )
                .await
            })?;
        }
    }

    Ok(())
}

fn parse_paper(s: &str) -> Result<PaperSize> {
    PaperSize::parse(s)
        .ok_or_else(|| DocketError::Config(format!("Unknown paper size '{}'", s)))
}

fn resolve_template(config: &KioskConfig, args: &SessionArgs) -> Result<Template> {
    if let Some(path) = &args.layout {
        return docket::config::load_template(path);
    }
    match &args.template {
        Some(name) => registry::by_name(name)
            .cloned()
            .ok_or_else(|| DocketError::Config(format!("Unknown template '{}'", name))),
        None => config.resolve_template(),
    }
}

/// Load frames and logo, then compose.
fn compose_session(
    config: &KioskConfig,
    args: &SessionArgs,
) -> Result<(image::GrayImage, Template)> {
    let template = resolve_template(config, args)?;
    let frames = args
        .frames
        .iter()
        .enumerate()
        .map(|(i, path)| Frame::load(i, path))
        .collect::<Result<Vec<_>>>()?;

    let logo = match &config.logo {
        Some(path) => Some(pack::to_grayscale(&image::open(path)?)),
        None => None,
    };

    let mut placeholders = config.placeholders(&args.code);
    if let Some(booth) = &args.booth {
        placeholders.booth_name = booth.clone();
    }

    let mut session = Session::new(&template, placeholders);
    if let Some(logo) = logo.as_ref() {
        session = session.with_logo(logo);
    }
    let composite = session.compose(&frames)?;
    Ok((composite, template))
}

fn build_client(config: &KioskConfig, profile: &PrinterProfile) -> Result<PrinterClient> {
    let transport = transport::from_profile(profile, config.queue.send_timeout())?;
    Ok(PrinterClient::new(transport, config.queue))
}

fn block_on<F, T>(future: F) -> Result<T>
where
    F: std::future::Future<Output = Result<T>>,
{
    tokio::runtime::Runtime::new()?.block_on(future)
}

fn save_png(path: &Path, img: &image::GrayImage) -> Result<()> {
    std::fs::write(path, raster::to_png(img)?)?;
    Ok(())
}
