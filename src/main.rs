use clap::Parser;
use pingora_core::server::configuration::Opt;
use pingora_core::server::Server;
use std::path::PathBuf;
use imgvariant::config::Config;
use imgvariant::server::{build_service, ImageService};

/// Imgvariant - image upload, resize and watermark service built on Pingora
#[derive(Parser, Debug)]
#[command(name = "imgvariant")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Daemon mode
    #[arg(short = 'd', long)]
    daemon: bool,

    /// Test configuration and exit
    #[arg(long)]
    test: bool,
}

fn main() {
    // Parse command-line arguments
    let args = Args::parse();

    // Load configuration from file
    let config = Config::from_file(&args.config).unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    if args.test {
        println!("Configuration {} is valid", args.config.display());
        return;
    }

    // Initialize logging subsystem
    imgvariant::logging::init_subscriber(&config.logging)
        .expect("Failed to initialize logging subsystem");

    tracing::info!(
        config_file = %args.config.display(),
        server_address = %config.server.address,
        server_port = config.server.port,
        storage = ?config.storage.backend,
        metadata = ?config.metadata.backend,
        "Configuration loaded successfully"
    );

    let app = ImageService::from_config(&config).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build image service");
        std::process::exit(1);
    });

    // Build Pingora server options
    let opt = Opt {
        daemon: args.daemon,
        ..Default::default()
    };

    // Create Pingora server
    let mut server = Server::new(Some(opt)).expect("Failed to create Pingora server");
    server.bootstrap();

    let service = build_service(&config, app);

    tracing::info!(
        address = %config.server.listen_addr(),
        threads = config.server.threads,
        "Starting imgvariant API"
    );

    // Register service with server
    server.add_service(service);

    // Run server forever (blocks until shutdown)
    server.run_forever();
}
