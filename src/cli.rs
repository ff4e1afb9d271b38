use std::io::Write;

use crate::config::ServerConfig;
use crate::data::DatasetKind;
use crate::logging;
use crate::server::{self, api};

const USAGE: &str = "usage: rail_timeline <serve|filter <railroads|stations> [date]>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Filter,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("filter") => Some(Command::Filter),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("{USAGE}");
        return 2;
    };

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            return 1;
        }
    };
    logging::init(&config.log_level);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("failed to start async runtime: {err}");
            return 1;
        }
    };

    match command {
        Command::Serve => runtime.block_on(handle_serve(&config)),
        Command::Filter => runtime.block_on(handle_filter(&config, args)),
    }
}

async fn handle_serve(config: &ServerConfig) -> i32 {
    match server::run_server(config).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

/// Run one dataset request offline and write the body to stdout.
async fn handle_filter(config: &ServerConfig, args: &[String]) -> i32 {
    let Some(kind) = args.get(2).and_then(|name| DatasetKind::from_name(name)) else {
        eprintln!("usage: rail_timeline filter <railroads|stations> [date]");
        return 2;
    };
    let date = args.get(3).map(String::as_str);

    let service = server::build_service(config);
    match api::dataset_payload(&service, "GET", kind, date).await {
        Ok(response) => {
            let payload = response.payload;
            let mut stdout = std::io::stdout().lock();
            if let Err(err) = stdout.write_all(&payload.body).and_then(|()| stdout.flush()) {
                eprintln!("failed to write output: {err}");
                return 1;
            }
            match payload.year.year() {
                Some(year) => eprintln!("features={} year={year}", payload.count),
                None => eprintln!("features={}", payload.count),
            }
            0
        }
        Err(err) => {
            eprintln!("filter failed: {}", err.public_message());
            1
        }
    }
}
