use clap::Parser;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;

use protobean::{decode_request, describe_to_json, encode_response, error_response, generate};
use protobean_compiler::BeanError;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// Log filter variable; logs go to stderr since stdout carries the response.
const LOG_ENV: &str = "PROTOC_GEN_BEAN_LOG";

#[derive(Parser)]
#[command(name = "protoc-gen-bean")]
#[command(about = "protoc plugin generating Java value objects and protobuf-java converters", long_about = None)]
struct Cli {
    /// Read the CodeGeneratorRequest from a file instead of stdin
    #[arg(long, value_name = "FILE")]
    request: Option<PathBuf>,

    /// Save the raw request bytes to a file before generating
    #[arg(long, value_name = "FILE")]
    dump_request: Option<PathBuf>,

    /// Print the resolved schema graph as JSON instead of generating
    #[arg(long)]
    describe: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

/// Returns whether generation succeeded; a failed generation has already
/// been reported to protoc in the response.
fn run(cli: &Cli) -> Result<bool, BeanError> {
    let input = match &cli.request {
        Some(path) => fs::read(path)?,
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };
    debug!(bytes = input.len(), "read request");

    if let Some(path) = &cli.dump_request {
        fs::write(path, &input)?;
        debug!(path = %path.display(), "dumped request");
    }

    if cli.describe {
        println!("{}", describe_to_json(&input)?);
        return Ok(true);
    }

    let response = generate(&decode_request(&input)?);
    io::stdout().write_all(&encode_response(&response))?;
    Ok(response.error.is_none())
}

/// Hands a fatal error to protoc. A failed write can only be logged.
fn report(out: &mut impl Write, err: &BeanError) -> bool {
    match out.write_all(&encode_response(&error_response(err))) {
        Ok(()) => true,
        Err(write_err) => {
            error!(%write_err, "failed to write error response");
            false
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(err) => {
            error!(%err, "protoc-gen-bean failed");
            if !cli.describe {
                report(&mut io::stdout(), &err);
            }
            process::exit(1);
        }
    }
}
