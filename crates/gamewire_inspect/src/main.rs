//! Decodes a dump of wire bytes with the standard registry and prints
//! each value. Handy when a region server and a client disagree about
//! what was on the wire.

use clap::Parser;

use gamewire_types::{standard_registry, unmarshal_object, ByteCursor};

use crate::args::{parse_hex, InspectArgs};

mod args;

fn main() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "INFO");
    }
    pretty_env_logger::init();

    let args = InspectArgs::parse();

    let bytes = match load_bytes(&args) {
        Ok(b) => b,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    let registry = match standard_registry() {
        Ok(r) => r,
        Err(e) => {
            log::error!("registry bootstrap failed: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("decoding {} bytes", bytes.len());

    let limit = args.limit.unwrap_or(usize::MAX);
    let mut cursor = ByteCursor::from_bytes(bytes);
    let mut index = 0_usize;

    while !cursor.at_end() && index < limit {
        match unmarshal_object(&registry, &mut cursor) {
            Ok(value) => {
                println!("[{}] {:?}", index, value);
                index += 1;
            }
            Err(e) => {
                log::error!(
                    "decode failed at value {} with {} bytes left: {}",
                    index,
                    cursor.remaining(),
                    e
                );
                std::process::exit(1);
            }
        }
    }
}

fn load_bytes(args: &InspectArgs) -> Result<Vec<u8>, String> {
    match (&args.file, &args.hex) {
        (Some(path), None) => {
            std::fs::read(path).map_err(|e| format!("cannot read {}: {}", path.display(), e))
        }
        (None, Some(hex)) => parse_hex(hex),
        _ => Err("pass exactly one of --file or --hex".to_owned()),
    }
}
