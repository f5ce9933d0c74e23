//! Lists the chunks of an ICNS file and what was decoded from them.
//!
//! ```shell
//! cargo run --example readicns <path/to/file.icns>
//! ```
//!
//! Pass `--meta` after the path to skip decoding pixel data.

use icns_chunks::{ChunkStatus, IconFamily, ParseOptions};
use std::env;
use std::fs::File;
use std::io::BufReader;

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        println!("Usage: readicns <path> [--meta]");
        return;
    }
    let metadata_only = args.get(2).map_or(false, |arg| arg == "--meta");
    let file = File::open(&args[1]).expect("failed to open file");
    let options = ParseOptions::new().with_metadata_only(metadata_only);
    let family = IconFamily::read_with(BufReader::new(file), &options)
        .expect("failed to read ICNS file");
    print!("{}", family.summary());
    if let Some(range) = family.compatibility() {
        println!("Compatible with {:?} through {:?}", range.min, range.max);
    }
    for report in family.reports() {
        match report.status {
            ChunkStatus::Skipped(ref err) => {
                println!("Offset {}: skipped ({})", report.offset, err)
            }
            ChunkStatus::Truncated { declared, available } => {
                println!("Offset {}: truncated ({} bytes declared, {} left)",
                         report.offset,
                         declared,
                         available)
            }
            _ => {}
        }
    }
}
