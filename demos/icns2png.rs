//! Extracts an icon from an ICNS file as a PNG.
//!
//! ```shell
//! cargo run --example icns2png <path/to/file.icns> [<ostype>]
//! # PNG will be saved to path/to/file.<ostype>.png
//! ```
//!
//! Without an OSType, the largest icon in the file is extracted.

use icns_chunks::{CompositeOrder, IconFamily, OSType, ParseOptions};
use std::env;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::str::FromStr;

fn main() {
    env_logger::init();
    let num_args = env::args().count();
    if num_args < 2 || num_args > 3 {
        println!("Usage: icns2png <path> [<ostype>]");
        return;
    }
    let icns_path = env::args().nth(1).unwrap();
    let icns_path = Path::new(&icns_path);
    let icns_file = BufReader::new(File::open(icns_path)
                                       .expect("failed to open ICNS file"));
    let options = ParseOptions::new()
        .with_composite_order(CompositeOrder::Deferred);
    let family = IconFamily::read_with(icns_file, &options)
                     .expect("failed to read ICNS file");
    let asset = match env::args().nth(2) {
        Some(arg) => {
            let ostype = OSType::from_str(&arg).unwrap();
            family.assets
                  .iter()
                  .find(|asset| asset.format.ostype == ostype)
                  .expect("no icon with that OSType found")
        }
        None => family.highest_resolution_asset().expect("no icons in file"),
    };
    let image = asset.image.as_ref().expect("icon was not decoded");
    let png_path =
        icns_path.with_extension(format!("{}.png", asset.format.ostype));
    let png_file = BufWriter::new(File::create(png_path)
                                      .expect("failed to create PNG file"));
    image.write_png(png_file).expect("failed to write PNG file");
}
