use anyhow::{anyhow, Context, Result};
use hfc_structs::core::CargoBox;
use hfc_utils::dejsonify;
use log::info;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::{Read, Write},
    path::Path,
};

pub const CSV_HEADER: [&str; 7] = [
    "Box Type",
    "Length",
    "Width",
    "Height",
    "Base_area",
    "Volume",
    "Weight",
];

/// Loads a cargo manifest. Paths ending in `.json` hold a json array of boxes,
/// anything else is read as csv. Rows keep their source order.
pub fn load_manifest(path: &Path) -> Result<Vec<CargoBox>> {
    let is_json = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
    let boxes = if is_json {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        parse_json_manifest(&json)
            .with_context(|| format!("Failed to parse manifest: {}", path.display()))?
    } else {
        let file = File::open(path)
            .with_context(|| format!("Failed to open manifest: {}", path.display()))?;
        parse_csv_manifest(file)
            .with_context(|| format!("Failed to parse manifest: {}", path.display()))?
    };
    info!("loaded {} boxes from {}", boxes.len(), path.display());
    Ok(boxes)
}

pub fn parse_json_manifest(json: &str) -> Result<Vec<CargoBox>> {
    Ok(dejsonify::<Vec<CargoBox>>(json)?)
}

pub fn parse_csv_manifest<R: Read>(reader: R) -> Result<Vec<CargoBox>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    reader
        .deserialize::<CargoBox>()
        .enumerate()
        .map(|(i, row)| row.with_context(|| format!("Invalid manifest row {}", i + 1)))
        .collect()
}

pub fn write_csv_manifest<W: Write>(writer: W, boxes: &[CargoBox]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(CSV_HEADER)?;
    for cargo in boxes {
        writer.write_record(&[
            cargo.box_type.clone().unwrap_or_default(),
            cargo.length.to_string(),
            cargo.width.to_string(),
            cargo.height.to_string(),
            cargo.base_area.to_string(),
            cargo.volume.to_string(),
            cargo.weight.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ManifestTrack {
    pub num_boxes: usize,
    pub min_side: u32,
    pub max_side: u32,
}

impl Default for ManifestTrack {
    fn default() -> Self {
        Self {
            num_boxes: 20,
            min_side: 5,
            max_side: 40,
        }
    }
}

/// Synthetic manifest with integer sides, so base area and volume are exact.
pub fn generate_manifest(seed: &[u8; 32], track: &ManifestTrack) -> Result<Vec<CargoBox>> {
    if track.min_side == 0 || track.min_side > track.max_side {
        return Err(anyhow!(
            "Invalid side range [{}, {}]",
            track.min_side,
            track.max_side
        ));
    }
    let mut rng = SmallRng::from_seed(*seed);
    let boxes = (0..track.num_boxes)
        .map(|i| {
            let length = rng.gen_range(track.min_side..=track.max_side) as f64;
            let width = rng.gen_range(track.min_side..=track.max_side) as f64;
            let height = rng.gen_range(track.min_side..=track.max_side) as f64;
            let density: f64 = rng.gen_range(0.5..1.5);
            let weight = length * width * height * density / 1000.0;
            CargoBox::new(length, width, height, weight).with_box_type(format!("T{:03}", i + 1))
        })
        .collect();
    Ok(boxes)
}
