//! Test utilities for integration tests.
//!
//! Helpers for writing tile directories and reading assembled output back.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

use tile_mosaic::AssembleConfig;

// =============================================================================
// Tile Directories
// =============================================================================

/// Scratch directory holding a `tiles/` source and room for the output.
pub struct TileDir {
    dir: TempDir,
}

impl TileDir {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("tiles")).unwrap();
        Self { dir }
    }

    pub fn tiles(&self) -> PathBuf {
        self.dir.path().join("tiles")
    }

    pub fn output(&self) -> PathBuf {
        self.dir.path().join("mosaic.tif")
    }

    pub fn config(&self, sort: bool) -> AssembleConfig {
        AssembleConfig {
            source: self.tiles(),
            dest: self.output(),
            sort,
            verbose: false,
        }
    }

    /// Write a u8 stack of `z` pages, `height` x `width`, filled with `value`.
    pub fn write_u8(&self, name: &str, z: usize, height: u32, width: u32, value: u8) -> &Self {
        let plane = vec![value; (height * width) as usize];
        let pages: Vec<Vec<u8>> = (0..z).map(|_| plane.clone()).collect();
        write_gray8(&self.tiles().join(name), width, height, &pages);
        self
    }

    /// Write a single u16 page holding `data`.
    pub fn write_u16(&self, name: &str, height: u32, width: u32, data: &[u16]) -> &Self {
        let file = File::create(self.tiles().join(name)).unwrap();
        let mut encoder = TiffEncoder::new(file).unwrap();
        encoder
            .write_image::<colortype::Gray16>(width, height, data)
            .unwrap();
        self
    }

    pub fn write_raw(&self, name: &str, bytes: &[u8]) -> &Self {
        std::fs::write(self.tiles().join(name), bytes).unwrap();
        self
    }
}

fn write_gray8(path: &Path, width: u32, height: u32, pages: &[Vec<u8>]) {
    let file = File::create(path).unwrap();
    let mut encoder = TiffEncoder::new(file).unwrap();
    for page in pages {
        encoder
            .write_image::<colortype::Gray8>(width, height, page)
            .unwrap();
    }
}

// =============================================================================
// Reading Output
// =============================================================================

/// Decoded output file.
pub struct Output {
    /// (width, height) of every page
    pub dims: (u32, u32),
    pub pages: usize,
    pub samples: DecodingResult,
    pub description: Option<String>,
}

impl Output {
    pub fn u8(&self) -> &[u8] {
        match &self.samples {
            DecodingResult::U8(data) => data,
            _ => panic!("expected u8 output"),
        }
    }

    pub fn u16(&self) -> &[u16] {
        match &self.samples {
            DecodingResult::U16(data) => data,
            _ => panic!("expected u16 output"),
        }
    }
}

/// Read every page of `path` into one buffer.
pub fn read_output(path: &Path) -> Output {
    let file = BufReader::new(File::open(path).unwrap());
    let mut decoder = Decoder::new(file).unwrap();

    let dims = decoder.dimensions().unwrap();
    let description = decoder.get_tag_ascii_string(Tag::ImageDescription).ok();

    let mut samples = decoder.read_image().unwrap();
    let mut pages = 1;
    while decoder.more_images() {
        decoder.next_image().unwrap();
        assert_eq!(decoder.dimensions().unwrap(), dims);
        match (&mut samples, decoder.read_image().unwrap()) {
            (DecodingResult::U8(all), DecodingResult::U8(page)) => all.extend(page),
            (DecodingResult::U16(all), DecodingResult::U16(page)) => all.extend(page),
            _ => panic!("unexpected page sample type"),
        }
        pages += 1;
    }

    Output {
        dims,
        pages,
        samples,
        description,
    }
}

/// First 4 bytes of a classic little-endian TIFF.
pub fn is_classic_tiff(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && bytes[0..4] == [0x49, 0x49, 0x2A, 0x00]
}
