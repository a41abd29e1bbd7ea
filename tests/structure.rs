//! Checks the byte level layout of encoder output: chunks, checksums and the zlib stream.
use depthpng::filter::{unfilter, FilterType};
use depthpng::{BitDepth, BytesPerPixel, ColorType, Compression, Encoder, PNG_SIGNATURE};
use miniz_oxide::inflate::decompress_to_vec_zlib;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

struct Chunk {
    type_: [u8; 4],
    data: Vec<u8>,
    crc: u32,
}

fn read_chunks(png: &[u8]) -> Vec<Chunk> {
    assert_eq!(&png[..8], &PNG_SIGNATURE);
    let mut chunks = Vec::new();
    let mut rest = &png[8..];
    while !rest.is_empty() {
        let len = u32::from_be_bytes(rest[..4].try_into().unwrap()) as usize;
        chunks.push(Chunk {
            type_: rest[4..8].try_into().unwrap(),
            data: rest[8..8 + len].to_vec(),
            crc: u32::from_be_bytes(rest[8 + len..12 + len].try_into().unwrap()),
        });
        rest = &rest[12 + len..];
    }
    chunks
}

fn zlib_stream(chunks: &[Chunk]) -> Vec<u8> {
    chunks
        .iter()
        .filter(|c| &c.type_ == b"IDAT")
        .flat_map(|c| c.data.iter().copied())
        .collect()
}

/// Inflates and unfilters the image data back into raw scanlines.
fn raw_scanlines(png: &[u8], row_bytes: usize, bpp: BytesPerPixel) -> Vec<u8> {
    let filtered = decompress_to_vec_zlib(&zlib_stream(&read_chunks(png))).unwrap();
    assert_eq!(filtered.len() % (row_bytes + 1), 0);

    let mut out: Vec<u8> = Vec::with_capacity(filtered.len());
    for row in filtered.chunks(row_bytes + 1) {
        let filter = FilterType::from_u8(row[0]).unwrap();
        let mut current = row[1..].to_vec();
        let previous = if out.is_empty() {
            &[][..]
        } else {
            &out[out.len() - row_bytes..]
        };
        unfilter(filter, bpp, previous, &mut current);
        out.extend_from_slice(&current);
    }
    out
}

#[test]
fn ihdr_for_4x2_gray8() {
    let png = depthpng::encode(&[0.5; 8], 4, 2, ColorType::Grayscale, BitDepth::Eight).unwrap();
    assert_eq!(
        &png[8..29],
        &[
            0, 0, 0, 13, b'I', b'H', b'D', b'R', 0, 0, 0, 4, 0, 0, 0, 2, 8, 0, 0, 0, 0
        ]
    );
    let crc = u32::from_be_bytes(png[29..33].try_into().unwrap());
    assert_eq!(crc, crc32fast::hash(&png[12..29]));
}

#[test]
fn ihdr_for_rgb16() {
    let png = depthpng::encode(&[0.5; 3], 3, 1, ColorType::Rgb, BitDepth::Sixteen).unwrap();
    let chunks = read_chunks(&png);
    assert_eq!(chunks[0].data, vec![0, 0, 0, 3, 0, 0, 0, 1, 16, 2, 0, 0, 0]);
}

#[test]
fn chunk_crcs_match_crc32fast() {
    let mut rng = StdRng::seed_from_u64(11);
    let samples: Vec<f32> = (0..120 * 80).map(|_| rng.gen()).collect();
    let mut encoder = Encoder::new(120, 80);
    encoder.set_idat_size(2048);
    let png = encoder.encode(&samples).unwrap();

    let chunks = read_chunks(&png);
    assert!(chunks.len() > 3);
    for chunk in &chunks {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&chunk.type_);
        hasher.update(&chunk.data);
        assert_eq!(chunk.crc, hasher.finalize());
    }
    let last = chunks.last().unwrap();
    assert_eq!(&last.type_, b"IEND");
    assert!(last.data.is_empty());
}

#[test]
fn zlib_trailer_is_adler32_of_filtered_data() {
    let samples: Vec<f32> = (0..30 * 20).map(|i| (i % 30) as f32 / 29.0).collect();
    let png = depthpng::encode(&samples, 30, 20, ColorType::Rgb, BitDepth::Eight).unwrap();
    let stream = zlib_stream(&read_chunks(&png));

    assert_eq!(&stream[..2], &[0x78, 0x9C]);
    let filtered = decompress_to_vec_zlib(&stream).unwrap();
    assert_eq!(filtered.len(), 20 * (1 + 30 * 3));

    let trailer = u32::from_be_bytes(stream[stream.len() - 4..].try_into().unwrap());
    assert_eq!(trailer, depthpng::hash::adler32(&filtered));
}

#[test]
fn stored_only_stream_header() {
    let mut encoder = Encoder::new(8, 8);
    encoder.set_compression(Compression::NoCompression);
    let png = encoder.encode(&[0.3; 64]).unwrap();
    let stream = zlib_stream(&read_chunks(&png));
    assert_eq!(&stream[..2], &[0x78, 0x01]);
    // One final stored block holding 8 rows of 9 bytes.
    assert_eq!(stream[2], 0x01);
    assert_eq!(&stream[3..7], &[72, 0, !72u8, 0xFF]);
}

#[test]
fn unfiltered_data_equals_quantized_samples() {
    let mut rng = StdRng::seed_from_u64(12);
    for (color, depth) in [
        (ColorType::Grayscale, BitDepth::Eight),
        (ColorType::Grayscale, BitDepth::Sixteen),
        (ColorType::Rgb, BitDepth::Eight),
        (ColorType::Rgb, BitDepth::Sixteen),
    ] {
        let (width, height) = (41usize, 13usize);
        let samples: Vec<f32> = (0..width * height)
            .map(|i| (i % width) as f32 / 50.0 + rng.gen_range(0.0f32..0.1))
            .collect();
        let png = depthpng::encode(&samples, width as i64, height as i64, color, depth).unwrap();

        let mut expected = Vec::new();
        for &s in &samples {
            let value = depthpng::quantize::quantize(s, depth);
            for _ in 0..color.samples() {
                match depth {
                    BitDepth::Eight => expected.push(value as u8),
                    BitDepth::Sixteen => expected.extend_from_slice(&value.to_be_bytes()),
                }
            }
        }

        let row_bytes = width * color.samples() * depth.bytes_per_sample();
        let bpp = BytesPerPixel::new(color, depth);
        assert_eq!(raw_scanlines(&png, row_bytes, bpp), expected);
    }
}

#[test]
fn equal_rows_choose_no_filter() {
    // All filters give a zero sum on a constant zero image, the lowest type wins.
    let png = depthpng::encode(&[0.0; 16], 4, 4, ColorType::Grayscale, BitDepth::Eight).unwrap();
    let filtered = decompress_to_vec_zlib(&zlib_stream(&read_chunks(&png))).unwrap();
    for row in filtered.chunks(5) {
        assert_eq!(row, &[0, 0, 0, 0, 0]);
    }
}
