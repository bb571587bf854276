pub mod samples;
pub mod networks;

pub mod prelude {
    pub use super::samples::Database as SamplesDatabase;
    pub use super::networks::Database as NetworksDatabase;
}

/// Pack a float vector into a compressed blob of little-endian bytes.
pub(crate) fn pack_floats(floats: &[f64]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(floats.len() * 8);

    for float in floats {
        bytes.extend_from_slice(&float.to_le_bytes());
    }

    lz4_flex::compress_prepend_size(&bytes)
}

/// Unpack a float vector from a compressed blob of little-endian bytes.
pub(crate) fn unpack_floats(blob: &[u8]) -> anyhow::Result<Vec<f64>> {
    let bytes = lz4_flex::decompress_size_prepended(blob)?;

    if bytes.len() % 8 != 0 {
        anyhow::bail!("stored float vector blob has truncated length {}", bytes.len());
    }

    let mut floats = Vec::with_capacity(bytes.len() / 8);
    let mut buffer = [0; 8];

    for chunk in bytes.chunks_exact(8) {
        buffer.copy_from_slice(chunk);

        floats.push(f64::from_le_bytes(buffer));
    }

    Ok(floats)
}

#[test]
fn test_floats_packing() -> anyhow::Result<()> {
    let floats = [0.0, -1.5, 0.25, f64::MAX];

    assert_eq!(unpack_floats(&pack_floats(&floats))?, floats);
    assert_eq!(unpack_floats(&pack_floats(&[]))?, [0.0; 0]);

    Ok(())
}
