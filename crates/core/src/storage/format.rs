use crate::errors::CoreError;

/// Magic bytes identifying a PTRD (papertrade ledger) file.
pub const MAGIC: &[u8; 4] = b"PTRD";

/// Current file format version.
pub const CURRENT_VERSION: u16 = 1;

/// Header size in bytes: magic(4) + version(2) + body_len(8) = 14
pub const MIN_HEADER_SIZE: usize = 14;

/// File header read from a ledger snapshot.
#[derive(Debug)]
pub struct FileHeader {
    pub version: u16,
    pub body_len: u64,
}

/// Write a complete snapshot file to bytes.
///
/// Layout:
/// ```text
/// [PTRD: 4B] [version: 2B LE] [body_len: 8B LE] [body: variable]
/// ```
pub fn write_file(version: u16, body: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(MIN_HEADER_SIZE + body.len());
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&version.to_le_bytes());
    buf.extend_from_slice(&(body.len() as u64).to_le_bytes());
    buf.extend_from_slice(body);
    buf
}

/// Parse the header from raw file bytes.
/// Returns the header and the body slice.
pub fn read_file(data: &[u8]) -> Result<(FileHeader, &[u8]), CoreError> {
    if data.len() < MIN_HEADER_SIZE {
        return Err(CoreError::InvalidFileFormat(
            "File too small to be a valid PTRD file".into(),
        ));
    }

    if &data[0..4] != MAGIC {
        return Err(CoreError::InvalidFileFormat(
            "Invalid magic bytes — not a PTRD file".into(),
        ));
    }

    let version = u16::from_le_bytes([data[4], data[5]]);
    if version == 0 || version > CURRENT_VERSION {
        return Err(CoreError::UnsupportedVersion(version));
    }

    let body_len = u64::from_le_bytes(data[6..MIN_HEADER_SIZE].try_into().map_err(|_| {
        CoreError::InvalidFileFormat("Failed to read body length".into())
    })?);

    let available = (data.len() - MIN_HEADER_SIZE) as u64;
    if available < body_len {
        return Err(CoreError::InvalidFileFormat(format!(
            "File truncated: expected {body_len} bytes of body, got {available}"
        )));
    }

    let end = MIN_HEADER_SIZE + body_len as usize;
    Ok((FileHeader { version, body_len }, &data[MIN_HEADER_SIZE..end]))
}
