use thiserror::Error;

pub const MAGIC: [u8; 8] = *b"SBC0MAG0";
pub const TRAILER_LEN: usize = 12;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmbedError {
    #[error("Exe too small")]
    TooSmall,
    #[error("Missing S payload")]
    MissingMagic,
    #[error("Invalid payload size")]
    InvalidSize,
}

pub fn attach(image: &mut Vec<u8>, payload: &[u8]) {
    image.extend_from_slice(payload);
    image.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    image.extend_from_slice(&MAGIC);
}

// Only the last 12 bytes define the trailer; magic bytes occurring earlier
// in the image are meaningless.
pub fn extract(exe: &[u8]) -> Result<&[u8], EmbedError> {
    if exe.len() < TRAILER_LEN {
        return Err(EmbedError::TooSmall);
    }
    let trailer_start = exe.len() - TRAILER_LEN;
    if exe[trailer_start + 4..] != MAGIC {
        return Err(EmbedError::MissingMagic);
    }
    let size_bytes = &exe[trailer_start..trailer_start + 4];
    let payload_size = u32::from_le_bytes(size_bytes.try_into().unwrap()) as usize;
    if payload_size > trailer_start {
        return Err(EmbedError::InvalidSize);
    }
    Ok(&exe[trailer_start - payload_size..trailer_start])
}
