//! Layer payload decoding: CSV text or base64, optionally gzip/zlib compressed.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::read::{GzDecoder, ZlibDecoder};
use std::fmt;
use std::io::{self, Read};

/// Compression applied to a base64 payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Plain bytes
    None,
    /// gzip stream
    Gzip,
    /// zlib stream
    Zlib,
}

/// How a `<data>` element stores its gids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Comma separated decimal gids
    Csv,
    /// Little-endian 32-bit gids, base64 wrapped
    Base64(Compression),
}

impl Encoding {
    /// Resolves the `encoding` / `compression` attribute pair of a `<data>` element.
    ///
    /// Returns the unrecognised name on failure. `compression` is not consulted
    /// for CSV data.
    pub fn parse(encoding: &str, compression: Option<&str>) -> Result<Self, String> {
        match encoding.to_ascii_lowercase().as_str() {
            "csv" => Ok(Encoding::Csv),
            "base64" => {
                let compression = match compression.map(str::to_ascii_lowercase).as_deref() {
                    None | Some("") => Compression::None,
                    Some("gzip") => Compression::Gzip,
                    Some("zlib") => Compression::Zlib,
                    Some(_) => return Err(compression.unwrap_or_default().to_owned()),
                };
                Ok(Encoding::Base64(compression))
            }
            _ => Err(encoding.to_owned()),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Csv => write!(f, "csv"),
            Encoding::Base64(Compression::None) => write!(f, "base64"),
            Encoding::Base64(Compression::Gzip) => write!(f, "base64+gzip"),
            Encoding::Base64(Compression::Zlib) => write!(f, "base64+zlib"),
        }
    }
}

/// Why a layer payload could not be decoded.
#[derive(Debug)]
pub enum DecodeError {
    /// A CSV token is not a non-negative integer literal
    BadToken(String),
    /// The payload is not valid base64
    Base64(base64::DecodeError),
    /// The compressed stream could not be inflated
    Inflate(io::Error),
    /// Binary payload length is not a whole number of 32-bit cells
    Misaligned(usize),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::BadToken(tok) => write!(f, "invalid tile id `{}`", tok),
            DecodeError::Base64(e) => write!(f, "invalid base64 data: {}", e),
            DecodeError::Inflate(e) => write!(f, "could not decompress data: {}", e),
            DecodeError::Misaligned(len) => {
                write!(f, "{} bytes is not a multiple of 4", len)
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Base64(e) => Some(e),
            DecodeError::Inflate(e) => Some(e),
            _ => None,
        }
    }
}

/// Decoded layer payload, still in its source shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerData {
    /// Raw gids parsed from CSV text
    Gids(Vec<u32>),
    /// Little-endian 32-bit gids, four bytes per cell
    Bytes(Vec<u8>),
}

impl LayerData {
    /// Number of whole cells the payload carries.
    pub fn cell_count(&self) -> usize {
        match self {
            LayerData::Gids(gids) => gids.len(),
            LayerData::Bytes(bytes) => bytes.len() / 4,
        }
    }
}

/// Decodes the text content of a `<data>` element.
pub fn decode(encoding: Encoding, text: &str) -> Result<LayerData, DecodeError> {
    match encoding {
        Encoding::Csv => decode_csv(text).map(LayerData::Gids),
        Encoding::Base64(compression) => {
            let bytes = decode_base64(text, compression)?;
            if bytes.len() % 4 != 0 {
                return Err(DecodeError::Misaligned(bytes.len()));
            }
            Ok(LayerData::Bytes(bytes))
        }
    }
}

/// Parses comma separated gids. Blank text yields no cells.
pub fn decode_csv(text: &str) -> Result<Vec<u32>, DecodeError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }
    text.split(',')
        .map(str::trim)
        .map(|tok| {
            if is_uint_literal(tok) {
                tok.parse::<u32>()
                    .map_err(|_| DecodeError::BadToken(tok.to_owned()))
            } else {
                Err(DecodeError::BadToken(tok.to_owned()))
            }
        })
        .collect()
}

/// Decodes base64 text, ignoring whitespace, then inflates it if compressed.
pub fn decode_base64(text: &str, compression: Compression) -> Result<Vec<u8>, DecodeError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let raw = STANDARD.decode(compact).map_err(DecodeError::Base64)?;

    let mut out = Vec::new();
    let inflated = match compression {
        Compression::None => return Ok(raw),
        Compression::Gzip => GzDecoder::new(&raw[..]).read_to_end(&mut out),
        Compression::Zlib => ZlibDecoder::new(&raw[..]).read_to_end(&mut out),
    };
    inflated.map_err(DecodeError::Inflate)?;
    Ok(out)
}

/// `0|[1-9][0-9]*`
pub fn is_uint_literal(s: &str) -> bool {
    match s.as_bytes() {
        [] => false,
        [b'0'] => true,
        [first, rest @ ..] => {
            (b'1'..=b'9').contains(first) && rest.iter().all(u8::is_ascii_digit)
        }
    }
}
