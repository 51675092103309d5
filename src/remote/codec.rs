// ABOUTME: Decoding of service responses, which always arrive gzip-compressed
// ABOUTME: Decompresses the raw body before handing it to serde_json

use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;
use std::io::Read;

use crate::error::MasterError;

pub fn gunzip(raw: &[u8]) -> Result<Vec<u8>, MasterError> {
    let mut decoder = GzDecoder::new(raw);
    let mut body = Vec::new();
    decoder
        .read_to_end(&mut body)
        .map_err(|e| MasterError::Decode(format!("can't read gzipped response: {}", e)))?;
    Ok(body)
}

pub fn decode_gzip_json<T: DeserializeOwned>(raw: &[u8]) -> Result<T, MasterError> {
    let body = gunzip(raw)?;
    tracing::trace!(body = %String::from_utf8_lossy(&body), "Decoded response body");
    serde_json::from_slice(&body)
        .map_err(|e| MasterError::Decode(format!("can't unmarshal response body: {}", e)))
}

#[cfg(test)]
pub(crate) fn gzip(body: &[u8]) -> Vec<u8> {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(body).unwrap();
    encoder.finish().unwrap()
}
