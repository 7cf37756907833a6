mod abx;
pub mod error;

pub use abx::Abx2XmlDecoder;

use error::DecoderError;

/// Turns a packed binary preference file into XML text
pub trait PreferenceDecoder: Send + Sync {
    fn decode(&self, data: &[u8]) -> Result<String, DecoderError>;
}

/// Decoder returning fixed XML. Fails like a missing program when empty
#[cfg(test)]
pub(crate) struct StaticDecoder(pub Option<String>);

#[cfg(test)]
impl PreferenceDecoder for StaticDecoder {
    fn decode(&self, _data: &[u8]) -> Result<String, DecoderError> {
        match &self.0 {
            Some(result) => Ok(result.clone()),
            None => Err(DecoderError::Spawn),
        }
    }
}
