use super::LineCodec;
use crate::error::{Result, TallyError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

/// One JSON document per line.
pub struct JsonLinesCodec<T> {
    _record: PhantomData<fn() -> T>,
}

impl<T> JsonLinesCodec<T> {
    pub fn new() -> Self {
        Self {
            _record: PhantomData,
        }
    }
}

impl<T> Default for JsonLinesCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Serialize + DeserializeOwned> LineCodec for JsonLinesCodec<T> {
    type Record = T;

    fn encode(&self, record: &T) -> Result<String> {
        Ok(serde_json::to_string(record)?)
    }

    fn decode(&self, line: &str) -> Result<T> {
        serde_json::from_str(line).map_err(|e| TallyError::malformed(0, e.to_string()))
    }
}
