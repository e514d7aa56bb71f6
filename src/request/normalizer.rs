use super::types::{CallbackName, Mode, Operation, PersonId, RawParams, is_valid_key};
use crate::config::{KvsConfig, ReservedKeys};
use crate::error::KvsError;
use crate::store::record::Payload;

/// Turns untrusted parameters into an `Operation` and an update payload.
///
/// Pure: never touches storage, and the same parameters always give the
/// same result.
#[derive(Debug, Clone)]
pub struct RequestNormalizer {
    reserved: ReservedKeys,
    max_value_length: usize,
}

impl RequestNormalizer {
    pub fn new(config: &KvsConfig) -> Self {
        Self {
            reserved: config.reserved.clone(),
            max_value_length: config.max_value_length,
        }
    }

    pub fn reserved(&self) -> &ReservedKeys {
        &self.reserved
    }

    pub fn operation(&self, params: &RawParams) -> Operation {
        Operation {
            mode: self.mode(params),
            person_id: self.person_id(params),
            callback: self.callback(params),
        }
    }

    /// Unknown or missing modes fall back to `fetch`.
    pub fn mode(&self, params: &RawParams) -> Mode {
        params
            .get_text(&self.reserved.mode)
            .and_then(Mode::parse)
            .unwrap_or_default()
    }

    pub fn person_id(&self, params: &RawParams) -> Option<PersonId> {
        params
            .get_text(&self.reserved.person_id)
            .and_then(PersonId::parse)
    }

    pub fn callback(&self, params: &RawParams) -> Option<CallbackName> {
        params
            .get_text(&self.reserved.callback)
            .and_then(CallbackName::parse)
    }

    /// Collects the key/value pairs of an update.
    ///
    /// Reserved names, non-string values and names outside the key charset
    /// are skipped silently. A surviving value longer than
    /// `max_value_length` bytes rejects the whole payload.
    pub fn payload(&self, params: &RawParams) -> Result<Payload, KvsError> {
        let mut payload = Payload::new();

        for (name, value) in params.iter() {
            if self.reserved.contains(name) || !is_valid_key(name) {
                continue;
            }
            let Some(text) = value.as_text() else {
                tracing::debug!("Skipping non-string parameter `{}`", name);
                continue;
            };
            if text.len() > self.max_value_length {
                return Err(KvsError::ValueTooLarge(name.to_string()));
            }
            payload.insert(name, text);
        }

        Ok(payload)
    }
}
