use crate::config::KvsConfig;
use crate::error::KvsError;
use crate::request::normalizer::RequestNormalizer;
use crate::request::types::{KvsRequest, Mode, Operation, RawParams};
use crate::response::envelope::{Envelope, Status};
use crate::store::engine::StorageEngine;

use uuid::Uuid;

/// Rendered reply to one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvsResponse {
    pub status: Status,
    pub body: String,
}

/// Entry point tying normalization, storage and rendering together.
///
/// `execute` runs synchronously and does blocking file I/O; async callers
/// should move it onto a blocking thread.
pub struct KvsService {
    config: KvsConfig,
    normalizer: RequestNormalizer,
    engine: StorageEngine,
}

impl KvsService {
    pub fn new(config: KvsConfig) -> Self {
        let normalizer = RequestNormalizer::new(&config);
        let engine = StorageEngine::new(&config);
        Self {
            config,
            normalizer,
            engine,
        }
    }

    pub fn config(&self) -> &KvsConfig {
        &self.config
    }

    pub fn engine(&self) -> &StorageEngine {
        &self.engine
    }

    /// Handles one request end to end.
    ///
    /// User mistakes come back as `Ok` with an "ng" envelope. `Err` is kept
    /// for integration failures: no parameters were ever added, a record
    /// file is corrupt, the storage tree is unusable.
    pub fn execute(&self, request: &KvsRequest) -> Result<KvsResponse, KvsError> {
        let params = request.params().ok_or(KvsError::MissingParameters)?;
        let operation = self.normalizer.operation(params);

        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("kvs_request", %request_id, mode = %operation.mode);
        let _entered = span.enter();

        let envelope = match self.dispatch(&operation, params) {
            Ok(envelope) => envelope,
            Err(err) if err.is_user_facing() => {
                tracing::warn!("Responding ng: {}", err);
                Envelope::ng(err.to_string())
            }
            Err(err) => {
                tracing::error!("Request failed: {}", err);
                return Err(err);
            }
        };

        let body = envelope.render(operation.callback.as_ref())?;
        Ok(KvsResponse {
            status: envelope.status,
            body,
        })
    }

    fn dispatch(&self, operation: &Operation, params: &RawParams) -> Result<Envelope, KvsError> {
        let person_id =
            operation
                .person_id
                .as_ref()
                .ok_or_else(|| KvsError::MissingPersonId {
                    key: self.normalizer.reserved().person_id.clone(),
                })?;

        match operation.mode {
            Mode::Fetch => {
                let record = self.engine.fetch(person_id)?;
                Ok(Envelope::ok("Succeeded fetching data").with_record(&record))
            }
            Mode::Update => {
                let payload = self.normalizer.payload(params)?;
                let keys = payload.len();
                let data_size = self.engine.update(person_id, payload)?;
                tracing::info!(
                    "Updated {} key(s) for {}, data-size {}",
                    keys,
                    person_id,
                    data_size
                );
                Ok(Envelope::ok(format!(
                    "Succeeded updating data, data-size=`{}`",
                    data_size
                )))
            }
            Mode::Remove => {
                self.engine.remove(person_id)?;
                tracing::info!("Removed record for {}", person_id);
                Ok(Envelope::ok("Succeeded removing data"))
            }
        }
    }
}
