use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use jsonschema::Validator;
use ocppwire_message::{Message, MessageTypeId, Request, Response};
use serde_json::Value;
use tracing::{debug, trace};

use crate::config::StoreConfig;
use crate::error::{Result, SchemaError};
use crate::key::{Direction, ProtocolVersion, SchemaKey};
use crate::validator::{is_special_action, validate_payload, ActionExtension};

static GLOBAL: OnceLock<SchemaStore> = OnceLock::new();

/// A loaded schema document and its compiled validator.
pub struct Schema {
    path: String,
    document: Value,
    validator: Validator,
}

impl Schema {
    /// Path relative to the schema directory.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema").field("path", &self.path).finish()
    }
}

/// Loads schema documents on first use and keeps them for the life of the
/// store.
///
/// Entries are never evicted. Concurrent first lookups of the same key may
/// both read the file, but only the first insert is kept and every caller
/// receives that entry.
pub struct SchemaStore {
    config: StoreConfig,
    cache: RwLock<HashMap<String, Arc<Schema>>>,
}

impl SchemaStore {
    /// Create an empty store with default config.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create an empty store with explicit config.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            config,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// The process-wide store, created from [`StoreConfig::default`] on
    /// first use.
    pub fn global() -> &'static SchemaStore {
        GLOBAL.get_or_init(SchemaStore::new)
    }

    /// Resolve the schema for a payload.
    pub fn get_schema(
        &self,
        direction: Direction,
        action: &str,
        version: ProtocolVersion,
    ) -> Result<Arc<Schema>> {
        let path = SchemaKey::new(direction, action, version)?.relative_path();

        if let Some(schema) = self.read_cache().get(&path) {
            trace!(%path, "schema cache hit");
            return Ok(Arc::clone(schema));
        }

        let loaded = Arc::new(self.load(&path, action)?);
        let mut cache = self.write_cache();
        Ok(Arc::clone(cache.entry(path).or_insert(loaded)))
    }

    /// Validate the payload of a request or response.
    pub fn validate(&self, message: &Message, version: ProtocolVersion) -> Result<()> {
        self.validate_message(message, version, None)
    }

    /// Validate, running `extension` for special-cased actions once the
    /// schema check passes.
    pub fn validate_with(
        &self,
        message: &Message,
        version: ProtocolVersion,
        extension: &dyn ActionExtension,
    ) -> Result<()> {
        self.validate_message(message, version, Some(extension))
    }

    pub fn validate_request(&self, request: &Request, version: ProtocolVersion) -> Result<()> {
        self.validate_payload_for(
            Direction::Request,
            &request.action,
            &request.payload,
            version,
            None,
        )
    }

    /// Fails with [`SchemaError::MissingAction`] for a decoded response
    /// that was never given its action.
    pub fn validate_response(&self, response: &Response, version: ProtocolVersion) -> Result<()> {
        let action = response
            .action()
            .ok_or_else(|| SchemaError::MissingAction(response.unique_id.clone()))?;
        self.validate_payload_for(Direction::Response, action, &response.payload, version, None)
    }

    /// Check whether a schema has already been loaded.
    pub fn is_cached(&self, direction: Direction, action: &str, version: ProtocolVersion) -> bool {
        SchemaKey::new(direction, action, version)
            .is_ok_and(|key| self.read_cache().contains_key(&key.relative_path()))
    }

    /// Number of loaded schemas.
    pub fn cached_len(&self) -> usize {
        self.read_cache().len()
    }

    /// Get store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn validate_message(
        &self,
        message: &Message,
        version: ProtocolVersion,
        extension: Option<&dyn ActionExtension>,
    ) -> Result<()> {
        match message {
            Message::Request(request) => self.validate_payload_for(
                Direction::Request,
                &request.action,
                &request.payload,
                version,
                extension,
            ),
            Message::Response(response) => {
                let action = response
                    .action()
                    .ok_or_else(|| SchemaError::MissingAction(response.unique_id.clone()))?;
                self.validate_payload_for(
                    Direction::Response,
                    action,
                    &response.payload,
                    version,
                    extension,
                )
            }
            Message::ErrorResponse(_) => {
                Err(SchemaError::NotValidatable(MessageTypeId::ErrorResponse))
            }
        }
    }

    fn validate_payload_for(
        &self,
        direction: Direction,
        action: &str,
        payload: &Value,
        version: ProtocolVersion,
        extension: Option<&dyn ActionExtension>,
    ) -> Result<()> {
        let schema = self.get_schema(direction, action, version)?;
        validate_payload(action, payload, schema.validator())?;

        if is_special_action(action) {
            match extension {
                Some(extension) => extension.check(action, payload, version)?,
                None => debug!(action, "no extension registered for special-cased action"),
            }
        }

        Ok(())
    }

    fn load(&self, path: &str, action: &str) -> Result<Schema> {
        let full_path = self.config.schema_dir.join(path);
        let load_failed = |message: String| SchemaError::LoadFailed {
            action: action.to_string(),
            message,
        };

        let content = read_limited(&full_path, self.config.max_schema_file_size)
            .map_err(load_failed)?;

        // 2.0 schema files start with a byte order mark.
        let text = content.strip_prefix('\u{feff}').unwrap_or(&content);
        let document: Value = serde_json::from_str(text)
            .map_err(|err| load_failed(format!("{}: {err}", full_path.display())))?;

        let validator = jsonschema::validator_for(&document).map_err(|err| {
            load_failed(format!("{}: invalid schema: {err}", full_path.display()))
        })?;

        debug!(path, "loaded schema");
        Ok(Schema {
            path: path.to_string(),
            document,
            validator,
        })
    }

    fn read_cache(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<Schema>>> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<Schema>>> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SchemaStore {
    fn default() -> Self {
        Self::new()
    }
}

fn read_limited(path: &Path, max_bytes: usize) -> std::result::Result<String, String> {
    let file = std::fs::File::open(path)
        .map_err(|err| format!("failed opening schema {}: {err}", path.display()))?;
    let metadata = file
        .metadata()
        .map_err(|err| format!("{}: {err}", path.display()))?;

    if metadata.len() > max_bytes as u64 {
        return Err(format!(
            "schema file too large ({} bytes, max {max_bytes}): {}",
            metadata.len(),
            path.display()
        ));
    }

    let read_limit = u64::try_from(max_bytes.saturating_add(1)).unwrap_or(u64::MAX);
    let mut content = String::new();
    file.take(read_limit)
        .read_to_string(&mut content)
        .map_err(|err| format!("failed reading schema {}: {err}", path.display()))?;
    if content.len() > max_bytes {
        return Err(format!(
            "schema file too large while reading: {}",
            path.display()
        ));
    }

    Ok(content)
}
