//! Load-once handle for datasets.
//!
//! The cache is created in `main` and passed to whoever needs a table.
//! Each source is loaded at most once; later requests get the same `Arc`.

use crate::dataset::{load_source, Dataset, LoadError, LoadOptions, Source};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;
use tracing::debug;

type Slot = Arc<OnceCell<Arc<Dataset>>>;

/// Memoizes loaded datasets by source.
#[derive(Debug, Default)]
pub struct DatasetCache {
    options: LoadOptions,
    slots: Mutex<HashMap<Source, Slot>>,
}

impl DatasetCache {
    /// Create an empty cache that loads with the given options.
    pub fn new(options: LoadOptions) -> Self {
        Self {
            options,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Return the dataset for `source`, loading it on first use.
    ///
    /// A failed load leaves nothing behind, so a later call retries.
    pub async fn get_or_load(&self, source: &Source) -> Result<Arc<Dataset>, LoadError> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(source.clone()).or_default())
        };

        if slot.initialized() {
            debug!("Dataset cache hit: {}", source);
        }

        let dataset = slot
            .get_or_try_init(|| async {
                load_source(source, &self.options).await.map(Arc::new)
            })
            .await?;

        Ok(Arc::clone(dataset))
    }

    /// Number of sources that have a loaded dataset.
    pub fn loaded_count(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.values().filter(|slot| slot.initialized()).count()
    }
}
