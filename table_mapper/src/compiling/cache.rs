use crate::errors::MapperError;
use once_cell::sync::OnceCell;
use std::sync::Mutex;

/// Compile-once storage for a statement builder and its compiled form
///
/// The builder sits in a slot that is emptied after a successful
/// compilation, so nothing can read it afterwards. Concurrent first
/// executions block on the cell and compile exactly once.
pub(crate) struct StatementCache<B, C> {
    builder: Mutex<Option<B>>,
    compiled: OnceCell<C>,
}

impl<B, C> StatementCache<B, C> {
    pub(crate) fn new(builder: B) -> Self {
        Self {
            builder: Mutex::new(Some(builder)),
            compiled: OnceCell::new(),
        }
    }

    pub(crate) fn get_or_compile<F>(&self, compile: F) -> Result<&C, MapperError>
    where
        F: FnOnce(&B) -> Result<C, MapperError>,
    {
        self.compiled.get_or_try_init(|| {
            let mut slot = self
                .builder
                .lock()
                .map_err(|_| MapperError::configuration("statement builder lock poisoned"))?;
            let builder = slot.as_ref().ok_or_else(|| {
                MapperError::configuration("statement builder released without a compiled plan")
            })?;

            let compiled = compile(builder)?;
            *slot = None;
            Ok(compiled)
        })
    }

    pub(crate) fn is_compiled(&self) -> bool {
        self.compiled.get().is_some()
    }

    pub(crate) fn builder_released(&self) -> bool {
        self.builder
            .lock()
            .map(|slot| slot.is_none())
            .unwrap_or(true)
    }
}
