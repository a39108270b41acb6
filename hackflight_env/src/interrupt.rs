//! Process interrupt (Ctrl-C) flag shared by the read and redraw loops.

use crate::error::EnvError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable flag raised when the controlling terminal sends an interrupt.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    raised: Arc<AtomicBool>,
}

impl Interrupt {
    /// Creates a flag that is not wired to any signal (tests, embedding).
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Creates a flag and installs a Ctrl-C handler that raises it.
    ///
    /// The handler can only be installed once per process.
    pub fn install() -> Result<Self, EnvError> {
        let interrupt = Self::new();
        let flag = interrupt.clone();
        ctrlc::set_handler(move || {
            tracing::debug!("Interrupt received");
            flag.raise();
        })?;
        Ok(interrupt)
    }
    
    /// Raises the flag.
    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }
    
    /// Returns whether the flag has been raised.
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }
}
