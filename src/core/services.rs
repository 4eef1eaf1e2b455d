/*!
 * Handle Services
 * Translator + diagnostic sink bundle shared by a handle and its strategies
 */

use crate::core::errors::HandleError;
use crate::diag::{DiagnosticSink, Event, LogSink};
use crate::driver::DriverError;
use crate::translate::{FailureTranslator, SqlStateTranslator};
use std::rc::Rc;

/// Services every strategy in a proxy family shares
///
/// Cloning is cheap; clones point at the same translator and sink.
#[derive(Clone)]
pub struct HandleServices {
    translator: Rc<dyn FailureTranslator>,
    sink: Rc<dyn DiagnosticSink>,
}

impl HandleServices {
    /// Default services: SQLSTATE translation, events to the log facade
    pub fn new() -> Self {
        Self {
            translator: Rc::new(SqlStateTranslator),
            sink: Rc::new(LogSink),
        }
    }

    pub fn with_translator(mut self, translator: impl FailureTranslator + 'static) -> Self {
        self.translator = Rc::new(translator);
        self
    }

    pub fn with_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Rc::new(sink);
        self
    }

    /// Translate an access-class driver failure; pass anything else
    /// through unchanged
    pub fn translate(&self, error: DriverError, operation: &str) -> HandleError {
        if error.is_access() {
            self.translator.translate(error, operation)
        } else {
            HandleError::Unclassified(error)
        }
    }

    /// Report a diagnostic event
    #[inline]
    pub fn emit(&self, event: Event) {
        self.sink.emit(event);
    }
}

impl Default for HandleServices {
    fn default() -> Self {
        Self::new()
    }
}
