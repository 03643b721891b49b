use std::cell::Cell;
use std::rc::Rc;

/// Cooperative cancellation flag shared between a binding and its session.
///
/// Cancelling never interrupts in-flight work; sessions check the flag at
/// their checkpoints and stop publishing once it is set.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}
