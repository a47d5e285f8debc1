use core::sync::atomic::{AtomicBool, Ordering};

/// Data-ready notification shared between an interrupt handler and a
/// polling loop.
///
/// Only the handler calls [`signal`](Self::signal) and only the polling loop
/// calls [`take`](Self::take), so it can live in a `static`.
///
/// ```
/// use lis3mdl_async::DataReadyFlag;
///
/// static DATA_READY: DataReadyFlag = DataReadyFlag::new();
///
/// // in the DRDY edge handler
/// DATA_READY.signal();
///
/// // in the polling loop
/// if DATA_READY.take() {
///     // read axes
/// }
/// assert!(!DATA_READY.take());
/// ```
#[derive(Debug, Default)]
pub struct DataReadyFlag {
    ready: AtomicBool,
}

impl DataReadyFlag {
    pub const fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
        }
    }

    /// Mark new data as available
    pub fn signal(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Read and clear the flag. Plain load and store, so it also builds on
    /// targets without atomic read-modify-write such as `thumbv6m`.
    pub fn take(&self) -> bool {
        let set = self.ready.load(Ordering::Acquire);
        if set {
            self.ready.store(false, Ordering::Release);
        }
        set
    }

    /// Read the flag without clearing it
    pub fn is_set(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}
