use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

type Callback<T> = Arc<dyn Fn(T) + Send + Sync>;

struct Pending<T> {
    generation: u64,
    value: T,
}

/// Coalesces rapid calls: each call cancels the pending one and restarts the
/// timer, so only the last value of a quiet period reaches the callback.
///
/// `call` spawns onto the current tokio runtime.
pub struct Debouncer<T> {
    delay: Duration,
    callback: Callback<T>,
    slot: Arc<Mutex<Option<Pending<T>>>>,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration, callback: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            delay,
            callback: Arc::new(callback),
            slot: Arc::new(Mutex::new(None)),
            generation: 0,
            timer: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_pending(&self) -> bool {
        self.slot.lock().is_some()
    }

    pub fn call(&mut self, value: T) {
        self.generation += 1;
        let generation = self.generation;
        *self.slot.lock() = Some(Pending { generation, value });

        if let Some(timer) = self.timer.take() {
            timer.abort();
        }

        let slot = self.slot.clone();
        let callback = self.callback.clone();
        let delay = self.delay;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // A newer call may have replaced the value after this timer was aborted.
            let ready = {
                let mut slot = slot.lock();
                match slot.as_ref() {
                    Some(pending) if pending.generation == generation => slot.take(),
                    _ => None,
                }
            };
            if let Some(pending) = ready {
                callback(pending.value);
            }
        }));
    }

    /// Applies the pending value now. Returns whether there was one.
    pub fn flush(&mut self) -> bool {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        let pending = self.slot.lock().take();
        match pending {
            Some(pending) => {
                (self.callback)(pending.value);
                true
            }
            None => false,
        }
    }

    /// Drops the pending value. Returns whether there was one.
    pub fn cancel(&mut self) -> bool {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.slot.lock().take().is_some()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
