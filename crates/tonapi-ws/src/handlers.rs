//! Per-topic callback slots.
//!
//! One slot per push method; the last registration wins. Dispatch snapshots
//! the slot under the lock and runs the callback after releasing it, so a
//! replacement never waits for a callback in flight and a callback may itself
//! re-register handlers.

use std::sync::{Arc, Mutex, MutexGuard};

use tonapi_core::events::{BlockEventData, MempoolEventData, TraceEventData, TransactionEventData};
use tonapi_core::PushEvent;

/// Callback for mempool events.
pub type MempoolHandler = Arc<dyn Fn(MempoolEventData) + Send + Sync>;
/// Callback for account transaction events.
pub type TransactionHandler = Arc<dyn Fn(TransactionEventData) + Send + Sync>;
/// Callback for trace events.
pub type TraceHandler = Arc<dyn Fn(TraceEventData) + Send + Sync>;
/// Callback for block events.
pub type BlockHandler = Arc<dyn Fn(BlockEventData) + Send + Sync>;

#[derive(Clone)]
struct Slots {
    mempool: MempoolHandler,
    transaction: TransactionHandler,
    trace: TraceHandler,
    block: BlockHandler,
}

impl Default for Slots {
    fn default() -> Self {
        Self {
            mempool: Arc::new(|_| {}),
            transaction: Arc::new(|_| {}),
            trace: Arc::new(|_| {}),
            block: Arc::new(|_| {}),
        }
    }
}

/// Monitor guarding the four handler slots.
#[derive(Default)]
pub struct HandlerSlots {
    slots: Mutex<Slots>,
}

impl HandlerSlots {
    /// All four slots start as no-ops.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        // Callbacks never run under the lock, so a poisoned guard still holds
        // consistent slot values.
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_mempool(&self, handler: MempoolHandler) {
        self.lock().mempool = handler;
    }

    pub fn set_transaction(&self, handler: TransactionHandler) {
        self.lock().transaction = handler;
    }

    pub fn set_trace(&self, handler: TraceHandler) {
        self.lock().trace = handler;
    }

    pub fn set_block(&self, handler: BlockHandler) {
        self.lock().block = handler;
    }

    /// Hand an event to the handler registered for its topic.
    pub fn dispatch(&self, event: PushEvent) {
        match event {
            PushEvent::Trace(data) => {
                let handler = Arc::clone(&self.lock().trace);
                handler(data);
            }
            PushEvent::Transaction(data) => {
                let handler = Arc::clone(&self.lock().transaction);
                handler(data);
            }
            PushEvent::Mempool(data) => {
                let handler = Arc::clone(&self.lock().mempool);
                handler(data);
            }
            PushEvent::Block(data) => {
                let handler = Arc::clone(&self.lock().block);
                handler(data);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn trace_event(hash: &str) -> PushEvent {
        PushEvent::Trace(TraceEventData {
            account_ids: vec!["0:01".into()],
            hash: hash.into(),
        })
    }

    #[test]
    fn dispatch_reaches_only_matching_slot() {
        let slots = HandlerSlots::new();
        let traces = Arc::new(AtomicUsize::new(0));
        let others = Arc::new(AtomicUsize::new(0));

        let t = traces.clone();
        slots.set_trace(Arc::new(move |_| {
            t.fetch_add(1, Ordering::SeqCst);
        }));
        let o = others.clone();
        slots.set_block(Arc::new(move |_| {
            o.fetch_add(1, Ordering::SeqCst);
        }));
        let o = others.clone();
        slots.set_transaction(Arc::new(move |_| {
            o.fetch_add(1, Ordering::SeqCst);
        }));

        slots.dispatch(trace_event("a"));

        assert_eq!(traces.load(Ordering::SeqCst), 1);
        assert_eq!(others.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn last_registration_wins() {
        let slots = HandlerSlots::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let f = first.clone();
        slots.set_trace(Arc::new(move |_| {
            f.fetch_add(1, Ordering::SeqCst);
        }));
        let s = second.clone();
        slots.set_trace(Arc::new(move |_| {
            s.fetch_add(1, Ordering::SeqCst);
        }));

        slots.dispatch(trace_event("a"));
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn handler_can_replace_itself_mid_dispatch() {
        let slots = Arc::new(HandlerSlots::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let inner_slots = slots.clone();
        let log = seen.clone();
        slots.set_trace(Arc::new(move |ev: TraceEventData| {
            log.lock().unwrap().push(format!("old:{}", ev.hash));
            let log = log.clone();
            inner_slots.set_trace(Arc::new(move |ev: TraceEventData| {
                log.lock().unwrap().push(format!("new:{}", ev.hash));
            }));
        }));

        slots.dispatch(trace_event("1"));
        slots.dispatch(trace_event("2"));

        assert_eq!(*seen.lock().unwrap(), vec!["old:1", "new:2"]);
    }

    #[test]
    fn defaults_are_noops() {
        let slots = HandlerSlots::new();
        slots.dispatch(PushEvent::Block(BlockEventData {
            workchain: 0,
            shard: "8000000000000000".into(),
            seqno: 1,
            root_hash: "r".into(),
            file_hash: "f".into(),
        }));
    }
}
