//! Bounded inference executor (§4.1).
//!
//! Bridges synchronous, blocking model calls onto `tokio::task::spawn_blocking`, gated by
//! a semaphore sized `INFERENCE_THREAD_POOL_SIZE`. This is the generalization of the
//! dedicated-OS-thread pattern used elsewhere in this codebase for `!Send` resources:
//! instead of one actor thread, a bounded pool of blocking tasks — because inference calls
//! here do not hold any `!Send` state across calls, a semaphore-gated pool is sufficient
//! and avoids pinning idle threads when no work is in flight.

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};

use crate::error::EngineError;

/// One item flowing from a blocking generator to its async consumer.
enum StreamItem<T> {
    Value(T),
    End,
    Error(EngineError),
}

/// Bounded worker pool bridging blocking model calls to async callers.
#[derive(Clone)]
pub struct InferenceExecutor {
    permits: Arc<Semaphore>,
}

impl InferenceExecutor {
    /// `pool_size` is the concurrency cap (`INFERENCE_THREAD_POOL_SIZE`, default
    /// `max(4, logical CPU count)`, per §4.1).
    #[must_use]
    pub fn new(pool_size: usize) -> Self {
        Self { permits: Arc::new(Semaphore::new(pool_size.max(1))) }
    }

    /// Schedules `f` on a worker thread and awaits its result. The blocking side's error
    /// (if any) is raised exactly once on the async side.
    pub async fn run_sync<F, T>(&self, f: F) -> Result<T, EngineError>
    where
        F: FnOnce() -> Result<T, EngineError> + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| EngineError::ExecutorShutDown)?;

        let join = tokio::task::spawn_blocking(move || {
            let result = f();
            drop(permit);
            result
        });

        join.await.map_err(|e| EngineError::Inference(format!("worker panicked: {e}")))?
    }

    /// Gates an already-async call behind the same concurrency cap as [`Self::run_sync`],
    /// without the `spawn_blocking` hop: used for engine trait methods that are themselves
    /// `async fn` rather than blocking closures, so there is nothing to hand off to a
    /// worker thread — only the permit needs acquiring.
    pub async fn run_async<F, Fut, T>(&self, f: F) -> Result<T, EngineError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, EngineError>>,
    {
        let _permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| EngineError::ExecutorShutDown)?;
        f().await
    }

    /// Schedules a blocking generator and returns a bounded async stream of its items.
    ///
    /// The generator is given a `yield_item` closure to call for each produced value; it
    /// returns `Ok(())` on normal completion or `Err` to propagate a single failure. The
    /// consumer may drop the returned receiver at any time: the next attempted `yield_item`
    /// call then fails, and the generator is expected to return promptly — cooperative,
    /// not preemptive, cancellation.
    pub fn run_sync_generator<F, T>(&self, queue_capacity: usize, f: F) -> mpsc::Receiver<Result<T, EngineError>>
    where
        F: FnOnce(&dyn Fn(T) -> Result<(), ()>) -> Result<(), EngineError> + Send + 'static,
        T: Send + 'static,
    {
        let (item_tx, mut item_rx) = mpsc::channel::<StreamItem<T>>(queue_capacity);
        let (out_tx, out_rx) = mpsc::channel::<Result<T, EngineError>>(queue_capacity);

        let permits = Arc::clone(&self.permits);

        tokio::spawn(async move {
            let _permit = permits.acquire_owned().await;
            let producer_tx = item_tx.clone();
            let join = tokio::task::spawn_blocking(move || {
                let yield_fn = |value: T| -> Result<(), ()> {
                    producer_tx.blocking_send(StreamItem::Value(value)).map_err(|_| ())
                };
                let result = f(&yield_fn);
                let final_item = match result {
                    Ok(()) => StreamItem::End,
                    Err(e) => StreamItem::Error(e),
                };
                let _ = producer_tx.blocking_send(final_item);
            });

            while let Some(item) = item_rx.recv().await {
                match item {
                    StreamItem::Value(v) => {
                        if out_tx.send(Ok(v)).await.is_err() {
                            break;
                        }
                    }
                    StreamItem::End => break,
                    StreamItem::Error(e) => {
                        let _ = out_tx.send(Err(e)).await;
                        break;
                    }
                }
            }

            let _ = join.await;
        });

        out_rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_sync_returns_the_blocking_result() {
        let executor = InferenceExecutor::new(4);
        let result = executor.run_sync(|| Ok::<_, EngineError>(2 + 2)).await.unwrap();
        assert_eq!(result, 4);
    }

    #[tokio::test]
    async fn run_sync_propagates_the_blocking_error_exactly_once() {
        let executor = InferenceExecutor::new(4);
        let result: Result<i32, EngineError> =
            executor.run_sync(|| Err(EngineError::Inference("boom".into()))).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn run_async_awaits_the_future_under_a_permit() {
        let executor = InferenceExecutor::new(4);
        let result = executor.run_async(|| async { Ok::<_, EngineError>(2 + 2) }).await.unwrap();
        assert_eq!(result, 4);
    }

    #[tokio::test]
    async fn run_async_propagates_the_future_error() {
        let executor = InferenceExecutor::new(4);
        let result: Result<i32, EngineError> =
            executor.run_async(|| async { Err(EngineError::Inference("boom".into())) }).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn run_sync_generator_streams_items_then_ends() {
        let executor = InferenceExecutor::new(4);
        let mut rx = executor.run_sync_generator(8, |yield_item| {
            for i in 0..5 {
                yield_item(i).map_err(|()| EngineError::Inference("consumer gone".into()))?;
            }
            Ok(())
        });

        let mut collected = Vec::new();
        while let Some(item) = rx.recv().await {
            collected.push(item.unwrap());
        }
        assert_eq!(collected, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn run_sync_generator_propagates_a_single_error() {
        let executor = InferenceExecutor::new(4);
        let mut rx = executor.run_sync_generator(8, |yield_item| {
            yield_item(1).map_err(|()| EngineError::Inference("consumer gone".into()))?;
            Err(EngineError::Inference("model failed mid-stream".into()))
        });

        let first = rx.recv().await.unwrap();
        assert!(first.is_ok());
        let second = rx.recv().await.unwrap();
        assert!(second.is_err());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn dropping_the_consumer_stops_the_generator_cooperatively() {
        let executor = InferenceExecutor::new(4);
        let produced = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let produced_clone = Arc::clone(&produced);

        let rx = executor.run_sync_generator(1, move |yield_item| {
            for i in 0..1000usize {
                if yield_item(i).is_err() {
                    return Ok(());
                }
                produced_clone.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            }
            Ok(())
        });

        drop(rx);
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(produced.load(std::sync::atomic::Ordering::SeqCst) < 1000);
    }
}
