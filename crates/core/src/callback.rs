//! Callable and callback calling forms
//!
//! [`AsyncClient`] submits operations to an [`Executor`]. For every
//! operation `op` it offers:
//!
//! - `op_callable(request)`: returns an [`OperationHandle`] that resolves to
//!   the outcome once the submitted task finishes
//! - `op_async(request, handler, context)`: runs `handler` with the client,
//!   the request, the outcome and the caller context when the task finishes

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use tokio::runtime::Handle;
use tokio::sync::oneshot;

use crate::api::S3Api;
use crate::error::{Error, Result};
use crate::model::*;
use crate::operations::for_each_operation;

/// Runs submitted operations
pub trait Executor: Send + Sync {
    fn submit(&self, task: BoxFuture<'static, ()>);
}

/// Executor spawning onto a tokio runtime
#[derive(Debug, Clone)]
pub struct TokioExecutor {
    handle: Handle,
}

impl TokioExecutor {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Executor for the runtime the caller is running on
    pub fn current() -> Result<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| Error::General(format!("no tokio runtime available: {e}")))
    }
}

impl Executor for TokioExecutor {
    fn submit(&self, task: BoxFuture<'static, ()>) {
        self.handle.spawn(task);
    }
}

static CONTEXT_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Opaque caller context handed back to callback handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    id: String,
}

impl CallerContext {
    /// Context with a generated, process-unique id
    pub fn new() -> Self {
        let nanos = jiff::Timestamp::now().as_nanosecond() as u128;
        let count = CONTEXT_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self {
            id: format!(
                "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
                (nanos >> 64) as u32 ^ (nanos >> 32) as u32,
                (nanos >> 16) as u16,
                nanos as u16,
                (count >> 48) as u16,
                count & 0xffff_ffff_ffff,
            ),
        }
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Default for CallerContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Pending outcome of a submitted operation
///
/// Resolves to [`Error::Cancelled`] if the executor drops the task before it
/// completes.
#[must_use = "the outcome is lost unless the handle is awaited"]
pub struct OperationHandle<T> {
    receiver: oneshot::Receiver<Result<T>>,
}

impl<T> OperationHandle<T> {
    /// Block the current thread until the outcome is available
    ///
    /// Must not be called from inside an async context.
    pub fn wait(self) -> Result<T> {
        self.receiver
            .blocking_recv()
            .unwrap_or_else(|_| Err(Error::Cancelled))
    }
}

impl<T> Future for OperationHandle<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|outcome| outcome.unwrap_or_else(|_| Err(Error::Cancelled)))
    }
}

/// Client exposing the callable and callback forms of every operation
pub struct AsyncClient<C> {
    client: Arc<C>,
    executor: Arc<dyn Executor>,
}

impl<C> Clone for AsyncClient<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            executor: Arc::clone(&self.executor),
        }
    }
}

impl<C: S3Api + 'static> AsyncClient<C> {
    pub fn new(client: C, executor: Arc<dyn Executor>) -> Self {
        Self::from_shared(Arc::new(client), executor)
    }

    pub fn from_shared(client: Arc<C>, executor: Arc<dyn Executor>) -> Self {
        Self { client, executor }
    }

    /// Use the current tokio runtime as executor
    pub fn with_tokio(client: C) -> Result<Self> {
        Ok(Self::new(client, Arc::new(TokioExecutor::current()?)))
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn submit_callable<T, F>(&self, future: F) -> OperationHandle<T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        self.executor.submit(Box::pin(async move {
            // The caller may have dropped the handle
            let _ = sender.send(future.await);
        }));
        OperationHandle { receiver }
    }
}

macro_rules! callback_methods {
    ($($op:ident, $callable:ident, $async_op:ident => $req:ty, $out:ty;)*) => {
        impl<C: S3Api + 'static> AsyncClient<C> {
            $(
                #[doc = concat!("Submit `", stringify!($op), "` and return a handle to its outcome")]
                pub fn $callable(&self, request: $req) -> OperationHandle<$out> {
                    tracing::trace!(operation = stringify!($op), "submitting");
                    let client = Arc::clone(&self.client);
                    self.submit_callable(async move { client.$op(request).await })
                }

                #[doc = concat!("Submit `", stringify!($op), "` and run `handler` with its outcome")]
                ///
                /// The handler receives a copy of the request as it was submitted.
                pub fn $async_op<H>(
                    &self,
                    request: $req,
                    handler: H,
                    context: Option<Arc<CallerContext>>,
                ) where
                    H: FnOnce(&C, &$req, Result<$out>, Option<Arc<CallerContext>>) + Send + 'static,
                {
                    tracing::trace!(operation = stringify!($op), "submitting with handler");
                    let client = Arc::clone(&self.client);
                    self.executor.submit(Box::pin(async move {
                        let outcome = client.$op(request.clone()).await;
                        handler(&client, &request, outcome, context);
                    }));
                }
            )*
        }
    };
}

for_each_operation!(callback_methods);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockS3Api;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Executor that discards every task
    struct DroppingExecutor;

    impl Executor for DroppingExecutor {
        fn submit(&self, _task: BoxFuture<'static, ()>) {}
    }

    /// Executor that records submissions and forwards them to tokio
    struct CountingExecutor {
        inner: TokioExecutor,
        submitted: Mutex<usize>,
    }

    impl Executor for CountingExecutor {
        fn submit(&self, task: BoxFuture<'static, ()>) {
            *self.submitted.lock().unwrap() += 1;
            self.inner.submit(task);
        }
    }

    fn mock_with_location() -> MockS3Api {
        let mut mock = MockS3Api::new();
        mock.expect_get_bucket_location()
            .returning(|req| Ok(GetBucketLocationOutput::from_constraint(Some(req.bucket.as_str()))));
        mock
    }

    #[tokio::test]
    async fn test_callable_resolves_to_outcome() {
        let client = AsyncClient::with_tokio(mock_with_location()).unwrap();
        let handle = client.get_bucket_location_callable(BucketRequest::new("eu-west-1"));
        assert_eq!(handle.await.unwrap().region, "eu-west-1");
    }

    #[tokio::test]
    async fn test_dropped_task_is_cancelled() {
        let client = AsyncClient::new(mock_with_location(), Arc::new(DroppingExecutor));
        let outcome = client
            .get_bucket_location_callable(BucketRequest::new("b1b"))
            .await;
        assert!(matches!(outcome, Err(Error::Cancelled)));
    }

    #[tokio::test]
    async fn test_async_handler_receives_request_and_context() {
        let executor = Arc::new(CountingExecutor {
            inner: TokioExecutor::current().unwrap(),
            submitted: Mutex::new(0),
        });
        let client = AsyncClient::new(mock_with_location(), executor.clone());
        let (tx, rx) = oneshot::channel();

        client.get_bucket_location_async(
            BucketRequest::new("ap-south-1"),
            move |_client, request, outcome, context| {
                let _ = tx.send((request.bucket.clone(), outcome.map(|o| o.region), context));
            },
            Some(Arc::new(CallerContext::with_id("ctx-1"))),
        );

        let (bucket, region, context) = rx.await.unwrap();
        assert_eq!(bucket, "ap-south-1");
        assert_eq!(region.unwrap(), "ap-south-1");
        assert_eq!(context.unwrap().id(), "ctx-1");
        assert_eq!(*executor.submitted.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_async_handler_receives_errors() {
        let mut mock = MockS3Api::new();
        mock.expect_get_bucket_policy()
            .returning(|_| Err(Error::from_service("NoSuchBucketPolicy", "", 404)));
        let client = AsyncClient::with_tokio(mock).unwrap();
        let (tx, rx) = oneshot::channel();

        client.get_bucket_policy_async(
            BucketRequest::new("open"),
            move |_, _, outcome, context| {
                let _ = tx.send((outcome.is_err_and(|e| e.is_not_found()), context.is_none()));
            },
            None,
        );

        assert_eq!(rx.await.unwrap(), (true, true));
    }

    #[test]
    fn test_caller_context_ids_are_unique() {
        let ids: HashSet<String> = (0..100)
            .map(|_| CallerContext::new().id().to_string())
            .collect();
        assert_eq!(ids.len(), 100);
        assert_eq!(CallerContext::with_id("x").id(), "x");
    }

    #[test]
    fn test_operation_handle_wait() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let client = AsyncClient::new(
            mock_with_location(),
            Arc::new(TokioExecutor::new(runtime.handle().clone())),
        );
        let outcome = client
            .get_bucket_location_callable(BucketRequest::new("us-west-2"))
            .wait();
        assert_eq!(outcome.unwrap().region, "us-west-2");
    }
}
