//! Synchronous calling form
//!
//! [`BlockingClient`] owns a tokio runtime and drives every [`S3Api`]
//! operation to completion on it. Do not use it from inside an async
//! context; blocking a runtime worker on another runtime panics.

use std::future::Future;
use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};

use crate::api::S3Api;
use crate::error::{Error, Result};
use crate::model::*;
use crate::operations::for_each_operation;

/// Blocking wrapper around an [`S3Api`] implementation
pub struct BlockingClient<C> {
    runtime: Runtime,
    inner: Arc<C>,
}

fn build_runtime() -> Result<Runtime> {
    Builder::new_multi_thread()
        .enable_all()
        .thread_name("s3kit-blocking")
        .build()
        .map_err(|e| Error::General(format!("failed to start runtime: {e}")))
}

impl<C: S3Api> BlockingClient<C> {
    /// Wrap an already constructed client
    pub fn new(inner: C) -> Result<Self> {
        Ok(Self {
            runtime: build_runtime()?,
            inner: Arc::new(inner),
        })
    }

    /// Construct the client on the owned runtime
    ///
    /// Clients whose constructors are async (credential providers, region
    /// discovery) must be built inside a runtime; this runs `make` on the
    /// runtime that will later drive the client.
    pub fn build<F, Fut>(make: F) -> Result<Self>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<C>>,
    {
        let runtime = build_runtime()?;
        let inner = runtime.block_on(make())?;
        Ok(Self {
            runtime,
            inner: Arc::new(inner),
        })
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Shared handle to the wrapped client
    pub fn shared(&self) -> Arc<C> {
        Arc::clone(&self.inner)
    }

    /// Run any future on the owned runtime
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

macro_rules! blocking_methods {
    ($($op:ident, $callable:ident, $async_op:ident => $req:ty, $out:ty;)*) => {
        impl<C: S3Api> BlockingClient<C> {
            $(
                #[doc = concat!("Run `", stringify!($op), "` and wait for its outcome")]
                pub fn $op(&self, request: $req) -> Result<$out> {
                    self.runtime.block_on(self.inner.$op(request))
                }
            )*
        }
    };
}

for_each_operation!(blocking_methods);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockS3Api;

    #[test]
    fn test_blocking_call_returns_outcome() {
        let mut mock = MockS3Api::new();
        mock.expect_head_bucket()
            .withf(|req| req.bucket == "photos")
            .returning(|_| {
                Ok(HeadBucketOutput {
                    region: Some("eu-west-1".into()),
                })
            });

        let client = BlockingClient::new(mock).unwrap();
        let out = client.head_bucket(BucketRequest::new("photos")).unwrap();
        assert_eq!(out.region.as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn test_blocking_call_propagates_errors() {
        let mut mock = MockS3Api::new();
        mock.expect_delete_bucket()
            .returning(|_| Err(Error::from_service("BucketNotEmpty", "not empty", 409)));

        let client = BlockingClient::new(mock).unwrap();
        let err = client.delete_bucket(BucketRequest::new("full")).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[test]
    fn test_build_runs_constructor_on_runtime() {
        let client = BlockingClient::build(|| async {
            // Only succeeds inside a runtime
            tokio::task::yield_now().await;
            let mut mock = MockS3Api::new();
            mock.expect_list_buckets()
                .returning(|_| Ok(ListBucketsOutput::default()));
            Ok(mock)
        })
        .unwrap();

        let out = client.list_buckets(ListBucketsRequest).unwrap();
        assert!(out.buckets.is_empty());
    }
}
