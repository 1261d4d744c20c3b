// SPDX-License-Identifier: MIT

//! A job body is an opaque future factory closing over the core's other
//! components.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use umcc_core::JobRunOutcome;

pub type JobFuture = Pin<Box<dyn Future<Output = JobRunOutcome> + Send>>;

/// Invoked once per fire; receives a token cancelled when the job's deadline
/// elapses so the body can cooperatively abandon in-flight work.
pub type JobBody = Arc<dyn Fn(CancellationToken) -> JobFuture + Send + Sync>;
