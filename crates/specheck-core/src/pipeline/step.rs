use std::future::Future;

use crate::error::ValidationError;

/// One typed stage of a validation run.
pub trait Step: Send + Sync {
    type Input: Send;
    type Output: Send;

    /// Stage name used for the tracing span and [`super::Pipeline::stages`].
    fn name(&self) -> &'static str;

    fn run(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = Result<Self::Output, ValidationError>> + Send;
}
