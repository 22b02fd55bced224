use std::future::Future;

use tracing::Instrument;

use crate::error::ValidationError;

use super::step::Step;

/// A chain of stages that can be run as a whole.
pub trait Runnable: Send + Sync {
    type Input: Send;
    type Output: Send;

    /// Appends stage names in execution order.
    fn collect_stages(&self, out: &mut Vec<&'static str>);

    fn run(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = Result<Self::Output, ValidationError>> + Send;
}

async fn run_stage<S: Step>(step: &S, input: S::Input) -> Result<S::Output, ValidationError> {
    let stage = step.name();
    let result = step
        .run(input)
        .instrument(tracing::info_span!("validation_stage", stage))
        .await;
    if let Err(e) = &result {
        tracing::debug!(stage, error = %e, "stage failed; aborting run");
    }
    result
}

pub struct Start<S>(S);

impl<S: Step> Runnable for Start<S> {
    type Input = S::Input;
    type Output = S::Output;

    fn collect_stages(&self, out: &mut Vec<&'static str>) {
        out.push(self.0.name());
    }

    async fn run(&self, input: Self::Input) -> Result<Self::Output, ValidationError> {
        run_stage(&self.0, input).await
    }
}

pub struct Chain<Prev, Current> {
    prev: Prev,
    current: Current,
}

impl<Prev, Current> Runnable for Chain<Prev, Current>
where
    Prev: Runnable,
    Current: Step<Input = Prev::Output>,
{
    type Input = Prev::Input;
    type Output = Current::Output;

    fn collect_stages(&self, out: &mut Vec<&'static str>) {
        self.prev.collect_stages(out);
        out.push(self.current.name());
    }

    async fn run(&self, input: Self::Input) -> Result<Self::Output, ValidationError> {
        let intermediate = self.prev.run(input).await?;
        run_stage(&self.current, intermediate).await
    }
}

/// Stages run strictly in order; the first error aborts the run and later
/// stages never see input.
pub struct Pipeline<S> {
    steps: S,
}

impl Pipeline<()> {
    #[must_use]
    pub fn start<S: Step>(step: S) -> Pipeline<Start<S>> {
        Pipeline { steps: Start(step) }
    }
}

impl<S> Pipeline<S> {
    #[must_use]
    pub fn step<T: Step>(self, step: T) -> Pipeline<Chain<S, T>> {
        Pipeline {
            steps: Chain {
                prev: self.steps,
                current: step,
            },
        }
    }
}

impl<S: Runnable> Pipeline<S> {
    /// Stage names in the order they run.
    #[must_use]
    pub fn stages(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        self.steps.collect_stages(&mut out);
        out
    }

    /// # Errors
    ///
    /// Returns the first `ValidationError` raised by a stage.
    pub async fn run(&self, input: S::Input) -> Result<S::Output, ValidationError> {
        self.steps.run(input).await
    }
}
