//! The uniform stage contract.
//!
//! Every pipeline step implements [`Stage`]: read any prior context entries,
//! produce one named output. The pipeline treats all stages identically for
//! sequencing, timing, and failure attribution, and stages can be tested in
//! isolation against a synthetic [`SharedContext`].

use async_trait::async_trait;

use crate::context::{SharedContext, StageOutput};
use crate::error::StageError;

#[async_trait]
pub trait Stage: Send + Sync {
    /// Stable stage name, used as the context entry key and in failure
    /// attribution.
    fn name(&self) -> &'static str;

    /// Run the stage against the accumulated context. A returned error is
    /// terminal for the run; recoverable conditions (such as a generation
    /// failure in the email writer) are handled inside the stage.
    async fn run(&self, ctx: &SharedContext) -> Result<StageOutput, StageError>;
}
