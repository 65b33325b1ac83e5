use std::future::Future;

use serde_json::json;
use tracing::{info, warn};

use crate::editor::error::EditError;
use crate::editor::image::EncodedImage;
use crate::editor::prompt::EditPlan;
use crate::editor::session::PendingEdit;
use crate::llm::gemini::{extract_first_image, GeminiResponse};
use crate::utils::timing::log_llm_timing;

/// The external generation service. One call per apply; no retries.
pub trait ImageEditBackend {
    fn provider(&self) -> &str;

    fn model(&self) -> &str;

    fn generate(
        &self,
        base: &EncodedImage,
        plan: &EditPlan,
    ) -> impl Future<Output = Result<GeminiResponse, EditError>> + Send;
}

/// Sends one edit and decodes the returned image.
pub async fn request_edit<B: ImageEditBackend>(
    backend: &B,
    pending: &PendingEdit,
) -> Result<EncodedImage, EditError> {
    let metadata = json!({
        "tool": pending.plan.tool.as_str(),
        "token": pending.token,
        "attachments": pending.plan.attachments.len(),
        "baseBytes": pending.base.len(),
    });

    let image = log_llm_timing(
        backend.provider(),
        backend.model(),
        "edit_image",
        Some(metadata),
        || async {
            let response = backend.generate(&pending.base, &pending.plan).await?;
            extract_first_image(&response)
        },
    )
    .await?;

    check_dimensions(&pending.base, &image);
    info!(
        tool = pending.plan.tool.as_str(),
        mime_type = image.mime_type(),
        bytes = image.len(),
        "edit applied"
    );
    Ok(image)
}

/// The prompt asks for identical dimensions; a mismatch is reported but the
/// result is still used.
fn check_dimensions(base: &EncodedImage, edited: &EncodedImage) -> bool {
    match (base.dimensions(), edited.dimensions()) {
        (Some(before), Some(after)) if before != after => {
            warn!(
                "edited image is {}x{} but the base image is {}x{}",
                after.0, after.1, before.0, before.1
            );
            false
        }
        _ => true,
    }
}
