use tracing::{debug, info, warn};

use crate::editor::error::{EditError, ErrorBanner};
use crate::editor::image::EncodedImage;
use crate::editor::navigation::{SelectError, ToolSelector};
use crate::editor::params::{ParamField, ToolParams};
use crate::editor::prompt::{build_edit_plan, EditPlan};
use crate::editor::tools::{ToolGroup, ToolId};
use crate::editor::viewport::Viewport;

/// An edit that has been handed to the requester and not yet completed.
#[derive(Debug, Clone)]
pub struct PendingEdit {
    pub token: u64,
    pub base: EncodedImage,
    pub plan: EditPlan,
}

#[derive(Debug)]
pub enum ApplyOutcome {
    Started(PendingEdit),
    /// Another edit is outstanding; nothing happened.
    Busy,
    /// Validation failed before any request was made. The banner is set.
    Rejected(EditError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    Applied,
    Failed,
    /// The result belongs to an image that has since been replaced or reset.
    Discarded,
    /// No outstanding edit carries this token.
    Unknown,
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    token: u64,
    tool: ToolId,
    generation: u64,
}

/// All state of one editing session. Every method is one discrete event;
/// the only suspension point lives between `begin_edit` and `complete_edit`.
#[derive(Debug, Default)]
pub struct EditorSession {
    original: Option<EncodedImage>,
    edited: Option<EncodedImage>,
    error: Option<ErrorBanner>,
    selector: ToolSelector,
    params: ToolParams,
    viewport: Viewport,
    peeking: bool,
    in_flight: Option<InFlight>,
    next_token: u64,
    // Bumped whenever the base image is replaced outside the edit pipeline.
    generation: u64,
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn original(&self) -> Option<&EncodedImage> {
        self.original.as_ref()
    }

    pub fn edited(&self) -> Option<&EncodedImage> {
        self.edited.as_ref()
    }

    pub fn error(&self) -> Option<&ErrorBanner> {
        self.error.as_ref()
    }

    pub fn selector(&self) -> &ToolSelector {
        &self.selector
    }

    pub fn params(&self) -> &ToolParams {
        &self.params
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn loading_tool(&self) -> Option<ToolId> {
        self.in_flight.map(|in_flight| in_flight.tool)
    }

    pub fn is_peeking(&self) -> bool {
        self.peeking
    }

    /// The image edits apply to: the latest result, else the original.
    pub fn base_image(&self) -> Option<&EncodedImage> {
        self.edited.as_ref().or(self.original.as_ref())
    }

    pub fn displayed_image(&self) -> Option<&EncodedImage> {
        if self.peeking {
            self.original.as_ref()
        } else {
            self.base_image()
        }
    }

    pub fn display_label(&self) -> &'static str {
        if !self.peeking && self.edited.is_some() {
            "Editada"
        } else {
            "Original"
        }
    }

    /// A new main photo discards the previous result and view.
    pub fn upload_original(&mut self, image: EncodedImage) {
        info!(mime_type = image.mime_type(), bytes = image.len(), "original image loaded");
        self.original = Some(image);
        self.edited = None;
        self.error = None;
        self.peeking = false;
        self.viewport.reset();
        self.generation += 1;
    }

    pub fn upload_reference(&mut self, image: EncodedImage) {
        debug!(bytes = image.len(), "clothing reference loaded");
        self.params.clothing_reference = Some(image);
    }

    pub fn upload_pattern(&mut self, image: EncodedImage) {
        debug!(bytes = image.len(), "pattern image loaded");
        self.params.pattern_image = Some(image);
    }

    pub fn record_error(&mut self, err: &EditError) {
        self.error = Some(ErrorBanner::from(err));
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn toggle_section(&mut self, section: ToolGroup) {
        self.selector.toggle_section(section);
    }

    pub fn select_tool(&mut self, tool: ToolId) -> Result<(), SelectError> {
        self.selector.select_tool(tool)
    }

    pub fn set_param(&mut self, field: ParamField, value: &str) {
        self.params.set(field, value);
    }

    /// Checks preconditions and hands out the next request. At most one
    /// request is outstanding at a time.
    pub fn begin_edit(&mut self) -> ApplyOutcome {
        if self.in_flight.is_some() {
            debug!("apply ignored: an edit is already in flight");
            return ApplyOutcome::Busy;
        }

        let prepared = self
            .base_image()
            .cloned()
            .ok_or(EditError::NoBaseImage)
            .and_then(|base| {
                let tool = self
                    .selector
                    .active_tool()
                    .ok_or(EditError::NoToolSelected)?;
                let plan = build_edit_plan(tool, &self.params)?;
                Ok((base, plan))
            });

        let (base, plan) = match prepared {
            Ok(prepared) => prepared,
            Err(err) => {
                warn!(category = ?err.category(), "edit rejected before sending: {}", err);
                self.record_error(&err);
                return ApplyOutcome::Rejected(err);
            }
        };

        self.next_token += 1;
        let token = self.next_token;
        self.in_flight = Some(InFlight {
            token,
            tool: plan.tool,
            generation: self.generation,
        });
        self.error = None;
        info!(tool = plan.tool.as_str(), token, "edit started");
        ApplyOutcome::Started(PendingEdit { token, base, plan })
    }

    pub fn complete_edit(
        &mut self,
        token: u64,
        result: Result<EncodedImage, EditError>,
    ) -> CompletionOutcome {
        let in_flight = match self.in_flight {
            Some(in_flight) if in_flight.token == token => in_flight,
            _ => {
                warn!(token, "completion for an unknown edit ignored");
                return CompletionOutcome::Unknown;
            }
        };
        self.in_flight = None;

        if in_flight.generation != self.generation {
            info!(token, "edit result discarded: base image changed meanwhile");
            return CompletionOutcome::Discarded;
        }

        match result {
            Ok(image) => {
                self.edited = Some(image);
                CompletionOutcome::Applied
            }
            Err(err) => {
                warn!(
                    tool = in_flight.tool.as_str(),
                    category = ?err.category(),
                    "edit failed: {}",
                    err
                );
                self.record_error(&err);
                CompletionOutcome::Failed
            }
        }
    }

    /// Drops the edited result and returns to the original.
    pub fn reset(&mut self) {
        self.edited = None;
        self.error = None;
        self.peeking = false;
        self.viewport.reset();
        self.generation += 1;
    }

    /// Peeking only has an effect when there is an edit to compare against.
    pub fn press_peek(&mut self) -> bool {
        if self.edited.is_some() {
            self.peeking = true;
        }
        self.peeking
    }

    pub fn release_peek(&mut self) {
        self.peeking = false;
    }
}
