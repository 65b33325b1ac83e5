pub mod commands;
pub mod render;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::CONFIG;
use crate::editor::error::{EditError, ErrorBanner};
use crate::editor::image::EncodedImage;
use crate::editor::requester::{request_edit, ImageEditBackend};
use crate::editor::session::{ApplyOutcome, CompletionOutcome, EditorSession};

use commands::{parse_command, ConsoleCommand, HELP_TEXT};
use render::{render_status, render_tools};

/// Token of the finished edit and what came back.
pub type Completion = (u64, Result<EncodedImage, EditError>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Original,
    Reference,
    Pattern,
}

fn banner_line(banner: &ErrorBanner) -> String {
    format!("[{}] {}", banner.title, banner.message)
}

/// Owns the session and dispatches console commands against it. Edits run
/// on spawned tasks and report back through the completion channel.
pub struct Console<B> {
    session: EditorSession,
    backend: Arc<B>,
    completions: mpsc::UnboundedSender<Completion>,
}

impl<B> Console<B>
where
    B: ImageEditBackend + Send + Sync + 'static,
{
    pub fn new(backend: B) -> (Self, mpsc::UnboundedReceiver<Completion>) {
        let (completions, receiver) = mpsc::unbounded_channel();
        let console = Self {
            session: EditorSession::new(),
            backend: Arc::new(backend),
            completions,
        };
        (console, receiver)
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub async fn execute(&mut self, command: ConsoleCommand) -> (Flow, Vec<String>) {
        let lines = match command {
            ConsoleCommand::Open(source) => self.load(Slot::Original, &source).await,
            ConsoleCommand::Reference(source) => self.load(Slot::Reference, &source).await,
            ConsoleCommand::Pattern(source) => self.load(Slot::Pattern, &source).await,
            ConsoleCommand::Section(section) => {
                self.session.toggle_section(section);
                render_tools(&self.session)
            }
            ConsoleCommand::Tool(tool) => match self.session.select_tool(tool) {
                Ok(()) => render_status(&self.session),
                Err(err) => vec![err.to_string()],
            },
            ConsoleCommand::Set { field, value } => {
                self.session.set_param(field, &value);
                vec![format!("{} = {}", field, self.session.params().get(field))]
            }
            ConsoleCommand::Apply => self.apply(),
            ConsoleCommand::Wheel(delta) => {
                self.session.viewport_mut().wheel(delta);
                self.zoom_line()
            }
            ConsoleCommand::ZoomIn => {
                self.session.viewport_mut().zoom_in();
                self.zoom_line()
            }
            ConsoleCommand::ZoomOut => {
                self.session.viewport_mut().zoom_out();
                self.zoom_line()
            }
            ConsoleCommand::DragStart(point) => {
                if self.session.viewport_mut().begin_drag(point) {
                    Vec::new()
                } else {
                    vec!["zoom in before dragging".to_string()]
                }
            }
            ConsoleCommand::DragMove(point) => {
                self.session.viewport_mut().drag_to(point);
                let offset = self.session.viewport().offset();
                vec![format!("offset ({:.1}, {:.1})", offset.x, offset.y)]
            }
            ConsoleCommand::DragEnd => {
                self.session.viewport_mut().end_drag();
                Vec::new()
            }
            ConsoleCommand::ViewReset => {
                self.session.viewport_mut().reset();
                self.zoom_line()
            }
            ConsoleCommand::Peek(true) => {
                if self.session.press_peek() {
                    vec![format!("showing: {}", self.session.display_label())]
                } else {
                    vec!["nothing to compare yet".to_string()]
                }
            }
            ConsoleCommand::Peek(false) => {
                self.session.release_peek();
                vec![format!("showing: {}", self.session.display_label())]
            }
            ConsoleCommand::Dismiss => {
                self.session.dismiss_error();
                Vec::new()
            }
            ConsoleCommand::Reset => {
                self.session.reset();
                render_status(&self.session)
            }
            ConsoleCommand::Save(dir) => self.save(dir.as_deref()).await,
            ConsoleCommand::Export => match self.session.edited() {
                Some(edited) => vec![edited.to_data_url()],
                None => vec!["nothing to export: apply an edit first".to_string()],
            },
            ConsoleCommand::Status => render_status(&self.session),
            ConsoleCommand::Tools => render_tools(&self.session),
            ConsoleCommand::Help => HELP_TEXT.lines().map(str::to_string).collect(),
            ConsoleCommand::Quit => return (Flow::Quit, Vec::new()),
        };
        (Flow::Continue, lines)
    }

    /// Applies a finished edit to the session.
    pub fn complete(&mut self, (token, result): Completion) -> Vec<String> {
        match self.session.complete_edit(token, result) {
            CompletionOutcome::Applied => {
                let mut lines = vec!["edit applied".to_string()];
                lines.extend(render_status(&self.session));
                lines
            }
            CompletionOutcome::Failed => self
                .session
                .error()
                .map(banner_line)
                .into_iter()
                .collect(),
            CompletionOutcome::Discarded => {
                vec!["edit finished after the photo changed; result discarded".to_string()]
            }
            CompletionOutcome::Unknown => Vec::new(),
        }
    }

    fn zoom_line(&self) -> Vec<String> {
        vec![format!("zoom {:.0}%", self.session.viewport().scale() * 100.0)]
    }

    async fn load(&mut self, slot: Slot, source: &str) -> Vec<String> {
        let image = match EncodedImage::from_source(source).await {
            Ok(image) => image,
            Err(err) => {
                warn!(slot = ?slot, "upload failed: {}", err);
                self.session.record_error(&err);
                return self.session.error().map(banner_line).into_iter().collect();
            }
        };
        let summary = format!("{:?} loaded ({}, {} bytes)", slot, image.mime_type(), image.len());
        match slot {
            Slot::Original => self.session.upload_original(image),
            Slot::Reference => self.session.upload_reference(image),
            Slot::Pattern => self.session.upload_pattern(image),
        }
        vec![summary]
    }

    fn apply(&mut self) -> Vec<String> {
        match self.session.begin_edit() {
            ApplyOutcome::Started(pending) => {
                let label = pending.plan.tool.label();
                let backend = Arc::clone(&self.backend);
                let completions = self.completions.clone();
                tokio::spawn(async move {
                    let result = request_edit(backend.as_ref(), &pending).await;
                    if completions.send((pending.token, result)).is_err() {
                        debug!(token = pending.token, "console closed before the edit finished");
                    }
                });
                vec![format!("Processando: {label}...")]
            }
            ApplyOutcome::Busy => vec!["an edit is already running".to_string()],
            ApplyOutcome::Rejected(err) => vec![banner_line(&ErrorBanner::from(&err))],
        }
    }

    async fn save(&self, dir: Option<&Path>) -> Vec<String> {
        let Some(edited) = self.session.edited() else {
            return vec!["nothing to save: apply an edit first".to_string()];
        };
        let path = CONFIG.download_path(dir.and_then(Path::to_str));
        match write_image(&path, edited).await {
            Ok(()) => {
                info!(path = %path.display(), bytes = edited.len(), "edited image saved");
                vec![format!("saved {}", path.display())]
            }
            Err(err) => {
                warn!("save failed: {:#}", err);
                vec![format!("save failed: {err:#}")]
            }
        }
    }
}

async fn write_image(path: &Path, image: &EncodedImage) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    tokio::fs::write(path, image.bytes())
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

async fn emit(out: &mut tokio::io::Stdout, lines: &[String]) -> anyhow::Result<()> {
    for line in lines {
        out.write_all(line.as_bytes()).await?;
        out.write_all(b"\n").await?;
    }
    out.flush().await?;
    Ok(())
}

/// Reads commands from stdin until `quit` or end of input. Completions are
/// handled as they arrive, between commands.
pub async fn run<B>(backend: B) -> anyhow::Result<()>
where
    B: ImageEditBackend + Send + Sync + 'static,
{
    let (mut console, mut completions) = Console::new(backend);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut out = tokio::io::stdout();

    emit(&mut out, &["Editor de retratos. Type 'help' for commands.".to_string()]).await?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    break;
                };
                let command = match parse_command(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(err) => {
                        emit(&mut out, &[err.to_string()]).await?;
                        continue;
                    }
                };
                let (flow, output) = console.execute(command).await;
                emit(&mut out, &output).await?;
                if flow == Flow::Quit {
                    return Ok(());
                }
            }
            Some(completion) = completions.recv() => {
                let output = console.complete(completion);
                emit(&mut out, &output).await?;
            }
        }
    }

    // Input ended; let a running edit finish so piped scripts see the result.
    if console.session().is_busy() {
        if let Some(completion) = completions.recv().await {
            let output = console.complete(completion);
            emit(&mut out, &output).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::editor::image::tests::sample_png;
    use crate::editor::requester::tests::CannedBackend;
    use crate::editor::tools::{ToolGroup, ToolId};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "portrait-editor-{}-{}",
            name,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).expect("scratch dir");
        dir
    }

    #[tokio::test]
    async fn apply_runs_in_the_background_and_saves() {
        let dir = scratch_dir("apply");
        let photo = dir.join("foto.png");
        std::fs::write(&photo, sample_png(3, 3)).expect("write photo");
        let edited = EncodedImage::new(sample_png(3, 3), "image/png");

        let (mut console, mut completions) = Console::new(CannedBackend::with_image(&edited));
        console
            .execute(ConsoleCommand::Open(photo.display().to_string()))
            .await;
        console.execute(ConsoleCommand::Section(ToolGroup::Filters)).await;
        console.execute(ConsoleCommand::Tool(ToolId::Contrast)).await;

        let (_, lines) = console.execute(ConsoleCommand::Apply).await;
        assert_eq!(lines, vec!["Processando: Aumentar Contraste...".to_string()]);
        let (_, lines) = console.execute(ConsoleCommand::Apply).await;
        assert_eq!(lines, vec!["an edit is already running".to_string()]);

        let completion = completions.recv().await.expect("completion");
        let lines = console.complete(completion);
        assert_eq!(lines[0], "edit applied");
        assert_eq!(console.session().edited(), Some(&edited));

        let (_, lines) = console.execute(ConsoleCommand::Export).await;
        assert_eq!(lines, vec![edited.to_data_url()]);

        let out = dir.join("out");
        let (_, lines) = console.execute(ConsoleCommand::Save(Some(out.clone()))).await;
        let saved = out.join(&CONFIG.download_filename);
        assert_eq!(lines, vec![format!("saved {}", saved.display())]);
        assert_eq!(std::fs::read(&saved).expect("saved file"), edited.bytes());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn failed_upload_shows_a_banner() {
        let (mut console, _completions) = Console::new(CannedBackend::with_image(
            &EncodedImage::new(vec![1], "image/png"),
        ));
        let (flow, lines) = console
            .execute(ConsoleCommand::Open("/nonexistent/foto.png".to_string()))
            .await;
        assert_eq!(flow, Flow::Continue);
        assert!(lines[0].starts_with("[Falha ao Carregar Imagem]"));
        assert!(console.session().original().is_none());
    }

    #[tokio::test]
    async fn save_without_an_edit_is_a_no_op() {
        let (mut console, _completions) = Console::new(CannedBackend::with_image(
            &EncodedImage::new(vec![1], "image/png"),
        ));
        let (_, lines) = console.execute(ConsoleCommand::Save(None)).await;
        assert_eq!(lines, vec!["nothing to save: apply an edit first".to_string()]);
    }

    #[tokio::test]
    async fn rejected_apply_reports_the_banner() {
        let (mut console, _completions) = Console::new(CannedBackend::with_image(
            &EncodedImage::new(vec![1], "image/png"),
        ));
        let (_, lines) = console.execute(ConsoleCommand::Apply).await;
        assert!(lines[0].starts_with("[Nenhuma Imagem Carregada]"));
        let (flow, _) = console.execute(ConsoleCommand::Quit).await;
        assert_eq!(flow, Flow::Quit);
    }
}
