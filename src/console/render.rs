use crate::editor::image::EncodedImage;
use crate::editor::params::ParamField;
use crate::editor::session::EditorSession;
use crate::editor::tools::{ToolGroup, ToolId};

fn describe_image(image: &EncodedImage) -> String {
    match image.dimensions() {
        Some((width, height)) => format!(
            "{} {}x{} ({} bytes)",
            image.mime_type(),
            width,
            height,
            image.len()
        ),
        None => format!("{} ({} bytes)", image.mime_type(), image.len()),
    }
}

fn slot(label: &str, image: Option<&EncodedImage>) -> String {
    match image {
        Some(image) => format!("{label}: {}", describe_image(image)),
        None => format!("{label}: -"),
    }
}

/// Extra inputs a tool needs besides its text fields.
fn attachment_line(session: &EditorSession, tool: ToolId) -> Option<String> {
    let params = session.params();
    match tool {
        ToolId::ClothingSwap => Some(slot("  reference", params.clothing_reference.as_ref())),
        ToolId::ClothingPatternAddImage => Some(slot("  pattern", params.pattern_image.as_ref())),
        _ => None,
    }
}

pub fn render_status(session: &EditorSession) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(slot("original", session.original()));
    lines.push(slot("edited", session.edited()));
    if session.displayed_image().is_some() {
        let peek = if session.is_peeking() { " (comparing)" } else { "" };
        lines.push(format!("showing: {}{}", session.display_label(), peek));
    } else {
        lines.push("showing: nothing; load a photo with 'open <path>'".to_string());
    }

    let viewport = session.viewport();
    let offset = viewport.offset();
    lines.push(format!(
        "view: {:.0}% offset ({:.1}, {:.1}){}",
        viewport.scale() * 100.0,
        offset.x,
        offset.y,
        if viewport.is_dragging() { " dragging" } else { "" }
    ));

    let selector = session.selector();
    let section = selector
        .open_section()
        .map(|section| section.title())
        .unwrap_or("-");
    let tool = selector.active_tool().map(|tool| tool.label()).unwrap_or("-");
    lines.push(format!("section: {section}  tool: {tool}"));
    if let Some(tool) = selector.active_tool() {
        for field in ParamField::for_tool(tool) {
            lines.push(format!("  {} = {}", field, session.params().get(*field)));
        }
        lines.extend(attachment_line(session, tool));
    }

    if let Some(tool) = session.loading_tool() {
        lines.push(format!("Processando: {}...", tool.label()));
    }
    if let Some(banner) = session.error() {
        lines.push(format!("[{}] {}", banner.title, banner.message));
    }
    lines
}

pub fn render_tools(session: &EditorSession) -> Vec<String> {
    let selector = session.selector();
    let mut lines = Vec::new();
    for group in ToolGroup::ALL {
        let open = selector.open_section() == Some(group);
        lines.push(format!(
            "{} {} ({})",
            if open { "v" } else { ">" },
            group.title(),
            group.key()
        ));
        if !open {
            continue;
        }
        for tool in group.tools() {
            let marker = if selector.active_tool() == Some(tool) { "*" } else { " " };
            let fields: Vec<&str> = ParamField::for_tool(tool)
                .iter()
                .map(|field| field.key())
                .collect();
            if fields.is_empty() {
                lines.push(format!("  {marker} {:<28} {}", tool.as_str(), tool.label()));
            } else {
                lines.push(format!(
                    "  {marker} {:<28} {} [{}]",
                    tool.as_str(),
                    tool.label(),
                    fields.join(", ")
                ));
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::error::EditError;
    use crate::editor::image::tests::sample_png;

    #[test]
    fn empty_session_prompts_for_a_photo() {
        let lines = render_status(&EditorSession::new());
        assert_eq!(lines[0], "original: -");
        assert!(lines[2].contains("open <path>"));
        assert!(lines.iter().any(|line| line.starts_with("view: 100%")));
    }

    #[test]
    fn status_lists_the_active_tool_fields_and_banner() {
        let mut session = EditorSession::new();
        session.upload_original(EncodedImage::new(sample_png(4, 3), "image/png"));
        session.toggle_section(ToolGroup::Clothing);
        session.select_tool(ToolId::ClothingSwap).expect("select");
        session.record_error(&EditError::MissingReferenceImage);

        let lines = render_status(&session);
        assert_eq!(lines[0], format!("original: image/png 4x3 ({} bytes)", sample_png(4, 3).len()));
        assert!(lines.contains(&"  swap-target = calças".to_string()));
        assert!(lines.contains(&"  reference: -".to_string()));
        assert!(lines
            .iter()
            .any(|line| line.starts_with("[Falta Imagem de Referência]")));
    }

    #[test]
    fn tools_expand_only_the_open_section() {
        let mut session = EditorSession::new();
        session.toggle_section(ToolGroup::Eyes);
        session.select_tool(ToolId::EyeShape).expect("select");
        let lines = render_tools(&session);
        assert_eq!(lines.len(), ToolGroup::ALL.len() + 2);
        assert!(lines.iter().any(|line| line.contains("* eye-shape")));
        assert!(!lines.iter().any(|line| line.contains("hair-color")));
    }
}
