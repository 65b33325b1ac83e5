use crate::editor::tools::{ToolGroup, ToolId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectError {
    /// The tool lives in a section that is not open.
    SectionClosed { tool: ToolId, section: ToolGroup },
}

impl std::fmt::Display for SelectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectError::SectionClosed { tool, section } => write!(
                f,
                "'{}' is in the '{}' section; open it first",
                tool, section
            ),
        }
    }
}

/// Which accordion section is open and which tool in it is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToolSelector {
    open_section: Option<ToolGroup>,
    active_tool: Option<ToolId>,
}

impl ToolSelector {
    pub fn open_section(&self) -> Option<ToolGroup> {
        self.open_section
    }

    pub fn active_tool(&self) -> Option<ToolId> {
        self.active_tool
    }

    /// Opens `section`, or closes it if it is already open. Either way the
    /// active tool is cleared and must be picked again.
    pub fn toggle_section(&mut self, section: ToolGroup) {
        self.open_section = if self.open_section == Some(section) {
            None
        } else {
            Some(section)
        };
        self.active_tool = None;
    }

    pub fn select_tool(&mut self, tool: ToolId) -> Result<(), SelectError> {
        if self.open_section != Some(tool.group()) {
            return Err(SelectError::SectionClosed {
                tool,
                section: tool.group(),
            });
        }
        self.active_tool = Some(tool);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_sections_clears_the_tool() {
        let mut selector = ToolSelector::default();
        selector.toggle_section(ToolGroup::Eyes);
        selector.select_tool(ToolId::EyeColor).expect("select");
        assert_eq!(selector.active_tool(), Some(ToolId::EyeColor));

        selector.toggle_section(ToolGroup::Hair);
        assert_eq!(selector.open_section(), Some(ToolGroup::Hair));
        assert_eq!(selector.active_tool(), None);

        selector.select_tool(ToolId::HairStyle).expect("select");
        selector.toggle_section(ToolGroup::Hair);
        assert_eq!(selector.open_section(), None);
        assert_eq!(selector.active_tool(), None);
    }

    #[test]
    fn tools_outside_the_open_section_are_rejected() {
        let mut selector = ToolSelector::default();
        assert!(selector.select_tool(ToolId::Sharpen).is_err());
        selector.toggle_section(ToolGroup::Clothing);
        let err = selector.select_tool(ToolId::Sharpen).unwrap_err();
        assert_eq!(
            err,
            SelectError::SectionClosed {
                tool: ToolId::Sharpen,
                section: ToolGroup::Filters
            }
        );
        assert_eq!(selector.active_tool(), None);
    }

    #[test]
    fn switching_tools_within_a_section() {
        let mut selector = ToolSelector::default();
        selector.toggle_section(ToolGroup::Filters);
        selector.select_tool(ToolId::Sharpen).expect("select");
        selector.select_tool(ToolId::Contrast).expect("select");
        assert_eq!(selector.active_tool(), Some(ToolId::Contrast));
    }
}
