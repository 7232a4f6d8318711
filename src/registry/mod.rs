//! Static element-configuration registry.
//!
//! The set of elements is closed: each tag maps to a fixed [`ElementDefinition`]
//! describing its kind, allowed children and attribute contract. The
//! transformer and attribute validator read it; editor tooling may read it for
//! completion. Nothing mutates it.

mod definitions;

use serde::{Deserialize, Serialize};

pub use definitions::definitions;

// =============================================================================
// TAGS / KINDS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementTag {
    Workflow,
    State,
    Parallel,
    Final,
    History,
    Transition,
    OnEntry,
    OnExit,
    If,
    ElseIf,
    Else,
    ForEach,
    DataModel,
    Data,
    Assign,
    Param,
    Content,
    DoneData,
    Script,
    Log,
    Send,
    Raise,
    Cancel,
    Llm,
    ToolCall,
    Input,
    SendText,
    SendObject,
    SendToolCalls,
    Error,
    /// Merged character data. Never resolvable from markup.
    #[serde(rename = "#text")]
    Text,
    /// Inline `{...}` expression. Never resolvable from markup.
    #[serde(rename = "#expression")]
    Expression,
}

/// Coarse behavior class of an element; drives healing and graph construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    State,
    Action,
    ControlFlow,
    Data,
    UserInput,
    Output,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementSubType {
    Workflow,
    Final,
    Parallel,
    History,
    Llm,
    ToolCall,
    Script,
    UserInput,
    Output,
    Error,
    Text,
    Expression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowedChildren {
    None,
    Any,
    Text,
    Tags(&'static [ElementTag]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    String,
    Number,
    Boolean,
    Json,
    /// Must be an expression (or a string that will be evaluated as one).
    Expression,
    /// Literal string restricted to the listed values.
    Enum(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct AttributeSpec {
    pub name: &'static str,
    pub ty: AttributeType,
    pub required: bool,
    pub documentation: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct ElementDefinition {
    pub tag: ElementTag,
    pub kind: ElementKind,
    pub sub_type: Option<ElementSubType>,
    pub allowed_children: AllowedChildren,
    pub attributes: &'static [AttributeSpec],
    pub documentation: &'static str,
}

impl ElementDefinition {
    pub fn required_attributes(&self) -> impl Iterator<Item = &'static str> {
        self.attributes
            .iter()
            .filter(|a| a.required)
            .map(|a| a.name)
    }

    pub fn attribute(&self, name: &str) -> Option<&'static AttributeSpec> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn allows_child(&self, child: ElementTag) -> bool {
        match self.allowed_children {
            AllowedChildren::Any => true,
            AllowedChildren::None => false,
            AllowedChildren::Text => matches!(child, ElementTag::Text | ElementTag::Expression),
            AllowedChildren::Tags(tags) => {
                tags.contains(&child) || matches!(child, ElementTag::Text | ElementTag::Expression)
            }
        }
    }
}

impl ElementTag {
    pub const ALL: [ElementTag; 32] = [
        ElementTag::Workflow,
        ElementTag::State,
        ElementTag::Parallel,
        ElementTag::Final,
        ElementTag::History,
        ElementTag::Transition,
        ElementTag::OnEntry,
        ElementTag::OnExit,
        ElementTag::If,
        ElementTag::ElseIf,
        ElementTag::Else,
        ElementTag::ForEach,
        ElementTag::DataModel,
        ElementTag::Data,
        ElementTag::Assign,
        ElementTag::Param,
        ElementTag::Content,
        ElementTag::DoneData,
        ElementTag::Script,
        ElementTag::Log,
        ElementTag::Send,
        ElementTag::Raise,
        ElementTag::Cancel,
        ElementTag::Llm,
        ElementTag::ToolCall,
        ElementTag::Input,
        ElementTag::SendText,
        ElementTag::SendObject,
        ElementTag::SendToolCalls,
        ElementTag::Error,
        ElementTag::Text,
        ElementTag::Expression,
    ];

    /// Canonical markup name.
    pub fn name(self) -> &'static str {
        match self {
            ElementTag::Workflow => "workflow",
            ElementTag::State => "state",
            ElementTag::Parallel => "parallel",
            ElementTag::Final => "final",
            ElementTag::History => "history",
            ElementTag::Transition => "transition",
            ElementTag::OnEntry => "onentry",
            ElementTag::OnExit => "onexit",
            ElementTag::If => "if",
            ElementTag::ElseIf => "elseif",
            ElementTag::Else => "else",
            ElementTag::ForEach => "foreach",
            ElementTag::DataModel => "datamodel",
            ElementTag::Data => "data",
            ElementTag::Assign => "assign",
            ElementTag::Param => "param",
            ElementTag::Content => "content",
            ElementTag::DoneData => "donedata",
            ElementTag::Script => "script",
            ElementTag::Log => "log",
            ElementTag::Send => "send",
            ElementTag::Raise => "raise",
            ElementTag::Cancel => "cancel",
            ElementTag::Llm => "llm",
            ElementTag::ToolCall => "toolcall",
            ElementTag::Input => "input",
            ElementTag::SendText => "sendtext",
            ElementTag::SendObject => "sendobject",
            ElementTag::SendToolCalls => "sendtoolcalls",
            ElementTag::Error => "error",
            ElementTag::Text => "#text",
            ElementTag::Expression => "#expression",
        }
    }

    /// Case-insensitive lookup of a markup tag name. The `#text` and
    /// `#expression` pseudo-tags are never returned.
    pub fn from_name(name: &str) -> Option<ElementTag> {
        ElementTag::ALL
            .iter()
            .copied()
            .filter(|t| !t.is_character_data())
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }

    pub fn definition(self) -> &'static ElementDefinition {
        definitions::definition(self)
    }

    pub fn kind(self) -> ElementKind {
        self.definition().kind
    }

    pub fn is_character_data(self) -> bool {
        matches!(self, ElementTag::Text | ElementTag::Expression)
    }

    /// Variable declarations that stay at the workflow root without wrapping.
    pub fn is_declaration(self) -> bool {
        matches!(self, ElementTag::DataModel | ElementTag::Data | ElementTag::Param)
    }
}

impl std::fmt::Display for ElementTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(ElementTag::from_name("State"), Some(ElementTag::State));
        assert_eq!(ElementTag::from_name("LLM"), Some(ElementTag::Llm));
        assert_eq!(ElementTag::from_name("sendText"), Some(ElementTag::SendText));
        assert_eq!(ElementTag::from_name("bogus"), None);
    }

    #[test]
    fn pseudo_tags_are_not_resolvable() {
        assert_eq!(ElementTag::from_name("#text"), None);
        assert_eq!(ElementTag::from_name("#expression"), None);
    }

    #[test]
    fn every_tag_has_a_matching_definition() {
        for tag in ElementTag::ALL {
            assert_eq!(tag.definition().tag, tag);
        }
        assert_eq!(definitions().len(), ElementTag::ALL.len());
    }

    #[test]
    fn state_requires_id() {
        let required: Vec<&str> = ElementTag::State.definition().required_attributes().collect();
        assert_eq!(required, vec!["id"]);
        assert_eq!(ElementTag::Llm.definition().sub_type, Some(ElementSubType::Llm));
    }

    #[test]
    fn allowed_children_accepts_character_data_for_tag_lists() {
        let final_def = ElementTag::Final.definition();
        assert!(final_def.allows_child(ElementTag::OnEntry));
        assert!(!final_def.allows_child(ElementTag::State));
        assert!(!ElementTag::Raise.definition().allows_child(ElementTag::Text));
    }
}
