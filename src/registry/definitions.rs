//! The element table. Entries are stored in `ElementTag` declaration order so
//! a tag's discriminant indexes its definition.

use super::AllowedChildren as Children;
use super::AttributeType as Ty;
use super::{AttributeSpec, ElementDefinition, ElementKind, ElementSubType, ElementTag};

const fn attr(name: &'static str, ty: Ty, documentation: &'static str) -> AttributeSpec {
    AttributeSpec {
        name,
        ty,
        required: false,
        documentation,
    }
}

const fn required(name: &'static str, ty: Ty, documentation: &'static str) -> AttributeSpec {
    AttributeSpec {
        name,
        ty,
        required: true,
        documentation,
    }
}

const FIELD_TYPES: &[&str] = &["string", "number", "boolean", "json"];

const EXECUTABLE: &[ElementTag] = &[
    ElementTag::Assign,
    ElementTag::Script,
    ElementTag::Log,
    ElementTag::Send,
    ElementTag::Raise,
    ElementTag::Cancel,
    ElementTag::If,
    ElementTag::ElseIf,
    ElementTag::Else,
    ElementTag::ForEach,
    ElementTag::Llm,
    ElementTag::ToolCall,
    ElementTag::SendText,
    ElementTag::SendObject,
    ElementTag::SendToolCalls,
    ElementTag::Error,
];

static DEFINITIONS: [ElementDefinition; 32] = [
    ElementDefinition {
        tag: ElementTag::Workflow,
        kind: ElementKind::State,
        sub_type: Some(ElementSubType::Workflow),
        allowed_children: Children::Any,
        attributes: &[
            attr("id", Ty::String, "Workflow identifier."),
            attr("initial", Ty::String, "Id of the first state to enter."),
            attr("name", Ty::String, "Human readable name."),
            attr("description", Ty::String, "What the workflow does."),
            attr("version", Ty::String, "Workflow version."),
        ],
        documentation: "Root container of the state machine.",
    },
    ElementDefinition {
        tag: ElementTag::State,
        kind: ElementKind::State,
        sub_type: None,
        allowed_children: Children::Any,
        attributes: &[
            required("id", Ty::String, "State identifier, unique within its scope."),
            attr("initial", Ty::String, "Id of the first child state to enter."),
        ],
        documentation: "A state. May contain nested states, actions and transitions.",
    },
    ElementDefinition {
        tag: ElementTag::Parallel,
        kind: ElementKind::State,
        sub_type: Some(ElementSubType::Parallel),
        allowed_children: Children::Any,
        attributes: &[required("id", Ty::String, "State identifier.")],
        documentation: "Runs all child states concurrently.",
    },
    ElementDefinition {
        tag: ElementTag::Final,
        kind: ElementKind::State,
        sub_type: Some(ElementSubType::Final),
        allowed_children: Children::Tags(&[
            ElementTag::OnEntry,
            ElementTag::OnExit,
            ElementTag::DoneData,
        ]),
        attributes: &[attr("id", Ty::String, "Final state identifier.")],
        documentation: "Terminal state of the enclosing compound state or workflow.",
    },
    ElementDefinition {
        tag: ElementTag::History,
        kind: ElementKind::State,
        sub_type: Some(ElementSubType::History),
        allowed_children: Children::Tags(&[ElementTag::Transition]),
        attributes: &[
            required("id", Ty::String, "History pseudo-state identifier."),
            attr("type", Ty::Enum(&["shallow", "deep"]), "History depth."),
        ],
        documentation: "Remembers the last active child configuration.",
    },
    ElementDefinition {
        tag: ElementTag::Transition,
        kind: ElementKind::ControlFlow,
        sub_type: None,
        allowed_children: Children::Tags(EXECUTABLE),
        attributes: &[
            attr("event", Ty::String, "Event descriptor that enables the transition."),
            attr("cond", Ty::Expression, "Guard condition."),
            attr("target", Ty::String, "Id of the target state."),
            attr("type", Ty::Enum(&["internal", "external"]), "Transition type."),
        ],
        documentation: "Moves control to another state.",
    },
    ElementDefinition {
        tag: ElementTag::OnEntry,
        kind: ElementKind::ControlFlow,
        sub_type: None,
        allowed_children: Children::Tags(EXECUTABLE),
        attributes: &[],
        documentation: "Executable content run when the parent state is entered.",
    },
    ElementDefinition {
        tag: ElementTag::OnExit,
        kind: ElementKind::ControlFlow,
        sub_type: None,
        allowed_children: Children::Tags(EXECUTABLE),
        attributes: &[],
        documentation: "Executable content run when the parent state is exited.",
    },
    ElementDefinition {
        tag: ElementTag::If,
        kind: ElementKind::ControlFlow,
        sub_type: None,
        allowed_children: Children::Tags(EXECUTABLE),
        attributes: &[required("cond", Ty::Expression, "Guard condition.")],
        documentation: "Conditional executable content.",
    },
    ElementDefinition {
        tag: ElementTag::ElseIf,
        kind: ElementKind::ControlFlow,
        sub_type: None,
        allowed_children: Children::Tags(EXECUTABLE),
        attributes: &[required("cond", Ty::Expression, "Guard condition.")],
        documentation: "Alternative branch of an `if`.",
    },
    ElementDefinition {
        tag: ElementTag::Else,
        kind: ElementKind::ControlFlow,
        sub_type: None,
        allowed_children: Children::Tags(EXECUTABLE),
        attributes: &[],
        documentation: "Fallback branch of an `if`.",
    },
    ElementDefinition {
        tag: ElementTag::ForEach,
        kind: ElementKind::ControlFlow,
        sub_type: None,
        allowed_children: Children::Tags(EXECUTABLE),
        attributes: &[
            required("array", Ty::Expression, "Collection to iterate."),
            required("item", Ty::String, "Variable bound to the current item."),
            attr("index", Ty::String, "Variable bound to the current index."),
        ],
        documentation: "Iterates executable content over a collection.",
    },
    ElementDefinition {
        tag: ElementTag::DataModel,
        kind: ElementKind::Data,
        sub_type: None,
        allowed_children: Children::Tags(&[ElementTag::Data]),
        attributes: &[],
        documentation: "Groups variable declarations.",
    },
    ElementDefinition {
        tag: ElementTag::Data,
        kind: ElementKind::Data,
        sub_type: None,
        allowed_children: Children::Text,
        attributes: &[
            required("id", Ty::String, "Variable name."),
            attr("type", Ty::Enum(FIELD_TYPES), "Value type."),
            attr("readonly", Ty::Boolean, "Rejects writes after initialization."),
            attr("fromRequest", Ty::Boolean, "Initialized from the workflow request."),
            attr("expr", Ty::String, "Default value."),
            attr("schema", Ty::Json, "JSON schema the value must satisfy."),
        ],
        documentation: "Declares a variable in the enclosing state's scope.",
    },
    ElementDefinition {
        tag: ElementTag::Assign,
        kind: ElementKind::Action,
        sub_type: None,
        allowed_children: Children::Text,
        attributes: &[
            required("location", Ty::String, "Variable to write."),
            attr("expr", Ty::Expression, "Value to assign."),
        ],
        documentation: "Writes a variable.",
    },
    ElementDefinition {
        tag: ElementTag::Param,
        kind: ElementKind::Data,
        sub_type: None,
        allowed_children: Children::None,
        attributes: &[
            required("name", Ty::String, "Parameter name."),
            attr("expr", Ty::Expression, "Parameter value."),
            attr("location", Ty::String, "Variable holding the value."),
        ],
        documentation: "Named parameter for `send`, `donedata` or the workflow.",
    },
    ElementDefinition {
        tag: ElementTag::Content,
        kind: ElementKind::Data,
        sub_type: None,
        allowed_children: Children::Text,
        attributes: &[attr("expr", Ty::Expression, "Content value.")],
        documentation: "Inline payload.",
    },
    ElementDefinition {
        tag: ElementTag::DoneData,
        kind: ElementKind::Data,
        sub_type: None,
        allowed_children: Children::Tags(&[ElementTag::Content, ElementTag::Param]),
        attributes: &[],
        documentation: "Data returned when a final state is reached.",
    },
    ElementDefinition {
        tag: ElementTag::Script,
        kind: ElementKind::Action,
        sub_type: Some(ElementSubType::Script),
        allowed_children: Children::Text,
        attributes: &[
            attr("src", Ty::String, "External script location."),
            attr("lang", Ty::Enum(&["javascript", "python"]), "Script language."),
        ],
        documentation: "Runs a script.",
    },
    ElementDefinition {
        tag: ElementTag::Log,
        kind: ElementKind::Action,
        sub_type: None,
        allowed_children: Children::None,
        attributes: &[
            attr("label", Ty::String, "Log label."),
            attr("expr", Ty::Expression, "Value to log."),
        ],
        documentation: "Writes a log record.",
    },
    ElementDefinition {
        tag: ElementTag::Send,
        kind: ElementKind::Action,
        sub_type: None,
        allowed_children: Children::Tags(&[ElementTag::Param, ElementTag::Content]),
        attributes: &[
            attr("event", Ty::String, "Event name."),
            attr("target", Ty::String, "Destination."),
            attr("delay", Ty::String, "Delay before dispatch."),
            attr("id", Ty::String, "Send id used by `cancel`."),
        ],
        documentation: "Sends an event.",
    },
    ElementDefinition {
        tag: ElementTag::Raise,
        kind: ElementKind::Action,
        sub_type: None,
        allowed_children: Children::None,
        attributes: &[required("event", Ty::String, "Internal event name.")],
        documentation: "Raises an internal event.",
    },
    ElementDefinition {
        tag: ElementTag::Cancel,
        kind: ElementKind::Action,
        sub_type: None,
        allowed_children: Children::None,
        attributes: &[attr("sendid", Ty::String, "Id of the `send` to cancel.")],
        documentation: "Cancels a delayed `send`.",
    },
    ElementDefinition {
        tag: ElementTag::Llm,
        kind: ElementKind::Action,
        sub_type: Some(ElementSubType::Llm),
        allowed_children: Children::Text,
        attributes: &[
            attr("id", Ty::String, "Action identifier."),
            attr("model", Ty::String, "Model name."),
            attr("prompt", Ty::String, "Prompt. Defaults to the element's text."),
            attr("instructions", Ty::String, "System instructions."),
            attr("temperature", Ty::Number, "Sampling temperature."),
            attr("includeChatHistory", Ty::Boolean, "Send prior turns."),
            attr("stream", Ty::Boolean, "Stream the response."),
            attr("responseFormat", Ty::Enum(&["text", "json", "gbnf"]), "Response format."),
            attr("tools", Ty::Json, "Tool definitions."),
        ],
        documentation: "Invokes a language model.",
    },
    ElementDefinition {
        tag: ElementTag::ToolCall,
        kind: ElementKind::Action,
        sub_type: Some(ElementSubType::ToolCall),
        allowed_children: Children::Any,
        attributes: &[
            required("name", Ty::String, "Tool name."),
            attr("description", Ty::String, "Tool description."),
        ],
        documentation: "Invokes a tool.",
    },
    ElementDefinition {
        tag: ElementTag::Input,
        kind: ElementKind::UserInput,
        sub_type: Some(ElementSubType::UserInput),
        allowed_children: Children::Text,
        attributes: &[
            attr("id", Ty::String, "Input identifier."),
            attr("prompt", Ty::String, "Question shown to the user."),
            attr("schema", Ty::Json, "Expected answer shape."),
        ],
        documentation: "Pauses for user input.",
    },
    ElementDefinition {
        tag: ElementTag::SendText,
        kind: ElementKind::Output,
        sub_type: Some(ElementSubType::Output),
        allowed_children: Children::Text,
        attributes: &[attr("expr", Ty::Expression, "Text to emit.")],
        documentation: "Emits text to the caller.",
    },
    ElementDefinition {
        tag: ElementTag::SendObject,
        kind: ElementKind::Output,
        sub_type: Some(ElementSubType::Output),
        allowed_children: Children::Text,
        attributes: &[
            attr("expr", Ty::Expression, "Object to emit."),
            attr("schema", Ty::Json, "Shape of the object."),
        ],
        documentation: "Emits a structured object to the caller.",
    },
    ElementDefinition {
        tag: ElementTag::SendToolCalls,
        kind: ElementKind::Output,
        sub_type: Some(ElementSubType::Output),
        allowed_children: Children::Tags(&[ElementTag::ToolCall]),
        attributes: &[attr("expr", Ty::Expression, "Tool calls to emit.")],
        documentation: "Emits tool calls to the caller.",
    },
    ElementDefinition {
        tag: ElementTag::Error,
        kind: ElementKind::Error,
        sub_type: Some(ElementSubType::Error),
        allowed_children: Children::Text,
        attributes: &[
            attr("code", Ty::String, "Machine readable error code."),
            attr("message", Ty::String, "Error message."),
        ],
        documentation: "Fails the workflow and enters the error state.",
    },
    ElementDefinition {
        tag: ElementTag::Text,
        kind: ElementKind::Data,
        sub_type: Some(ElementSubType::Text),
        allowed_children: Children::None,
        attributes: &[attr("value", Ty::String, "Character data.")],
        documentation: "Character data.",
    },
    ElementDefinition {
        tag: ElementTag::Expression,
        kind: ElementKind::Data,
        sub_type: Some(ElementSubType::Expression),
        allowed_children: Children::None,
        attributes: &[attr("value", Ty::Expression, "Expression source.")],
        documentation: "Inline expression.",
    },
];

pub(super) fn definition(tag: ElementTag) -> &'static ElementDefinition {
    &DEFINITIONS[tag as usize]
}

/// All element definitions, in tag order.
pub fn definitions() -> &'static [ElementDefinition] {
    &DEFINITIONS
}
