//! Pluggable steps of the chat pipeline.
//!
//! Planning, tool dispatch and reply generation each sit behind a trait. The
//! implementations here are the placeholders used until a real reasoning
//! core is wired in; the orchestrator's control flow does not change when
//! they are swapped out.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use unicode_general_category::{get_general_category, GeneralCategory};

use crate::mode::Mode;
use crate::self_model::{Confidence, EpistemicSnapshot};

/// One step of a drafted plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    #[serde(rename = "type")]
    pub step_type: String,
    pub description: String,
}

/// What the assistant intends to do with a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub mode: Mode,
    pub steps: Vec<PlanStep>,
    pub session_id: String,
}

/// Outcome of a single tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    pub output: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn ok(output: Value) -> Self {
        Self {
            success: true,
            output,
            error: None,
        }
    }
}

/// Tool results keyed by tool name.
pub type ToolResults = BTreeMap<String, ToolResult>;

/// Generated reply plus how much we trust it.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub reply: String,
    pub epistemic: EpistemicSnapshot,
}

#[cfg_attr(test, mockall::automock)]
pub trait Planner {
    fn draft(&self, text: &str, mode: Mode, session_id: &str) -> Plan;
}

#[cfg_attr(test, mockall::automock)]
pub trait ToolDispatcher {
    fn dispatch(&self, plan: &Plan, session_id: &str) -> ToolResults;
}

#[cfg_attr(test, mockall::automock)]
pub trait Responder {
    fn respond(
        &self,
        text: &str,
        plan: &Plan,
        tool_results: &ToolResults,
        mode: Mode,
        session_id: &str,
    ) -> Draft;
}

/// Always plans a single "respond directly" step.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticPlanner;

impl Planner for StaticPlanner {
    fn draft(&self, _text: &str, mode: Mode, session_id: &str) -> Plan {
        Plan {
            mode,
            steps: vec![PlanStep {
                step_type: "respond_directly".to_string(),
                description: "Use the core text model to answer the user.".to_string(),
            }],
            session_id: session_id.to_string(),
        }
    }
}

/// Calls nothing and returns no results.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopToolDispatcher;

impl ToolDispatcher for NoopToolDispatcher {
    fn dispatch(&self, _plan: &Plan, _session_id: &str) -> ToolResults {
        ToolResults::new()
    }
}

/// Echoes the user's text back behind the mode prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoResponder;

pub const STUB_SOURCE: &str = "internal_stub";
pub const STUB_NOTES: &str = "Using placeholder echo logic; no real model consulted yet.";

impl Responder for EchoResponder {
    fn respond(
        &self,
        text: &str,
        _plan: &Plan,
        _tool_results: &ToolResults,
        mode: Mode,
        _session_id: &str,
    ) -> Draft {
        let reply = format!(
            "{}Machine Spirit has received: {}. Real reasoning core not wired yet.",
            mode.reply_prefix(),
            quote_literal(text)
        );
        Draft {
            reply,
            epistemic: EpistemicSnapshot {
                confidence: Confidence::Low,
                sources: vec![STUB_SOURCE.to_string()],
                notes: STUB_NOTES.to_string(),
            },
        }
    }
}

/// Quote `text` as a string literal: single quotes unless the text holds a
/// single quote and no double quote. Backslashes, the chosen quote and every
/// non-printable character are escaped (`\xNN`, `\uNNNN`, `\UNNNNNNNN`).
pub fn quote_literal(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if !is_printable(c) => {
                let cp = c as u32;
                if cp <= 0xff {
                    out.push_str(&format!("\\x{:02x}", cp));
                } else if cp <= 0xffff {
                    out.push_str(&format!("\\u{:04x}", cp));
                } else {
                    out.push_str(&format!("\\U{:08x}", cp));
                }
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Printable means: not a control, format, private-use or unassigned code
/// point, and not a separator other than the plain space.
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    !matches!(
        get_general_category(c),
        GeneralCategory::Control
            | GeneralCategory::Format
            | GeneralCategory::Surrogate
            | GeneralCategory::PrivateUse
            | GeneralCategory::Unassigned
            | GeneralCategory::LineSeparator
            | GeneralCategory::ParagraphSeparator
            | GeneralCategory::SpaceSeparator
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_plan_shape() {
        let plan = StaticPlanner.draft("hello", Mode::Ops, "s1");
        assert_eq!(plan.mode, Mode::Ops);
        assert_eq!(plan.session_id, "s1");
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].step_type, "respond_directly");

        let v = serde_json::to_value(&plan).unwrap();
        assert_eq!(v["steps"][0]["type"], "respond_directly");
        assert_eq!(v["mode"], "OPS");
    }

    #[test]
    fn test_noop_dispatch_is_empty() {
        let plan = StaticPlanner.draft("x", Mode::Default, "s1");
        assert!(NoopToolDispatcher.dispatch(&plan, "s1").is_empty());
    }

    #[test]
    fn test_echo_reply() {
        let plan = StaticPlanner.draft("hello", Mode::Dev, "s1");
        let draft = EchoResponder.respond("hello", &plan, &ToolResults::new(), Mode::Dev, "s1");
        assert_eq!(
            draft.reply,
            "[DEV] Machine Spirit has received: 'hello'. Real reasoning core not wired yet."
        );
        assert_eq!(draft.epistemic.confidence, Confidence::Low);
        assert_eq!(draft.epistemic.sources, vec!["internal_stub"]);
        assert_eq!(draft.epistemic.notes, STUB_NOTES);
    }

    #[test]
    fn test_echo_reply_default_mode_has_no_prefix() {
        let plan = StaticPlanner.draft("hey", Mode::Default, "s1");
        let draft = EchoResponder.respond("hey", &plan, &ToolResults::new(), Mode::Default, "s1");
        assert!(draft.reply.starts_with("Machine Spirit has received: 'hey'"));
    }

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("hello"), "'hello'");
        assert_eq!(quote_literal(""), "''");
        assert_eq!(quote_literal("it's"), "\"it's\"");
        assert_eq!(quote_literal("it's \"x\""), "'it\\'s \"x\"'");
        assert_eq!(quote_literal("a\\b"), "'a\\\\b'");
        assert_eq!(quote_literal("line\nbreak"), "'line\\nbreak'");
        assert_eq!(quote_literal("\u{1}"), "'\\x01'");
        assert_eq!(quote_literal("héllo"), "'héllo'");
    }

    #[test]
    fn test_quote_literal_escapes_non_printable() {
        assert_eq!(quote_literal("a\u{a0}b"), "'a\\xa0b'");
        assert_eq!(quote_literal("a\u{200b}b"), "'a\\u200bb'");
        assert_eq!(quote_literal("\u{85}"), "'\\x85'");
        assert_eq!(quote_literal("\u{7f}"), "'\\x7f'");
        assert_eq!(quote_literal("x\u{2028}y\u{2029}"), "'x\\u2028y\\u2029'");
        assert_eq!(quote_literal("\u{3000}"), "'\\u3000'");
        assert_eq!(quote_literal("\u{e000}"), "'\\ue000'");
        assert_eq!(quote_literal("\u{feff}"), "'\\ufeff'");
        assert_eq!(quote_literal("\u{10ffff}"), "'\\U0010ffff'");
        assert_eq!(quote_literal("\u{e0001}"), "'\\U000e0001'");
    }

    #[test]
    fn test_quote_literal_keeps_printable_unicode() {
        assert_eq!(quote_literal("a b"), "'a b'");
        assert_eq!(quote_literal("日本語"), "'日本語'");
        assert_eq!(quote_literal("🤖"), "'🤖'");
        assert_eq!(quote_literal("€ ¥"), "'€ ¥'");
    }

    #[test]
    fn test_tool_result_serialization() {
        let ok = ToolResult::ok(serde_json::json!({"n": 1}));
        assert!(ok.success);
        let v = serde_json::to_value(&ok).unwrap();
        assert!(v.get("error").is_none());

        let failed: ToolResult =
            serde_json::from_str(r#"{"success":false,"output":null,"error":"boom"}"#).unwrap();
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("boom"));
    }
}
