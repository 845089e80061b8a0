// SPDX-License-Identifier: MIT

//! Run transcripts
//!
//! A [`Run`] records one agent invocation: the user input and the ordered
//! output items the runtime produced. Scorers only ever see a shared,
//! immutable reference to it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One entry of a run's output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunItem {
    ToolCall { tool: String, args: Value },
    ToolResult { tool: String, result: Value },
    Text { content: String },
}

/// The transcript of one agent invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: Uuid,
    pub agent: String,
    pub input: String,
    pub output: Vec<RunItem>,
}

impl Run {
    pub fn new(agent: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            agent: agent.into(),
            input: input.into(),
            output: Vec::new(),
        }
    }

    pub fn push(&mut self, item: RunItem) {
        self.output.push(item);
    }

    pub fn with_items(mut self, items: impl IntoIterator<Item = RunItem>) -> Self {
        self.output.extend(items);
        self
    }

    /// Arguments of the first tool call, if any
    pub fn first_tool_call(&self) -> Option<(&str, &Value)> {
        self.output.iter().find_map(|item| match item {
            RunItem::ToolCall { tool, args } => Some((tool.as_str(), args)),
            _ => None,
        })
    }

    /// Payload of the first tool result, if any
    pub fn first_tool_result(&self) -> Option<(&str, &Value)> {
        self.output.iter().find_map(|item| match item {
            RunItem::ToolResult { tool, result } => Some((tool.as_str(), result)),
            _ => None,
        })
    }

    /// Names of every tool called, in call order
    pub fn tool_calls(&self) -> Vec<&str> {
        self.output
            .iter()
            .filter_map(|item| match item {
                RunItem::ToolCall { tool, .. } => Some(tool.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Text of the last output item; empty when the run ended on anything else
    pub fn final_response(&self) -> &str {
        match self.output.last() {
            Some(RunItem::Text { content }) => content,
            _ => "",
        }
    }
}
