// SPDX-License-Identifier: MIT

//! LLM Agent - tool-calling loop that records and scores a run
//!
//! Sends the descriptor's instructions and the user input to a model and
//! resolves tool calls one at a time until the model answers in text. Every
//! call, result and answer is appended to the [`Run`]. The finished run is
//! handed to the descriptor's scorers on a background task, so the reply
//! returns without waiting for any judge.

use super::{Agent, AgentDescriptor, AgentResponse, PendingScores};
use crate::adk::error::CampaignError;
use crate::adk::model::{Content, Model, Part};
use crate::adk::run::{Run, RunItem};
use crate::adk::scorer;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_MAX_TURNS: u32 = 10;

/// Standard LLM agent with tool calling support
pub struct LLMAgent {
    descriptor: Arc<AgentDescriptor>,
    model: Arc<dyn Model>,
    max_turns: u32,
    scorer_timeout: Option<Duration>,
}

impl LLMAgent {
    pub fn new(descriptor: Arc<AgentDescriptor>, model: Arc<dyn Model>) -> Self {
        Self {
            descriptor,
            model,
            max_turns: DEFAULT_MAX_TURNS,
            scorer_timeout: None,
        }
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_scorer_timeout(mut self, timeout: Duration) -> Self {
        self.scorer_timeout = Some(timeout);
        self
    }

    pub fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    /// Execute one tool call; failures go back to the model as `{error}`
    async fn call_tool(&self, name: &str, args: Value) -> Value {
        let Some(tool) = self.descriptor.tool(name) else {
            log::error!("Tool {} not found", name);
            return json!({ "error": format!("Tool {} not found", name) });
        };

        match tool.execute(args).await {
            Ok(result) => result,
            Err(e) => {
                log::error!("Tool {} failed: {}", name, e);
                json!({ "error": e.to_string() })
            }
        }
    }

    fn spawn_scoring(&self, run: &Run) -> Option<PendingScores> {
        if self.descriptor.scorers().is_empty() {
            return None;
        }
        let descriptor = self.descriptor.clone();
        let run = run.clone();
        let timeout = self.scorer_timeout;
        Some(PendingScores::spawn(async move {
            scorer::evaluate(descriptor.scorers(), &run, timeout).await
        }))
    }

    /// Drive the model until it answers, recording everything in `run`
    async fn converse(&self, run: &mut Run) -> Result<String, CampaignError> {
        let name = &self.descriptor.name;
        let mut history = vec![
            Content::system(&self.descriptor.instructions),
            Content::user(&run.input),
        ];

        for turn in 0..self.max_turns {
            log::info!("Agent {} turn {}/{}", name, turn + 1, self.max_turns);
            let response = self
                .model
                .generate_content(&history, None, Some(self.descriptor.tools()))
                .await?;

            let text = response.text();
            let function_calls: Vec<(String, Value, Option<String>)> = response
                .parts
                .iter()
                .filter_map(|part| match part {
                    Part::FunctionCall {
                        name,
                        args,
                        call_id,
                    } => Some((name.clone(), args.clone(), call_id.clone())),
                    _ => None,
                })
                .collect();

            if function_calls.is_empty() {
                if text.is_empty() {
                    log::warn!(
                        "Agent {} received empty response with no function calls",
                        name
                    );
                }
                run.push(RunItem::Text {
                    content: text.clone(),
                });
                return Ok(text);
            }

            if !text.is_empty() {
                run.push(RunItem::Text { content: text });
            }

            // Resolved strictly in order: one result before the next call.
            let mut function_responses = Vec::with_capacity(function_calls.len());
            for (tool, args, call_id) in function_calls {
                log::info!("Tool call: {} {}", tool, args);
                run.push(RunItem::ToolCall {
                    tool: tool.clone(),
                    args: args.clone(),
                });

                let result = self.call_tool(&tool, args).await;
                log::info!("Tool {} response: {}", tool, result);
                run.push(RunItem::ToolResult {
                    tool: tool.clone(),
                    result: result.clone(),
                });

                function_responses.push(Part::FunctionResponse {
                    name: tool,
                    response: result,
                    call_id,
                });
            }

            history.push(response);
            history.push(Content {
                role: "user".to_string(),
                parts: function_responses,
            });
        }

        log::error!("Agent {} reached max turns without text response", name);
        Err(CampaignError::MaxIterations {
            kind: "turns".to_string(),
            limit: self.max_turns,
        })
    }
}

#[async_trait]
impl Agent for LLMAgent {
    fn name(&self) -> &str {
        &self.descriptor.name
    }

    async fn run(&self, input: String) -> Result<AgentResponse, CampaignError> {
        let mut run = Run::new(&self.descriptor.name, input);
        let text = self.converse(&mut run).await?;
        let scoring = self.spawn_scoring(&run);

        Ok(AgentResponse { text, run, scoring })
    }
}
