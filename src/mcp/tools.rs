//! Tool manifest, argument parsing, and result rendering.

use serde_json::{Map, Value, json};

use super::protocol::JsonRpcError;
use crate::retrieval::RetrievedResult;

pub const SEARCH_TOOL: &str = "search_knowledge_base";
pub const ANSWER_TOOL: &str = "answer_question";

/// A validated `tools/call` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    Search { query: String, top_k: Option<usize> },
    Answer { question: String },
}

/// The `tools/list` result.
pub fn tool_manifest(default_top_k: usize) -> Value {
    json!({
        "tools": [
            {
                "name": SEARCH_TOOL,
                "description": "Search the knowledge base and return relevant document chunks",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "The search query"
                        },
                        "top_k": {
                            "type": "integer",
                            "description": "Number of results to return",
                            "default": default_top_k,
                            "minimum": 1
                        }
                    },
                    "required": ["query"]
                }
            },
            {
                "name": ANSWER_TOOL,
                "description": "Answer a question using the knowledge base and LLM",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "question": {
                            "type": "string",
                            "description": "The question to answer"
                        }
                    },
                    "required": ["question"]
                }
            }
        ]
    })
}

/// Validate `tools/call` params: `{ name, arguments? }`.
pub fn parse_tool_call(params: Option<&Value>) -> Result<ToolCall, JsonRpcError> {
    let params = params.and_then(Value::as_object);
    let name = params
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str)
        .ok_or_else(|| JsonRpcError::invalid_params("Missing required parameter: name"))?;

    let empty = Map::new();
    let arguments = match params.and_then(|p| p.get("arguments")) {
        None | Some(Value::Null) => &empty,
        Some(Value::Object(args)) => args,
        Some(_) => return Err(JsonRpcError::invalid_params("Invalid parameter: arguments must be an object")),
    };

    match name {
        SEARCH_TOOL => Ok(ToolCall::Search {
            query: required_string(arguments, "query")?,
            top_k: optional_top_k(arguments)?,
        }),
        ANSWER_TOOL => Ok(ToolCall::Answer {
            question: required_string(arguments, "question")?,
        }),
        other => Err(JsonRpcError::invalid_params(format!("Unknown tool: {other}"))),
    }
}

fn required_string(arguments: &Map<String, Value>, key: &str) -> Result<String, JsonRpcError> {
    match arguments.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        None | Some(Value::Null) | Some(Value::String(_)) => Err(JsonRpcError::invalid_params(
            format!("Missing required parameter: {key}"),
        )),
        Some(_) => Err(JsonRpcError::invalid_params(format!(
            "Invalid parameter: {key} must be a string"
        ))),
    }
}

fn optional_top_k(arguments: &Map<String, Value>) -> Result<Option<usize>, JsonRpcError> {
    match arguments.get("top_k") {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .filter(|k| *k >= 1)
            .and_then(|k| usize::try_from(k).ok())
            .map(Some)
            .ok_or_else(|| {
                JsonRpcError::invalid_params("Invalid parameter: top_k must be a positive integer")
            }),
    }
}

fn text_block(text: String) -> Value {
    json!({ "type": "text", "text": text })
}

/// One text block per result.
pub fn search_result_content(results: &[RetrievedResult]) -> Value {
    let content: Vec<Value> = results
        .iter()
        .map(|r| {
            text_block(format!(
                "Result {}:\n{}\n\nSource: {}",
                r.rank,
                r.content(),
                r.source()
            ))
        })
        .collect();
    json!({ "content": content })
}

/// A single text block with the answer and a numbered source list.
pub fn answer_content(answer: &str, sources: &[RetrievedResult]) -> Value {
    let mut text = format!("Answer: {answer}\n\nSources:\n");
    for (i, source) in sources.iter().enumerate() {
        text.push_str(&format!("{}. {}\n", i + 1, source.source()));
    }
    json!({ "content": [text_block(text)] })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Chunk;
    use crate::mcp::protocol::error_codes;

    fn result(rank: usize, source: &str, content: &str) -> RetrievedResult {
        RetrievedResult {
            rank,
            score: 0.9,
            chunk: Chunk::new(source, 0, (0, content.len()), content),
        }
    }

    #[test]
    fn test_manifest_lists_both_tools() {
        let manifest = tool_manifest(3);
        let tools = manifest["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0]["name"], SEARCH_TOOL);
        assert_eq!(tools[0]["inputSchema"]["required"], json!(["query"]));
        assert_eq!(tools[0]["inputSchema"]["properties"]["top_k"]["default"], 3);
        assert_eq!(tools[1]["name"], ANSWER_TOOL);
        assert_eq!(tools[1]["inputSchema"]["required"], json!(["question"]));
    }

    #[test]
    fn test_parse_search_call() {
        let params = json!({ "name": SEARCH_TOOL, "arguments": { "query": "vacation", "top_k": 2 } });
        assert_eq!(
            parse_tool_call(Some(&params)).unwrap(),
            ToolCall::Search {
                query: "vacation".to_string(),
                top_k: Some(2)
            }
        );

        let params = json!({ "name": SEARCH_TOOL, "arguments": { "query": "vacation" } });
        assert!(matches!(
            parse_tool_call(Some(&params)).unwrap(),
            ToolCall::Search { top_k: None, .. }
        ));
    }

    #[test]
    fn test_missing_query() {
        let params = json!({ "name": SEARCH_TOOL, "arguments": {} });
        let err = parse_tool_call(Some(&params)).unwrap_err();
        assert_eq!(err.code, error_codes::INVALID_PARAMS);
        assert_eq!(err.message, "Missing required parameter: query");

        // No arguments object at all
        let params = json!({ "name": ANSWER_TOOL });
        let err = parse_tool_call(Some(&params)).unwrap_err();
        assert_eq!(err.message, "Missing required parameter: question");
    }

    #[test]
    fn test_invalid_arguments() {
        for args in [
            json!({ "query": 42 }),
            json!({ "query": "x", "top_k": 0 }),
            json!({ "query": "x", "top_k": -1 }),
            json!({ "query": "x", "top_k": "three" }),
        ] {
            let params = json!({ "name": SEARCH_TOOL, "arguments": args });
            let err = parse_tool_call(Some(&params)).unwrap_err();
            assert_eq!(err.code, error_codes::INVALID_PARAMS);
        }
    }

    #[test]
    fn test_unknown_tool() {
        let params = json!({ "name": "delete_everything", "arguments": {} });
        let err = parse_tool_call(Some(&params)).unwrap_err();
        assert_eq!(err.code, error_codes::INVALID_PARAMS);
        assert_eq!(err.message, "Unknown tool: delete_everything");

        assert!(parse_tool_call(None).is_err());
    }

    #[test]
    fn test_search_result_content() {
        let content = search_result_content(&[
            result(1, "leave.md", "15 vacation days"),
            result(2, "remote.md", "two remote days"),
        ]);
        assert_eq!(
            content["content"][0]["text"],
            "Result 1:\n15 vacation days\n\nSource: leave.md"
        );
        assert_eq!(content["content"][1]["type"], "text");
    }

    #[test]
    fn test_answer_content() {
        let content = answer_content(
            "You get 15 days.",
            &[result(1, "leave.md", "a"), result(2, "remote.md", "b")],
        );
        assert_eq!(
            content["content"][0]["text"],
            "Answer: You get 15 days.\n\nSources:\n1. leave.md\n2. remote.md\n"
        );
    }
}
