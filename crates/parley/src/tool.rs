use indoc::indoc;
use serde_json::{json, Value};

use crate::errors::{ChatError, ChatResult};
use crate::models::tool::Tool;

pub const SEARCH_WEB: &str = "search_web";

/// The one tool offered to the model.
pub fn search_web_tool() -> Tool {
    Tool::new(
        SEARCH_WEB,
        indoc! {r#"
            Searches the web for current information about poker or other topics
            when the model's training data is not enough to answer.
        "#}
        .trim(),
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The term or question to search for (e.g. 'WSOP 2024 winner', 'latest poker news')."
                }
            },
            "required": ["query"]
        }),
    )
}

/// Extract the `query` from the JSON argument string of a `search_web` call.
pub fn parse_search_arguments(arguments: &str) -> ChatResult<String> {
    let args: Value = serde_json::from_str(arguments)
        .map_err(|e| ChatError::ToolArguments(format!("arguments are not valid JSON: {}", e)))?;

    args.get("query")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ChatError::ToolArguments("arguments have no string `query`".into()))
}

/// Something that can answer a search query for the model
pub trait Search: Send + Sync {
    fn search(&self, query: &str) -> String;
}

/// Stand-in for a real search backend. Produces a fixed result that quotes
/// the query back so the model has something to ground its answer on.
#[derive(Debug, Default, Clone)]
pub struct SimulatedSearch;

impl Search for SimulatedSearch {
    fn search(&self, query: &str) -> String {
        format!(
            "[Search results for \"{}\"]: The 2024 WSOP Main Event was won by John Smith. Other recent poker results: ...",
            query
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_web_definition() {
        let tool = search_web_tool();
        assert_eq!(tool.name, "search_web");
        assert_eq!(tool.parameters["required"], json!(["query"]));
        assert_eq!(tool.parameters["properties"]["query"]["type"], "string");
        assert!(!tool.description.ends_with('\n'));
    }

    #[test]
    fn test_parse_search_arguments() {
        let query = parse_search_arguments(r#"{"query": "latest poker news"}"#).unwrap();
        assert_eq!(query, "latest poker news");
    }

    #[test]
    fn test_parse_search_arguments_errors() {
        assert!(matches!(
            parse_search_arguments("invalid json {"),
            Err(ChatError::ToolArguments(_))
        ));
        assert!(matches!(
            parse_search_arguments(r#"{"q": "x"}"#),
            Err(ChatError::ToolArguments(_))
        ));
        assert!(matches!(
            parse_search_arguments(r#"{"query": 7}"#),
            Err(ChatError::ToolArguments(_))
        ));
    }

    #[test]
    fn test_simulated_search_quotes_query() {
        for query in ["WSOP 2024 winner", "", "quotes \" and ünïcode"] {
            let result = SimulatedSearch.search(query);
            assert!(result.contains(query));
        }
        assert_eq!(SimulatedSearch.search("a"), SimulatedSearch.search("a"));
    }
}
