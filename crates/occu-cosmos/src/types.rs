//! Cosmos DB REST API request/response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A parameterized SQL query.
///
/// Values travel as parameters; the query text never embeds them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqlQuery {
    pub query: String,
    #[serde(default)]
    pub parameters: Vec<SqlParameter>,
}

impl SqlQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            parameters: Vec::new(),
        }
    }

    /// Add a `@name` parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.push(SqlParameter {
            name: name.into(),
            value: value.into(),
        });
        self
    }
}

/// A single query parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqlParameter {
    pub name: String,
    pub value: Value,
}

/// One page of query results.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    #[serde(rename = "Documents", default)]
    pub documents: Vec<Value>,
    #[serde(rename = "_count", default)]
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_query_wire_shape() {
        let query = SqlQuery::new("SELECT * FROM c WHERE c.id = @id").param("@id", "doc1");
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["query"], "SELECT * FROM c WHERE c.id = @id");
        assert_eq!(json["parameters"][0]["name"], "@id");
        assert_eq!(json["parameters"][0]["value"], "doc1");
    }

    #[test]
    fn test_query_response_parses_documents() {
        let body = r#"{"_rid": "abc", "Documents": [{"id": "d1"}, {"id": "d2"}], "_count": 2}"#;
        let page: QueryResponse = serde_json::from_str(body).unwrap();
        assert_eq!(page.documents.len(), 2);
        assert_eq!(page.count, 2);
    }

    #[test]
    fn test_query_response_defaults_when_empty() {
        let page: QueryResponse = serde_json::from_str(r#"{"_rid": "abc"}"#).unwrap();
        assert!(page.documents.is_empty());
        assert_eq!(page.count, 0);
    }
}
