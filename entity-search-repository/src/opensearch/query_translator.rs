//! Translation of query clauses into OpenSearch request bodies.
//!
//! Field clauses become Lucene `query_string` syntax, ANDed together. Raw
//! text is passed through in parentheses.

use entity_search_shared::{
    format_date, format_number, quote, DocumentQuery, Operand, Operator, QueryClause, SearchValue,
    SortDefault, SortDirection, SortExpression,
};
use serde_json::{json, Value};

use super::index_config::KEYWORD_SUFFIX;

const RESERVED: &[char] = &[
    '\\', '+', '-', '=', '&', '|', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?',
    ':', '/', '<', '>',
];

/// Escapes `query_string` operators inside free tokens.
fn escape_tokens(tokens: &str) -> String {
    let mut escaped = String::with_capacity(tokens.len());
    for c in tokens.chars() {
        if RESERVED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn render_value(value: &SearchValue) -> String {
    match value {
        SearchValue::Text(text) => quote(text),
        SearchValue::Number(number) => format_number(*number),
        SearchValue::Date(date) => format_date(date),
    }
}

fn translate_clause(clause: &QueryClause) -> Option<String> {
    match clause {
        QueryClause::Raw(text) if text.trim().is_empty() => None,
        QueryClause::Raw(text) => Some(format!("({text})")),
        QueryClause::Field {
            field,
            operator,
            operand,
        } => {
            let prefix = match operator {
                Operator::Is | Operator::Equals => String::new(),
                range => range.token().to_string(),
            };
            let rendered = match operand {
                Operand::Tokens(tokens) => format!("({})", escape_tokens(tokens)),
                Operand::Value(value) => format!("{prefix}{}", render_value(value)),
                Operand::AnyOf(values) => {
                    let alternatives: Vec<String> = values
                        .iter()
                        .map(|v| format!("{prefix}{}", render_value(v)))
                        .collect();
                    format!("({})", alternatives.join(" OR "))
                }
            };
            Some(format!("{field}:{rendered}"))
        }
    }
}

/// The `query_string` text for the clauses, or `None` to match everything.
pub fn to_query_string(clauses: &[QueryClause]) -> Option<String> {
    let parts: Vec<String> = clauses.iter().filter_map(translate_clause).collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" AND "))
    }
}

/// OpenSearch sort clauses. Documents without the field sort as the default
/// would: numeric fields as `0`, text fields as an empty string.
pub fn to_sort(expressions: &[SortExpression]) -> Vec<Value> {
    expressions
        .iter()
        .map(|expression| {
            let order = match expression.direction {
                SortDirection::Ascending => "asc",
                SortDirection::Descending => "desc",
            };
            match &expression.default {
                SortDefault::Numeric(default) => json!({
                    expression.field.as_str(): {
                        "order": order,
                        "missing": default,
                        "unmapped_type": "double"
                    }
                }),
                SortDefault::Text(_) => {
                    let missing = match expression.direction {
                        SortDirection::Ascending => "_first",
                        SortDirection::Descending => "_last",
                    };
                    json!({
                        format!("{}.{}", expression.field, KEYWORD_SUFFIX): {
                            "order": order,
                            "missing": missing,
                            "unmapped_type": "keyword"
                        }
                    })
                }
            }
        })
        .collect()
}

/// Full `_search` body for a document query.
pub fn search_body(query: &DocumentQuery) -> Value {
    let query_clause = match to_query_string(&query.clauses) {
        Some(text) => json!({
            "query_string": {
                "query": text,
                "default_operator": "AND"
            }
        }),
        None => json!({ "match_all": {} }),
    };

    let mut body = json!({
        "query": query_clause,
        "track_total_hits": true
    });
    if !query.sort.is_empty() {
        body["sort"] = Value::Array(to_sort(&query.sort));
    }
    if let Some(limit) = query.limit {
        body["size"] = json!(limit);
    }
    body
}

/// `_search` body returning only document ids.
pub fn range_body(limit: usize) -> Value {
    json!({
        "query": { "match_all": {} },
        "_source": false,
        "size": limit
    })
}
