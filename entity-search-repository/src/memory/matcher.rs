//! Clause evaluation and sorting for the in-memory engine.

use std::cmp::Ordering;

use chrono::NaiveDate;
use entity_search_shared::{
    format_date, format_number, Document, FieldValue, Number, Operand, Operator, QueryClause,
    SearchValue, SortDefault, SortDirection, SortExpression,
};

/// Lower-cased alphanumeric tokens.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn field_tokens(value: &FieldValue) -> Vec<String> {
    match value {
        FieldValue::Text(text) => tokenize(text),
        FieldValue::Number(n) => tokenize(&format_number(Number::Float(*n))),
        FieldValue::Date(date) => tokenize(&format_date(date)),
        FieldValue::GeoPoint(_) => Vec::new(),
    }
}

fn contains_all(haystack: &[String], needles: &[String]) -> bool {
    needles.iter().all(|n| haystack.contains(n))
}

fn contains_phrase(haystack: &[String], phrase: &[String]) -> bool {
    phrase.is_empty() || haystack.windows(phrase.len()).any(|w| w == phrase)
}

/// Whether a document satisfies every clause.
pub(crate) fn matches(document: &Document, clauses: &[QueryClause]) -> bool {
    clauses.iter().all(|clause| clause_matches(document, clause))
}

fn clause_matches(document: &Document, clause: &QueryClause) -> bool {
    match clause {
        QueryClause::Raw(text) => {
            let available: Vec<String> = document
                .fields
                .iter()
                .flat_map(|f| field_tokens(&f.value))
                .collect();
            contains_all(&available, &tokenize(text))
        }
        QueryClause::Field {
            field,
            operator,
            operand,
        } => document
            .field(field)
            .is_some_and(|value| operand_matches(value, *operator, operand)),
    }
}

fn operand_matches(field: &FieldValue, operator: Operator, operand: &Operand) -> bool {
    match operand {
        Operand::Tokens(tokens) => match field {
            FieldValue::Text(text) => contains_all(&tokenize(text), &tokenize(tokens)),
            _ => compare(field, &SearchValue::Text(tokens.clone())) == Some(Ordering::Equal),
        },
        Operand::Value(value) => value_matches(field, operator, value),
        Operand::AnyOf(values) => values.iter().any(|v| value_matches(field, operator, v)),
    }
}

fn value_matches(field: &FieldValue, operator: Operator, value: &SearchValue) -> bool {
    let ordering = || compare(field, value);
    match operator {
        Operator::Is => match (field, value) {
            (FieldValue::Text(text), SearchValue::Text(phrase)) => {
                contains_phrase(&tokenize(text), &tokenize(phrase))
            }
            _ => ordering() == Some(Ordering::Equal),
        },
        Operator::Equals => match (field, value) {
            (FieldValue::Text(text), SearchValue::Text(phrase)) => tokenize(text) == tokenize(phrase),
            _ => ordering() == Some(Ordering::Equal),
        },
        Operator::LessThan => ordering() == Some(Ordering::Less),
        Operator::LessThanEquals => {
            matches!(ordering(), Some(Ordering::Less | Ordering::Equal))
        }
        Operator::GreaterThan => ordering() == Some(Ordering::Greater),
        Operator::GreaterThanEquals => {
            matches!(ordering(), Some(Ordering::Greater | Ordering::Equal))
        }
    }
}

/// Orders a field value against an operand of a compatible type.
fn compare(field: &FieldValue, value: &SearchValue) -> Option<Ordering> {
    match (field, value) {
        (FieldValue::Number(n), SearchValue::Number(v)) => n.partial_cmp(&v.as_f64()),
        (FieldValue::Number(n), SearchValue::Text(s)) => {
            s.trim().parse::<f64>().ok().and_then(|v| n.partial_cmp(&v))
        }
        (FieldValue::Date(d), SearchValue::Date(v)) => Some(d.cmp(v)),
        (FieldValue::Date(d), SearchValue::Text(s)) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .ok()
            .map(|v| d.cmp(&v)),
        (FieldValue::Text(t), SearchValue::Text(s)) => {
            Some(t.to_lowercase().cmp(&s.to_lowercase()))
        }
        _ => None,
    }
}

enum SortKey {
    Number(f64),
    Text(String),
}

fn sort_key(document: &Document, expression: &SortExpression) -> SortKey {
    let value = document.field(&expression.field);
    match &expression.default {
        SortDefault::Numeric(default) => SortKey::Number(match value {
            Some(FieldValue::Number(n)) => *n,
            _ => *default,
        }),
        SortDefault::Text(default) => SortKey::Text(match value {
            Some(FieldValue::Text(text)) => text.to_lowercase(),
            Some(FieldValue::Number(n)) => format_number(Number::Float(*n)),
            Some(FieldValue::Date(date)) => format_date(date),
            Some(FieldValue::GeoPoint(_)) | None => default.clone(),
        }),
    }
}

fn compare_keys(a: &SortKey, b: &SortKey) -> Ordering {
    match (a, b) {
        (SortKey::Number(a), SortKey::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

/// Stable sort by each expression in turn. Missing fields sort as the default.
pub(crate) fn sort_documents(documents: &mut [Document], sort: &[SortExpression]) {
    if sort.is_empty() {
        return;
    }
    documents.sort_by(|a, b| {
        for expression in sort {
            let ordering = compare_keys(&sort_key(a, expression), &sort_key(b, expression));
            let ordering = match expression.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}
