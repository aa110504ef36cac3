//! Command execution logic.

use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::path::Path;
use tabula_query::{AnyResponse, Filterable, Query, Response, ResponseKind};
use tokio::io::AsyncReadExt;
use tracing::debug;

use super::OutputMode;
use super::args::{ParseArgs, QueryArgs};

/// Build the read query described by `args`.
pub fn build_query(args: &QueryArgs) -> Query {
    let mut query = Query::new();
    if let Some(search) = &args.search {
        query.search(search.as_str());
    }
    if let Some(limit) = args.limit {
        query.limit(limit);
    }
    if let Some(offset) = args.offset {
        query.offset(offset);
    }
    if !args.select.is_empty() {
        query.only(args.select.iter().map(String::as_str));
    }
    for sort in &args.sort {
        if sort.descending {
            query.sort_desc(&sort.field);
        } else {
            query.sort_asc(&sort.field);
        }
    }
    if let Some(circle) = &args.within {
        query.within(circle);
    }
    for equality in &args.equals {
        query
            .field(equality.field.as_str())
            .equal(equality.value.clone());
    }
    query.include_row_count(args.include_count);
    query
}

/// Execute the query command
pub fn execute_query(args: &QueryArgs, output_mode: OutputMode) -> Result<()> {
    let query = build_query(args);
    debug!(query = %query, "built query");

    if args.url {
        println!("{}", query.to_url_query());
        return Ok(());
    }

    let params = query.to_request_params();
    match output_mode {
        OutputMode::Json => println!("{}", serde_json::to_string_pretty(&params)?),
        OutputMode::Text => {
            for (key, value) in &params {
                println!("{key}={value}");
            }
        }
    }
    Ok(())
}

async fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut content = String::new();
            tokio::io::stdin()
                .read_to_string(&mut content)
                .await
                .context("Failed to read stdin")?;
            Ok(content)
        }
    }
}

/// Describe a parsed response as JSON.
pub fn summarize(response: &AnyResponse) -> Value {
    let mut summary = json!({
        "kind": response.kind().as_str(),
        "version": response.version(),
        "status": response.status(),
        "total_row_count": response.total_row_count(),
        "included_rows": response.included_row_count(),
    });
    let detail = match response {
        AnyResponse::Read(read) => json!({ "rows": read.len() }),
        AnyResponse::Facet(facets) => {
            let counts: serde_json::Map<String, Value> = facets
                .facets()
                .iter()
                .map(|(field, values)| (field.clone(), json!(values.len())))
                .collect();
            json!({ "facets": counts })
        }
        AnyResponse::Schema(schema) => json!({
            "title": schema.title(),
            "columns": schema.columns().iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        }),
        AnyResponse::Submit(submit) => json!({
            "entity_id": submit.entity_id(),
            "new_entity": submit.is_new_entity(),
        }),
        AnyResponse::Flag(_) | AnyResponse::Raw(_) => json!({}),
    };
    if let (Value::Object(summary), Value::Object(detail)) = (&mut summary, detail) {
        summary.extend(detail);
    }
    summary
}

fn render_text(value: &Value) -> String {
    match value {
        Value::Null => "undefined".to_string(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items.iter().map(render_text).collect::<Vec<_>>().join(", "),
        Value::Object(entries) => entries
            .iter()
            .map(|(key, value)| format!("{key}={}", render_text(value)))
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Execute the parse command
pub async fn execute_parse(args: &ParseArgs, output_mode: OutputMode) -> Result<()> {
    let content = read_input(args.file.as_deref()).await?;
    let kind = ResponseKind::from(args.kind);
    let response = kind
        .parse(content)
        .with_context(|| format!("Malformed {kind_name} response", kind_name = kind.as_str()))?;
    let summary = summarize(&response);

    match output_mode {
        OutputMode::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputMode::Text => {
            if let Value::Object(entries) = &summary {
                for (key, value) in entries {
                    println!("{key}: {}", render_text(value));
                }
            }
        }
    }
    Ok(())
}
