//! Generated API documentation.
//!
//! The endpoint catalog below is the single source for both `GET /docs` (HTML) and
//! `GET /docs/catalog.json`. Body shapes are described with JSON Schemas derived from the
//! same types the handlers (de)serialize.

use crate::inventory::{Item, ItemPatch};
use schemars::{JsonSchema, schema_for};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Response body of `POST /register`.
#[derive(Debug, Serialize, JsonSchema)]
pub struct RegisterResponse {
    /// Identifier assigned to the new item.
    pub id: String,
    /// Human readable confirmation.
    pub message: String,
}

/// Descriptor for a single endpoint in the documentation catalog.
#[derive(Debug, Serialize)]
pub struct EndpointDescriptor {
    /// Short machine-friendly name.
    pub name: &'static str,
    /// HTTP method.
    pub method: &'static str,
    /// Route path; `:id` marks the item identifier.
    pub path: &'static str,
    /// What the endpoint does and how it fails.
    pub description: &'static str,
    /// Body encoding expected by the endpoint, if it takes one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<&'static str>,
    /// Example request body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_example: Option<Value>,
}

/// Full documentation payload.
#[derive(Debug, Serialize)]
pub struct ApiCatalog {
    /// Service title.
    pub title: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Every routed endpoint.
    pub endpoints: Vec<EndpointDescriptor>,
    /// JSON Schemas keyed by type name.
    pub schemas: BTreeMap<&'static str, Value>,
}

/// Build the documentation catalog.
pub fn catalog() -> ApiCatalog {
    let mut schemas = BTreeMap::new();
    schemas.insert("Item", json!(schema_for!(Item)));
    schemas.insert("ItemPatch", json!(schema_for!(ItemPatch)));
    schemas.insert("RegisterResponse", json!(schema_for!(RegisterResponse)));

    ApiCatalog {
        title: "Inventory Service API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: endpoints(),
        schemas,
    }
}

fn endpoints() -> Vec<EndpointDescriptor> {
    vec![
        EndpointDescriptor {
            name: "register",
            method: "POST",
            path: "/register",
            description: "Register a new item. `inventory_name` is required (400 otherwise); `description` and a `photo` file are optional. Responds 201 with the new id.",
            content_type: Some("multipart/form-data"),
            request_example: Some(json!({
                "inventory_name": "drill",
                "description": "cordless",
                "photo": "<file>"
            })),
        },
        EndpointDescriptor {
            name: "list_items",
            method: "GET",
            path: "/inventory",
            description: "List every registered item in registration order.",
            content_type: None,
            request_example: None,
        },
        EndpointDescriptor {
            name: "get_item",
            method: "GET",
            path: "/inventory/:id",
            description: "Fetch one item. 404 when the id is unknown.",
            content_type: None,
            request_example: None,
        },
        EndpointDescriptor {
            name: "update_item",
            method: "PUT",
            path: "/inventory/:id",
            description: "Overwrite `name` and/or `description`. Absent or empty values leave the field unchanged. 404 when the id is unknown.",
            content_type: Some("application/json"),
            request_example: Some(json!({
                "name": "hammer drill",
                "description": "corded"
            })),
        },
        EndpointDescriptor {
            name: "get_photo",
            method: "GET",
            path: "/inventory/:id/photo",
            description: "Download the item photo. 404 when the id is unknown or the item has no photo.",
            content_type: None,
            request_example: None,
        },
        EndpointDescriptor {
            name: "update_photo",
            method: "PUT",
            path: "/inventory/:id/photo",
            description: "Replace the item photo with the uploaded `photo` file; the previous file is removed. 404 when the id is unknown.",
            content_type: Some("multipart/form-data"),
            request_example: Some(json!({ "photo": "<file>" })),
        },
        EndpointDescriptor {
            name: "delete_item",
            method: "DELETE",
            path: "/inventory/:id",
            description: "Delete the item and its photo. 404 when the id is unknown.",
            content_type: None,
            request_example: None,
        },
        EndpointDescriptor {
            name: "search",
            method: "POST",
            path: "/search",
            description: "Look up an item by `id`. With `has_photo=on` and a stored photo, the returned description carries a link to the photo. 404 when the id is unknown.",
            content_type: Some("application/x-www-form-urlencoded"),
            request_example: Some(json!({ "id": "<item id>", "has_photo": "on" })),
        },
        EndpointDescriptor {
            name: "register_form",
            method: "GET",
            path: "/RegisterForm.html",
            description: "HTML form for registering an item.",
            content_type: None,
            request_example: None,
        },
        EndpointDescriptor {
            name: "search_form",
            method: "GET",
            path: "/SearchForm.html",
            description: "HTML form for searching an item by id.",
            content_type: None,
            request_example: None,
        },
        EndpointDescriptor {
            name: "metrics",
            method: "GET",
            path: "/metrics",
            description: "Inventory activity counters, including photo files that could not be removed.",
            content_type: None,
            request_example: None,
        },
        EndpointDescriptor {
            name: "uploads",
            method: "GET",
            path: "/uploads/*",
            description: "Raw access to stored photo files by the path recorded in an item.",
            content_type: None,
            request_example: None,
        },
    ]
}

/// Render the catalog as a standalone HTML page.
pub fn render_html(catalog: &ApiCatalog) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <style>body{{font-family:sans-serif;max-width:60rem;margin:2rem auto}}\
         .endpoint{{border:1px solid #ccc;border-radius:4px;padding:.5rem 1rem;margin:1rem 0}}\
         .method{{font-weight:bold;margin-right:.5rem}}pre{{background:#f5f5f5;padding:.5rem}}</style>\n\
         </head>\n<body>\n<h1>{title} <small>v{version}</small></h1>\n",
        title = escape(catalog.title),
        version = escape(catalog.version),
    );

    html.push_str("<h2>Endpoints</h2>\n");
    for endpoint in &catalog.endpoints {
        let _ = write!(
            html,
            "<div class=\"endpoint\" id=\"{name}\">\n<p><span class=\"method\">{method}</span><code>{path}</code></p>\n<p>{description}</p>\n",
            name = escape(endpoint.name),
            method = escape(endpoint.method),
            path = escape(endpoint.path),
            description = escape(endpoint.description),
        );
        if let Some(content_type) = endpoint.content_type {
            let _ = writeln!(html, "<p>Body: <code>{}</code></p>", escape(content_type));
        }
        if let Some(example) = &endpoint.request_example {
            let _ = writeln!(html, "<pre>{}</pre>", escape(&pretty(example)));
        }
        html.push_str("</div>\n");
    }

    html.push_str("<h2>Schemas</h2>\n");
    for (name, schema) in &catalog.schemas {
        let _ = writeln!(
            html,
            "<h3 id=\"schema-{name}\">{name}</h3>\n<pre>{}</pre>",
            escape(&pretty(schema)),
            name = escape(name),
        );
    }
    html.push_str("</body>\n</html>\n");
    html
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
