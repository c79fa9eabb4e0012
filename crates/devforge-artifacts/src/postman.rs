//! Postman collection builder
//!
//! The collection is assembled as a `serde_json::Value` document from
//! typed request descriptions, never by string templating, so URLs and
//! bodies are always correctly quoted.

use anyhow::Result;
use serde_json::{json, Value};

/// Builds a Postman v2.1 collection for the scaffolded product API
pub struct PostmanCollectionBuilder {
    name: String,
    base_url: String,
}

impl PostmanCollectionBuilder {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
        }
    }

    /// Assemble the full collection document
    pub fn build(&self) -> Value {
        json!({
            "info": {
                "name": format!("{} API", self.name),
                "description": "Generated by devforge for the provisioned product API",
                "schema": "https://schema.getpostman.com/json/collection/v2.1.0/collection.json"
            },
            "variable": [
                { "key": "baseUrl", "value": self.base_url }
            ],
            "item": [
                self.request("Health check", "GET", "/api/health", None),
                self.request("List products", "GET", "/api/products", None),
                self.request("Get product", "GET", "/api/products/1", None),
                self.request(
                    "Create product",
                    "POST",
                    "/api/products",
                    Some(json!({
                        "name": "Mechanical Keyboard",
                        "description": "87-key, hot-swappable",
                        "price": 89.00,
                        "stock": 25
                    })),
                ),
                self.request(
                    "Update product",
                    "PUT",
                    "/api/products/1",
                    Some(json!({ "price": 79.00, "stock": 30 })),
                ),
                self.request("Delete product", "DELETE", "/api/products/1", None),
                self.request("Clear product cache", "POST", "/api/products/cache/clear", None),
            ]
        })
    }

    /// Serialize the collection to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.build())?)
    }

    fn request(&self, name: &str, method: &str, path: &str, body: Option<Value>) -> Value {
        let mut request = json!({
            "method": method,
            "header": [
                { "key": "Accept", "value": "application/json" }
            ],
            "url": {
                "raw": format!("{{{{baseUrl}}}}{}", path),
                "host": ["{{baseUrl}}"],
                "path": path.trim_start_matches('/').split('/').collect::<Vec<_>>()
            }
        });

        if let Some(body) = body {
            request["header"]
                .as_array_mut()
                .expect("header array")
                .push(json!({ "key": "Content-Type", "value": "application/json" }));
            request["body"] = json!({
                "mode": "raw",
                "raw": serde_json::to_string_pretty(&body).expect("body serializes")
            });
        }

        json!({ "name": name, "request": request })
    }
}
