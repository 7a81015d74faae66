//! Interactive API documentation

use axum::{
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use serde_json::{json, Value};

/// Path of the OpenAPI document served alongside the UI
pub const SPEC_PATH: &str = "/apispec_1.json";

const SWAGGER_UI: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>memeguard API</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    window.onload = function () {
      window.ui = SwaggerUIBundle({ url: "/apispec_1.json", dom_id: "#swagger-ui" });
    };
  </script>
</body>
</html>
"##;

pub async fn swagger_ui() -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, "no-cache")],
        Html(SWAGGER_UI),
    )
}

pub async fn openapi_spec() -> Json<Value> {
    Json(openapi_document())
}

/// OpenAPI 2.0 description of the prediction endpoint
pub fn openapi_document() -> Value {
    let error_schema = json!({
        "type": "object",
        "properties": { "error": { "type": "string" } }
    });

    json!({
        "swagger": "2.0",
        "info": {
            "title": "memeguard",
            "description": "Classifies a meme (image plus text) as offensive or non-offensive",
            "version": env!("CARGO_PKG_VERSION")
        },
        "basePath": "/",
        "paths": {
            "/predict": {
                "post": {
                    "summary": "Classify an (image, text) pair",
                    "consumes": ["application/x-www-form-urlencoded", "multipart/form-data"],
                    "produces": ["application/json"],
                    "parameters": [
                        {
                            "name": "image",
                            "in": "formData",
                            "type": "string",
                            "required": true,
                            "description": "Base64 encoded image, optionally prefixed with a data URI header"
                        },
                        {
                            "name": "text",
                            "in": "formData",
                            "type": "string",
                            "required": true,
                            "description": "Text accompanying the image"
                        }
                    ],
                    "responses": {
                        "200": {
                            "description": "Prediction",
                            "schema": {
                                "type": "object",
                                "properties": {
                                    "prediction": {
                                        "type": "string",
                                        "enum": ["offensive", "non-offensive"]
                                    }
                                }
                            }
                        },
                        "400": {
                            "description": "Image or text missing",
                            "schema": error_schema.clone()
                        },
                        "500": {
                            "description": "Image could not be decoded or inference failed",
                            "schema": error_schema
                        }
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_describes_predict() {
        let doc = openapi_document();
        assert_eq!(doc["swagger"], "2.0");

        let params = doc["paths"]["/predict"]["post"]["parameters"]
            .as_array()
            .unwrap();
        let names: Vec<_> = params.iter().map(|p| p["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["image", "text"]);
    }

    #[test]
    fn test_ui_points_at_document() {
        assert!(SWAGGER_UI.contains(SPEC_PATH));
    }
}
