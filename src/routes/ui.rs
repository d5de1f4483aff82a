//! Landing page
//!
//! A single inline HTML page describing the API; there is no frontend build.

use axum::{response::Html, routing::get, Router};

pub fn router() -> Router {
    Router::new().route("/", get(serve_index))
}

async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Storyweaver - Educational Story Generator</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, sans-serif;
            max-width: 800px;
            margin: 0 auto;
            padding: 40px 20px;
            background: linear-gradient(135deg, #1d1a2e 0%, #21163e 100%);
            min-height: 100vh;
            color: #e6e6e6;
        }
        h1 { color: #ffb86b; margin-bottom: 10px; }
        h2 { color: #a0a0a0; font-weight: 400; font-size: 1.2em; }
        .endpoints {
            background: #2a1e3f;
            border-radius: 8px;
            padding: 20px;
            margin: 30px 0;
        }
        code {
            background: #3a2a4a;
            padding: 2px 8px;
            border-radius: 4px;
            color: #ffb86b;
        }
        pre {
            background: #120d1a;
            padding: 15px;
            border-radius: 6px;
            overflow-x: auto;
        }
        a { color: #ffb86b; }
    </style>
</head>
<body>
    <h1>Storyweaver</h1>
    <h2>Educational stories, scene by scene</h2>

    <div class="endpoints">
        <h3>API Endpoints</h3>
        <ul>
            <li><code>POST /generate-story</code> - start a story generation job</li>
            <li><code>GET /story/{id}</code> - poll a job's status and result</li>
            <li><code>GET /stories</code> - list all jobs</li>
            <li><code>GET /api/health</code> - health check</li>
        </ul>

        <h4>Example Request:</h4>
        <pre>curl -X POST http://localhost:8000/generate-story \
  -H "Content-Type: application/json" \
  -d '{"subject": "Mathematics", "topic": "fractions", "grade": "grade_6", "curriculum": "CBSE"}'</pre>
    </div>

    <p style="margin-top: 40px; color: #666;">
        <a href="/api/health">API Health</a> |
        <a href="/stories">Stories</a>
    </p>
</body>
</html>"#;
