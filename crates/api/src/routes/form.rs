//! HTML Form Routes

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use diagnosis::{RawSymptoms, SymptomKind, Symptoms};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::{record_outcome, AppState};

const TEMPLATE: &str = include_str!("../../templates/index.html");

/// Render the page, optionally with a message below the form
pub fn render_page(greeting: Option<&str>) -> String {
    let fields: String = SymptomKind::ALL
        .iter()
        .map(|kind| {
            format!(
                "        <label for=\"{name}\">{label}</label>\n        \
                 <input type=\"number\" id=\"{name}\" name=\"{name}\" min=\"0\" max=\"10\" step=\"any\" required>\n",
                name = kind.field_name(),
                label = escape_html(kind.label()),
            )
        })
        .collect();

    let greeting = greeting
        .map(|g| format!("    <p class=\"greeting\">{}</p>", escape_html(g)))
        .unwrap_or_default();

    TEMPLATE.replace("{{fields}}", &fields).replace("{{greeting}}", &greeting)
}

/// Escape text for element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// GET / - empty form
pub async fn show_form() -> Html<String> {
    Html(render_page(None))
}

/// POST / - diagnose and render the result
pub async fn submit_form(State(state): State<Arc<AppState>>, Form(raw): Form<RawSymptoms>) -> Response {
    let symptoms = match Symptoms::from_raw(&raw, &state.validator) {
        Ok(symptoms) => symptoms,
        Err(e) => {
            warn!("Form rejected: {}", e);
            record_outcome("invalid", None);
            // Validation errors render as a normal page
            return Html(render_page(Some(ApiError::from(e).user_message()))).into_response();
        }
    };

    match state.pipeline.diagnose(&symptoms) {
        Ok(diagnosis) => {
            info!(
                "Form diagnosis: score={:.3} category={:?}",
                diagnosis.score, diagnosis.category
            );
            record_outcome("ok", Some(&diagnosis));
            Html(render_page(Some(&diagnosis.message()))).into_response()
        }
        Err(e) => {
            let err = ApiError::from(e);
            tracing::error!("Form diagnosis failed: {}", err);
            record_outcome("error", None);
            (StatusCode::INTERNAL_SERVER_ERROR, Html(render_page(Some(err.user_message())))).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FAILURE_MESSAGE, VALIDATION_MESSAGE};

    #[test]
    fn test_empty_page_has_all_fields() {
        let page = render_page(None);
        for kind in SymptomKind::ALL {
            assert!(page.contains(&format!("name=\"{}\"", kind.field_name())));
        }
        assert!(!page.contains("class=\"greeting\""));
        assert!(!page.contains("{{"));
    }

    #[test]
    fn test_greeting_is_escaped() {
        let page = render_page(Some("<b>hola</b> & \"adiós\""));
        assert!(page.contains("&lt;b&gt;hola&lt;/b&gt; &amp; &quot;adiós&quot;"));
    }

    #[test]
    fn test_messages_render_verbatim() {
        assert!(render_page(Some(VALIDATION_MESSAGE)).contains(VALIDATION_MESSAGE));
        assert!(render_page(Some(FAILURE_MESSAGE)).contains(FAILURE_MESSAGE));
    }
}
