//! HTML form front end.

use axum::extract::State;
use axum::response::Html;
use axum::Form;
use serde::Deserialize;
use sri_core::{Product, ProfileInput};

use crate::app::AppState;
use crate::error::ApiError;

/// Name used when the form leaves it blank.
const ANONYMOUS_CLIENT: &str = "Client Anonyme";

/// Raw form fields; everything arrives as text.
#[derive(Debug, Default, Deserialize)]
pub struct FormInput {
    #[serde(default)]
    name: String,
    #[serde(default)]
    age: String,
    #[serde(default)]
    sector: String,
    #[serde(default)]
    need_description: String,
}

/// `GET /`
pub async fn show_form() -> Html<String> {
    Html(render_form(&[]))
}

/// `POST /` - run the submitted profile and render the outcome.
pub async fn submit_form(
    State(state): State<AppState>,
    Form(input): Form<FormInput>,
) -> Result<Html<String>, ApiError> {
    let Ok(age) = input.age.trim().parse::<i64>() else {
        return Ok(Html(render_form(&["L'âge doit être un nombre valide.".to_string()])));
    };

    let name = if input.name.trim().is_empty() {
        ANONYMOUS_CLIENT.to_string()
    } else {
        input.name
    };

    let profile_input = ProfileInput::new(name, age, input.sector, input.need_description);

    let profile = match profile_input.validate() {
        Ok(profile) => profile,
        Err(errors) => {
            let messages: Vec<String> = errors
                .fields()
                .iter()
                .flat_map(|(field, msgs)| msgs.iter().map(move |m| format!("{}: {}", field, m)))
                .collect();
            return Ok(Html(render_form(&messages)));
        }
    };

    let client_name = profile.name.clone();
    let outcome = state.recommend(profile).await?;
    let judgment = outcome.decision.judgment();
    let status = outcome.decision.status();

    let product_label = judgment
        .product()
        .map(|p| format!("{} ({})", p.id(), p.label()))
        .unwrap_or_else(|| judgment.product_id().to_string());

    let review_line = outcome
        .review_id
        .map(|id| format!("<p>Ticket de revue : <code>{}</code></p>", id))
        .unwrap_or_default();

    Ok(Html(format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head><meta charset="utf-8"><title>Recommandation</title></head>
<body>
<h1>Recommandation pour {client}</h1>
<p>Produit recommandé : <strong>{product}</strong></p>
<p>Justification : {justification}</p>
<p>Confiance : {confidence:.2}</p>
<p class="{class}">Statut : <strong>{status}</strong></p>
{review}
<p><a href="/">Nouvelle analyse</a></p>
</body>
</html>"#,
        client = escape(&client_name),
        product = escape(&product_label),
        justification = escape(judgment.justification()),
        confidence = judgment.confidence(),
        class = if status.needs_review() { "pending" } else { "approved" },
        status = status.ui_label(),
        review = review_line,
    )))
}

fn render_form(errors: &[String]) -> String {
    let error_block = if errors.is_empty() {
        String::new()
    } else {
        let items: String = errors
            .iter()
            .map(|e| format!("<li>{}</li>", escape(e)))
            .collect();
        format!("<ul class=\"errors\">{}</ul>", items)
    };

    let catalog: String = Product::ALL
        .iter()
        .map(|p| format!("<li><code>{}</code> {} : {}</li>", p.id(), p.label(), escape(p.description())))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head><meta charset="utf-8"><title>Agent de recommandation</title></head>
<body>
<h1>Agent de recommandation</h1>
{errors}
<form method="post" action="/">
<label>Nom <input name="name" maxlength="100"></label>
<label>Âge <input name="age" type="number" min="18" required></label>
<label>Secteur <input name="sector" maxlength="100" required></label>
<label>Besoin <textarea name="need_description" maxlength="500" required></textarea></label>
<button type="submit">Analyser</button>
</form>
<h2>Catalogue</h2>
<ul>{catalog}</ul>
</body>
</html>"#,
        errors = error_block,
        catalog = catalog,
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
