//! Recommendation prompt rendering and reply parsing.

use regex::Regex;
use serde::Deserialize;
use sri_core::{Judgment, Product, Profile};

use crate::producer::{ProducerError, Result};

const INSTRUCTIONS: &str = "\
Tu es un Expert en Recommandation de Produits pour des clients B2B.
Ton rôle est d'analyser le profil client fourni et de recommander un seul produit/service.

RÈGLES DE CONFIANCE (pour score_confiance) :
1. CONFIANCE ÉLEVÉE (score > 0.80) : le secteur et le besoin correspondent parfaitement à un produit.
2. CONFIANCE MOYENNE (score entre 0.70 et 0.80) : le besoin est clair mais le secteur est générique.
3. CONFIANCE BASSE (score < 0.70) : le besoin est ambigu ou incohérent, le profil est atypique \
(âge < 5 ans ou > 60 ans), ou la recommandation est un compromis.";

const FORMAT: &str = "\
Réponds uniquement avec un objet JSON, sans texte avant ou après :
{\"product_id\": \"<id du catalogue>\", \"justification_courte\": \"<30 mots maximum>\", \"score_confiance\": <nombre entre 0.0 et 1.0>}";

/// Render the user prompt for a profile.
pub fn render(profile: &Profile) -> String {
    let catalog = Product::ALL
        .iter()
        .map(|p| format!("- {} ({}) : {}", p.id(), p.label(), p.description()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{}\n\nProfil Client :\n- Âge du client : {}\n- Secteur d'activité : {}\n- Besoin exprimé : {}\n\n\
         Liste des Produits/Services disponibles (utilise ces IDs uniquement) :\n{}\n\n{}",
        INSTRUCTIONS, profile.age, profile.sector, profile.need, catalog, FORMAT
    )
}

#[derive(Deserialize)]
struct RawJudgment {
    product_id: String,
    justification_courte: String,
    score_confiance: f64,
}

/// Parse the model reply into a judgment.
///
/// Accepts a bare JSON object or one wrapped in prose or code fences. The
/// first object that reads as a judgment wins; anything after it is ignored.
pub fn parse_reply(content: &str) -> Result<Judgment> {
    let starts = Regex::new(r#"\{\s*""#).map_err(|e| ProducerError::Malformed(e.to_string()))?;

    let mut last_error = None;
    for candidate in starts.find_iter(content) {
        let mut stream = serde_json::Deserializer::from_str(&content[candidate.start()..])
            .into_iter::<RawJudgment>();
        match stream.next() {
            Some(Ok(raw)) => return to_judgment(raw),
            Some(Err(e)) => last_error = Some(e.to_string()),
            None => {}
        }
    }

    Err(ProducerError::Malformed(
        last_error.unwrap_or_else(|| "no JSON object in reply".to_string()),
    ))
}

fn to_judgment(raw: RawJudgment) -> Result<Judgment> {
    if !raw.score_confiance.is_finite() || !(0.0..=1.0).contains(&raw.score_confiance) {
        return Err(ProducerError::Malformed(format!(
            "score_confiance out of range: {}",
            raw.score_confiance
        )));
    }

    Ok(Judgment::new(raw.product_id.trim(), raw.justification_courte, raw.score_confiance))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_profile_and_catalog() {
        let profile = Profile::new("Claire", 45, "Finance", "analyse de données de marché");
        let prompt = render(&profile);

        assert!(prompt.contains("Âge du client : 45"));
        assert!(prompt.contains("Secteur d'activité : Finance"));
        assert!(prompt.contains("analyse de données de marché"));
        for product in Product::ALL {
            assert!(prompt.contains(product.id()));
        }
        // name is not sent to the model
        assert!(!prompt.contains("Claire"));
    }

    #[test]
    fn test_parse_bare_json() {
        let judgment = parse_reply(
            r#"{"product_id": "S-2024-PRO", "justification_courte": "Analyse avancée", "score_confiance": 0.92}"#,
        )
        .unwrap();
        assert_eq!(judgment.product_id(), "S-2024-PRO");
        assert_eq!(judgment.confidence(), 0.92);
    }

    #[test]
    fn test_parse_fenced_json() {
        let reply = "Voici ma réponse :\n```json\n{\"product_id\": \"C-2024-MIG\", \"justification_courte\": \"Cloud\", \"score_confiance\": 0.7}\n```";
        let judgment = parse_reply(reply).unwrap();
        assert_eq!(judgment.product_id(), "C-2024-MIG");
    }

    #[test]
    fn test_parse_ignores_braces_after_object() {
        let reply = "{\"product_id\":\"S-2024-PRO\",\"justification_courte\":\"ok\",\"score_confiance\":0.9}\nNote : format {id}.";
        let judgment = parse_reply(reply).unwrap();
        assert_eq!(judgment.product_id(), "S-2024-PRO");
        assert_eq!(judgment.confidence(), 0.9);
    }

    #[test]
    fn test_parse_skips_braces_before_object() {
        let reply = "Gabarit {id} rempli :\n{\"product_id\": \"B-2024-ESS\", \"justification_courte\": \"simple\", \"score_confiance\": 0.8} {\"autre\": 1}";
        let judgment = parse_reply(reply).unwrap();
        assert_eq!(judgment.product_id(), "B-2024-ESS");
    }

    #[test]
    fn test_parse_rejects_prose() {
        assert!(matches!(parse_reply("je ne sais pas"), Err(ProducerError::Malformed(_))));
    }

    #[test]
    fn test_parse_rejects_missing_field() {
        let reply = r#"{"product_id": "S-2024-PRO", "score_confiance": 0.9}"#;
        assert!(matches!(parse_reply(reply), Err(ProducerError::Malformed(_))));
    }

    #[test]
    fn test_parse_rejects_out_of_range_score() {
        let reply = r#"{"product_id": "S-2024-PRO", "justification_courte": "x", "score_confiance": 85}"#;
        assert!(matches!(parse_reply(reply), Err(ProducerError::Malformed(_))));
    }
}
