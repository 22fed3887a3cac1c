//! Prompt construction for the vision model.

/// Canonical extraction instructions sent with every first attempt.
pub const EXTRACT_PROMPT: &str = r#"Analyze this menu/catalog image and extract the information as JSON following the "canta.menu v1" schema exactly.

Return ONLY valid JSON with this structure:
{
  "source": "string description of what this menu/catalog is",
  "sections": [
    {
      "name": "section name or null",
      "time": "time period like 'breakfast' or null",
      "items": [
        {
          "name": "item name",
          "price": {"value": number_or_null, "currency": "MYR"},
          "size": {"value": number_or_null, "unit": "g|kg|ml|l|pcs|pack|null"},
          "desc": "description or null",
          "tags": ["tag1", "tag2"] or null,
          "extras": {"any_additional_info": "value"}
        }
      ]
    }
  ],
  "meta": {"service_charge_note": true_or_false_or_null},
  "schema": {"name": "canta.menu", "version": "1.0"}
}

Rules:
- Return JSON ONLY, no commentary
- If value unknown, use null (do NOT hallucinate)
- Currency is "MYR" when RM shown; parse "RM 12" -> 12.00 in price.value
- Keep Malay terms as-is (e.g., "Nasi Lemak")
- For multiple prices/sizes, put base price in price.value, rest in extras
- For tables or sectionless pages, use sections=[{"name": null, "time": null, "items":[...]}]
- Any additional attributes go under item.extras
"#;

/// Build the single-shot repair prompt, embedding the model's previous
/// output and the validation error verbatim.
pub fn build_repair_prompt(original_text: &str, error_text: &str) -> String {
    format!(
        r#"You returned invalid JSON for schema 'canta.menu v1'. Here is your JSON and the error. Fix it to match the schema exactly. Return JSON only.

Your JSON:
{original_text}

Error:
{error_text}

Return ONLY valid JSON following the canta.menu v1 schema. No commentary.
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_prompt_mandates_json_only() {
        assert!(EXTRACT_PROMPT.contains("Return JSON ONLY"));
        assert!(EXTRACT_PROMPT.contains("canta.menu"));
    }

    #[test]
    fn repair_prompt_embeds_output_and_error() {
        let prompt = build_repair_prompt("{\"bad\": }", "invalid JSON from model: expected value");
        assert!(prompt.contains("{\"bad\": }"));
        assert!(prompt.contains("expected value"));
        assert!(prompt.contains("Return ONLY valid JSON"));
    }
}
