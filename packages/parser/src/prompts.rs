//! Prompt construction for the three LLM call sites: generation,
//! cross-validation, and synthesis. Every prompt instructs the model to
//! reply with **only** a JSON object, matching the wire shapes the
//! `parse` module expects.

use vicinity_models::{Category, Recommendation};

/// Builds the generation prompt sent to every available provider in stage 3.
///
/// `location` is a human-readable description of the resolved place (either
/// a display name or a formatted coordinate string); `categories` names
/// every category the request asked for. One prompt covers all of them —
/// every available provider gets exactly one generation call per request.
#[must_use]
pub fn generation_prompt(location: &str, categories: &[Category]) -> String {
    let category_hint = if categories.iter().any(|c| *c == Category::All) {
        "places of any kind (restaurants, cafes, attractions, parks, bars, hotels, shops, entertainment venues)".to_string()
    } else if let [single] = categories {
        format!("places in the category '{single}'")
    } else {
        let names: Vec<String> = categories.iter().map(ToString::to_string).collect();
        format!("places in any of these categories: {}", names.join(", "))
    };

    format!(
        "You are a local recommendation expert. Recommend {category_hint} near {location}.\n\n\
         Return 12 to 15 real, specific recommendations. Respond with ONLY a JSON object \
         in exactly this shape, no prose before or after:\n\n\
         {{\"recommendations\":[{{\"name\":string,\"description\":string,\"address\":string|null,\
         \"latitude\":number|null,\"longitude\":number|null,\"confidenceScore\":number between 0 and 1,\
         \"highlights\":[up to 5 short strings],\"whyRecommended\":string}}]}}"
    )
}

/// Builds the cross-validation prompt sent from validator `v` about
/// source `s`'s recommendations.
#[must_use]
pub fn validation_prompt(location: &str, candidates: &[Recommendation]) -> String {
    let mut listing = String::new();
    for (i, rec) in candidates.iter().enumerate() {
        listing.push_str(&format!(
            "{}. {} — {}{}\n   {}\n",
            i + 1,
            rec.name,
            rec.address.as_deref().unwrap_or("address unknown"),
            rec.lat
                .zip(rec.lng)
                .map(|(lat, lng)| format!(" ({lat}, {lng})"))
                .unwrap_or_default(),
            rec.description,
        ));
    }

    format!(
        "You are fact-checking place recommendations near {location}. For each of the following \
         candidates, judge whether it is a real, plausible place that actually exists near this \
         location:\n\n{listing}\n\
         Respond with ONLY a JSON object in exactly this shape, no prose before or after:\n\n\
         {{\"validations\":[{{\"name\":string,\"validationScore\":number between 0 and 1,\
         \"flaggedAsInaccurate\":bool,\"flaggedAsOutOfRange\":bool,\"comment\":string|null}}]}}"
    )
}

/// Builds the synthesis prompt: the fastest successful provider is asked to
/// polish copy for the already-ranked list, without reordering it.
#[must_use]
pub fn synthesis_prompt(candidates: &[Recommendation]) -> String {
    let mut listing = String::new();
    for (i, rec) in candidates.iter().enumerate() {
        listing.push_str(&format!(
            "{}. {}\n   current description: {}\n   current highlights: {}\n",
            i + 1,
            rec.name,
            rec.description,
            rec.highlights.join(", "),
        ));
    }

    format!(
        "Polish the descriptions and highlights for the following {} places, in the exact same \
         order, without adding, removing, or reordering any entry:\n\n{listing}\n\
         Respond with ONLY a JSON object in exactly this shape, no prose before or after:\n\n\
         {{\"recommendations\":[{{\"name\":string,\"description\":string,\
         \"highlights\":[up to 5 short strings],\"whyRecommended\":string}}]}}",
        candidates.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_prompt_mentions_resolved_location() {
        let prompt = generation_prompt("Toronto, ON", &[Category::Restaurant]);
        assert!(prompt.contains("Toronto, ON"));
        assert!(prompt.contains("recommendations"));
    }

    #[test]
    fn all_category_uses_cross_category_hint() {
        let prompt = generation_prompt("Toronto, ON", &[Category::All]);
        assert!(prompt.contains("any kind"));
    }

    #[test]
    fn multiple_categories_are_all_named() {
        let prompt = generation_prompt("Toronto, ON", &[Category::Restaurant, Category::Museum]);
        assert!(prompt.contains("Restaurant"));
        assert!(prompt.contains("Museum"));
    }
}
