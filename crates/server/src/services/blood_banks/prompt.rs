//! Prompts for the blood bank lookup.

use blood_connect_core::PostalCode;

use crate::models::MAX_PROVIDER_ENTRIES;

/// System prompt for every lookup.
pub const SYSTEM_PROMPT: &str = "You return only a valid JSON array, no commentary.";

/// User prompt asking for blood banks near `postal_code`.
#[must_use]
pub fn user_prompt(postal_code: &PostalCode) -> String {
    format!(
        "You are an assistant who retrieves real-world data and formats it as valid JSON.\n\
         List up to {MAX_PROVIDER_ENTRIES} blood banks near the postal code \"{postal_code}\".\n\
         For each provide:\n\
         - name,\n\
         - address (with city and postal code),\n\
         - contact phone,\n\
         - hours (if available),\n\
         - any current or upcoming donation campaigns (as a short description, or null if none).\n\
         \n\
         Format the output as a JSON array of up to {MAX_PROVIDER_ENTRIES} objects with these fields: \
         name, address, contact, hours, campaign.\n\
         Output only the JSON array.\n\
         \n\
         If no information is available, return an empty array."
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prompt_mentions_postal_code_and_fields() {
        let prompt = user_prompt(&PostalCode::parse("75034").unwrap());
        assert!(prompt.contains("\"75034\""));
        assert!(prompt.contains("up to 10 blood banks"));
        assert!(prompt.contains("name, address, contact, hours, campaign"));
        assert!(prompt.contains("empty array"));
    }
}
