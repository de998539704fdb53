// Shared prompt fragments and the template filler used by every stage.
// Each stage's own template lives in briefing/prompts.rs.

/// Instruction appended to stages whose output is parsed as JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "Return ONLY the JSON. \
    No preamble, no explanation, no markdown code fences.";

/// Instruction shared by the factual stages.
pub const GROUNDING_INSTRUCTION: &str = "Only include facts you can support from the \
    provided content. Use \"Unknown\" for anything you cannot verify. \
    Do not speculate or invent details.";

/// Replaces every `{{KEY}}` token whose key appears in `bindings` with its value.
///
/// Tokens without a binding are left untouched. Values are inserted verbatim.
pub fn fill_template(template: &str, bindings: &[(&str, &str)]) -> String {
    let mut filled = template.to_string();
    for (key, value) in bindings {
        let token = format!("{{{{{key}}}}}");
        if filled.contains(&token) {
            filled = filled.replace(&token, value);
        }
    }
    filled
}
