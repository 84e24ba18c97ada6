// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it;
// this file holds the cross-cutting pieces.

/// Appended to every system prompt that expects a JSON reply.
pub const JSON_ONLY_INSTRUCTION: &str = "\
    Respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT include explanations or apologies.";

/// Instruction that keeps extraction honest.
pub const GROUNDING_INSTRUCTION: &str = "\
    Only include information actually present in the input. \
    Do NOT infer, interpolate, or invent details. \
    Omit a field rather than guessing its value.";

/// Builds a system prompt from a role description plus the shared JSON rules.
pub fn json_system_prompt(role: &str) -> String {
    format!("{role}\n\n{GROUNDING_INSTRUCTION}\n{JSON_ONLY_INSTRUCTION}")
}
