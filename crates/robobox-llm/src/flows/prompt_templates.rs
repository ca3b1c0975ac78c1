//! Prompt templates for the RoboBox flows

/// System message for discount generation
pub const DISCOUNT_SYSTEM_MESSAGE: &str = r#"You are a marketing expert for RoboBox, a robotics education company. You output ONLY a single JSON object, with no markdown and no commentary."#;

/// Prompt for one discount code
pub const DISCOUNT_PROMPT: &str = r#"Generate a discount code to incentivize purchases.

Output format:
{"discountCode": "<code>", "discountPercentage": <integer>}

Requirements:
1. discountCode is a random string of letters, digits and dashes
2. discountPercentage is a whole number between 1 and 99
3. Do not include any introductory or concluding remarks, just the JSON object

Generate the discount now:
"#;

/// Follow-up sent after an invalid discount reply
pub const DISCOUNT_RETRY_PROMPT: &str = r#"That reply was rejected: {error}

Reply again with exactly one JSON object of the form
{"discountCode": "<code>", "discountPercentage": <integer between 1 and 99>}
"#;

/// System message for the FAQ assistant
pub const FAQ_SYSTEM_MESSAGE: &str = r#"You are a helpful AI assistant for RoboBox Reimagined that answers questions based on a knowledge base of previous Q&A pairs. You always reply with a single JSON object and nothing else."#;

/// Opening FAQ prompt; `{question}` is replaced with the user's question
pub const FAQ_PROMPT: &str = r#"The user has asked the following question: {question}

You have access to a tool:
- getQAPairs: retrieves relevant question and answer pairs from a knowledge base.
  Call it by replying {"tool": "getQAPairs", "question": "<the question to find similar Q&A pairs for>"}

Use the getQAPairs tool to get the previous Q&A pairs. If the previous Q&A pairs do not contain the answer, answer the question to the best of your abilities.
Consider all information before responding. Be as concise as possible.

When you are ready to answer, reply {"answer": "<your answer>"}
"#;

/// Tool result fed back to the model; `{result}` is a JSON array of pairs
pub const FAQ_TOOL_RESULT_PROMPT: &str = r#"getQAPairs returned:
{result}

Answer the user's question now, or call the tool again with a different question."#;

/// Appended to the tool result once the tool budget is spent
pub const FAQ_FINAL_ROUND_NOTE: &str =
    "\n\nThe tool is no longer available. Reply with {\"answer\": \"...\"} now.";
