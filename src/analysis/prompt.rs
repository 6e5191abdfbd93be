pub const MAX_DOCUMENT_CHARS: usize = 30_000;

pub const RULES: [&str; 6] = [
    "Act must define key terms",
    "Act must specify eligibility criteria",
    "Act must specify responsibilities of the administering authority",
    "Act must include enforcement or penalties",
    "Act must include payment calculation or entitlement structure",
    "Act must include record-keeping or reporting requirements",
];

const SECTION_KEYS: [&str; 7] = [
    "definitions",
    "obligations",
    "responsibilities",
    "eligibility",
    "payments",
    "penalties",
    "record_keeping",
];

#[derive(Debug, Clone)]
pub struct Prompt {
    pub text: String,
    pub document_chars: usize,
    pub truncated: bool,
}

impl Prompt {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

pub fn truncate_document(text: &str) -> &str {
    match text.char_indices().nth(MAX_DOCUMENT_CHARS) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

pub fn build_prompt(document: &str) -> Prompt {
    let excerpt = truncate_document(document);
    let document_chars = document.chars().count();

    let rules = RULES
        .iter()
        .enumerate()
        .map(|(index, rule)| format!("{}. {rule}", index + 1))
        .collect::<Vec<String>>()
        .join("\n");
    let section_list = SECTION_KEYS.join(", ");
    let section_layout = SECTION_KEYS
        .iter()
        .map(|key| format!("    \"{key}\": \"...\""))
        .collect::<Vec<String>>()
        .join(",\n");

    let text = format!(
        r#"You are a legal AI agent analyzing a UK Act of Parliament.

DOCUMENT TEXT:
{excerpt}

---
PERFORM THE FOLLOWING TASKS AND RETURN ONLY RAW JSON.

TASK 2: SUMMARIZE
Summarize the entire Act in 5-10 bullet points focusing on: Purpose, Key definitions, Eligibility, Obligations, Enforcement elements.

TASK 3: EXTRACT SECTIONS
Extract exact text or summary for: {section_list}.

TASK 4: RULE CHECKS
Check these 6 rules. Return status (pass/fail), evidence, and confidence (0-100).
Return one rule check per rule, in this order.
{rules}

---
REQUIRED JSON OUTPUT FORMAT:
{{
  "summary": ["point 1", "point 2"],
  "sections": {{
{section_layout}
  }},
  "rules_analysis": [
    {{
      "rule": "{first_rule}",
      "status": "pass",
      "evidence": "Section X mentions...",
      "confidence": 100
    }}
  ]
}}
Repeat the rules_analysis entry for all 6 rules.
"#,
        first_rule = RULES[0],
    );

    Prompt {
        text,
        document_chars,
        truncated: document_chars > MAX_DOCUMENT_CHARS,
    }
}
