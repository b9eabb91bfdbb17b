//! Extraction prompt and structured-output schema
//!
//! The upstream model is forced into a JSON array of four-field records via
//! a response schema, so parsing never has to guess at prose. The system
//! prompt carries today's date for relative-phrase resolution and the
//! knowledge-base directives for learned categories.

use chrono::NaiveDate;
use serde_json::{json, Value};

/// Default upstream model
pub const GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Build the system prompt for one extraction call
///
/// `knowledge` is the serialized directive string (`"Item": "Category"`
/// pairs); empty when the ledger has no usable history yet.
pub fn build_system_prompt(today: NaiveDate, knowledge: &str) -> String {
    let mut prompt = format!(
        "You are an expense extraction engine. Today's date is {}.\n\
         Read the user's notes and extract every financial transaction you find.\n\
         \n\
         Rules:\n\
         1. Copy the item text exactly as the user wrote it, including typos \
         and abbreviations. Never correct or expand it in the output.\n\
         2. When choosing a category, tolerate typos, slang, and shorthand: a \
         misspelled drink is still a beverage.\n\
         3. Mark an entry as income when the wording signals money coming in \
         (salary, sold, credited, received, a leading '+'). Everything else is \
         an expense.\n\
         4. Resolve relative dates like 'yesterday' or 'today' against today's \
         date, and output dates as YYYY-MM-DD.\n\
         5. Skip any text that is not plausibly a transaction.\n",
        today.format("%Y-%m-%d"),
    );
    if knowledge.is_empty() {
        prompt.push_str(
            "6. No category history exists yet; pick sensible everyday \
             categories like Food, Transport, or Shopping.\n",
        );
    } else {
        prompt.push_str(&format!(
            "6. The user has categorized these items before. When an item \
             matches one of them exactly or closely, you MUST reuse the stored \
             category instead of inventing a new one: {}\n",
            knowledge,
        ));
    }
    prompt
}

/// Response schema forcing the four required fields
///
/// Gemini's structured-output schema dialect (uppercase type names).
pub fn response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "date": { "type": "STRING", "description": "YYYY-MM-DD" },
                "item": { "type": "STRING" },
                "price": { "type": "NUMBER" },
                "category": { "type": "STRING" },
                "type": { "type": "STRING", "enum": ["expense", "income"] }
            },
            "required": ["date", "item", "price", "category"]
        }
    })
}
