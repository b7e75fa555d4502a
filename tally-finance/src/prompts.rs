//! Classifier prompt templates

use tally_core::Vocabulary;

/// One prompt listing every merchant, numbered, answered one per line
pub fn batch_prompt(descriptions: &[&str], vocabulary: &Vocabulary) -> String {
    let mut prompt = format!(
        "Categorize each merchant into exactly one category from this list:\n{}\n\nMerchants to categorize:\n",
        vocabulary.prompt_list()
    );
    for (i, desc) in descriptions.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, desc));
    }
    prompt.push_str(
        "\nRespond with ONLY the category for each, one per line, in the same order. No explanations.",
    );
    prompt
}

pub fn single_prompt(description: &str, vocabulary: &Vocabulary) -> String {
    format!(
        "Categorize this merchant into exactly one category.\n\n\
         Merchant: {description}\n\n\
         Categories: {}\n\n\
         Reply with ONLY the category name, nothing else.",
        vocabulary.prompt_list()
    )
}

/// Re-ask with web search snippets as extra context
pub fn web_context_prompt(description: &str, context: &str, vocabulary: &Vocabulary) -> String {
    format!(
        "Categorize this merchant into exactly one category.\n\n\
         Merchant: {description}\n\n\
         Web search results about this merchant:\n{context}\n\n\
         Categories: {}\n\n\
         Based on the web search results, what type of business is this? \
         Reply with ONLY the category name, nothing else.",
        vocabulary.prompt_list()
    )
}
