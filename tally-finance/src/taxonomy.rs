//! Remap categories a bank export already carries (Pocketbook's
//! Category/Subcategory columns) onto our vocabulary.

use tally_core::{Vocabulary, INCOME, TRANSFER};

/// (source category, source subcategory) -> vocabulary name.
/// An empty subcategory is the catch-all for its category.
const MAPPING: &[((&str, &str), &str)] = &[
    (("Groceries", ""), "Groceries"),
    (("Eating Out", "Coffee"), "Coffee"),
    (("Eating Out", "Takeaway"), "Dining"),
    (("Eating Out", ""), "Dining"),
    (("Transport", "Fuel"), "Fuel"),
    (("Transport", "Public Transport"), "Transport"),
    (("Transport", "Parking"), "Transport"),
    (("Transport", ""), "Transport"),
    (("Bills", "Electricity"), "Utilities"),
    (("Bills", "Gas"), "Utilities"),
    (("Bills", "Water"), "Utilities"),
    (("Bills", "Phone & Internet"), "Utilities"),
    (("Bills", "Insurance"), "Insurance"),
    (("Bills", "Subscriptions"), "Subscriptions"),
    (("Home", "Rent"), "Rent"),
    (("Home", "Mortgage"), "Rent"),
    (("Home", ""), "Home"),
    (("Health & Fitness", ""), "Health"),
    (("Medical", ""), "Health"),
    (("Personal Care", ""), "Personal Care"),
    (("Entertainment", ""), "Entertainment"),
    (("Holidays & Travel", ""), "Travel"),
    (("Shopping", "Clothing"), "Shopping"),
    (("Shopping", ""), "Shopping"),
    (("Education", ""), "Education"),
    (("Gifts & Donations", ""), "Gifts"),
    (("Fees & Charges", ""), "Fees"),
    (("Bank Fees", ""), "Fees"),
    (("Transfers", ""), TRANSFER),
    (("Internal Transfer", ""), TRANSFER),
    (("Income", "Salary"), INCOME),
    (("Income", ""), INCOME),
];

fn lookup(category: &str, subcategory: &str) -> Option<&'static str> {
    MAPPING
        .iter()
        .find(|((c, s), _)| *c == category && *s == subcategory)
        .map(|(_, target)| *target)
}

/// Map a source category pair onto `vocabulary`.
///
/// Exact pair, then `(category, "")`, then a loose case-insensitive
/// substring match of the category against vocabulary names. Table targets
/// missing from the vocabulary count as misses. `None` means unresolved.
pub fn remap(category: &str, subcategory: &str, vocabulary: &Vocabulary) -> Option<String> {
    let category = category.trim();
    let subcategory = subcategory.trim();
    if category.is_empty() {
        return None;
    }

    let table_hit = lookup(category, subcategory)
        .into_iter()
        .chain(lookup(category, ""))
        .find(|target| vocabulary.contains(target));
    if let Some(target) = table_hit {
        return Some(target.to_string());
    }

    let needle = category.to_lowercase();
    vocabulary
        .assignable()
        .find(|name| {
            let name = name.to_lowercase();
            name.contains(&needle) || needle.contains(&name)
        })
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_pair() {
        let v = Vocabulary::builtin();
        assert_eq!(remap("Eating Out", "Coffee", &v).as_deref(), Some("Coffee"));
        assert_eq!(remap("Home", "Rent", &v).as_deref(), Some("Rent"));
    }

    #[test]
    fn test_category_only_fallback() {
        let v = Vocabulary::builtin();
        assert_eq!(remap("Eating Out", "Brunch", &v).as_deref(), Some("Dining"));
        assert_eq!(remap("Transfers", "Between Accounts", &v).as_deref(), Some("Transfer"));
    }

    #[test]
    fn test_fuzzy_fallback() {
        let v = Vocabulary::builtin();
        assert_eq!(
            remap("Groceries & Household", "", &v).as_deref(),
            Some("Groceries")
        );
        assert_eq!(remap("travel", "Flights", &v).as_deref(), Some("Travel"));
    }

    #[test]
    fn test_unmapped() {
        let v = Vocabulary::builtin();
        assert_eq!(remap("Miscellaneous", "", &v), None);
        assert_eq!(remap("", "Coffee", &v), None);
    }

    #[test]
    fn test_target_missing_from_vocabulary() {
        // "Eating Out/Coffee" -> Coffee, but only Dining is available
        let v = Vocabulary::from_names(["Dining"]);
        assert_eq!(remap("Eating Out", "Coffee", &v).as_deref(), Some("Dining"));

        let v = Vocabulary::from_names(["Rent"]);
        assert_eq!(remap("Eating Out", "Coffee", &v), None);
    }

    #[test]
    fn test_deterministic() {
        let v = Vocabulary::builtin();
        let a = remap("Bills", "Water", &v);
        let b = remap("Bills", "Water", &v);
        assert_eq!(a, b);
        assert_eq!(a.as_deref(), Some("Utilities"));
    }
}
