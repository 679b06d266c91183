//! Word tallies and their upsert into the words collection

use serde::Serialize;
use std::collections::BTreeMap;

use super::split::Language;
use crate::backend::{BackendResult, CollectionHandle, CommitResult, FieldValue};

/// Word counts extracted from one batch of identifiers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordTally {
    pub language: Language,
    /// Word → occurrences
    pub counts: BTreeMap<String, u64>,
    /// Identifiers that did not follow the language's convention
    pub skipped: usize,
}

impl WordTally {
    /// Split every identifier and count the resulting words
    pub fn from_identifiers<I, S>(language: Language, identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counts = BTreeMap::new();
        let mut skipped = 0;

        for identifier in identifiers {
            match language.split(identifier.as_ref().trim()) {
                Some(words) => {
                    for word in words {
                        *counts.entry(word).or_insert(0) += 1;
                    }
                }
                None => skipped += 1,
            }
        }

        Self {
            language,
            counts,
            skipped,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total word occurrences
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}

/// Add a tally to the words collection in one atomic batch.
///
/// Each word document ends up as `{name, value, python_value, java_value}`:
/// `value` and the tally language's counter grow by the count, the other
/// language's counter is created at 0 if missing.
pub fn record_tally(words: &CollectionHandle, tally: &WordTally) -> BackendResult<CommitResult> {
    let mut batch = words.batch();

    for (word, count) in &tally.counts {
        let count = i64::try_from(*count).unwrap_or(i64::MAX);
        let mut fields = vec![
            ("name".to_string(), FieldValue::from(word.as_str())),
            ("value".to_string(), FieldValue::increment(count)),
        ];
        for language in Language::all() {
            let by = if language == tally.language { count } else { 0 };
            fields.push((language.counter_field().to_string(), FieldValue::increment(by)));
        }
        batch.set_merge(words, word.clone(), fields);
    }

    let result = batch.commit()?;

    tracing::info!(
        language = %tally.language,
        words = tally.counts.len(),
        occurrences = tally.total(),
        skipped = tally.skipped,
        "Recorded word tally"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{client::test_config, BackendClient};
    use serde_json::json;

    #[test]
    fn test_tally_counts_words() {
        let tally = WordTally::from_identifiers(
            Language::Python,
            ["get_user", "get_name", "setUser", " load_user "],
        );

        assert_eq!(tally.counts["get"], 2);
        assert_eq!(tally.counts["user"], 2);
        assert_eq!(tally.counts["name"], 1);
        assert_eq!(tally.counts["load"], 1);
        assert_eq!(tally.skipped, 1);
        assert_eq!(tally.total(), 6);
    }

    #[test]
    fn test_record_tally_creates_and_increments() {
        let client = BackendClient::connect(test_config()).unwrap();
        let words = client.words();

        let python = WordTally::from_identifiers(Language::Python, ["get_user", "get_item"]);
        record_tally(&words, &python).unwrap();

        let get = words.get("get").unwrap().unwrap();
        assert_eq!(get.fields["name"], json!("get"));
        assert_eq!(get.fields["value"], json!(2));
        assert_eq!(get.fields["python_value"], json!(2));
        assert_eq!(get.fields["java_value"], json!(0));

        let java = WordTally::from_identifiers(Language::Java, ["getUser"]);
        let result = record_tally(&words, &java).unwrap();
        assert_eq!(result.writes, 2);

        let get = words.get("get").unwrap().unwrap();
        assert_eq!(get.fields["value"], json!(3));
        assert_eq!(get.fields["python_value"], json!(2));
        assert_eq!(get.fields["java_value"], json!(1));

        assert_eq!(words.len(), 3);
    }
}
