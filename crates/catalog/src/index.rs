use crate::models::CatalogRecord;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Language code to the torrents that carry subtitles in it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LanguageIndex {
    languages: BTreeMap<String, BTreeSet<u64>>,
}
impl LanguageIndex {
    pub fn insert(&mut self, record: &CatalogRecord) {
        for language in &record.languages {
            self.languages.entry(language.clone()).or_default().insert(record.torrent_id);
        }
    }

    pub fn torrents(&self, language: &str) -> impl Iterator<Item = u64> + '_ {
        self.languages.get(language).into_iter().flatten().copied()
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}
impl<'a> FromIterator<&'a CatalogRecord> for LanguageIndex {
    fn from_iter<I: IntoIterator<Item = &'a CatalogRecord>>(records: I) -> Self {
        let mut index = Self::default();
        records.into_iter().for_each(|record| index.insert(record));
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, languages: &[&str]) -> CatalogRecord {
        CatalogRecord {
            torrent_id: id,
            display_name: format!("Show {id}"),
            languages: languages.iter().map(|l| l.to_string()).collect(),
            subtitle_entries: Vec::new(),
            episodes_available: BTreeSet::new(),
            file_count: 1,
            total_size: 0,
            external_ref_id: None,
        }
    }

    #[test]
    fn test_index() {
        let records = [record(9, &["eng", "spa"]), record(2, &["eng"]), record(4, &[])];
        let index: LanguageIndex = records.iter().collect();
        assert_eq!(index.languages().collect::<Vec<_>>(), vec!["eng", "spa"]);
        assert_eq!(index.torrents("eng").collect::<Vec<_>>(), vec![2, 9]);
        assert_eq!(index.torrents("jpn").count(), 0);
        assert_eq!(serde_json::to_string(&index).unwrap(), r#"{"eng":[2,9],"spa":[9]}"#);
    }
}
