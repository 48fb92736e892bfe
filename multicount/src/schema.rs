//! Record types flowing through the job, from source row to aggregate.

use serde::{Deserialize, Serialize};

/// One row of the source file.  `doc_id` is carried as an opaque string; the
/// job never interprets it, only groups by it.
#[derive(Clone, Debug, Deserialize)]
pub struct InputRecord {
    pub doc_id: String,
    pub text: String,
}

/// A single token paired with the document it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenRecord {
    pub token: String,
    pub doc_id: String,
}

/// The four counting dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dimension {
    All,
    PerToken,
    PerDoc,
    PerTokenAndDoc,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::All,
        Dimension::PerToken,
        Dimension::PerDoc,
        Dimension::PerTokenAndDoc,
    ];

    /// Identifier tagging records of this dimension; also names the output
    /// file the dimension is written to.
    pub fn group_id(&self) -> &'static str {
        match self {
            Dimension::All => "countAll",
            Dimension::PerToken => "countPerToken",
            Dimension::PerDoc => "countPerDoc",
            Dimension::PerTokenAndDoc => "countPerTokenAndDoc",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Dimension::All => 0,
            Dimension::PerToken => 1,
            Dimension::PerDoc => 2,
            Dimension::PerTokenAndDoc => 3,
        }
    }
}

/// A dimension-tagged group key.  Grouping equality is structural over the
/// dimension and the tuple elements.  Keys are serializable so the
/// aggregation shuffle can stage them through spill files.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupKey {
    All,
    PerToken(String),
    PerDoc(String),
    PerTokenAndDoc(String, String),
}

impl GroupKey {
    pub fn dimension(&self) -> Dimension {
        match self {
            GroupKey::All => Dimension::All,
            GroupKey::PerToken(_) => Dimension::PerToken,
            GroupKey::PerDoc(_) => Dimension::PerDoc,
            GroupKey::PerTokenAndDoc(_, _) => Dimension::PerTokenAndDoc,
        }
    }

    /// The group tuple rendered for the sink: elements tab-joined, empty for
    /// the global count.  Matches the reference output layout, where the
    /// two-element tuple occupies two physical columns.
    pub fn group(&self) -> String {
        match self {
            GroupKey::All => String::new(),
            GroupKey::PerToken(token) => token.clone(),
            GroupKey::PerDoc(doc_id) => doc_id.clone(),
            GroupKey::PerTokenAndDoc(token, doc_id) => format!("{token}\t{doc_id}"),
        }
    }
}

#[cfg(test)]
mod schema_test {
    use super::*;

    #[test]
    fn test_group_ids() {
        let ids: Vec<_> = Dimension::ALL.iter().map(|d| d.group_id()).collect();
        assert_eq!(
            ids,
            vec!["countAll", "countPerToken", "countPerDoc", "countPerTokenAndDoc"]
        );
    }

    #[test]
    fn test_group_rendering() {
        assert_eq!(GroupKey::All.group(), "");
        assert_eq!(GroupKey::PerToken("cat".into()).group(), "cat");
        assert_eq!(GroupKey::PerDoc("1".into()).group(), "1");
        assert_eq!(
            GroupKey::PerTokenAndDoc("cat".into(), "1".into()).group(),
            "cat\t1"
        );
    }

    #[test]
    fn test_key_equality_is_structural() {
        assert_eq!(
            GroupKey::PerTokenAndDoc("cat".into(), "1".into()),
            GroupKey::PerTokenAndDoc("cat".into(), "1".into())
        );
        assert_ne!(
            GroupKey::PerToken("1".into()),
            GroupKey::PerDoc("1".into())
        );
    }
}
