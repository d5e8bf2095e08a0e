use phone_check::dto::CandidateRecord;
use rustc_hash::FxHashMap;

///
/// One batch of base-file candidates keyed by phone number.
///
/// Identity is the `(label, phone)` pair: a repeated pair is stored once,
/// while distinct labels for the same phone fan out in first-seen order.
///
#[derive(Debug, Default)]
pub struct CandidateSet {
    /// Labels per phone; `None` stands for an unlabeled row
    labels: FxHashMap<String, Vec<Option<String>>>,
    /// Number of distinct `(label, phone)` pairs
    pairs: usize,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record, returning `false` when the pair was already present.
    pub fn insert(&mut self, record: CandidateRecord) -> bool {
        let CandidateRecord { label, phone } = record;
        let labels = self.labels.entry(phone).or_default();
        if labels.contains(&label) {
            return false;
        }
        labels.push(label);
        self.pairs += 1;
        true
    }

    pub fn get(&self, phone: &str) -> Option<&[Option<String>]> {
        self.labels.get(phone).map(Vec::as_slice)
    }

    pub fn pairs(&self) -> usize {
        self.pairs
    }

    pub fn phones(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
