use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Batch, BatchOp, RankedMember, ScoreStore};
use crate::{
    error::{RecError, RecResult},
    keys::SetShape,
};

#[derive(Debug, Clone)]
enum Entry {
    Ranked(HashMap<String, f64>),
    Plain(HashSet<String>),
}

impl Entry {
    fn len(&self) -> usize {
        match self {
            Entry::Ranked(members) => members.len(),
            Entry::Plain(members) => members.len(),
        }
    }

    fn shape(&self) -> SetShape {
        match self {
            Entry::Ranked(_) => SetShape::Ranked,
            Entry::Plain(_) => SetShape::Plain,
        }
    }
}

/// The error Redis answers with when a command hits a key of the other type
fn wrong_type(key: &str) -> RecError {
    RecError::Store(redis::RedisError::from((
        redis::ErrorKind::TypeError,
        "WRONGTYPE",
        format!("key '{}' holds a different kind of set", key),
    )))
}

/// Fails unless `key` is absent or holds a set of `shape`
fn check_shape(inner: &HashMap<String, Entry>, key: &str, shape: SetShape) -> RecResult<()> {
    match inner.get(key) {
        Some(entry) if entry.shape() != shape => Err(wrong_type(key)),
        _ => Ok(()),
    }
}

/// In-process score store with Redis semantics
///
/// Sets vanish once their last member is removed, ties in score rank by member
/// descending (as ZREVRANGE does), and a batch is applied under one write lock.
/// Reading or trimming a key as the wrong shape fails with a WRONGTYPE store
/// error; a batch is checked in full first, so a failing batch changes nothing.
#[derive(Clone, Default)]
pub struct MemoryScoreStore {
    inner: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `member`'s score in the ranked set at `key`, creating it if needed
    pub async fn add_ranked(&self, key: &str, member: &str, score: f64) {
        let mut inner = self.inner.write().await;
        let entry = inner
            .entry(key.to_string())
            .or_insert_with(|| Entry::Ranked(HashMap::new()));
        if let Entry::Ranked(members) = entry {
            members.insert(member.to_string(), score);
        }
    }

    /// Adds `member` to the plain set at `key`, creating it if needed
    pub async fn add_member(&self, key: &str, member: &str) {
        let mut inner = self.inner.write().await;
        let entry = inner
            .entry(key.to_string())
            .or_insert_with(|| Entry::Plain(HashSet::new()));
        if let Entry::Plain(members) = entry {
            members.insert(member.to_string());
        }
    }

    pub async fn contains_key(&self, key: &str) -> bool {
        self.inner.read().await.contains_key(key)
    }

    /// True if `member` is in the set at `key`, whatever its shape
    pub async fn contains_member(&self, key: &str, member: &str) -> bool {
        match self.inner.read().await.get(key) {
            Some(Entry::Ranked(members)) => members.contains_key(member),
            Some(Entry::Plain(members)) => members.contains(member),
            None => false,
        }
    }

    /// Every key currently held, sorted
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    fn remove(
        inner: &mut HashMap<String, Entry>,
        key: &str,
        shape: SetShape,
        member: &str,
    ) -> RecResult<()> {
        check_shape(inner, key, shape)?;
        let emptied = match inner.get_mut(key) {
            Some(Entry::Ranked(members)) => {
                members.remove(member);
                members.is_empty()
            }
            Some(Entry::Plain(members)) => {
                members.remove(member);
                members.is_empty()
            }
            None => false,
        };
        if emptied {
            inner.remove(key);
        }
        Ok(())
    }
}

#[async_trait]
impl ScoreStore for MemoryScoreStore {
    async fn range_descending(&self, key: &str, with_scores: bool) -> RecResult<Vec<RankedMember>> {
        let inner = self.inner.read().await;
        let members = match inner.get(key) {
            Some(Entry::Ranked(members)) => members,
            Some(Entry::Plain(_)) => return Err(wrong_type(key)),
            None => return Ok(Vec::new()),
        };

        let mut ranked: Vec<(&String, f64)> = members.iter().map(|(id, s)| (id, *s)).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| b.0.cmp(a.0)));

        Ok(ranked
            .into_iter()
            .map(|(id, score)| RankedMember {
                id: id.clone(),
                score: with_scores.then_some(score),
            })
            .collect())
    }

    async fn cardinality(&self, key: &str, shape: SetShape) -> RecResult<u64> {
        let inner = self.inner.read().await;
        check_shape(&inner, key, shape)?;
        Ok(inner.get(key).map_or(0, Entry::len) as u64)
    }

    async fn keys_matching(&self, pattern: &str) -> RecResult<BTreeSet<String>> {
        let inner = self.inner.read().await;
        Ok(inner
            .keys()
            .filter(|key| glob_match(pattern, key))
            .cloned()
            .collect())
    }

    async fn remove_member(&self, key: &str, shape: SetShape, member: &str) -> RecResult<()> {
        let mut inner = self.inner.write().await;
        Self::remove(&mut inner, key, shape, member)
    }

    async fn execute_batch(&self, batch: Batch) -> RecResult<()> {
        let mut inner = self.inner.write().await;
        for op in batch.ops() {
            if let BatchOp::RemoveMember { key, shape, .. } = op {
                check_shape(&inner, key, *shape)?;
            }
        }

        for op in batch.ops() {
            match op {
                BatchOp::RemoveMember { key, shape, member } => {
                    Self::remove(&mut inner, key, *shape, member)?;
                }
                BatchOp::DeleteKeys(keys) => {
                    for key in keys {
                        inner.remove(key);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Glob matching with `*` (any run) and `?` (any one char)
fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '*' {
            backtrack = Some((pi, ti));
            pi += 1;
        } else if let Some((star, matched)) = backtrack {
            pi = star + 1;
            ti = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }

    p[pi..].iter().all(|&c| c == '*')
}
