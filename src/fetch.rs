use tokio::task::JoinSet;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::models::{Id, Rating};

/// Result of fetching one child collection per parent id.
///
/// Items keep the order of the parent ids, no matter which response
/// arrived first. A failed sub-fetch contributes nothing to `items` and is
/// recorded in `failures` instead of failing the whole aggregate.
#[derive(Debug)]
pub struct FanOut<T> {
    pub items: Vec<T>,
    pub failures: Vec<(Id, ApiError)>,
}

impl<T> Default for FanOut<T> {
    fn default() -> Self {
        FanOut {
            items: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<T> FanOut<T> {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

pub async fn ratings_for_classes(api: &ApiClient, class_ids: &[Id]) -> FanOut<Rating> {
    if class_ids.is_empty() {
        return FanOut::default();
    }

    let mut set = JoinSet::new();
    for (idx, class_id) in class_ids.iter().copied().enumerate() {
        let api = api.clone();
        set.spawn(async move { (idx, class_id, api.class_ratings(class_id).await) });
    }

    // join barrier: nothing is returned until every sub-fetch settled
    let mut settled = Vec::with_capacity(class_ids.len());
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(entry) => settled.push(entry),
            Err(e) => tracing::error!(error = %e, "rating fetch task aborted"),
        }
    }
    settled.sort_by_key(|(idx, _, _)| *idx);

    let mut out = FanOut::default();
    for (_, class_id, res) in settled {
        match res {
            Ok(mut ratings) => out.items.append(&mut ratings),
            Err(e) => {
                tracing::warn!(class_id, error = %e, "failed to fetch class ratings");
                out.failures.push((class_id, e));
            }
        }
    }
    out
}
