use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, info};

use crate::config::StoreConfig;
use crate::db::{Database, DbError};
use crate::error::{AppError, AppResult};
use crate::models::{
    Blacklist, Clip, ClipContent, ClipFilter, ContentType, FavoriteContent, FavoriteItem,
    LastSnapshot, MatchCounts, Summary,
};
use crate::services::notifier::{Notifier, RefreshEvent};

/// How long past the call timeout a commit already under way may take to report back.
const COMMIT_GRACE: Duration = Duration::from_millis(100);

/// Handle to the clip history. Cheap to clone; every clone shares one
/// database connection and one subscriber list.
///
/// Async methods need a tokio runtime with the time driver enabled.
#[derive(Clone)]
pub struct ClipStore {
    db: Arc<Database>,
    notifier: Notifier,
    config: StoreConfig,
}

impl ClipStore {
    pub fn new(db: Arc<Database>, config: StoreConfig) -> Self {
        Self {
            db,
            notifier: Notifier::new(),
            config,
        }
    }

    pub fn open(path: &Path, config: StoreConfig) -> AppResult<Self> {
        let db = Database::new(path, config.busy_timeout())?;
        info!(path = %path.display(), history_limit = config.history_limit, "clip store opened");
        Ok(Self::new(Arc::new(db), config))
    }

    pub fn db(&self) -> &Arc<Database> {
        &self.db
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Runs `work` on the blocking pool against a handle bounded by the call
    /// timeout. Work that misses the deadline is rolled back and reported as
    /// `Unavailable`.
    async fn run<T, F>(&self, operation: &'static str, work: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> AppResult<T> + Send + 'static,
    {
        let timeout = self.config.call_timeout();
        let db = self.db.with_deadline(Instant::now().checked_add(timeout));
        let task = tokio::task::spawn_blocking(move || work(&db));
        match tokio::time::timeout(timeout.saturating_add(COMMIT_GRACE), task).await {
            Ok(Ok(Err(AppError::Db(DbError::DeadlineElapsed)))) | Err(_) => {
                Err(AppError::Unavailable { operation, timeout })
            }
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(AppError::Internal(format!("{operation} task failed: {join_err}"))),
        }
    }

    fn finish_mutation<T>(&self, operation: &str, event: RefreshEvent, result: AppResult<T>) -> AppResult<T> {
        match &result {
            Ok(_) => self.notifier.notify(event),
            Err(err) => error!("{operation} failed: {err}"),
        }
        result
    }

    /// Resolves once the clip is written, after evicting rows over capacity.
    pub async fn insert(&self, clip: Clip) -> AppResult<Clip> {
        let limit = self.config.history_limit;
        self.run("insert clip", move |db| Ok(db.insert_clip(&clip, limit)?))
            .await
    }

    /// Returns `false` when the clip was already gone.
    pub async fn delete(&self, clip: &Clip) -> AppResult<bool> {
        let (kind, id) = (clip.kind(), clip.id);
        self.run("delete clip", move |db| Ok(db.delete_clip(kind, id)?))
            .await
    }

    pub async fn list(&self, kind: ContentType) -> AppResult<Vec<Clip>> {
        self.run("list clips", move |db| Ok(db.list_clips(kind)?)).await
    }

    pub async fn find_exact(&self, content: ClipContent) -> AppResult<Vec<Clip>> {
        self.run("find exact clip", move |db| Ok(db.find_exact(&content)?))
            .await
    }

    pub async fn count_matching(&self, filter: ClipFilter) -> AppResult<MatchCounts> {
        self.run("count matching clips", move |db| Ok(db.count_matching(&filter)?))
            .await
    }

    /// All three tables are cleared in one transaction; on error nothing was removed.
    pub async fn delete_matching(&self, filter: ClipFilter) -> AppResult<MatchCounts> {
        let result = self
            .run("delete matching clips", {
                let filter = filter.clone();
                move |db| Ok(db.delete_matching(&filter)?)
            })
            .await;
        match &result {
            Ok(counts) => info!(removed = counts.total(), ?filter, "cleared clips"),
            Err(err) => error!(?filter, "clearing clips failed: {err}"),
        }
        result
    }

    pub async fn last_snapshot(&self) -> AppResult<LastSnapshot> {
        self.run("last snapshot", |db| Ok(db.last_snapshot()?)).await
    }

    pub async fn favorites(&self) -> AppResult<Vec<FavoriteItem>> {
        self.run("list favorites", |db| Ok(db.list_favorites()?)).await
    }

    pub async fn promote(&self, clip: &Clip) -> AppResult<FavoriteItem> {
        let result = match FavoriteContent::from_clip(clip) {
            Ok(content) => {
                self.run("promote clip", move |db| Ok(db.insert_favorite(content)?))
                    .await
            }
            Err(err) => Err(err),
        };
        self.finish_mutation("promote clip", RefreshEvent::Favorites, result)
    }

    pub async fn update_favorite(&self, item: FavoriteItem) -> AppResult<()> {
        let result = match check_favorite_shape(&item) {
            Ok(()) => {
                self.run("update favorite", move |db| Ok(db.update_favorite(&item)?))
                    .await
            }
            Err(err) => Err(err),
        };
        self.finish_mutation("update favorite", RefreshEvent::Favorites, result)
    }

    pub async fn delete_favorite(&self, item: &FavoriteItem) -> AppResult<bool> {
        let favorite = item.favorite.clone();
        let result = self
            .run("delete favorite", move |db| Ok(db.delete_favorite(&favorite)?))
            .await;
        self.finish_mutation("delete favorite", RefreshEvent::Favorites, result)
    }

    pub async fn blacklist(&self) -> AppResult<Vec<Blacklist>> {
        self.run("list blacklist", |db| Ok(db.list_blacklist()?)).await
    }

    pub async fn is_blacklisted(&self, application_name: &str) -> AppResult<bool> {
        let application_name = application_name.to_string();
        self.run("check blacklist", move |db| Ok(db.is_blacklisted(&application_name)?))
            .await
    }

    pub async fn insert_blacklist(&self, application_name: &str) -> AppResult<Blacklist> {
        let application_name = application_name.trim().to_string();
        let result = if application_name.is_empty() {
            Err(AppError::InvalidContent("blacklist entry needs an application name".to_string()))
        } else {
            self.run("insert blacklist", move |db| Ok(db.insert_blacklist(&application_name)?))
                .await
        };
        self.finish_mutation("insert blacklist", RefreshEvent::Blacklist, result)
    }

    pub async fn delete_blacklist(&self, entry: &Blacklist) -> AppResult<bool> {
        let id = entry.id;
        let result = self
            .run("delete blacklist", move |db| Ok(db.delete_blacklist(id)?))
            .await;
        self.finish_mutation("delete blacklist", RefreshEvent::Blacklist, result)
    }

    pub async fn summary(&self) -> AppResult<Vec<Summary>> {
        self.run("summary", |db| Ok(db.summary()?)).await
    }
}

fn check_favorite_shape(item: &FavoriteItem) -> AppResult<()> {
    let Some(content) = &item.content else {
        return Ok(());
    };
    if content.kind() != item.favorite.content_type {
        return Err(AppError::InvalidContent(format!(
            "favorite {} is {} but its content is {}",
            item.favorite.id,
            item.favorite.content_type.as_str(),
            content.kind().as_str()
        )));
    }
    if content.id() != item.favorite.favorite_content_id {
        return Err(AppError::InvalidContent(format!(
            "favorite {} does not own content {}",
            item.favorite.id,
            content.id()
        )));
    }
    Ok(())
}
