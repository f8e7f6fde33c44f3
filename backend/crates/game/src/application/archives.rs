//! Archive Browsing Use Case

use std::sync::Arc;

use kernel::id::ArchiveId;

use crate::domain::puzzle::{ArchiveSummary, GameArchive, LeaderboardEntry};
use crate::domain::repository::ArchiveRepository;
use crate::error::{GameError, GameResult};

/// Archive Browsing Use Case
pub struct BrowseArchivesUseCase<A>
where
    A: ArchiveRepository,
{
    archive_repo: Arc<A>,
}

impl<A> BrowseArchivesUseCase<A>
where
    A: ArchiveRepository,
{
    pub fn new(archive_repo: Arc<A>) -> Self {
        Self { archive_repo }
    }

    pub async fn list(&self) -> GameResult<Vec<ArchiveSummary>> {
        self.archive_repo.list_archives().await
    }

    pub async fn get(&self, id: ArchiveId) -> GameResult<GameArchive> {
        self.archive_repo
            .find_archive(id.into_uuid())
            .await?
            .ok_or(GameError::ArchiveNotFound)
    }

    /// The player-facing leaderboard is the ranking of the most recent
    /// finished week. An empty list before the first turnover.
    pub async fn latest_leaderboard(&self) -> GameResult<Vec<LeaderboardEntry>> {
        Ok(self
            .archive_repo
            .latest_archive()
            .await?
            .map(|a| a.leaderboard)
            .unwrap_or_default())
    }
}
