//! Archive And Reset Use Case
//!
//! The weekly turnover. The repository performs the whole
//! snapshot-then-wipe as one transaction under an advisory lock, so
//! two racing requests produce exactly one archive.

use std::sync::Arc;

use platform::clock::Clock;

use crate::domain::puzzle::GameArchive;
use crate::domain::repository::ArchiveRepository;
use crate::error::GameResult;

/// Archive And Reset Use Case
pub struct ArchiveAndResetUseCase<A>
where
    A: ArchiveRepository,
{
    archive_repo: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<A> ArchiveAndResetUseCase<A>
where
    A: ArchiveRepository,
{
    pub fn new(archive_repo: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self { archive_repo, clock }
    }

    pub async fn execute(&self) -> GameResult<GameArchive> {
        let archived_on = self.clock.now().date_naive();
        let archive = self.archive_repo.archive_and_reset(archived_on).await?;

        tracing::info!(
            archive_id = %archive.id,
            archived_on = %archive.archived_on,
            finishers = archive.leaderboard.len(),
            "Competition archived and reset"
        );

        Ok(archive)
    }
}
