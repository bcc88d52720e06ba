//! Player history pipelines.

use std::sync::Arc;

use tracing::info;

use super::DataGateway;
use super::merge::merge_row;
use crate::Result;
use crate::cache::QueryCategory;
use crate::store::{Query, decode_rows_lenient, fetch_pages};
use crate::types::{
    FullHistory, HISTORY_COLUMNS, HistoryLimit, PlayerId, PlayerRow, RATINGS_TABLE, RatingRow,
};

impl DataGateway {
    /// Up to `limit` most recent rating rows for one player, oldest first.
    ///
    /// The store is read newest first so the limit keeps the latest rows;
    /// the result is reversed into chronological order for charting.
    pub async fn player_history(
        &self,
        id: PlayerId,
        limit: HistoryLimit,
    ) -> Result<Arc<Vec<PlayerRow>>> {
        let parameter = format!("{id}:{}", limit.get());
        self.cached(QueryCategory::PlayerHistory, parameter, move |gw| async move {
            let query = Query::table(RATINGS_TABLE)
                .eq("nba_id", id.get())
                .order("date", false)
                .limit(limit.get());
            let (mut rows, dimension) =
                tokio::try_join!(gw.rating_rows(&query), gw.player_dimension(id))?;
            rows.reverse();

            let history = rows
                .into_iter()
                .map(|row| merge_row(row, dimension.as_deref()))
                .collect();
            Ok(Arc::new(history))
        })
        .await
    }

    /// A player's whole career, oldest first, walked page by page.
    ///
    /// The walk stops at the policy's row cap; `truncated` reports whether
    /// it did.
    pub async fn full_player_history(&self, id: PlayerId) -> Result<Arc<FullHistory>> {
        self.cached(QueryCategory::FullPlayerHistory, id, move |gw| async move {
            let max_rows = gw.policy.full_history_max_rows;
            let query = Query::table(RATINGS_TABLE)
                .select(HISTORY_COLUMNS)
                .eq("nba_id", id.get())
                .order("date", true);
            let (walk, dimension) = tokio::try_join!(
                fetch_pages(gw.store(), &query, gw.policy.page_size, Some(max_rows)),
                gw.player_dimension(id),
            )?;

            let rows: Vec<RatingRow> = decode_rows_lenient(RATINGS_TABLE, walk.rows);
            let rows: Vec<_> = rows
                .into_iter()
                .map(|row| merge_row(row, dimension.as_deref()))
                .collect();

            info!(
                nba_id = id.get(),
                rows = rows.len(),
                pages = walk.pages,
                truncated = walk.truncated,
                "full player history loaded"
            );
            Ok(Arc::new(FullHistory {
                rows,
                truncated: walk.truncated,
                max_rows,
            }))
        })
        .await
    }
}
