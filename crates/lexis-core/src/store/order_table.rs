use super::Store;
use crate::error::StoreError;
use crate::model::LexemeId;

impl Store {
    /// Replace the ordering table with `ids` at positions `1..=N`.
    ///
    /// Clear and insert share one transaction, so readers see either the old
    /// or the new table. `is_current` is checked before commit; when it
    /// returns false the transaction rolls back and `Ok(false)` is returned.
    pub(crate) fn replace_order_if(
        &self,
        ids: &[LexemeId],
        is_current: impl FnOnce() -> bool,
    ) -> Result<bool, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM lexeme_order", [])?;
        {
            let mut stmt =
                tx.prepare_cached("INSERT INTO lexeme_order (position, lexeme_id) VALUES (?1, ?2)")?;
            for (position, id) in (1_i64..).zip(ids) {
                stmt.execute(rusqlite::params![position, id])?;
            }
        }
        if !is_current() {
            // Dropping the transaction rolls it back.
            return Ok(false);
        }
        tx.commit()?;
        Ok(true)
    }

    /// Up to `count` ids at positions `from..from + count`.
    pub(crate) fn order_range(&self, count: usize, from: i64) -> Result<Vec<LexemeId>, StoreError> {
        let count = i64::try_from(count).unwrap_or(i64::MAX);
        let end = from.saturating_add(count);
        self.read(|conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT lexeme_id FROM lexeme_order
                 WHERE position >= ?1 AND position < ?2 ORDER BY position",
            )?;
            let rows = stmt.query_map(rusqlite::params![from, end], |row| row.get(0))?;
            Ok(rows.collect::<Result<_, _>>()?)
        })
    }

    pub(crate) fn order_len(&self) -> Result<usize, StoreError> {
        self.read(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM lexeme_order", [], |row| row.get(0))?;
            Ok(usize::try_from(n).unwrap_or(0))
        })
    }

    pub(crate) fn clear_order(&self) -> Result<(), StoreError> {
        self.write(|tx| {
            tx.execute("DELETE FROM lexeme_order", [])?;
            Ok(())
        })
    }
}
