use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use yuletide_core::{StockCap, UserId};

/// Stock counters and the book winners set.
///
/// Counters live in memory only and restart at zero with the process; the
/// winners set is loaded from and saved to a `WinnerStore` by the engine.
/// Caps are not stored here because admins can change them at any time.
#[derive(Debug, Clone, Default)]
pub struct RewardLedger {
    role_given: u32,
    book_given: u32,
    book_winners: BTreeSet<UserId>,
}

impl RewardLedger {
    pub fn new(book_winners: BTreeSet<UserId>) -> Self {
        Self {
            role_given: 0,
            book_given: 0,
            book_winners,
        }
    }

    pub fn role_given(&self) -> u32 {
        self.role_given
    }

    pub fn book_given(&self) -> u32 {
        self.book_given
    }

    pub fn book_winners(&self) -> &BTreeSet<UserId> {
        &self.book_winners
    }

    pub fn has_book(&self, user: UserId) -> bool {
        self.book_winners.contains(&user)
    }

    pub fn book_available(&self, cap: StockCap) -> bool {
        cap.has_remaining(self.book_given)
    }

    pub fn role_available(&self, cap: StockCap) -> bool {
        cap.has_remaining(self.role_given)
    }

    /// Counts a book win. Callers check stock first.
    pub fn record_book_win(&mut self, user: UserId) {
        self.book_given += 1;
        self.book_winners.insert(user);
    }

    /// Counts a role that was actually granted. Callers check stock first.
    pub fn record_role_win(&mut self) {
        self.role_given += 1;
    }

    pub fn stats(&self, role_max: StockCap, book_max: StockCap) -> LedgerStats {
        LedgerStats {
            role_given: self.role_given,
            role_max,
            book_given: self.book_given,
            book_max,
            book_winners: self.book_winners.len(),
        }
    }
}

/// Ledger state for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerStats {
    pub role_given: u32,
    pub role_max: StockCap,
    pub book_given: u32,
    pub book_max: StockCap,
    pub book_winners: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_stock_runs_out() {
        let mut ledger = RewardLedger::default();
        let cap = StockCap::Limited(2);

        assert!(ledger.book_available(cap));
        ledger.record_book_win(UserId(1));
        assert!(ledger.book_available(cap));
        ledger.record_book_win(UserId(2));
        assert!(!ledger.book_available(cap));

        assert!(ledger.has_book(UserId(1)));
        assert!(!ledger.has_book(UserId(3)));
        assert_eq!(ledger.book_given(), 2);
    }

    #[test]
    fn test_unlimited_role_stock() {
        let mut ledger = RewardLedger::default();
        for _ in 0..100 {
            ledger.record_role_win();
        }
        assert!(ledger.role_available(StockCap::Unlimited));
        assert!(!ledger.role_available(StockCap::Limited(100)));
    }

    #[test]
    fn test_loaded_winners_do_not_count_as_given() {
        let winners: BTreeSet<UserId> = [UserId(5), UserId(6)].into_iter().collect();
        let ledger = RewardLedger::new(winners);

        assert!(ledger.has_book(UserId(5)));
        assert_eq!(ledger.book_given(), 0);
        assert!(ledger.book_available(StockCap::Limited(1)));

        let stats = ledger.stats(StockCap::Unlimited, StockCap::Limited(1));
        assert_eq!(stats.book_winners, 2);
        assert_eq!(stats.book_given, 0);
    }
}
