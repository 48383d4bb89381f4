//! Energy-credit ledger for injected surplus generation.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// How injected credits age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CreditPolicy {
    /// Credits accumulate indefinitely as a single running balance.
    #[default]
    Unlimited,
    /// Each month's injection expires `months` months after it was generated. Oldest credits
    /// are consumed first.
    Expiring { months: u32 },
}

/// Credits generated in one month.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CreditLot {
    origin_month: u32,
    kwh: f64,
}

/// Outcome of settling one month against the ledger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settlement {
    /// Credits applied against grid draw.
    pub used_kwh: f64,
    /// Credits that expired before they could be used.
    pub expired_kwh: f64,
    /// Remaining balance after the month.
    pub balance_kwh: f64,
}

/// Credit balance carried from month to month.
#[derive(Debug, Clone, PartialEq)]
pub struct CreditLedger {
    policy: CreditPolicy,
    balance_kwh: f64,
    lots: VecDeque<CreditLot>,
}

impl CreditLedger {
    /// Creates an empty ledger.
    pub fn new(policy: CreditPolicy) -> Self {
        Self {
            policy,
            balance_kwh: 0.0,
            lots: VecDeque::new(),
        }
    }

    /// Deposits `injected_kwh`, then draws credits against `drawn_kwh`.
    ///
    /// `month` is the 1-based absolute month of the run; it dates new lots and drives expiry.
    pub fn settle(self, month: u32, injected_kwh: f64, drawn_kwh: f64) -> (Self, Settlement) {
        match self.policy {
            CreditPolicy::Unlimited => self.settle_unlimited(injected_kwh, drawn_kwh),
            CreditPolicy::Expiring { months } => {
                self.settle_expiring(months, month, injected_kwh, drawn_kwh)
            }
        }
    }

    fn settle_unlimited(mut self, injected_kwh: f64, drawn_kwh: f64) -> (Self, Settlement) {
        self.balance_kwh += injected_kwh;
        let used_kwh = self.balance_kwh.min(drawn_kwh);
        self.balance_kwh -= used_kwh;
        let settlement = Settlement {
            used_kwh,
            expired_kwh: 0.0,
            balance_kwh: self.balance_kwh,
        };
        (self, settlement)
    }

    fn settle_expiring(
        mut self,
        lifetime_months: u32,
        month: u32,
        injected_kwh: f64,
        drawn_kwh: f64,
    ) -> (Self, Settlement) {
        if injected_kwh > 0.0 {
            self.lots.push_back(CreditLot {
                origin_month: month,
                kwh: injected_kwh,
            });
        }

        let mut expired_kwh = 0.0;
        while let Some(lot) = self.lots.front() {
            if month.saturating_sub(lot.origin_month) < lifetime_months {
                break;
            }
            expired_kwh += lot.kwh;
            self.lots.pop_front();
        }

        let mut remaining = drawn_kwh.max(0.0);
        let mut used_kwh = 0.0;
        while remaining > 0.0 {
            let Some(lot) = self.lots.front_mut() else {
                break;
            };
            let take = lot.kwh.min(remaining);
            lot.kwh -= take;
            used_kwh += take;
            remaining -= take;
            if lot.kwh <= 0.0 {
                self.lots.pop_front();
            }
        }

        self.balance_kwh = self.lots.iter().map(|lot| lot.kwh).sum();
        let settlement = Settlement {
            used_kwh,
            expired_kwh,
            balance_kwh: self.balance_kwh,
        };
        (self, settlement)
    }
}
