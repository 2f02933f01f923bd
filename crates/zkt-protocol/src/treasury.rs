//! Escrow for thread creation fees.
//!
//! The balance only grows through deposits and only shrinks through a
//! full withdrawal to the owner. Moving value is the host ledger's job:
//! `withdraw` returns a [`Withdrawal`] instruction for it to execute.

use serde::{Deserialize, Serialize};

use zkt_core::{AccountId, Amount, ThreadsError};

/// Payout instruction for the host ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub to: AccountId,
    #[serde(with = "crate::amount")]
    pub amount: Amount,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Treasury {
    balance: Amount,
}

impl Treasury {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_balance(balance: Amount) -> Self {
        Self { balance }
    }

    /// Escrowed balance.
    pub fn available(&self) -> Amount {
        self.balance
    }

    /// Balance after depositing `amount`, or `BalanceOverflow`.
    pub fn checked_deposit(&self, amount: Amount) -> Result<Amount, ThreadsError> {
        self.balance
            .checked_add(amount)
            .ok_or(ThreadsError::BalanceOverflow)
    }

    /// Add `amount` to the balance.
    pub fn deposit(&mut self, amount: Amount) -> Result<Amount, ThreadsError> {
        self.balance = self.checked_deposit(amount)?;
        Ok(self.balance)
    }

    /// Empty the balance into a payout to `to`. A zero balance yields a
    /// zero payout.
    pub fn withdraw(&mut self, to: AccountId) -> Withdrawal {
        let amount = std::mem::take(&mut self.balance);
        Withdrawal { to, amount }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deposit_and_withdraw_all() {
        let mut t = Treasury::new();
        t.deposit(1).unwrap();
        t.deposit(2).unwrap();
        assert_eq!(t.available(), 3);
        let w = t.withdraw(AccountId::new("owner"));
        assert_eq!(w.amount, 3);
        assert_eq!(w.to.as_str(), "owner");
        assert_eq!(t.available(), 0);
    }

    #[test]
    fn test_withdraw_zero() {
        let mut t = Treasury::new();
        assert_eq!(t.withdraw(AccountId::new("owner")).amount, 0);
    }

    #[test]
    fn test_overflow_leaves_balance() {
        let mut t = Treasury::with_balance(Amount::MAX);
        assert_eq!(t.deposit(1).unwrap_err(), ThreadsError::BalanceOverflow);
        assert_eq!(t.available(), Amount::MAX);
    }
}
