//! Balance planning.
//!
//! Pure functions that turn a transaction mutation into the relative
//! increments it implies on account balances. Nothing here touches storage:
//! the executor in `ops` applies the plan inside the database transaction
//! that also writes the transaction row.
//!
//! For every account `a` the engine keeps
//! `balance(a) == baseline(a) + Σ signed_delta(t)` over the transactions
//! referencing `a`. Each plan preserves that equation when applied.

use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, TransactionKind};

/// `+amount` for income, `-amount` for expense.
#[must_use]
pub fn signed_delta(amount: MoneyCents, kind: TransactionKind) -> MoneyCents {
    match kind {
        TransactionKind::Income => amount,
        TransactionKind::Expense => -amount,
    }
}

/// A relative change to apply to one account balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BalanceDelta {
    pub account_id: Uuid,
    pub delta: MoneyCents,
}

/// The balance-relevant fields of a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contribution {
    pub account_id: Uuid,
    pub amount: MoneyCents,
    pub kind: TransactionKind,
}

impl Contribution {
    #[must_use]
    pub fn signed(&self) -> MoneyCents {
        signed_delta(self.amount, self.kind)
    }
}

/// Balance-relevant part of an update; `None` keeps the current value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContributionPatch {
    pub account_id: Option<Uuid>,
    pub amount: Option<MoneyCents>,
    pub kind: Option<TransactionKind>,
}

/// Ordered deltas plus the contribution the transaction has afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalancePlan {
    pub deltas: Vec<BalanceDelta>,
    pub next: Contribution,
}

#[must_use]
pub fn plan_create(contribution: &Contribution) -> Vec<BalanceDelta> {
    vec![BalanceDelta {
        account_id: contribution.account_id,
        delta: contribution.signed(),
    }]
}

#[must_use]
pub fn plan_delete(contribution: &Contribution) -> Vec<BalanceDelta> {
    vec![BalanceDelta {
        account_id: contribution.account_id,
        delta: -contribution.signed(),
    }]
}

/// Plans an update as "reverse the old contribution, then apply the new one".
///
/// The reversal always comes first. Use [`net`] to collapse the two steps
/// when both land on the same account.
#[must_use]
pub fn plan_update(old: &Contribution, patch: &ContributionPatch) -> BalancePlan {
    let next = Contribution {
        account_id: patch.account_id.unwrap_or(old.account_id),
        amount: patch.amount.unwrap_or(old.amount),
        kind: patch.kind.unwrap_or(old.kind),
    };

    let mut deltas = plan_delete(old);
    deltas.extend(plan_create(&next));

    BalancePlan { deltas, next }
}

/// Coalesces deltas per account, keeping first-appearance order and
/// dropping accounts whose net change is zero.
pub fn net(deltas: &[BalanceDelta]) -> ResultEngine<Vec<BalanceDelta>> {
    let mut merged: Vec<BalanceDelta> = Vec::with_capacity(deltas.len());
    for delta in deltas {
        match merged.iter_mut().find(|d| d.account_id == delta.account_id) {
            Some(existing) => {
                existing.delta = existing
                    .delta
                    .checked_add(delta.delta)
                    .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))?;
            }
            None => merged.push(*delta),
        }
    }
    merged.retain(|d| !d.delta.is_zero());
    Ok(merged)
}
