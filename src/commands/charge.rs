use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};

use tower::Service;

use crate::{
    domain::{Balance, TransactionKind},
    ports::{balance::BalanceStore, history::HistoryLog},
};

use super::{validated_magnitude, Error, PointLedger};

/// Add points to a user's balance
///
/// The balance is created on the first successful charge; there is no
/// separate registration step.
pub struct ChargeRequest {
    pub user_id: u64,
    /// Signed as received from the wire; validated non-negative here. A zero
    /// amount is a valid, recorded no-op.
    pub amount: i64,
}

impl<B, H> Service<ChargeRequest> for PointLedger<B, H>
where
    B: BalanceStore + Send + Sync + 'static,
    H: HistoryLog + Send + Sync + 'static,
{
    type Response = Balance;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ChargeRequest) -> Self::Future {
        let balances = self.balances.clone();
        let history = self.history.clone();
        let locks = self.locks.clone();
        Box::pin(async move {
            // Fails before the critical section, so rejected requests leave
            // no trace anywhere.
            let amount = validated_magnitude(req.amount)?;

            let lock = locks.for_user(req.user_id);
            let _guard = lock.write().await;
            let start = Instant::now();

            // Absent balance reads as zero: the first charge creates it.
            let current = balances
                .get(req.user_id)
                .await?
                .map(|balance| balance.point)
                .unwrap_or(0);
            let new_total = current
                .checked_add(amount)
                .ok_or(Error::BalanceOverflow {
                    user_id: req.user_id,
                    current,
                    amount,
                })?;
            let balance = balances.set(req.user_id, new_total).await?;

            let took_micros = start.elapsed().as_micros() as u64;
            history
                .append(req.user_id, amount, TransactionKind::Charge, took_micros)
                .await?;
            tracing::debug!(user_id = req.user_id, amount, new_total, "charge applied");

            Ok(balance)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::database::memory::{MemoryBalanceStore, MemoryHistoryLog},
        ports::{
            balance::{BalanceStore, MockBalanceStore},
            history::{HistoryLog, MockHistoryLog},
        },
    };
    use rstest::*;
    use speculoos::prelude::*;
    use std::sync::Arc;
    use tower::{BoxError, ServiceExt};

    #[tokio::test]
    async fn test_negative_amount_touches_nothing() {
        // GIVEN stores that expect no calls at all
        let balances = Arc::new(MockBalanceStore::new());
        let history = Arc::new(MockHistoryLog::new());
        let mut ledger = PointLedger::new(balances, history);

        // WHEN charging a negative amount
        let res = ServiceExt::<ChargeRequest>::ready(&mut ledger)
            .await
            .unwrap()
            .call(ChargeRequest {
                user_id: 1,
                amount: -1,
            })
            .await;

        // THEN it is rejected and neither store was called
        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::InvalidAmount { amount: -1 }));
        Arc::into_inner(ledger.balances).unwrap().checkpoint();
        Arc::into_inner(ledger.history).unwrap().checkpoint();
    }

    #[rstest]
    #[case(None, 100, 100)]
    #[case(Some(50), 70, 120)]
    #[case(None, 0, 0)]
    #[case(Some(100), 0, 100)]
    #[tokio::test]
    async fn test_charge(
        #[case] existing: Option<u64>,
        #[case] amount: i64,
        #[case] expected: u64,
    ) -> Result<(), BoxError> {
        // GIVEN a ledger, optionally with a pre-existing balance
        let balances = Arc::new(MemoryBalanceStore::default());
        let history = Arc::new(MemoryHistoryLog::default());
        if let Some(point) = existing {
            balances.set(1, point).await?;
        }
        let mut ledger = PointLedger::new(balances, history.clone());

        // WHEN charging
        let res = ServiceExt::<ChargeRequest>::ready(&mut ledger)
            .await?
            .call(ChargeRequest { user_id: 1, amount })
            .await;

        // THEN the balance reflects the sum and exactly one CHARGE record
        // with the requested magnitude was appended
        assert_that!(res)
            .is_ok()
            .matches(|balance| balance.user_id == 1 && balance.point == expected);
        let records = history.list_by_user(1).await?;
        assert_that!(records).has_length(1);
        assert_that!(records[0].kind).is_equal_to(TransactionKind::Charge);
        assert_that!(records[0].amount).is_equal_to(amount as u64);
        Ok(())
    }

    #[tokio::test]
    async fn test_overflow_rejected_without_mutation() -> Result<(), BoxError> {
        // GIVEN a balance at the representable maximum
        let balances = Arc::new(MemoryBalanceStore::default());
        let history = Arc::new(MemoryHistoryLog::default());
        balances.set(1, u64::MAX).await?;
        let mut ledger = PointLedger::new(balances.clone(), history.clone());

        // WHEN charging one more point
        let res = ServiceExt::<ChargeRequest>::ready(&mut ledger)
            .await?
            .call(ChargeRequest { user_id: 1, amount: 1 })
            .await;

        // THEN the charge fails and neither the balance nor the history moved
        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::BalanceOverflow { current: u64::MAX, .. }));
        let balance = balances.get(1).await?;
        assert_that!(balance).is_some().matches(|b| b.point == u64::MAX);
        assert_that!(history.list_by_user(1).await?).is_empty();
        Ok(())
    }
}
