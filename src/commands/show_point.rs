use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tower::Service;

use crate::{domain::Balance, ports::balance::BalanceStore, ports::history::HistoryLog};

use super::{Error, PointLedger};

/// Read a user's current balance; no side effects.
pub struct ShowPointRequest {
    pub user_id: u64,
}

impl<B, H> Service<ShowPointRequest> for PointLedger<B, H>
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

    fn call(&mut self, req: ShowPointRequest) -> Self::Future {
        let balances = self.balances.clone();
        let locks = self.locks.clone();
        Box::pin(async move {
            // Shared section: readers of the same user never see a balance
            // from the middle of a mutation, but do not block each other.
            let lock = locks.for_user(req.user_id);
            let _guard = lock.read().await;

            balances
                .get(req.user_id)
                .await?
                .ok_or(Error::UserNotFound {
                    user_id: req.user_id,
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::database::memory::{MemoryBalanceStore, MemoryHistoryLog},
        commands::charge::ChargeRequest,
    };
    use speculoos::prelude::*;
    use std::sync::Arc;
    use tower::{BoxError, ServiceExt};

    #[tokio::test]
    async fn test_unknown_user() {
        let mut ledger = PointLedger::new(
            Arc::new(MemoryBalanceStore::default()),
            Arc::new(MemoryHistoryLog::default()),
        );
        let res = ServiceExt::<ShowPointRequest>::ready(&mut ledger)
            .await
            .unwrap()
            .call(ShowPointRequest { user_id: 9 })
            .await;
        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::UserNotFound { user_id: 9 }));
    }

    #[tokio::test]
    async fn test_returns_current_balance() -> Result<(), BoxError> {
        // GIVEN a charged user
        let mut ledger = PointLedger::new(
            Arc::new(MemoryBalanceStore::default()),
            Arc::new(MemoryHistoryLog::default()),
        );
        ServiceExt::<ChargeRequest>::ready(&mut ledger)
            .await?
            .call(ChargeRequest {
                user_id: 1,
                amount: 250,
            })
            .await?;

        // WHEN reading the balance
        let res = ServiceExt::<ShowPointRequest>::ready(&mut ledger)
            .await?
            .call(ShowPointRequest { user_id: 1 })
            .await;

        // THEN it matches the charged amount
        assert_that!(res)
            .is_ok()
            .matches(|balance| balance.user_id == 1 && balance.point == 250);
        Ok(())
    }
}
