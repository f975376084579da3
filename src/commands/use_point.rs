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

/// Spend points from a user's balance
///
/// Bounded by the available balance: the sufficiency check and the write run
/// under the same exclusive section, so two concurrent uses can never both
/// pass against a stale read.
pub struct UsePointRequest {
    pub user_id: u64,
    /// Signed as received from the wire; validated non-negative here. A zero
    /// amount is a valid, recorded no-op.
    pub amount: i64,
}

impl<B, H> Service<UsePointRequest> for PointLedger<B, H>
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

    fn call(&mut self, req: UsePointRequest) -> Self::Future {
        let balances = self.balances.clone();
        let history = self.history.clone();
        let locks = self.locks.clone();
        Box::pin(async move {
            let amount = validated_magnitude(req.amount)?;

            let lock = locks.for_user(req.user_id);
            let _guard = lock.write().await;
            let start = Instant::now();

            // Unlike charge, use never creates a balance.
            let current = balances
                .get(req.user_id)
                .await?
                .map(|balance| balance.point)
                .ok_or(Error::UserNotFound {
                    user_id: req.user_id,
                })?;
            let new_total = current
                .checked_sub(amount)
                .ok_or(Error::InsufficientBalance {
                    user_id: req.user_id,
                    requested: amount,
                    available: current,
                })?;
            let balance = balances.set(req.user_id, new_total).await?;

            let took_micros = start.elapsed().as_micros() as u64;
            history
                .append(req.user_id, amount, TransactionKind::Use, took_micros)
                .await?;
            tracing::debug!(user_id = req.user_id, amount, new_total, "use applied");

            Ok(balance)
        })
    }
}
