use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tower::Service;

use crate::{domain::HistoryRecord, ports::balance::BalanceStore, ports::history::HistoryLog};

use super::{Error, PointLedger};

/// Read a user's transaction history in the order it was applied.
///
/// An empty record set surfaces as `UserNotFound`: the service cannot tell a
/// user that never transacted apart from one that does not exist, and the
/// wire contract treats both the same.
pub struct ShowHistoryRequest {
    pub user_id: u64,
}

impl<B, H> Service<ShowHistoryRequest> for PointLedger<B, H>
where
    B: BalanceStore + Send + Sync + 'static,
    H: HistoryLog + Send + Sync + 'static,
{
    type Response = Vec<HistoryRecord>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ShowHistoryRequest) -> Self::Future {
        let history = self.history.clone();
        let locks = self.locks.clone();
        Box::pin(async move {
            let lock = locks.for_user(req.user_id);
            let _guard = lock.read().await;

            let records = history.list_by_user(req.user_id).await?;
            if records.is_empty() {
                return Err(Error::UserNotFound {
                    user_id: req.user_id,
                });
            }

            Ok(records)
        })
    }
}
