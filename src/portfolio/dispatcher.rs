//! Batch dispatcher: concurrent fan-out of wallet lookups, ordered fan-in.

use futures_util::future::join_all;

use crate::chains::registry::ChainRegistry;
use crate::chains::types::{ChainLookupResult, LookupError};
use crate::observability::metrics;
use crate::portfolio::types::WalletRequest;

/// Look up every wallet concurrently.
///
/// Output index `i` always corresponds to `requests[i]`. Each resolved wallet
/// runs in its own task, so a slow or crashing lookup never holds back or
/// cancels its siblings; the call returns once the slowest one finishes.
pub async fn dispatch(registry: &ChainRegistry, requests: &[WalletRequest]) -> Vec<ChainLookupResult> {
    let mut slots: Vec<Option<ChainLookupResult>> = (0..requests.len()).map(|_| None).collect();
    let mut pending = Vec::new();

    for (index, request) in requests.iter().enumerate() {
        let resolved = if request.is_well_formed() {
            registry.resolve(&request.chain)
        } else {
            Err(LookupError::UnsupportedChain)
        };
        match resolved {
            Ok(strategy) => {
                let address = request.address.clone();
                let chain = strategy.chain();
                let handle = tokio::spawn(async move { strategy.lookup(&address).await });
                pending.push((index, chain, handle));
            }
            Err(e) => {
                metrics::record_wallet_lookup("unsupported", false);
                slots[index] = Some(ChainLookupResult::failed(
                    request.chain.clone(),
                    request.address.clone(),
                    &e,
                ));
            }
        }
    }

    let (positions, handles): (Vec<_>, Vec<_>) = pending
        .into_iter()
        .map(|(index, chain, handle)| ((index, chain), handle))
        .unzip();

    for ((index, chain), joined) in positions.into_iter().zip(join_all(handles).await) {
        let result = match joined {
            Ok(result) => result,
            Err(e) => {
                let request = &requests[index];
                ChainLookupResult::failed(
                    request.chain.clone(),
                    request.address.clone(),
                    &LookupError::Severe(e.to_string()),
                )
            }
        };
        metrics::record_wallet_lookup(chain.symbol(), result.is_found());
        slots[index] = Some(result);
    }

    // Every slot was filled by exactly one branch above.
    slots.into_iter().flatten().collect()
}
