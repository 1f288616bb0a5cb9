//! Single entry point every API operation goes through
//!
//! `invoke` runs: table check, request preparation, token fetch, one
//! transport attempt, response resolution. The first two stages do no I/O, so
//! a malformed route fails without touching the token endpoint or the API.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde::de::DeserializeOwned;
use smapi_auth::TokenProvider;
use tracing::{debug, instrument, warn};
use transport::Transport;

use crate::error::{Result, ServiceError};
use crate::metrics;
use crate::request::RequestBuilder;
use crate::response::{self, InvocationResult, ResponseTable};
use crate::route::RouteDescriptor;

#[derive(Clone)]
pub struct ServiceInvoker {
    builder: RequestBuilder,
    tokens: Arc<TokenProvider>,
    transport: Arc<dyn Transport>,
}

impl ServiceInvoker {
    /// `tokens` may be shared between invokers; it holds the only cache.
    pub fn new(
        builder: RequestBuilder,
        tokens: Arc<TokenProvider>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            builder,
            tokens,
            transport,
        }
    }

    pub fn builder(&self) -> &RequestBuilder {
        &self.builder
    }

    pub fn tokens(&self) -> &Arc<TokenProvider> {
        &self.tokens
    }

    /// Execute one API operation.
    ///
    /// `T` is the payload type of the table's typed 2xx entries, `E` the
    /// payload type of its typed error entries. No retries: every failure is
    /// returned as-is in `Error<E>`.
    #[instrument(skip_all, fields(method = %route.method(), template = %route.template()))]
    pub async fn invoke<B, T, E>(
        &self,
        route: RouteDescriptor<B>,
        table: &ResponseTable,
    ) -> Result<InvocationResult<T>, E>
    where
        B: Serialize,
        T: DeserializeOwned,
        E: DeserializeOwned,
    {
        response::check_table(table)?;
        let method = route.method().to_string();
        let prepared = self.builder.prepare(route)?;

        let token = self.tokens.access_token().await?;
        let request = prepared.authorize(&token)?;

        let started = Instant::now();
        let outcome = self.transport.execute(request).await;
        let elapsed = started.elapsed().as_secs_f64();

        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                metrics::record_invocation(&method, None, elapsed);
                warn!(error = %e, "no response from service");
                return Err(ServiceError::transport(e).into());
            }
        };

        metrics::record_invocation(&method, Some(response.status), elapsed);
        debug!(status = response.status, elapsed_secs = elapsed, "service responded");

        response::resolve(response, table)
    }
}
