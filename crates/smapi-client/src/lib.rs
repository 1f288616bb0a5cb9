//! Skill Management API client core
//!
//! Every API operation is a route description plus a static response table,
//! handed to `ServiceInvoker::invoke`. The invoker validates and builds the
//! request, attaches a bearer token from the shared `TokenProvider`, executes
//! it over the injected `Transport`, and resolves the response against the
//! table: the first entry whose status matches decides whether the body is
//! decoded and whether the call succeeds.
//!
//! Request lifecycle:
//! 1. Operation builds a `RouteDescriptor` (path/query/header params, body)
//! 2. `RequestBuilder::prepare` resolves the path and encodes the body (no I/O)
//! 3. `TokenProvider::access_token` supplies the bearer token
//! 4. `Transport::execute` performs the single HTTP attempt
//! 5. `response::resolve` maps status to a typed payload or a `ServiceError`

pub mod error;
pub mod invoker;
pub mod metrics;
pub mod models;
pub mod pagination;
pub mod request;
pub mod response;
pub mod route;
pub mod skills;

pub use error::{Error, RequestError, Result, ServiceError, ServiceErrorKind};
pub use invoker::ServiceInvoker;
pub use models::ErrorBody;
pub use pagination::{PageRequest, Paginated};
pub use request::{PreparedRequest, RequestBuilder};
pub use response::{InvocationResult, ResponseEntry, ResponseTable};
pub use route::RouteDescriptor;
pub use skills::SkillManagementClient;
