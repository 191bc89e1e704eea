//! Activity handling - parsing, middleware, dispatching

pub mod dispatcher;
pub mod middleware;
pub mod parser;

pub use dispatcher::TurnDispatcher;
pub use middleware::{LoggingMiddleware, Middleware, MiddlewareChain, RateLimitMiddleware};
pub use parser::{ActivityParser, ConsoleInput};
