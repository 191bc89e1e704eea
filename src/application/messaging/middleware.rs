//! Middleware system run in front of every turn

use std::sync::Arc;
use std::time::{Duration, Instant};
use std::collections::HashMap;
use crate::domain::entities::Activity;

/// Context passed through middleware chain
#[derive(Debug, Clone)]
pub struct TurnContext {
    pub activity: Activity,
    pub conversation_key: String,
    pub user_id: Option<String>,
}

impl TurnContext {
    pub fn new(activity: Activity) -> Self {
        let conversation_key = activity.conversation_key();
        let user_id = Some(activity.from.id.clone()).filter(|id| !id.is_empty());

        Self {
            activity,
            conversation_key,
            user_id,
        }
    }
}

/// Middleware trait - processors that can intercept a turn before it runs
pub trait Middleware: Send + Sync {
    /// Process a turn and optionally modify the context
    fn process(&self, ctx: TurnContext, next: Next) -> MiddlewareResult;
}

/// Result of middleware processing
pub type MiddlewareResult = Result<TurnContext, MiddlewareError>;

/// Middleware errors
#[derive(Debug, Clone)]
pub enum MiddlewareError {
    /// Rate limited
    RateLimited { retry_after: Duration },
    /// Internal error
    Internal(String),
}

impl std::fmt::Display for MiddlewareError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MiddlewareError::RateLimited { retry_after } => {
                write!(f, "Rate limited, retry after {:?}", retry_after)
            }
            MiddlewareError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for MiddlewareError {}

/// Next middleware in chain
#[derive(Clone)]
pub struct Next {
    remaining: Arc<Vec<Arc<dyn Middleware>>>,
}

impl Next {
    pub fn new(middlewares: Vec<Arc<dyn Middleware>>) -> Self {
        Self {
            remaining: Arc::new(middlewares),
        }
    }

    /// Process remaining middleware
    pub fn run(self, ctx: TurnContext) -> MiddlewareResult {
        if let Some(first) = self.remaining.first() {
            let remaining = self.remaining[1..].to_vec();
            let next = Next::new(remaining);
            first.process(ctx, next)
        } else {
            Ok(ctx)
        }
    }
}

/// Middleware chain builder
pub struct MiddlewareChain {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    pub fn add<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    pub fn build(self) -> Vec<Arc<dyn Middleware>> {
        self.middlewares
    }
}

impl Default for MiddlewareChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Senders tracked before expired windows are swept
const SWEEP_THRESHOLD: usize = 1024;

/// Rate limit middleware
pub struct RateLimitMiddleware {
    requests: std::sync::Mutex<HashMap<String, Vec<Instant>>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimitMiddleware {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            requests: std::sync::Mutex::new(HashMap::new()),
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    fn check_rate_limit(&self, key: &str) -> Result<(), MiddlewareError> {
        let mut requests = self.requests.lock()
            .map_err(|_| MiddlewareError::Internal("Lock poisoned".to_string()))?;

        let now = Instant::now();

        if requests.len() > SWEEP_THRESHOLD {
            requests.retain(|_, times| {
                times.last().is_some_and(|t| now.duration_since(*t) < self.window)
            });
        }

        let times = requests.entry(key.to_string()).or_insert_with(Vec::new);

        // Remove old requests outside the window
        times.retain(|&t| now.duration_since(t) < self.window);

        if times.len() >= self.max_requests as usize {
            let retry_after = times.first()
                .map(|t| self.window.saturating_sub(now.duration_since(*t)))
                .unwrap_or(self.window);

            return Err(MiddlewareError::RateLimited { retry_after });
        }

        times.push(now);
        Ok(())
    }
}

impl Middleware for RateLimitMiddleware {
    fn process(&self, ctx: TurnContext, next: Next) -> MiddlewareResult {
        // Rate limit by user or conversation
        let key = ctx.user_id.clone()
            .unwrap_or_else(|| ctx.conversation_key.clone());

        self.check_rate_limit(&key)?;

        next.run(ctx)
    }
}

/// Logging middleware for debugging
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn process(&self, ctx: TurnContext, next: Next) -> MiddlewareResult {
        let preview = ctx.activity.text.as_deref()
            .map(|s| s.chars().take(50).collect::<String>())
            .unwrap_or_else(|| format!("[{:?}]", ctx.activity.activity_type));

        tracing::debug!("[{}] {}", ctx.conversation_key, preview);

        let key = ctx.conversation_key.clone();
        let result = next.run(ctx);

        match &result {
            Ok(_) => {
                tracing::debug!("[{}] Admitted", key);
            }
            Err(e) => {
                tracing::warn!("[{}] Stopped: {}", key, e);
            }
        }

        result
    }
}
