//! The repository seam.
//!
//! A proxy can wrap anything implementing [`Repository`]: a named-operation
//! surface with a runtime existence check. Arguments and results travel as
//! [`serde_json::Value`], which is also what the key generator flattens.
//!
//! Hand-written implementations match on the method name. For the common
//! case, [`MethodTable`] maps names to registered callables over shared state:
//!
//! ```rust
//! use std::sync::Mutex;
//! use repocache::repository::{arg, MethodTable};
//! use serde_json::json;
//!
//! let numbers = MethodTable::new(Mutex::new(vec![1, 2, 3]))
//!     .method("all", |state, _args| Ok(json!(*state.lock().unwrap())))
//!     .method("find", |state, args| {
//!         let i: usize = arg("find", args, 0)?;
//!         Ok(json!(state.lock().unwrap().get(i)))
//!     });
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{CacheError, Result};

/// A data-access component with named, callable operations.
///
/// Implementations return [`CacheError::MethodNotFound`] from [`call`](Self::call)
/// for names they do not expose; the proxy checks [`has_method`](Self::has_method)
/// first so a missing method never touches the cache.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Whether an operation with this name exists.
    fn has_method(&self, method: &str) -> bool;

    /// Invoke `method` with positional `args`.
    async fn call(&self, method: &str, args: &[Value]) -> Result<Value>;
}

#[async_trait]
impl<R: Repository + ?Sized> Repository for Arc<R> {
    fn has_method(&self, method: &str) -> bool {
        (**self).has_method(method)
    }

    async fn call(&self, method: &str, args: &[Value]) -> Result<Value> {
        (**self).call(method, args).await
    }
}

#[async_trait]
impl<R: Repository + ?Sized> Repository for Box<R> {
    fn has_method(&self, method: &str) -> bool {
        (**self).has_method(method)
    }

    async fn call(&self, method: &str, args: &[Value]) -> Result<Value> {
        (**self).call(method, args).await
    }
}

type SyncHandler<S> = Box<dyn Fn(&S, &[Value]) -> Result<Value> + Send + Sync>;
type AsyncHandler<S> =
    Box<dyn Fn(Arc<S>, Vec<Value>) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

enum Handler<S> {
    Sync(SyncHandler<S>),
    Async(AsyncHandler<S>),
}

/// A [`Repository`] assembled from named callables over shared state `S`.
///
/// Registering a name twice replaces the earlier callable.
pub struct MethodTable<S> {
    state: Arc<S>,
    methods: HashMap<String, Handler<S>>,
}

impl<S: Send + Sync + 'static> MethodTable<S> {
    pub fn new(state: S) -> Self {
        Self::from_shared(Arc::new(state))
    }

    /// Build over state that is already shared elsewhere.
    pub fn from_shared(state: Arc<S>) -> Self {
        Self {
            state,
            methods: HashMap::new(),
        }
    }

    /// Register a synchronous operation.
    pub fn method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&S, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Handler::Sync(Box::new(f)));
        self
    }

    /// Register an asynchronous operation.
    pub fn async_method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Arc<S>, Vec<Value>) -> BoxFuture<'static, Result<Value>> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Handler::Async(Box::new(f)));
        self
    }

    /// Shared state the operations run against.
    pub fn state(&self) -> &Arc<S> {
        &self.state
    }

    /// Registered operation names, sorted.
    pub fn methods(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[async_trait]
impl<S: Send + Sync + 'static> Repository for MethodTable<S> {
    fn has_method(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }

    async fn call(&self, method: &str, args: &[Value]) -> Result<Value> {
        match self.methods.get(method) {
            Some(Handler::Sync(f)) => f(&self.state, args),
            Some(Handler::Async(f)) => f(Arc::clone(&self.state), args.to_vec()).await,
            None => Err(CacheError::MethodNotFound(method.to_string())),
        }
    }
}

/// Decode the positional argument at `index`.
///
/// A missing argument or a value of the wrong shape is an
/// [`CacheError::InvalidArgument`].
pub fn arg<T: DeserializeOwned>(method: &str, args: &[Value], index: usize) -> Result<T> {
    let value = args.get(index).ok_or_else(|| CacheError::InvalidArgument {
        method: method.to_string(),
        index,
        reason: "missing".to_string(),
    })?;
    decode(method, index, value)
}

/// Decode the positional argument at `index`, using `T::default()` when it is
/// absent or null.
pub fn arg_or_default<T: DeserializeOwned + Default>(
    method: &str,
    args: &[Value],
    index: usize,
) -> Result<T> {
    match args.get(index) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => decode(method, index, value),
    }
}

fn decode<T: DeserializeOwned>(method: &str, index: usize, value: &Value) -> Result<T> {
    T::deserialize(value).map_err(|e| CacheError::InvalidArgument {
        method: method.to_string(),
        index,
        reason: e.to_string(),
    })
}
