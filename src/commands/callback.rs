//! Command callbacks
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.0.0: Explicit parameter metadata instead of signature introspection

use anyhow::Result;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

use super::arguments::Arguments;
use super::droplet::Droplet;

/// The function behind a slash command.
///
/// `parameters()` lists the callback's declared parameters in order,
/// starting with the implicit interaction context (the droplet). Every
/// name after it becomes one slash option.
///
/// # Example
///
/// ```ignore
/// struct Hello;
///
/// #[async_trait]
/// impl CommandCallback for Hello {
///     fn identifier(&self) -> &str {
///         "hello"
///     }
///
///     fn parameters(&self) -> Vec<String> {
///         vec!["droplet".into(), "name".into()]
///     }
///
///     async fn call(&self, droplet: Droplet, args: Arguments) -> Result<()> {
///         let name = args.get_str("name").unwrap_or("stranger");
///         droplet.respond(format!("Hello {name}!")).await?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait CommandCallback: Send + Sync {
    /// The callback's own name, used as the command name unless overridden
    fn identifier(&self) -> &str;

    /// Declared parameter names, interaction context first
    fn parameters(&self) -> Vec<String>;

    /// Run the command with the droplet and the name-keyed arguments
    async fn call(&self, droplet: Droplet, args: Arguments) -> Result<()>;
}

/// A [`CommandCallback`] made from a closure
pub struct FnCallback<F> {
    identifier: String,
    parameters: Vec<String>,
    func: F,
}

#[async_trait]
impl<F, Fut> CommandCallback for FnCallback<F>
where
    F: Fn(Droplet, Arguments) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn parameters(&self) -> Vec<String> {
        self.parameters.clone()
    }

    async fn call(&self, droplet: Droplet, args: Arguments) -> Result<()> {
        (self.func)(droplet, args).await
    }
}

/// Wrap a closure as a callback.
///
/// `parameters` is the full declared list, e.g. `&["droplet", "name"]`.
pub fn callback<F, Fut>(identifier: &str, parameters: &[&str], func: F) -> Arc<dyn CommandCallback>
where
    F: Fn(Droplet, Arguments) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(FnCallback {
        identifier: identifier.to_string(),
        parameters: parameters.iter().map(|p| p.to_string()).collect(),
        func,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_object_safe(_: &dyn CommandCallback) {}

    #[test]
    fn test_fn_callback_metadata() {
        let cb = callback("hello", &["droplet", "name", "age"], |_droplet, _args| async { Ok(()) });
        assert_eq!(cb.identifier(), "hello");
        assert_eq!(cb.parameters(), vec!["droplet", "name", "age"]);
    }
}
