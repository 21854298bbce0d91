use crate::core::BrowserTrait;
use crate::errors::{RecorderError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Script execution helpers layered over [`BrowserTrait::execute_script`].
pub struct JavaScriptRunner;

impl JavaScriptRunner {
    pub async fn execute_with_timeout<B: BrowserTrait>(
        browser: &B,
        tab: &B::TabHandle,
        script: &str,
        timeout_ms: u64,
    ) -> Result<Value> {
        let execution = browser.execute_script(tab, script);

        tokio::time::timeout(Duration::from_millis(timeout_ms), execution)
            .await
            .map_err(|_| RecorderError::JavaScriptTimeout)?
    }

    /// Runs `script` and decodes its JSON result. `null` decodes as the type's default.
    pub async fn fetch_json<B, T>(
        browser: &B,
        tab: &B::TabHandle,
        script: &str,
        timeout_ms: u64,
    ) -> Result<T>
    where
        B: BrowserTrait,
        T: DeserializeOwned + Default,
    {
        let value = Self::execute_with_timeout(browser, tab, script, timeout_ms).await?;
        if value.is_null() {
            return Ok(T::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Quotes `text` as a JavaScript string literal.
    pub fn string_literal(text: &str) -> String {
        // JSON string syntax is valid JavaScript.
        Value::String(text.to_string()).to_string()
    }
}
