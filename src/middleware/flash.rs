//! Installs the flash accessor on every request.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{Middleware, Next};
use crate::flash::FlashBinding;
use crate::handler::BoxFuture;
use crate::request::Request;

// ── FlashConfig ───────────────────────────────────────────────────────────────

/// Options for [`FlashLayer`].
///
/// Deserialises from `{"unsafe": <value>}`. Any value is accepted and read by
/// JavaScript truthiness, so `1`, `"yes"` and `[]` all mean `true` while `0`,
/// `""` and `null` mean `false`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashConfig {
    /// Rebind the accessor even when an earlier layer already bound one.
    #[serde(rename = "unsafe", default, deserialize_with = "truthy")]
    pub unsafe_reinstall: bool,
}

impl FlashConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unsafe_reinstall(mut self, enabled: bool) -> Self {
        self.unsafe_reinstall = enabled;
        self
    }
}

fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

// ── FlashLayer ────────────────────────────────────────────────────────────────

/// Installs the [`Flash`] accessor on the request, then forwards.
///
/// In the default safe mode a request that already carries an accessor is
/// forwarded untouched, so mounting the layer twice is harmless. With
/// [`FlashConfig::unsafe_reinstall`] every pass rebinds.
///
/// The session is looked up each time a handler calls
/// [`Request::flash`](crate::Request::flash), so this layer may sit before or
/// after the layer that attaches the [`Session`].
///
/// [`Flash`]: crate::Flash
/// [`Session`]: crate::Session
#[derive(Clone, Debug, Default)]
pub struct FlashLayer {
    config: FlashConfig,
}

impl FlashLayer {
    pub fn new(config: FlashConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> FlashConfig {
        self.config
    }
}

impl Middleware for FlashLayer {
    fn call(&self, mut req: Request, next: Next) -> BoxFuture {
        if let Some(bound) = req.extensions().get::<FlashBinding>()
            && !self.config.unsafe_reinstall
        {
            debug!(binding = ?bound, "flash accessor already bound");
            return next.run(req);
        }

        let binding = FlashBinding::next();
        debug!(?binding, has_session = req.session().is_some(), "flash accessor bound");
        req.extensions_mut().insert(binding);
        next.run(req)
    }
}
