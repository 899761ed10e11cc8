use super::form::{ElementPresence, EnrolmentForm, FormElement, FormError};
use crate::config::BrowserConfig;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// The operator may sit on a CAPTCHA for a while; keep the DevTools link open meanwhile.
const BROWSER_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// [`EnrolmentForm`] backed by a Chrome tab sitting on the lookup page.
pub struct ChromeForm {
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeForm {
    pub fn launch(config: &BrowserConfig) -> Result<Self, FormError> {
        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .idle_browser_timeout(BROWSER_IDLE_TIMEOUT)
            .build()
            .map_err(|err| FormError::Launch(err.to_string()))?;
        let browser = Browser::new(options).map_err(|err| FormError::Launch(err.to_string()))?;
        let tab = browser
            .new_tab()
            .map_err(|err| FormError::Launch(err.to_string()))?;

        tab.navigate_to(&config.form_url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|err| FormError::Navigation {
                url: config.form_url.clone(),
                reason: err.to_string(),
            })?;

        info!(url = %config.form_url, headless = config.headless, "lookup form opened");
        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    fn evaluate(&self, element: FormElement, body: &str) -> Result<Value, FormError> {
        let script = format!(
            "(() => {{ const el = document.getElementById({id}); if (el === null) {{ return null; }} {body} }})()",
            id = js_string(element.dom_id()),
        );

        self.tab
            .evaluate(&script, false)
            .map(|object| object.value.unwrap_or(Value::Null))
            .map_err(|err| FormError::Driver {
                element,
                reason: err.to_string(),
            })
    }

    /// Runs `body` against the element and fails if the element is not on the page.
    fn evaluate_present(&self, element: FormElement, body: &str) -> Result<Value, FormError> {
        match self.evaluate(element, body)? {
            Value::Null => Err(FormError::MissingElement { element }),
            value => Ok(value),
        }
    }
}

impl EnrolmentForm for ChromeForm {
    fn set_field(&mut self, element: FormElement, value: &str) -> Result<(), FormError> {
        self.evaluate_present(element, "el.value = \"\"; return true;")?;
        if value.is_empty() {
            return Ok(());
        }

        // Typed key by key so the page's own input handlers see the change.
        self.tab
            .find_element(&selector(element))
            .and_then(|field| {
                field.type_into(value)?;
                Ok(())
            })
            .map_err(|err| FormError::Driver {
                element,
                reason: err.to_string(),
            })
    }

    fn select_option(&mut self, element: FormElement, value: &str) -> Result<bool, FormError> {
        let body = format!(
            "const key = {key}; \
             const found = Array.from(el.options).some((option) => option.value === key); \
             if (found) {{ el.value = key; el.dispatchEvent(new Event(\"change\", {{ bubbles: true }})); }} \
             return found;",
            key = js_string(value),
        );

        match self.evaluate_present(element, &body)? {
            Value::Bool(found) => Ok(found),
            other => Err(FormError::Driver {
                element,
                reason: format!("unexpected dropdown reply {other}"),
            }),
        }
    }

    fn focus(&mut self, element: FormElement) -> Result<(), FormError> {
        self.evaluate_present(element, "el.focus(); return true;")?;
        Ok(())
    }

    fn click(&mut self, element: FormElement) -> Result<(), FormError> {
        self.tab
            .find_element(&selector(element))
            .and_then(|button| {
                button.click()?;
                Ok(())
            })
            .map_err(|err| FormError::Driver {
                element,
                reason: err.to_string(),
            })
    }

    fn query(&mut self, element: FormElement) -> ElementPresence<String> {
        let body = if element.reads_value() {
            "return String(el.value ?? \"\");"
        } else {
            "return el.innerText;"
        };

        match self.evaluate(element, body) {
            Ok(Value::Null) => ElementPresence::Absent,
            Ok(Value::String(text)) => ElementPresence::Present(text),
            Ok(other) => ElementPresence::Present(other.to_string()),
            Err(err) => ElementPresence::CapabilityError(err),
        }
    }
}

fn selector(element: FormElement) -> String {
    format!("#{}", element.dom_id())
}

fn js_string(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}
