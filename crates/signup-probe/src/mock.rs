//! In-memory page driver modelling the remote signup form.
//!
//! `MockDriver` keeps a flat list of elements in document order and answers
//! selectors with a small CSS subset (tag, `.class`, `[attr]`, `[attr="v"]`,
//! `+` / `~` sibling combinators and comma groups) plus the `text=` engine.
//!
//! [`MockDriver::signup_form`] builds a stand-in for the registration page
//! whose submit button reproduces the remote application's observable
//! behaviour: empty or malformed fields surface `role="alert"` regions, a
//! clean submission leaves the form for a confirmation screen. It is a test
//! double, not a statement of the real validation rules.

use crate::driver::{ElementSnapshot, PageDriver, PageFactory};
use crate::locator::Selector;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::LoadState;
use async_trait::async_trait;
use chrono::{Datelike, Local, NaiveDate};
use std::collections::BTreeMap;
use std::time::Duration;

/// Title reported by the mock signup page
pub const MOCK_SIGNUP_TITLE: &str = "Sign up for Facebook | Facebook";

/// Minimum age accepted by the mock registration
pub const MOCK_MINIMUM_AGE: i32 = 13;

/// One element of the mock DOM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    /// Lowercase tag name
    pub tag: String,
    /// Attributes
    pub attributes: BTreeMap<String, String>,
    /// Text content
    pub text: String,
    /// Current value for form controls
    pub value: Option<String>,
    /// Rendered with a box
    pub visible: bool,
    /// Checked state for radios
    pub checked: bool,
    /// `(value, label)` pairs for `<select>`
    pub options: Vec<(String, String)>,
}

impl MockElement {
    /// Create an element with a tag
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_lowercase(),
            attributes: BTreeMap::new(),
            text: String::new(),
            value: None,
            visible: true,
            checked: false,
            options: Vec::new(),
        }
    }

    /// Text input with a `name`
    #[must_use]
    pub fn input(name: &str) -> Self {
        Self::new("input")
            .attr("type", "text")
            .attr("name", name)
            .with_value("")
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        let _ = self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    /// Set text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the control value
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set `<select>` options
    #[must_use]
    pub fn with_options(mut self, options: Vec<(String, String)>) -> Self {
        self.options = options;
        self
    }

    /// Mark hidden
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    fn is_enabled(&self) -> bool {
        !self.attributes.contains_key("disabled")
    }

    fn has_class(&self, class: &str) -> bool {
        self.attributes
            .get("class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }
}

/// Mock driver for unit testing and dry runs
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    url: String,
    title: String,
    elements: Vec<MockElement>,
    loaded: bool,
    closed: bool,
    unreachable: bool,
    focused: Option<usize>,
    validates_signup: bool,
    call_history: Vec<String>,
}

impl MockDriver {
    /// Create a driver with an empty page
    #[must_use]
    pub fn new() -> Self {
        Self {
            url: "about:blank".to_string(),
            ..Self::default()
        }
    }

    /// Create a driver serving the signup form
    #[must_use]
    pub fn signup_form() -> Self {
        let today = Local::now().date_naive();
        let days = (1..=31).map(|d| (d.to_string(), d.to_string())).collect();
        let months = ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"]
            .iter()
            .enumerate()
            .map(|(i, label)| ((i + 1).to_string(), (*label).to_string()))
            .collect();
        let years = (1905..=today.year())
            .rev()
            .map(|y| (y.to_string(), y.to_string()))
            .collect();

        let elements = vec![
            MockElement::new("div").with_text("Create a new account"),
            MockElement::new("div").with_text("It's quick and easy."),
            MockElement::input("firstname")
                .attr("aria-label", "First name")
                .attr("placeholder", "First name")
                .attr("aria-required", "true"),
            MockElement::input("lastname")
                .attr("aria-label", "Surname")
                .attr("placeholder", "Surname")
                .attr("aria-required", "true"),
            MockElement::new("select")
                .attr("name", "birthday_day")
                .attr("aria-label", "Day")
                .with_options(days)
                .with_value(today.day().to_string()),
            MockElement::new("select")
                .attr("name", "birthday_month")
                .attr("aria-label", "Month")
                .with_options(months)
                .with_value(today.month().to_string()),
            MockElement::new("select")
                .attr("name", "birthday_year")
                .attr("aria-label", "Year")
                .with_options(years)
                .with_value(today.year().to_string()),
            MockElement::new("input")
                .attr("type", "radio")
                .attr("name", "sex")
                .attr("value", "1")
                .with_value("1"),
            MockElement::new("input")
                .attr("type", "radio")
                .attr("name", "sex")
                .attr("value", "2")
                .with_value("2"),
            MockElement::new("input")
                .attr("type", "radio")
                .attr("name", "sex")
                .attr("value", "-1")
                .with_value("-1"),
            MockElement::input("reg_email__")
                .attr("aria-label", "Mobile number or email address")
                .attr("aria-required", "true"),
            MockElement::input("reg_passwd__")
                .attr("type", "password")
                .attr("aria-label", "New password")
                .attr("aria-required", "true")
                .attr("autocomplete", "new-password"),
            MockElement::new("button")
                .attr("type", "submit")
                .attr("name", "websubmit")
                .with_text("Sign Up"),
        ];

        Self {
            url: "about:blank".to_string(),
            title: MOCK_SIGNUP_TITLE.to_string(),
            elements,
            validates_signup: true,
            ..Self::default()
        }
    }

    /// Make every navigation fail with a transport error
    #[must_use]
    pub const fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// Drop elements whose text contains `text` (e.g. the page heading)
    #[must_use]
    pub fn without_text(mut self, text: &str) -> Self {
        self.elements.retain(|e| !e.text.contains(text));
        self
    }

    /// Append an element
    #[must_use]
    pub fn with_element(mut self, element: MockElement) -> Self {
        self.elements.push(element);
        self
    }

    /// Set the `disabled` attribute on every match
    pub fn set_disabled(&mut self, selector: &Selector, disabled: bool) {
        for index in self.resolve(selector) {
            let attributes = &mut self.elements[index].attributes;
            if disabled {
                let _ = attributes.insert("disabled".to_string(), String::new());
            } else {
                let _ = attributes.remove("disabled");
            }
        }
    }

    /// Show or hide every match
    pub fn set_visible(&mut self, selector: &Selector, visible: bool) {
        for index in self.resolve(selector) {
            self.elements[index].visible = visible;
        }
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.call_history
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.call_history.iter().any(|c| c.starts_with(method))
    }

    /// Whether the page has been closed
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    fn resolve(&self, selector: &Selector) -> Vec<usize> {
        if !self.loaded {
            return Vec::new();
        }
        match selector {
            Selector::Css(css) => {
                let groups = parse_css(css);
                (0..self.elements.len())
                    .filter(|&i| groups.iter().any(|g| self.matches_complex(g, i)))
                    .collect()
            }
            Selector::Text(text) => {
                let needle = Selector::normalized_text(text);
                self.elements
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| Selector::normalized_text(&e.text).contains(&needle))
                    .map(|(i, _)| i)
                    .collect()
            }
        }
    }

    fn resolve_one(&self, selector: &Selector) -> ProbeResult<usize> {
        let matches = self.resolve(selector);
        match matches.as_slice() {
            [index] => Ok(*index),
            [] => Err(ProbeError::element(selector, "no element matches")),
            many => Err(ProbeError::element(
                selector,
                format!("strict mode violation: {} elements match", many.len()),
            )),
        }
    }

    fn actionable(&self, selector: &Selector) -> ProbeResult<usize> {
        let index = self.resolve_one(selector)?;
        let element = &self.elements[index];
        if !element.visible {
            return Err(ProbeError::element(selector, "element is not visible"));
        }
        if !element.is_enabled() {
            return Err(ProbeError::element(selector, "element is disabled"));
        }
        Ok(index)
    }

    fn matches_complex(&self, complex: &[(Combinator, Compound)], index: usize) -> bool {
        let Some(((combinator, last), rest)) = complex.split_last() else {
            return false;
        };
        if !last.matches(&self.elements[index]) {
            return false;
        }
        if rest.is_empty() {
            return true;
        }
        match combinator {
            Combinator::Adjacent => index > 0 && self.matches_complex(rest, index - 1),
            Combinator::Sibling => (0..index).any(|i| self.matches_complex(rest, i)),
            Combinator::None => false,
        }
    }

    fn snapshot(&self, index: usize) -> ElementSnapshot {
        let element = &self.elements[index];
        ElementSnapshot {
            tag: element.tag.clone(),
            text: element.text.clone(),
            value: element.value.clone(),
            visible: element.visible,
            enabled: element.is_enabled(),
            checked: element.checked,
            attributes: element.attributes.clone(),
        }
    }

    fn field_value(&self, name: &str) -> String {
        self.elements
            .iter()
            .find(|e| e.attributes.get("name").map(String::as_str) == Some(name))
            .and_then(|e| e.value.clone())
            .unwrap_or_default()
    }

    fn submit_signup(&mut self) {
        self.elements
            .retain(|e| e.attributes.get("role").map(String::as_str) != Some("alert"));

        let errors = self.signup_errors();
        if errors.is_empty() {
            for element in &mut self.elements {
                element.visible = false;
            }
            self.elements
                .push(MockElement::new("h2").with_text("Enter the code from your email"));
            self.url = "https://www.facebook.com/confirmemail.php".to_string();
            return;
        }

        let submit = self
            .elements
            .iter()
            .position(|e| e.attributes.get("name").map(String::as_str) == Some("websubmit"))
            .unwrap_or(self.elements.len());
        for (offset, message) in errors.into_iter().enumerate() {
            self.elements.insert(
                submit + offset,
                MockElement::new("div")
                    .attr("role", "alert")
                    .with_text(format!("\n  {message}  ")),
            );
        }
    }

    fn signup_errors(&self) -> Vec<&'static str> {
        let mut errors = Vec::new();
        for name in ["firstname", "lastname"] {
            let value = self.field_value(name);
            if value.trim().is_empty() {
                errors.push("What's your name?");
            } else if !value
                .chars()
                .all(|c| c.is_alphabetic() || matches!(c, ' ' | '-' | '\'' | '.'))
            {
                errors.push("This name has certain characters that aren't allowed.");
            }
        }

        if !self.birthday_is_plausible() {
            errors.push("It looks like you entered the wrong info. Please be sure to use your real birthday.");
        }

        if !self
            .elements
            .iter()
            .any(|e| e.checked && e.attributes.get("name").map(String::as_str) == Some("sex"))
        {
            errors.push("Please choose a gender. You can change who can see this later.");
        }

        let contact = self.field_value("reg_email__");
        if contact.is_empty() {
            errors.push("You'll use this when you log in and if you ever need to reset your password.");
        } else if !looks_like_contact(&contact) {
            errors.push("Please enter a valid mobile number or email address.");
        }

        if self.field_value("reg_passwd__").chars().count() < 6 {
            errors.push("Enter a combination of at least six numbers, letters and punctuation marks (such as ! and &).");
        }
        errors
    }

    fn birthday_is_plausible(&self) -> bool {
        let parse = |name: &str| self.field_value(name).parse::<u32>().ok();
        let (Some(day), Some(month), Some(year)) = (
            parse("birthday_day"),
            parse("birthday_month"),
            parse("birthday_year"),
        ) else {
            return false;
        };
        let Some(birthday) = i32::try_from(year)
            .ok()
            .and_then(|y| NaiveDate::from_ymd_opt(y, month, day))
        else {
            return false;
        };
        let today = Local::now().date_naive();
        birthday
            .checked_add_months(chrono::Months::new(12 * MOCK_MINIMUM_AGE as u32))
            .is_some_and(|adult| adult <= today)
    }
}

fn looks_like_contact(value: &str) -> bool {
    if value.chars().all(|c| c.is_ascii_digit() || c == '+') {
        return value.len() >= 7;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !value.contains(char::is_whitespace)
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn goto(
        &mut self,
        url: &str,
        wait_until: LoadState,
        _timeout: Duration,
    ) -> ProbeResult<()> {
        self.call_history.push(format!("goto:{url}:{wait_until}"));
        if self.unreachable {
            return Err(ProbeError::NavigationError {
                url: url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            });
        }
        self.url = url.to_string();
        self.loaded = true;
        Ok(())
    }

    async fn reload(&mut self, _timeout: Duration) -> ProbeResult<()> {
        self.call_history.push("reload".to_string());
        if self.unreachable {
            return Err(ProbeError::NavigationError {
                url: self.url.clone(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            });
        }
        Ok(())
    }

    async fn current_url(&self) -> ProbeResult<String> {
        Ok(self.url.clone())
    }

    async fn title(&self) -> ProbeResult<String> {
        Ok(if self.loaded {
            self.title.clone()
        } else {
            String::new()
        })
    }

    async fn query_all(&self, selector: &Selector) -> ProbeResult<Vec<ElementSnapshot>> {
        Ok(self
            .resolve(selector)
            .into_iter()
            .map(|i| self.snapshot(i))
            .collect())
    }

    async fn fill(&mut self, selector: &Selector, value: &str) -> ProbeResult<()> {
        self.call_history.push(format!("fill:{selector}"));
        let index = self.actionable(selector)?;
        let element = &mut self.elements[index];
        if element.tag != "input" && element.tag != "textarea" {
            return Err(ProbeError::element(selector, "element is not an input"));
        }
        element.value = Some(value.to_string());
        self.focused = Some(index);
        Ok(())
    }

    async fn type_text(&mut self, selector: &Selector, text: &str) -> ProbeResult<()> {
        self.call_history.push(format!("type:{selector}"));
        let index = self.actionable(selector)?;
        let element = &mut self.elements[index];
        element.value.get_or_insert_with(String::new).push_str(text);
        self.focused = Some(index);
        Ok(())
    }

    async fn select_option(&mut self, selector: &Selector, value: &str) -> ProbeResult<()> {
        self.call_history.push(format!("select:{selector}:{value}"));
        let index = self.actionable(selector)?;
        let element = &mut self.elements[index];
        if element.tag != "select" {
            return Err(ProbeError::element(selector, "element is not a <select>"));
        }
        let chosen = element
            .options
            .iter()
            .find(|(v, label)| v == value || label == value)
            .map(|(v, _)| v.clone())
            .ok_or_else(|| ProbeError::element(selector, format!("no option {value:?}")))?;
        element.value = Some(chosen);
        Ok(())
    }

    async fn click(&mut self, selector: &Selector) -> ProbeResult<()> {
        self.call_history.push(format!("click:{selector}"));
        let index = self.actionable(selector)?;
        self.focused = Some(index);

        let element = &self.elements[index];
        let is_radio = element.attributes.get("type").map(String::as_str) == Some("radio");
        let is_submit = element.attributes.get("name").map(String::as_str) == Some("websubmit");

        if is_radio {
            let group = element.attributes.get("name").cloned();
            for (i, other) in self.elements.iter_mut().enumerate() {
                if other.attributes.get("name") == group.as_ref() {
                    other.checked = i == index;
                }
            }
        } else if is_submit && self.validates_signup {
            self.submit_signup();
        }
        Ok(())
    }

    async fn focus(&mut self, selector: &Selector) -> ProbeResult<()> {
        self.call_history.push(format!("focus:{selector}"));
        let index = self.resolve_one(selector)?;
        self.focused = Some(index);
        Ok(())
    }

    async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        if self.closed {
            return Err(ProbeError::ScreenshotError {
                message: "page is closed".to_string(),
            });
        }
        Ok(vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])
    }

    async fn close(&mut self) -> ProbeResult<()> {
        self.call_history.push("close".to_string());
        self.closed = true;
        Ok(())
    }
}

/// Page factory handing out fresh copies of a template driver
#[derive(Debug, Clone)]
pub struct MockPageFactory {
    template: MockDriver,
}

impl MockPageFactory {
    /// Factory for the signup form
    #[must_use]
    pub fn signup_form() -> Self {
        Self::new(MockDriver::signup_form())
    }

    /// Factory cloning `template` for every page
    #[must_use]
    pub const fn new(template: MockDriver) -> Self {
        Self { template }
    }
}

#[async_trait]
impl PageFactory for MockPageFactory {
    async fn new_page(&self) -> ProbeResult<Box<dyn PageDriver>> {
        Ok(Box::new(self.template.clone()))
    }
}

// ============================================================================
// CSS subset
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    None,
    Adjacent,
    Sibling,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
}

impl Compound {
    fn matches(&self, element: &MockElement) -> bool {
        if let Some(tag) = &self.tag {
            if tag != "*" && *tag != element.tag {
                return false;
            }
        }
        if !self.classes.iter().all(|c| element.has_class(c)) {
            return false;
        }
        self.attributes.iter().all(|(name, expected)| {
            match (element.attributes.get(name), expected) {
                (Some(actual), Some(expected)) => actual == expected,
                (Some(_), None) => true,
                (None, _) => false,
            }
        })
    }
}

fn parse_css(css: &str) -> Vec<Vec<(Combinator, Compound)>> {
    css.split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(parse_complex)
        .collect()
}

fn parse_complex(group: &str) -> Vec<(Combinator, Compound)> {
    let mut parts = Vec::new();
    let mut combinator = Combinator::None;
    for token in group.split_whitespace() {
        match token {
            "+" => combinator = Combinator::Adjacent,
            "~" => combinator = Combinator::Sibling,
            _ => {
                parts.push((combinator, parse_compound(token)));
                combinator = Combinator::None;
            }
        }
    }
    parts
}

fn parse_compound(token: &str) -> Compound {
    let mut compound = Compound::default();
    let mut rest = token;

    let tag_end = rest.find(['.', '[']).unwrap_or(rest.len());
    if tag_end > 0 {
        compound.tag = Some(rest[..tag_end].to_lowercase());
    }
    rest = &rest[tag_end..];

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('.') {
            let end = after.find(['.', '[']).unwrap_or(after.len());
            compound.classes.push(after[..end].to_string());
            rest = &after[end..];
        } else if let Some(after) = rest.strip_prefix('[') {
            let end = after.find(']').unwrap_or(after.len());
            let body = &after[..end];
            let attribute = match body.split_once('=') {
                Some((name, value)) => (
                    name.trim().to_string(),
                    Some(value.trim().trim_matches(['"', '\'']).to_string()),
                ),
                None => (body.trim().to_string(), None),
            };
            compound.attributes.push(attribute);
            rest = after.get(end + 1..).unwrap_or("");
        } else {
            break;
        }
    }
    compound
}
