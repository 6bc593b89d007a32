//! Validation of the editor's HTML form submissions.
//!
//! Bodies arrive as `application/x-www-form-urlencoded`, with multi-select fields
//! sent as repeated keys. Each form cleans a [FormData] into the plain values the
//! core crates work with, or reports [FormErrors] per field.

use crate::errors::{http::HTTPError, reason::ReasonCode};
use actix_web::{http::header::CONTENT_LENGTH, FromRequest};
use bdr_api::ObjectInfo;
use futures::{future::LocalBoxFuture, StreamExt};
use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};
use rights::{Identity, RightsInputs};
use serde::Serialize;
use std::{collections::BTreeMap, fmt};

const MAX_FORM_SIZE: usize = 2 * 1024 * 1024;

const REQUIRED: &str = "This field is required.";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormData(Vec<(String, String)>);

impl FormData {
    pub fn parse(body: &[u8]) -> Self {
        Self(url::form_urlencoded::parse(body).into_owned().collect())
    }

    /// First value submitted for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key).next()
    }

    /// Every value submitted for `key`, in submission order
    pub fn get_all<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a str> + 'a {
        let key = key.to_string();
        self.0
            .iter()
            .filter(move |(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl FromRequest for FormData {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let length = req
            .headers()
            .get(&CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());

        let mut payload = payload.take();
        Box::pin(async move {
            if length.map_or(false, |l| l > MAX_FORM_SIZE) {
                return Err(HTTPError::new(ReasonCode::FormPayloadTooLarge, None).into());
            }

            let mut body = Vec::with_capacity(length.unwrap_or(0));
            while let Some(chunk) = payload.next().await {
                body.extend_from_slice(&chunk?);
                if body.len() > MAX_FORM_SIZE {
                    return Err(HTTPError::new(ReasonCode::FormPayloadTooLarge, None).into());
                }
            }

            Ok(Self::parse(&body))
        })
    }
}

/// Validation messages keyed by form field.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    fn finish<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid form: ")?;
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for FormErrors {}

/// Splits every submitted value on commas, trimming and dropping blank entries.
fn split_tokens<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn invalid_choice(token: &str) -> String {
    format!("Select a valid choice. {token} is not one of the available choices.")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandingForm {
    pub pid: String,
}

impl LandingForm {
    pub fn clean(data: &FormData) -> Result<Self, FormErrors> {
        match data.get("pid").map(str::trim).filter(|pid| !pid.is_empty()) {
            Some(pid) => Ok(Self {
                pid: pid.to_string(),
            }),
            None => Err(FormErrors::single("pid", "Please enter a pid")),
        }
    }
}

pub struct RightsForm;

impl RightsForm {
    pub const DISCOVER_AND_READ: &'static str = "discover_and_read";
    pub const DISCOVER_ONLY: &'static str = "discover_only";
    pub const READ_ONLY: &'static str = "read_only";
    pub const EDIT_RIGHTS: &'static str = "edit_rights";
    pub const OWNERS: &'static str = "owners";

    /// Cleans the five rights fields against the configured identity choices.
    ///
    /// The form requires at least one owner; nothing is filled in on the caller's
    /// behalf.
    pub fn clean(data: &FormData, choices: &[String]) -> Result<RightsInputs, FormErrors> {
        let mut errors = FormErrors::default();
        let mut field = |name: &str| -> Vec<Identity> {
            let tokens = split_tokens(data.get_all(name));
            if let Some(invalid) = tokens.iter().find(|t| !choices.contains(t)) {
                errors.add(name, invalid_choice(invalid));
                return vec![];
            }

            tokens
                .into_iter()
                .filter_map(|token| Identity::new(token).ok())
                .collect()
        };

        let inputs = RightsInputs {
            discover_and_read: field(Self::DISCOVER_AND_READ),
            discover_only: field(Self::DISCOVER_ONLY),
            read_only: field(Self::READ_ONLY),
            edit_rights: field(Self::EDIT_RIGHTS),
            owners: field(Self::OWNERS),
        };

        if inputs.owners.is_empty() && errors.0.get(Self::OWNERS).is_none() {
            errors.add(Self::OWNERS, REQUIRED);
        }

        errors.finish(inputs)
    }
}

pub struct CollectionsForm;

impl CollectionsForm {
    pub const COLLECTIONS: &'static str = "collections";

    /// Cleans the selected collections against the library's subfolders. Nothing
    /// selected is valid and removes the object from every collection.
    pub fn clean(
        data: &FormData,
        choices: &[(String, String)],
    ) -> Result<Vec<String>, FormErrors> {
        let mut selected: Vec<String> = vec![];
        for token in split_tokens(data.get_all(Self::COLLECTIONS)) {
            if !choices.iter().any(|(id, _)| *id == token) {
                return Err(FormErrors::single(Self::COLLECTIONS, invalid_choice(&token)));
            }
            if !selected.contains(&token) {
                selected.push(token);
            }
        }

        Ok(selected)
    }
}

pub struct EmbargoForm;

impl EmbargoForm {
    pub const EMBARGO_END_YEAR: &'static str = "embargo_end_year";

    pub fn clean(data: &FormData, current_year: i32) -> Result<u16, FormErrors> {
        let field = Self::EMBARGO_END_YEAR;
        let Some(value) = data.get(field).map(str::trim).filter(|v| !v.is_empty()) else {
            return Err(FormErrors::single(field, REQUIRED));
        };

        let Ok(year) = value.parse::<i32>() else {
            return Err(FormErrors::single(field, "Enter a whole number."));
        };

        if year < current_year {
            return Err(FormErrors::single(
                field,
                format!("Ensure this value is greater than or equal to {current_year}."),
            ));
        }

        match u16::try_from(year) {
            Ok(year) if year <= 9999 => Ok(year),
            _ => Err(FormErrors::single(
                field,
                "Ensure this value is less than or equal to 9999.",
            )),
        }
    }
}

pub struct ReorderForm;

impl ReorderForm {
    pub const CHILD_PIDS: &'static str = "child_pids_ordered_list";

    /// Cleans the new child order. When the object reports its children, the
    /// submission must be a permutation of them.
    pub fn clean(data: &FormData, children: &[String]) -> Result<Vec<String>, FormErrors> {
        let field = Self::CHILD_PIDS;
        let pids = split_tokens(data.get_all(field));
        if pids.is_empty() {
            return Err(FormErrors::single(field, REQUIRED));
        }

        let mut errors = FormErrors::default();
        for (i, pid) in pids.iter().enumerate() {
            if pids[..i].contains(pid) {
                errors.add(field, format!("Duplicate pid {pid}."));
            }
        }

        if !children.is_empty() {
            let mut submitted = pids.clone();
            let mut expected = children.to_vec();
            submitted.sort();
            expected.sort();
            if submitted != expected {
                errors.add(field, "Submitted pids must match the object's children.");
            }
        }

        errors.finish(pids)
    }
}

/// Query of a new datastream upload. The file itself is the request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateStreamForm {
    pub dsid: String,
    pub label: Option<String>,
}

impl CreateStreamForm {
    pub const DSID: &'static str = "dsid";
    pub const LABEL: &'static str = "label";

    /// The audit trail is served by the repository and can never be uploaded.
    pub const RESERVED: &'static [&'static str] = &["AUDIT"];

    pub fn clean(data: &FormData, object: &ObjectInfo) -> Result<Self, FormErrors> {
        let field = Self::DSID;
        let Some(dsid) = data.get(field).map(str::trim).filter(|d| !d.is_empty()) else {
            return Err(FormErrors::single(field, REQUIRED));
        };

        if !dsid
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(FormErrors::single(
                field,
                "Enter a valid datastream id: letters, numbers, underscores or hyphens.",
            ));
        }

        if object.has_datastream(dsid) || Self::RESERVED.contains(&dsid) {
            return Err(FormErrors::single(
                field,
                format!("Datastream {dsid} already exists."),
            ));
        }

        Ok(Self {
            dsid: dsid.to_string(),
            label: data
                .get(Self::LABEL)
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string),
        })
    }
}

pub struct XmlForm;

impl XmlForm {
    pub const XML_CONTENT: &'static str = "xml_content";

    pub fn clean(data: &FormData) -> Result<String, FormErrors> {
        let field = Self::XML_CONTENT;
        let Some(content) = data.get(field).filter(|c| !c.trim().is_empty()) else {
            return Err(FormErrors::single(field, REQUIRED));
        };

        check_well_formed(content)
            .map_err(|e| FormErrors::single(field, format!("Enter well-formed XML: {e}")))?;

        Ok(content.to_string())
    }
}

fn check_well_formed(xml: &str) -> Result<(), String> {
    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;
    let mut roots = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                check_attributes(&start)?;
                if depth == 0 {
                    roots += 1;
                }
                depth += 1;
            }
            Ok(Event::Empty(empty)) => {
                check_attributes(&empty)?;
                if depth == 0 {
                    roots += 1;
                }
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Text(text)) => {
                let text = text.unescape().map_err(|e| e.to_string())?;
                if depth == 0 && !text.trim().is_empty() {
                    return Err("text outside of the root element".to_string());
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(e.to_string()),
        }
    }

    if depth != 0 {
        return Err("unclosed element".to_string());
    }

    if roots != 1 {
        return Err("expected a single root element".to_string());
    }

    Ok(())
}

/// Attributes are parsed lazily, so quoting, duplicates and entities in values
/// are only checked here.
fn check_attributes(element: &BytesStart<'_>) -> Result<(), String> {
    for attribute in element.attributes().with_checks(true) {
        let attribute = attribute.map_err(|e| e.to_string())?;
        attribute.unescape_value().map_err(|e| e.to_string())?;
    }
    Ok(())
}
