//! Handler responses and the JSON status envelope
//!
//! JSON endpoints answer `{"sc": 0}` on success and
//! `{"sc": -1, "msg": "..."}` on failure.

use bm_model::DataModel;
use serde_json::{json, Value};
use warp::http::StatusCode;

/// Envelope status key
pub const STATUS_CODE: &str = "sc";
/// Envelope message key
pub const MSG: &str = "msg";
/// Envelope success status
pub const SUCC: i32 = 0;
/// Envelope failure status
pub const ERR: i32 = -1;

/// What a handler or advice produced
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// JSON body with an HTTP status
    Json { status: StatusCode, body: Value },
    /// Template name plus the model to render it with
    Page {
        template: String,
        data_model: DataModel,
    },
    /// 302 to `location`
    Redirect { location: String },
}

impl Response {
    /// `{"sc": 0}`
    #[must_use]
    pub fn succ() -> Self {
        Self::succ_with(json!({}))
    }

    /// `{"sc": 0}` merged into `extra` (must be an object)
    #[must_use]
    pub fn succ_with(mut extra: Value) -> Self {
        if let Some(obj) = extra.as_object_mut() {
            obj.insert(STATUS_CODE.to_string(), json!(SUCC));
        }
        Self::Json {
            status: StatusCode::OK,
            body: extra,
        }
    }

    /// `{"sc": -1, "msg": msg}` with HTTP 200
    #[must_use]
    pub fn err(msg: impl Into<String>) -> Self {
        Self::err_status(StatusCode::OK, msg)
    }

    /// `{"sc": -1, "msg": msg}` with the given HTTP status
    #[must_use]
    pub fn err_status(status: StatusCode, msg: impl Into<String>) -> Self {
        let msg: String = msg.into();
        Self::Json {
            status,
            body: json!({ STATUS_CODE: ERR, MSG: msg }),
        }
    }

    #[must_use]
    pub fn page(template: impl Into<String>, data_model: DataModel) -> Self {
        Self::Page {
            template: template.into(),
            data_model,
        }
    }

    #[must_use]
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::Redirect {
            location: location.into(),
        }
    }

    /// HTTP status of this response
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Json { status, .. } => *status,
            Self::Page { .. } => StatusCode::OK,
            Self::Redirect { .. } => StatusCode::FOUND,
        }
    }

    /// JSON body as sent over the wire (`null` for redirects)
    #[must_use]
    pub fn body(&self) -> Value {
        match self {
            Self::Json { body, .. } => body.clone(),
            Self::Page {
                template,
                data_model,
            } => json!({ "template": template, "dataModel": data_model }),
            Self::Redirect { .. } => Value::Null,
        }
    }

    /// Mutable data model of a page response
    pub fn data_model_mut(&mut self) -> Option<&mut DataModel> {
        match self {
            Self::Page { data_model, .. } => Some(data_model),
            _ => None,
        }
    }
}
