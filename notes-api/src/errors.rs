use std::sync::{Arc, OnceLock};

use crate::{error_responses, store};
use axum::{
    extract::{rejection::PathRejection, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_jsonschema::JsonSchemaRejection;
use schemars::{
    schema::{Schema, SchemaObject, SubschemaValidation},
    schema_for, schema_for_value, JsonSchema,
};
use serde::Serialize;
use serde_json::{json, Map, Value};

pub use response::{ErrorResponse, ErrorResponseDocs};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("not_found")]
    NotFound(String),

    // validation
    #[error("validation")]
    Validation(String),
    #[error("validation")]
    JsonValidation(JsonSchemaRejection),
    #[error("validation")]
    PathValidation(#[from] PathRejection),

    #[error("{context}")]
    Store {
        context: String,
        #[source]
        source: store::Error,
    },

    // startup
    #[error(transparent)]
    Config(#[from] envy::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("unexpected")]
    Unexpected(String),
}

impl Error {
    pub fn store(context: impl Into<String>, source: store::Error) -> Self {
        Self::Store {
            context: context.into(),
            source,
        }
    }
}

impl From<JsonSchemaRejection> for Error {
    fn from(rejection: JsonSchemaRejection) -> Self {
        Self::JsonValidation(rejection)
    }
}

// Response

error_responses! {
    not_found: 404,
    validation: 400,
    path_validation: 400,
    json_validation: 400,
    conflict: 409,
    unexpected: 500
}

impl From<&Error> for ErrorResponse {
    fn from(error: &Error) -> Self {
        let errors = errors();
        match error {
            Error::NotFound(message) => errors.not_found.with_message(message),
            Error::Validation(message) => errors.validation.with_message(message),
            Error::JsonValidation(JsonSchemaRejection::Json(error)) => {
                errors.json_validation.with_message(error.body_text())
            }
            Error::JsonValidation(JsonSchemaRejection::Serde(error)) => {
                errors.json_validation.with_message(error.to_string())
            }
            Error::JsonValidation(JsonSchemaRejection::Schema(schema_errors)) => {
                let mut details = Map::new();
                details.insert("errors".into(), json!(schema_errors));
                errors
                    .json_validation
                    .with_message("Request schema validation error")
                    .with_details(details)
            }
            Error::PathValidation(error) => errors.path_validation.with_message(error.body_text()),
            Error::Store {
                context,
                source: source @ store::Error::AlreadyExists(_),
            } => errors.conflict.with_message(format!("{context}: {source}")),
            Error::Unexpected(message) => errors.unexpected.with_message(message),
            _ => errors.unexpected.with_message("Unexpected"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let error = Arc::new(self);

        let error_res = ErrorResponse::from(error.as_ref());
        let status = error_res.status;

        let mut res = axum::Json(error_res).into_response();
        res.extensions_mut().insert(error);

        *res.status_mut() = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        res
    }
}

pub async fn on_error(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    let error = response.extensions().get::<Arc<Error>>().map(Arc::as_ref);
    if let Some(error) = error {
        tracing::error!("{:?}", error);
    }

    response
}

mod response {
    use super::*;

    #[derive(Debug, Serialize, Clone, Default, JsonSchema)]
    pub struct ErrorResponse {
        pub error: String,
        pub message: Option<String>,
        pub status: u16,
        pub details: Option<Map<String, Value>>,
    }

    impl ErrorResponse {
        pub fn new(error: impl Into<String>, status: u16) -> Self {
            Self {
                error: error.into(),
                status,
                ..Default::default()
            }
        }

        pub fn with_message(&self, message: impl Into<String>) -> Self {
            let mut res = self.clone();
            res.message = Some(message.into());
            res
        }

        pub fn with_details(mut self, details: Map<String, Value>) -> Self {
            self.details = Some(details);
            self
        }
    }

    /// `ErrorResponse` schema narrowed to one variant per known error.
    pub struct ErrorResponseDocs;

    impl JsonSchema for ErrorResponseDocs {
        fn schema_name() -> String {
            String::from("ErrorResponse")
        }

        fn json_schema(_gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
            let example_schema = schema_for_value!(errors());

            let error_schemas = example_schema
                .schema
                .metadata
                .as_ref()
                .and_then(|metadata| metadata.examples.first())
                .and_then(Value::as_object)
                .map(|examples| examples.values().filter_map(variant_schema).collect::<Vec<_>>())
                .unwrap_or_default();

            let schema = SchemaObject {
                subschemas: Some(Box::new(SubschemaValidation {
                    one_of: Some(error_schemas),
                    ..Default::default()
                })),
                ..Default::default()
            };

            schema.into()
        }
    }

    fn variant_schema(example: &Value) -> Option<Schema> {
        let error = example.get("error")?.as_str()?.to_string();
        let status = example.get("status")?.as_u64()?;

        let mut schema = schema_for!(ErrorResponse).schema;
        let obj = schema.object();
        if let Some(Schema::Object(prop)) = obj.properties.get_mut("status") {
            prop.enum_values = Some(vec![Value::from(status)]);
        }
        if let Some(Schema::Object(prop)) = obj.properties.get_mut("error") {
            prop.enum_values = Some(vec![Value::from(error)]);
        }

        Some(Schema::from(schema))
    }

    /// Typed responses with a custom JSON schema
    /// ```rust,ignore
    /// error_responses! {
    ///     not_found: 404,
    ///     unexpected: 500
    /// }
    ///
    /// impl From<&Error> for ErrorResponse {
    ///     fn from(error: &Error) -> Self {
    ///         let errors = errors(); // <- from macro
    ///         match error {
    ///             Error::NotFound(message) => errors.not_found.with_message(message),
    ///             Error::Unexpected(message) => errors.unexpected.with_message(message),
    ///         }
    ///     }
    /// }
    /// ```
    #[macro_export]
    macro_rules! error_responses {
        (
            $($name:ident: $code:expr),* $(,)?
        ) => {
            #[derive(Debug, Clone, Serialize)]
            struct Responses {
                $(
                    $name: ErrorResponse,
                )*
            }

            static ERRORS: OnceLock<Responses> = OnceLock::new();

            fn errors() -> &'static Responses {
                ERRORS.get_or_init(|| Responses {
                    $(
                        $name: ErrorResponse::new(stringify!($name), $code),
                    )*
                })
            }
        };
    }
}
