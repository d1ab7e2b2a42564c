//! Handler for the `/identify` endpoint.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/identify` | Body: [`IdentifyBody`]; returns the consolidated contact |

use std::sync::Arc;

use axum::{Json, extract::State};
use coalesce_core::{
  contact::Observation, response::ConsolidatedContact, store::IdentityStore,
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ApiError;

/// JSON body accepted by `POST /identify`. Both fields are optional on
/// the wire, but at least one must carry a value.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyBody {
  #[serde(default)]
  pub email:        Option<String>,
  #[serde(default, deserialize_with = "string_or_number")]
  pub phone_number: Option<String>,
}

/// Envelope around the consolidated contact, matching the historical
/// response shape.
#[derive(Debug, Serialize)]
pub struct IdentifyResponse {
  pub contact: ConsolidatedContact,
}

/// `POST /identify` — body: `{"email": "...", "phoneNumber": "..."}`
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<IdentifyBody>,
) -> Result<Json<IdentifyResponse>, ApiError>
where
  S: IdentityStore,
{
  let observation = Observation::new(body.email, body.phone_number)
    .map_err(|_| ApiError::MissingIdentifier)?;

  let contact = store
    .identify(observation)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(IdentifyResponse { contact }))
}

/// `phoneNumber` historically arrives as either a JSON string or a bare
/// number; coerce numbers to their decimal string form.
fn string_or_number<'de, D>(
  deserializer: D,
) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Raw {
    Text(String),
    Number(serde_json::Number),
  }

  Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
    Raw::Text(s) => s,
    Raw::Number(n) => n.to_string(),
  }))
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use coalesce_core::response::ConsolidatedContact;
  use tower::ServiceExt as _;

  use super::*;
  use crate::api_router;

  // ─── Body parsing ──────────────────────────────────────────────────────────

  #[test]
  fn phone_number_accepts_string_and_number() {
    let body: IdentifyBody =
      serde_json::from_str(r#"{"phoneNumber": "111"}"#).unwrap();
    assert_eq!(body.phone_number.as_deref(), Some("111"));

    let body: IdentifyBody =
      serde_json::from_str(r#"{"phoneNumber": 123456}"#).unwrap();
    assert_eq!(body.phone_number.as_deref(), Some("123456"));
  }

  #[test]
  fn absent_fields_deserialise_to_none() {
    let body: IdentifyBody = serde_json::from_str("{}").unwrap();
    assert_eq!(body.email, None);
    assert_eq!(body.phone_number, None);

    let body: IdentifyBody =
      serde_json::from_str(r#"{"email": null, "phoneNumber": null}"#).unwrap();
    assert_eq!(body.email, None);
    assert_eq!(body.phone_number, None);
  }

  // ─── Routing and status mapping ────────────────────────────────────────────

  /// Canned [`IdentityStore`] so routing tests need no database.
  #[derive(Clone)]
  enum StubStore {
    Respond(ConsolidatedContact),
    Fail,
  }

  impl IdentityStore for StubStore {
    type Error = std::io::Error;

    async fn identify(
      &self,
      _observation: Observation,
    ) -> Result<ConsolidatedContact, Self::Error> {
      match self {
        StubStore::Respond(contact) => Ok(contact.clone()),
        StubStore::Fail => Err(std::io::Error::other("backend down")),
      }
    }
  }

  fn sample_contact() -> ConsolidatedContact {
    ConsolidatedContact {
      primary_contact_id:    1,
      emails:                vec!["a@x.com".into()],
      phone_numbers:         vec!["111".into()],
      secondary_contact_ids: vec![2],
    }
  }

  async fn post_identify(
    store: StubStore,
    body: &str,
  ) -> (StatusCode, serde_json::Value) {
    let app = api_router(Arc::new(store));
    let response = app
      .oneshot(
        Request::builder()
          .method("POST")
          .uri("/identify")
          .header(header::CONTENT_TYPE, "application/json")
          .body(Body::from(body.to_owned()))
          .unwrap(),
      )
      .await
      .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
      .await
      .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  #[tokio::test]
  async fn identify_returns_consolidated_contact() {
    let (status, json) = post_identify(
      StubStore::Respond(sample_contact()),
      r#"{"email": "a@x.com", "phoneNumber": 111}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["contact"]["primaryContatctId"], 1);
    assert_eq!(json["contact"]["emails"][0], "a@x.com");
    assert_eq!(json["contact"]["phoneNumbers"][0], "111");
    assert_eq!(json["contact"]["secondaryContactIds"][0], 2);
  }

  #[tokio::test]
  async fn missing_both_fields_is_rejected() {
    let (status, json) =
      post_identify(StubStore::Respond(sample_contact()), "{}").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Email or phoneNumber is required");
  }

  #[tokio::test]
  async fn empty_strings_count_as_missing() {
    let (status, json) = post_identify(
      StubStore::Respond(sample_contact()),
      r#"{"email": "", "phoneNumber": ""}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Email or phoneNumber is required");
  }

  #[tokio::test]
  async fn store_failures_are_opaque() {
    let (status, json) =
      post_identify(StubStore::Fail, r#"{"email": "a@x.com"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Internal Server Error");
  }
}
