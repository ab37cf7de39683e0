use std::{fmt, time::Duration};

use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use shared::error::ServerErrorBody;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ApiResult, ClientError};

/// The fixed set of character server endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    CreateCharacter,
    DeleteCharacter,
    RevealCharacteristic,
    AttemptEnlistment,
    TermSurvival,
    TermCommission,
    TermPromotion,
    TermReenlistment,
    CharacterStatus,
    TermInfo,
    TermButtonStatus,
    CalculateTermSkills,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::CreateCharacter => "/create_character",
            Endpoint::DeleteCharacter => "/delete_character",
            Endpoint::RevealCharacteristic => "/reveal_characteristic",
            Endpoint::AttemptEnlistment => "/attempt_enlistment",
            Endpoint::TermSurvival => "/term_survival",
            Endpoint::TermCommission => "/term_commission",
            Endpoint::TermPromotion => "/term_promotion",
            Endpoint::TermReenlistment => "/term_reenlistment",
            Endpoint::CharacterStatus => "/character_status",
            Endpoint::TermInfo => "/term_info",
            Endpoint::TermButtonStatus => "/term_button_status",
            Endpoint::CalculateTermSkills => "/calculate_term_skills",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Endpoint::CharacterStatus | Endpoint::TermInfo | Endpoint::TermButtonStatus => {
                Method::GET
            }
            _ => Method::POST,
        }
    }

    /// A 400 from this endpoint means "nothing to do" rather than a failure.
    fn rejects_silently(self) -> bool {
        matches!(self, Endpoint::RevealCharacteristic)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// JSON-over-HTTP plumbing shared by every endpoint wrapper.
#[derive(Clone)]
pub struct HttpTransport {
    http: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: Url, timeout: Duration) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Builder)?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn url(&self, endpoint: Endpoint) -> Url {
        let mut url = self.base_url.clone();
        let base_path = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{base_path}{}", endpoint.path()));
        url
    }

    pub async fn get<T>(&self, endpoint: Endpoint) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        self.send::<(), T>(endpoint, None).await
    }

    /// POSTs `body`, or `{}` when the endpoint takes no payload.
    pub async fn post<B, T>(&self, endpoint: Endpoint, body: Option<&B>) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        match body {
            Some(body) => self.send(endpoint, Some(body)).await,
            None => {
                self.send(endpoint, Some(&serde_json::Map::new()))
                    .await
            }
        }
    }

    async fn send<B, T>(&self, endpoint: Endpoint, body: Option<&B>) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(endpoint);
        debug!(endpoint = %endpoint, method = %endpoint.method(), "sending request");

        let mut request = self.http.request(endpoint.method(), url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|source| ClientError::Transport { endpoint, source })?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|source| ClientError::Transport { endpoint, source })?;

        if !status.is_success() {
            let detail = ServerErrorBody::from_slice(&bytes)
                .and_then(|body| body.describe().map(str::to_string));
            if status == StatusCode::BAD_REQUEST && endpoint.rejects_silently() {
                debug!(endpoint = %endpoint, "request rejected by server");
                return Err(ClientError::Rejected { endpoint, detail });
            }
            warn!(endpoint = %endpoint, status = %status, "request failed");
            return Err(ClientError::Status {
                endpoint,
                status,
                detail,
            });
        }

        decode_body(endpoint, &bytes)
    }
}

/// An empty 2xx body decodes as `{}` so optional-field responses still parse.
fn decode_body<T: DeserializeOwned>(endpoint: Endpoint, bytes: &[u8]) -> ApiResult<T> {
    let bytes: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        bytes
    };
    serde_json::from_slice(bytes).map_err(|source| ClientError::Decode { endpoint, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::protocol::{CreateCharacterResponse, DeleteCharacterResponse};

    #[test]
    fn endpoint_urls_keep_base_path_prefix() {
        let transport = HttpTransport::new(
            Url::parse("http://127.0.0.1:5000/traveller/").expect("url"),
            Duration::from_secs(1),
        )
        .expect("transport");
        assert_eq!(
            transport.url(Endpoint::TermInfo).as_str(),
            "http://127.0.0.1:5000/traveller/term_info"
        );

        let transport = HttpTransport::new(
            Url::parse("http://localhost:5000").expect("url"),
            Duration::from_secs(1),
        )
        .expect("transport");
        assert_eq!(
            transport.url(Endpoint::CreateCharacter).as_str(),
            "http://localhost:5000/create_character"
        );
    }

    #[test]
    fn read_endpoints_use_get() {
        assert_eq!(Endpoint::CharacterStatus.method(), Method::GET);
        assert_eq!(Endpoint::TermButtonStatus.method(), Method::GET);
        assert_eq!(Endpoint::TermSurvival.method(), Method::POST);
        assert_eq!(Endpoint::CalculateTermSkills.method(), Method::POST);
    }

    #[test]
    fn blank_body_decodes_as_empty_object() {
        let decoded: DeleteCharacterResponse =
            decode_body(Endpoint::DeleteCharacter, b"  ").expect("decode");
        assert!(!decoded.deleted);

        let err = decode_body::<CreateCharacterResponse>(Endpoint::CreateCharacter, b"not json")
            .expect_err("must fail");
        assert!(matches!(err, ClientError::Decode { .. }));
    }
}
