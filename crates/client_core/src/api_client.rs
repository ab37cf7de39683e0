use async_trait::async_trait;
use shared::{
    domain::{Characteristic, Service},
    protocol::{
        CharacterStatusResponse, CreateCharacterResponse, DeleteCharacterResponse,
        EnlistmentRequest, EnlistmentResponse, ReenlistmentResponse, RevealCharacteristicRequest,
        RevealCharacteristicResponse, RollOutcome, TermButtonStatus, TermInfoResponse,
        TermSkillsResponse,
    },
};

use crate::{
    config::ClientSettings,
    error::ApiResult,
    transport::{Endpoint, HttpTransport},
};

/// One method per character server endpoint.
#[async_trait]
pub trait CharacterApi: Send + Sync {
    async fn create_character(&self) -> ApiResult<CreateCharacterResponse>;
    async fn delete_character(&self) -> ApiResult<DeleteCharacterResponse>;
    async fn reveal_characteristic(
        &self,
        characteristic: Characteristic,
    ) -> ApiResult<RevealCharacteristicResponse>;
    async fn attempt_enlistment(&self, service: Service) -> ApiResult<EnlistmentResponse>;
    async fn term_survival(&self) -> ApiResult<RollOutcome>;
    async fn term_commission(&self) -> ApiResult<RollOutcome>;
    async fn term_promotion(&self) -> ApiResult<RollOutcome>;
    async fn term_reenlistment(&self) -> ApiResult<ReenlistmentResponse>;
    async fn character_status(&self) -> ApiResult<CharacterStatusResponse>;
    async fn term_info(&self) -> ApiResult<TermInfoResponse>;
    async fn term_button_status(&self) -> ApiResult<TermButtonStatus>;
    async fn calculate_term_skills(&self) -> ApiResult<TermSkillsResponse>;
}

#[derive(Clone)]
pub struct HttpCharacterApi {
    transport: HttpTransport,
}

impl HttpCharacterApi {
    pub fn new(settings: &ClientSettings) -> ApiResult<Self> {
        Ok(Self {
            transport: HttpTransport::new(settings.server_url.clone(), settings.request_timeout)?,
        })
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }
}

#[async_trait]
impl CharacterApi for HttpCharacterApi {
    async fn create_character(&self) -> ApiResult<CreateCharacterResponse> {
        self.transport
            .post::<(), _>(Endpoint::CreateCharacter, None)
            .await
    }

    async fn delete_character(&self) -> ApiResult<DeleteCharacterResponse> {
        self.transport
            .post::<(), _>(Endpoint::DeleteCharacter, None)
            .await
    }

    async fn reveal_characteristic(
        &self,
        characteristic: Characteristic,
    ) -> ApiResult<RevealCharacteristicResponse> {
        self.transport
            .post(
                Endpoint::RevealCharacteristic,
                Some(&RevealCharacteristicRequest { characteristic }),
            )
            .await
    }

    async fn attempt_enlistment(&self, service: Service) -> ApiResult<EnlistmentResponse> {
        self.transport
            .post(Endpoint::AttemptEnlistment, Some(&EnlistmentRequest { service }))
            .await
    }

    async fn term_survival(&self) -> ApiResult<RollOutcome> {
        self.transport.post::<(), _>(Endpoint::TermSurvival, None).await
    }

    async fn term_commission(&self) -> ApiResult<RollOutcome> {
        self.transport
            .post::<(), _>(Endpoint::TermCommission, None)
            .await
    }

    async fn term_promotion(&self) -> ApiResult<RollOutcome> {
        self.transport.post::<(), _>(Endpoint::TermPromotion, None).await
    }

    async fn term_reenlistment(&self) -> ApiResult<ReenlistmentResponse> {
        self.transport
            .post::<(), _>(Endpoint::TermReenlistment, None)
            .await
    }

    async fn character_status(&self) -> ApiResult<CharacterStatusResponse> {
        self.transport.get(Endpoint::CharacterStatus).await
    }

    async fn term_info(&self) -> ApiResult<TermInfoResponse> {
        self.transport.get(Endpoint::TermInfo).await
    }

    async fn term_button_status(&self) -> ApiResult<TermButtonStatus> {
        self.transport.get(Endpoint::TermButtonStatus).await
    }

    async fn calculate_term_skills(&self) -> ApiResult<TermSkillsResponse> {
        self.transport
            .post::<(), _>(Endpoint::CalculateTermSkills, None)
            .await
    }
}

#[cfg(test)]
#[path = "tests/api_client_tests.rs"]
mod tests;
