//! Runs actions against the character server and re-reads its state.

use tracing::{debug, info, warn};

use crate::{
    api_client::CharacterApi,
    config::Features,
    error::{ClientError, FailureKind},
    state::{Action, ActionOutcome, ActionReport, TermCheck},
    types::{CharacterSummary, RollHistory, Snapshot, TermInfo},
};

/// Performs `action`, then refreshes unless the action failed, was a
/// rejected reveal, or is a reveal patched locally per `features`.
pub async fn execute(api: &dyn CharacterApi, action: Action, features: &Features) -> ActionReport {
    debug!(action = %action, "executing action");
    let result = perform(api, action).await;

    let refresh = match &result {
        Err(_) | Ok(ActionOutcome::RevealRejected(_)) => false,
        Ok(ActionOutcome::Revealed { .. }) => features.refresh_after_reveal,
        Ok(_) => true,
    };
    let snapshot = if refresh {
        Some(fetch_snapshot(api, features).await)
    } else {
        None
    };

    ActionReport {
        action,
        result,
        snapshot,
    }
}

async fn perform(api: &dyn CharacterApi, action: Action) -> Result<ActionOutcome, ClientError> {
    match action {
        Action::Refresh => Ok(ActionOutcome::Refreshed),
        Action::Create => api.create_character().await.map(ActionOutcome::Created),
        Action::Delete => api
            .delete_character()
            .await
            .map(|response| ActionOutcome::Deleted {
                deleted: response.deleted,
            }),
        Action::Reveal(characteristic) => match api.reveal_characteristic(characteristic).await {
            Ok(response) => Ok(ActionOutcome::Revealed {
                characteristic,
                response,
            }),
            Err(err) if err.kind() == FailureKind::ValidationRejection => {
                Ok(ActionOutcome::RevealRejected(characteristic))
            }
            Err(err) => Err(err),
        },
        Action::Enlist(service) => api
            .attempt_enlistment(service)
            .await
            .map(|response| ActionOutcome::Enlisted(response.into())),
        Action::Check(check) => {
            let outcome = match check {
                TermCheck::Survival => api.term_survival().await,
                TermCheck::Commission => api.term_commission().await,
                TermCheck::Promotion => api.term_promotion().await,
            }?;
            Ok(ActionOutcome::Rolled { check, outcome })
        }
        Action::Reenlist => api
            .term_reenlistment()
            .await
            .map(|response| ActionOutcome::Reenlisted(response.into())),
    }
}

/// Reads the four snapshot endpoints concurrently. A failed status read means
/// "no character"; other failed reads leave their part empty.
pub async fn fetch_snapshot(api: &dyn CharacterApi, features: &Features) -> Snapshot {
    let skills = async {
        if features.term_skills {
            Some(api.calculate_term_skills().await)
        } else {
            None
        }
    };
    let (status, term, buttons, skills) = futures::join!(
        api.character_status(),
        api.term_info(),
        api.term_button_status(),
        skills
    );

    let (character, rolls) = match status {
        Ok(status) => (
            CharacterSummary::from_status(&status),
            RollHistory::from_status(&status),
        ),
        Err(err) => {
            debug!(error = %err, "character status unavailable; treating as no character");
            (None, RollHistory::default())
        }
    };

    if character.is_none() {
        return Snapshot::default();
    }

    let term = term
        .map(TermInfo::from)
        .map_err(|err| warn!(error = %err, "term info unavailable"))
        .ok();
    let buttons = buttons
        .map_err(|err| warn!(error = %err, "term button status unavailable"))
        .ok();
    let skills = match skills {
        Some(Ok(response)) => response.skill_breakdown,
        Some(Err(err)) => {
            warn!(error = %err, "term skills unavailable");
            None
        }
        None => None,
    };

    info!(
        has_term = term.is_some(),
        has_buttons = buttons.is_some(),
        "snapshot refreshed"
    );

    Snapshot {
        character,
        rolls,
        term,
        buttons,
        skills,
    }
}

#[cfg(test)]
#[path = "tests/sync_tests.rs"]
mod tests;
