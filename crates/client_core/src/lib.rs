//! Client core for the Traveller character generator: talks to the character
//! server, mirrors its state and decides what the page should show.

pub mod api_client;
pub mod config;
pub mod error;
pub mod render;
pub mod state;
pub mod sync;
pub mod transport;
pub mod types;
pub mod view_state;

pub use api_client::{CharacterApi, HttpCharacterApi};
pub use config::{load_settings, ClientSettings, ConfigError, Features, Layout};
pub use error::{ApiResult, ClientError, FailureKind};
pub use render::{render, BindingTable, ElementId, Page, Surface};
pub use state::{Action, ActionOutcome, ActionReport, AppState, StatusMessage, TermCheck};
pub use sync::{execute, fetch_snapshot};
pub use view_state::{derive_view_state, Phase, ViewState};
