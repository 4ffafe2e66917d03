use steward_application::AccessService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub access_service: AccessService,
}
